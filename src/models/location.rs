use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Decimal places kept for every resolved or stored coordinate
pub const COORDINATE_PRECISION: i32 = 6;

/// Rounds a coordinate component to [`COORDINATE_PRECISION`] fractional digits
pub fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(COORDINATE_PRECISION);
    (value * factor).round() / factor
}

/// Locale-invariant, fixed six-decimal rendering used in outbound requests and cache keys
pub fn format_coordinate(value: f64) -> String {
    format!("{:.6}", round_coordinate(value))
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("latitude and longitude must be provided together")]
    Incomplete,
}

/// A latitude/longitude pair in decimal degrees.
///
/// Construction validates both ranges and rounds to six decimals, so any
/// `CoordinatePair` in hand is safe to send upstream or persist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePair {
    pub latitude: f64,
    pub longitude: f64,
}

impl CoordinatePair {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }

        Ok(Self {
            latitude: round_coordinate(latitude),
            longitude: round_coordinate(longitude),
        })
    }

    /// Builds a pair from optional parts: both or neither, never one alone
    pub fn from_parts(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<Self>, CoordinateError> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self::new(lat, lon).map(Some),
            (None, None) => Ok(None),
            _ => Err(CoordinateError::Incomplete),
        }
    }

    /// Stable key for caches keyed on a location
    pub fn cache_key(&self) -> String {
        format!(
            "{},{}",
            format_coordinate(self.latitude),
            format_coordinate(self.longitude)
        )
    }
}

impl Display for CoordinatePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A city name prepared for geocoding.
///
/// Holds the trimmed text sent upstream and the case-folded form used as cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeQuery {
    text: String,
    key: String,
}

impl GeocodeQuery {
    /// Returns `None` for empty or whitespace-only input
    pub fn parse(city: &str) -> Option<Self> {
        let text = city.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            key: text.to_lowercase(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cache_key(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_coordinate_six_places() {
        assert_eq!(round_coordinate(48.85661234), 48.856612);
        assert_eq!(round_coordinate(-23.5505199), -23.55052);
        assert_eq!(round_coordinate(2.3522), 2.3522);
    }

    #[test]
    fn test_format_coordinate_fixed_width() {
        assert_eq!(format_coordinate(48.8566), "48.856600");
        assert_eq!(format_coordinate(2.3522), "2.352200");
        assert_eq!(format_coordinate(-0.1), "-0.100000");
        assert_eq!(format_coordinate(0.0), "0.000000");
    }

    #[test]
    fn test_coordinate_pair_rejects_out_of_range() {
        assert_eq!(
            CoordinatePair::new(95.0, 10.0),
            Err(CoordinateError::LatitudeOutOfRange(95.0))
        );
        assert_eq!(
            CoordinatePair::new(10.0, 200.0),
            Err(CoordinateError::LongitudeOutOfRange(200.0))
        );
        assert!(CoordinatePair::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_coordinate_pair_accepts_bounds() {
        assert!(CoordinatePair::new(90.0, 180.0).is_ok());
        assert!(CoordinatePair::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_coordinate_pair_rounds_on_construction() {
        let pair = CoordinatePair::new(48.85661234, 2.35219876).unwrap();
        assert_eq!(pair.latitude, 48.856612);
        assert_eq!(pair.longitude, 2.352199);
    }

    #[test]
    fn test_from_parts_requires_both() {
        assert_eq!(CoordinatePair::from_parts(None, None), Ok(None));
        assert_eq!(
            CoordinatePair::from_parts(Some(1.0), None),
            Err(CoordinateError::Incomplete)
        );
        assert_eq!(
            CoordinatePair::from_parts(None, Some(1.0)),
            Err(CoordinateError::Incomplete)
        );
        assert!(CoordinatePair::from_parts(Some(1.0), Some(2.0))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_cache_key_uses_fixed_format() {
        let pair = CoordinatePair::new(48.8566, 2.3522).unwrap();
        assert_eq!(pair.cache_key(), "48.856600,2.352200");
    }

    #[test]
    fn test_geocode_query_normalizes_case_and_whitespace() {
        let a = GeocodeQuery::parse("  Paris ").unwrap();
        let b = GeocodeQuery::parse("PARIS").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.text(), "Paris");
    }

    #[test]
    fn test_geocode_query_rejects_blank() {
        assert!(GeocodeQuery::parse("").is_none());
        assert!(GeocodeQuery::parse("   \t").is_none());
    }
}
