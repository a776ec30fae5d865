/// City name to coordinates lookup
///
/// Backed by the Nominatim free-text search endpoint. Lookups are best-effort:
/// every failure (timeout, bad status, unreadable body, unparseable numbers)
/// is logged and reported as "not found".
use crate::{
    cached,
    db::{CacheKey, TtlCache},
    models::{CoordinatePair, GeocodeQuery},
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;

const GEOCODE_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns the best-ranked match for `city`, or `None` if it cannot be resolved
    async fn resolve(&self, city: &str) -> Option<CoordinatePair>;
}

/// One Nominatim search hit; coordinates arrive as decimal strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Clone)]
pub struct NominatimGeocoder {
    http_client: HttpClient,
    api_url: String,
    cache: TtlCache<CacheKey, CoordinatePair>,
}

impl NominatimGeocoder {
    pub fn new(http_client: HttpClient, api_url: String) -> Self {
        Self {
            http_client,
            api_url,
            cache: TtlCache::new(),
        }
    }

    async fn lookup(&self, query: &GeocodeQuery) -> Result<CoordinatePair, LookupFailure> {
        tracing::debug!(url = %self.api_url, city = %query.text(), "Geocoding request");

        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("q", query.text()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| LookupFailure::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupFailure::Request(format!(
                "geocoding service returned status {}",
                status
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| LookupFailure::Request(e.to_string()))?;

        let place = places.into_iter().next().ok_or(LookupFailure::NoMatch)?;
        parse_place(&place)
    }
}

/// Why a lookup produced no coordinates; never leaves this module
#[derive(Debug)]
enum LookupFailure {
    NoMatch,
    Request(String),
    Unparseable(String),
}

/// Parses the provider's strings with `.` as decimal separator, independent of host locale
fn parse_place(place: &NominatimPlace) -> Result<CoordinatePair, LookupFailure> {
    let latitude = place.lat.trim().parse::<f64>().map_err(|_| {
        LookupFailure::Unparseable(format!("latitude '{}' is not a number", place.lat))
    })?;
    let longitude = place.lon.trim().parse::<f64>().map_err(|_| {
        LookupFailure::Unparseable(format!("longitude '{}' is not a number", place.lon))
    })?;

    CoordinatePair::new(latitude, longitude).map_err(|e| LookupFailure::Unparseable(e.to_string()))
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, city: &str) -> Option<CoordinatePair> {
        let query = GeocodeQuery::parse(city)?;

        // Only successful lookups are cached; misses are retried on the next call
        let result: Result<CoordinatePair, LookupFailure> = async {
            cached!(
                self.cache,
                CacheKey::Geocode(query.cache_key().to_string()),
                GEOCODE_CACHE_TTL,
                self.lookup(&query)
            )
        }
        .await;

        match result {
            Ok(coordinates) => {
                tracing::info!(city = %query.text(), coordinates = %coordinates, "City resolved");
                Some(coordinates)
            }
            Err(LookupFailure::NoMatch) => {
                tracing::info!(city = %query.text(), "City not found");
                None
            }
            Err(LookupFailure::Unparseable(reason)) => {
                tracing::error!(city = %query.text(), reason = %reason, "Geocoding returned invalid coordinates");
                None
            }
            Err(LookupFailure::Request(reason)) => {
                tracing::warn!(city = %query.text(), url = %self.api_url, reason = %reason, "Geocoding request failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(lat: &str, lon: &str) -> NominatimPlace {
        NominatimPlace {
            lat: lat.to_string(),
            lon: lon.to_string(),
        }
    }

    #[test]
    fn test_parse_place_rounds() {
        let coordinates = parse_place(&place("48.8588897", "2.3200410")).unwrap();
        assert_eq!(coordinates.latitude, 48.85889);
        assert_eq!(coordinates.longitude, 2.320041);
    }

    #[test]
    fn test_parse_place_rejects_non_numeric() {
        assert!(matches!(
            parse_place(&place("abc", "2.35")),
            Err(LookupFailure::Unparseable(_))
        ));
        assert!(matches!(
            parse_place(&place("48.85", "")),
            Err(LookupFailure::Unparseable(_))
        ));
    }

    #[test]
    fn test_parse_place_rejects_comma_decimal() {
        assert!(parse_place(&place("48,8566", "2,3522")).is_err());
    }

    #[test]
    fn test_parse_place_rejects_out_of_range() {
        assert!(parse_place(&place("123.0", "2.0")).is_err());
    }

    #[tokio::test]
    async fn test_blank_city_skips_lookup() {
        // Unroutable URL: any request attempt would fail rather than hang
        let geocoder = NominatimGeocoder::new(HttpClient::new(), "http://127.0.0.1:1".to_string());
        assert_eq!(geocoder.resolve("   ").await, None);
        assert!(geocoder.cache.is_empty());
    }
}
