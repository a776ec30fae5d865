use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{CoordinateError, CoordinatePair};

/// A movie stored in the local catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    pub tmdb_id: i64,
    pub title: String,
    pub original_title: String,
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub genre: Option<String>,
    pub poster_path: Option<String>,
    pub language: Option<String>,
    pub runtime: Option<i64>,
    pub vote_average: Option<f64>,
    pub main_cast: Option<String>,
    pub reference_city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// Stored coordinates, only when both halves are present and valid
    pub fn coordinates(&self) -> Option<CoordinatePair> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => CoordinatePair::new(lat, lon).ok(),
            _ => None,
        }
    }

    /// Trimmed reference city, if one is set and non-blank
    pub fn city(&self) -> Option<&str> {
        self.reference_city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn set_coordinates(&mut self, coordinates: CoordinatePair) {
        self.latitude = Some(coordinates.latitude);
        self.longitude = Some(coordinates.longitude);
    }

    /// Applies user edits, validating coordinates before touching the entry
    pub fn apply_update(&mut self, update: MovieUpdate) -> Result<(), CoordinateError> {
        let coordinates = CoordinatePair::from_parts(update.latitude, update.longitude)?;

        self.title = update.title;
        self.original_title = update.original_title;
        self.overview = update.overview;
        self.release_date = update.release_date;
        self.genre = update.genre;
        self.language = update.language;
        self.runtime = update.runtime;
        self.vote_average = update.vote_average;
        self.main_cast = update.main_cast;
        self.reference_city = update.reference_city;
        self.latitude = coordinates.map(|c| c.latitude);
        self.longitude = coordinates.map(|c| c.longitude);
        Ok(())
    }
}

/// Fields for a catalog entry that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub tmdb_id: i64,
    pub title: String,
    pub original_title: String,
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub genre: Option<String>,
    pub poster_path: Option<String>,
    pub language: Option<String>,
    pub runtime: Option<i64>,
    pub vote_average: Option<f64>,
    pub main_cast: Option<String>,
    pub reference_city: Option<String>,
    pub coordinates: Option<CoordinatePair>,
}

/// User-editable fields of a catalog entry
#[derive(Debug, Clone, Deserialize)]
pub struct MovieUpdate {
    pub title: String,
    pub original_title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub main_cast: Option<String>,
    #[serde(default)]
    pub reference_city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::movie;
    use super::*;

    fn update_for(title: &str) -> MovieUpdate {
        MovieUpdate {
            title: title.to_string(),
            original_title: title.to_string(),
            overview: None,
            release_date: None,
            genre: Some("Drama".to_string()),
            language: None,
            runtime: Some(120),
            vote_average: None,
            main_cast: None,
            reference_city: Some("Lisbon".to_string()),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_coordinates_require_both_parts() {
        let mut entry = movie(1, "Amélie");
        assert_eq!(entry.coordinates(), None);

        entry.latitude = Some(48.8566);
        assert_eq!(entry.coordinates(), None);

        entry.longitude = Some(2.3522);
        assert_eq!(
            entry.coordinates(),
            Some(CoordinatePair::new(48.8566, 2.3522).unwrap())
        );
    }

    #[test]
    fn test_city_ignores_blank_reference() {
        let mut entry = movie(1, "Amélie");
        entry.reference_city = Some("   ".to_string());
        assert_eq!(entry.city(), None);

        entry.reference_city = Some(" Paris ".to_string());
        assert_eq!(entry.city(), Some("Paris"));
    }

    #[test]
    fn test_apply_update_rounds_coordinates() {
        let mut entry = movie(1, "Amélie");
        let mut update = update_for("Le Fabuleux Destin");
        update.latitude = Some(38.72225512);
        update.longitude = Some(-9.13933398);

        entry.apply_update(update).unwrap();

        assert_eq!(entry.title, "Le Fabuleux Destin");
        assert_eq!(entry.latitude, Some(38.722255));
        assert_eq!(entry.longitude, Some(-9.139334));
        assert_eq!(entry.reference_city.as_deref(), Some("Lisbon"));
    }

    #[test]
    fn test_apply_update_rejects_invalid_coordinates_untouched() {
        let mut entry = movie(1, "Amélie");
        let mut update = update_for("Changed");
        update.latitude = Some(95.0);
        update.longitude = Some(10.0);

        assert!(entry.apply_update(update).is_err());
        assert_eq!(entry.title, "Amélie");
    }

    #[test]
    fn test_apply_update_clears_coordinates() {
        let mut entry = movie(1, "Amélie");
        entry.latitude = Some(1.0);
        entry.longitude = Some(2.0);

        entry.apply_update(update_for("Amélie")).unwrap();
        assert_eq!(entry.coordinates(), None);
    }
}
