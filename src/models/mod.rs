use serde::{Deserialize, Serialize};

pub mod forecast;
pub mod location;
pub mod movie;

pub use forecast::{DailyReading, ForecastResult, OpenMeteoForecast};
pub use location::{
    format_coordinate, round_coordinate, CoordinateError, CoordinatePair, GeocodeQuery,
};
pub use movie::{Movie, MovieUpdate, NewMovie};

// ============================================================================
// TMDb API Types
// ============================================================================

/// Paged result of a movie search or genre discovery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// A movie as listed in search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
}

/// Full movie record from `/movie/{id}?append_to_response=credits`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub spoken_languages: Vec<SpokenLanguage>,
    #[serde(default)]
    pub credits: Option<Credits>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpokenLanguage {
    #[serde(default)]
    pub iso_639_1: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub order: i32,
}

/// Response from `/movie/{id}/images`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieImages {
    pub id: i64,
    #[serde(default)]
    pub backdrops: Vec<ImageInfo>,
    #[serde(default)]
    pub posters: Vec<ImageInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageInfo {
    pub file_path: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub aspect_ratio: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
}

/// Response from `/configuration`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbConfiguration {
    #[serde(default)]
    pub images: Option<ImageConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageConfiguration {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub secure_base_url: String,
    #[serde(default)]
    pub backdrop_sizes: Vec<String>,
    #[serde(default)]
    pub logo_sizes: Vec<String>,
    #[serde(default)]
    pub poster_sizes: Vec<String>,
    #[serde(default)]
    pub profile_sizes: Vec<String>,
    #[serde(default)]
    pub still_sizes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_deserialization() {
        let json = r#"{
            "page": 1,
            "results": [{
                "id": 27205,
                "title": "Inception",
                "original_title": "Inception",
                "overview": "Cobb, a skilled thief...",
                "release_date": "2010-07-15",
                "poster_path": "/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg",
                "backdrop_path": null,
                "vote_average": 8.369,
                "vote_count": 36000
            }],
            "total_pages": 1,
            "total_results": 1
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.page, 1);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, 27205);
        assert_eq!(response.results[0].backdrop_path, None);
    }

    #[test]
    fn test_movie_details_deserialization_with_credits() {
        let json = r#"{
            "id": 194,
            "title": "Amélie",
            "original_title": "Le Fabuleux Destin d'Amélie Poulain",
            "runtime": 122,
            "vote_average": 7.9,
            "genres": [{"id": 35, "name": "Comedy"}, {"id": 10749, "name": "Romance"}],
            "spoken_languages": [{"iso_639_1": "fr", "name": "Français"}],
            "credits": {"cast": [
                {"id": 1, "name": "Audrey Tautou", "character": "Amélie Poulain", "order": 0}
            ]}
        }"#;

        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.genres.len(), 2);
        assert_eq!(details.runtime, Some(122));
        assert_eq!(details.credits.unwrap().cast[0].name, "Audrey Tautou");
        assert_eq!(details.release_date, None);
    }

    #[test]
    fn test_configuration_deserialization() {
        let json = r#"{
            "images": {
                "base_url": "http://image.tmdb.org/t/p/",
                "secure_base_url": "https://image.tmdb.org/t/p/",
                "poster_sizes": ["w92", "w500", "original"]
            },
            "change_keys": ["adult"]
        }"#;

        let config: TmdbConfiguration = serde_json::from_str(json).unwrap();
        let images = config.images.unwrap();
        assert_eq!(images.poster_sizes, vec!["w92", "w500", "original"]);
        assert!(images.backdrop_sizes.is_empty());
    }
}
