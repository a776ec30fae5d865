use std::{sync::Arc, time::Duration};

use sqlx::SqlitePool;

use crate::{
    config::Config,
    db::{MovieRepository, SqliteMovieRepository},
    services::{
        enrichment::LocationEnricher,
        geocoding::{Geocoder, NominatimGeocoder},
        movie_catalog::{ImageUrls, MovieCatalog, TmdbClient},
        weather::{OpenMeteoWeatherProvider, WeatherProvider},
    },
};

/// Shared application state
///
/// Each service owns its own cache; cloning the state shares them.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn MovieCatalog>,
    pub repository: Arc<dyn MovieRepository>,
    pub geocoder: Arc<dyn Geocoder>,
    pub weather: Arc<dyn WeatherProvider>,
    pub enricher: LocationEnricher,
    pub images: ImageUrls,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn MovieCatalog>,
        repository: Arc<dyn MovieRepository>,
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherProvider>,
        images: ImageUrls,
    ) -> Self {
        let enricher = LocationEnricher::new(Arc::clone(&weather), Arc::clone(&repository));
        Self {
            catalog,
            repository,
            geocoder,
            weather,
            enricher,
            images,
        }
    }

    /// Wires the production services against one shared HTTP client
    pub fn from_config(config: &Config, pool: SqlitePool) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(config.http_user_agent.as_str())
            .build()?;

        let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimGeocoder::new(
            http_client.clone(),
            config.geocoding_api_url.clone(),
        ));
        let weather: Arc<dyn WeatherProvider> = Arc::new(OpenMeteoWeatherProvider::new(
            http_client.clone(),
            config.weather_api_url.clone(),
            Arc::clone(&geocoder),
        ));
        let catalog: Arc<dyn MovieCatalog> = Arc::new(TmdbClient::new(
            http_client,
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
        ));
        let repository: Arc<dyn MovieRepository> = Arc::new(SqliteMovieRepository::new(pool));

        Ok(Self::new(
            catalog,
            repository,
            geocoder,
            weather,
            ImageUrls::new(config.tmdb_image_base_url.clone()),
        ))
    }
}
