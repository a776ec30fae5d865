/// Open-Meteo daily temperature forecasts
///
/// Coordinates are validated before any request and formatted with six fixed
/// decimals, so the outbound query and the cache key are identical for equal
/// inputs. Failures surface as `WeatherServiceError`; nothing is retried.
use crate::{
    cached,
    db::{CacheKey, TtlCache},
    error::WeatherServiceError,
    models::{format_coordinate, CoordinatePair, ForecastResult, OpenMeteoForecast},
    services::geocoding::Geocoder,
};
use reqwest::Client as HttpClient;
use std::{sync::Arc, time::Duration};

const FORECAST_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Daily min/max forecast at a point
    async fn forecast_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastResult, WeatherServiceError>;

    /// Geocodes `city` first; `Ok(None)` when the city cannot be resolved
    async fn forecast_by_city(
        &self,
        city: &str,
    ) -> Result<Option<ForecastResult>, WeatherServiceError>;
}

#[derive(Clone)]
pub struct OpenMeteoWeatherProvider {
    http_client: HttpClient,
    api_url: String,
    geocoder: Arc<dyn Geocoder>,
    cache: TtlCache<CacheKey, ForecastResult>,
}

impl OpenMeteoWeatherProvider {
    pub fn new(http_client: HttpClient, api_url: String, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            http_client,
            api_url,
            geocoder,
            cache: TtlCache::new(),
        }
    }

    async fn fetch_forecast(
        &self,
        coordinates: CoordinatePair,
    ) -> Result<ForecastResult, WeatherServiceError> {
        let latitude = format_coordinate(coordinates.latitude);
        let longitude = format_coordinate(coordinates.longitude);

        tracing::debug!(
            url = %self.api_url,
            latitude = %latitude,
            longitude = %longitude,
            "Forecast request"
        );

        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("daily", "temperature_2m_max,temperature_2m_min"),
                ("timezone", "auto"),
            ])
            .send()
            .await
            .map_err(|e| self.log_failure(coordinates, WeatherServiceError::from_reqwest(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.log_failure(
                coordinates,
                WeatherServiceError::Status {
                    status: status.as_u16(),
                },
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.log_failure(coordinates, WeatherServiceError::from_reqwest(e)))?;

        let malformed = |message: String| WeatherServiceError::Malformed {
            status: Some(status.as_u16()),
            message,
        };

        let raw: Option<OpenMeteoForecast> = serde_json::from_str(&body)
            .map_err(|e| self.log_failure(coordinates, malformed(e.to_string())))?;

        let raw = match raw {
            Some(raw) if raw.daily.is_some() => raw,
            _ => {
                return Err(self.log_failure(
                    coordinates,
                    malformed("response has no daily series".to_string()),
                ))
            }
        };

        let forecast = raw
            .into_forecast(coordinates)
            .map_err(|message| self.log_failure(coordinates, malformed(message)))?;

        tracing::info!(
            coordinates = %coordinates,
            days = forecast.days(),
            timezone = %forecast.timezone,
            "Forecast fetched"
        );

        Ok(forecast)
    }

    fn log_failure(
        &self,
        coordinates: CoordinatePair,
        error: WeatherServiceError,
    ) -> WeatherServiceError {
        tracing::error!(
            url = %self.api_url,
            coordinates = %coordinates,
            status = ?error.status_code(),
            error = %error,
            "Forecast request failed"
        );
        error
    }
}

#[async_trait::async_trait]
impl WeatherProvider for OpenMeteoWeatherProvider {
    async fn forecast_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastResult, WeatherServiceError> {
        let coordinates = CoordinatePair::new(latitude, longitude)?;

        cached!(
            self.cache,
            CacheKey::Forecast(coordinates.cache_key()),
            FORECAST_CACHE_TTL,
            self.fetch_forecast(coordinates)
        )
    }

    async fn forecast_by_city(
        &self,
        city: &str,
    ) -> Result<Option<ForecastResult>, WeatherServiceError> {
        let Some(coordinates) = self.geocoder.resolve(city).await else {
            tracing::info!(city = %city.trim(), "No forecast: city could not be resolved");
            return Ok(None);
        };

        self.forecast_by_coordinates(coordinates.latitude, coordinates.longitude)
            .await
            .map(Some)
    }
}
