use std::{collections::HashMap, sync::Arc};

use serde::Serialize;

use crate::{
    db::MovieRepository,
    models::{CoordinatePair, ForecastResult, Movie},
    services::weather::WeatherProvider,
};

/// A catalog entry with the forecast found for it, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedEntry {
    pub entry: Movie,
    pub forecast: Option<ForecastResult>,
}

/// Attaches weather to catalog entries and upgrades their stored location.
///
/// Stored coordinates win over the reference city. When only a city is set
/// and it resolves, the coordinates are written back so later lookups skip
/// geocoding. Forecasts are an enhancement: nothing here returns an error.
#[derive(Clone)]
pub struct LocationEnricher {
    weather: Arc<dyn WeatherProvider>,
    repository: Arc<dyn MovieRepository>,
}

impl LocationEnricher {
    pub fn new(weather: Arc<dyn WeatherProvider>, repository: Arc<dyn MovieRepository>) -> Self {
        Self {
            weather,
            repository,
        }
    }

    pub async fn enrich_entry(&self, entry: Movie) -> EnrichedEntry {
        if let Some(coordinates) = entry.coordinates() {
            let forecast = match self
                .weather
                .forecast_by_coordinates(coordinates.latitude, coordinates.longitude)
                .await
            {
                Ok(forecast) => Some(forecast),
                Err(e) => {
                    tracing::warn!(
                        movie_id = entry.id,
                        coordinates = %coordinates,
                        error = %e,
                        "Forecast unavailable for stored coordinates"
                    );
                    None
                }
            };
            return EnrichedEntry { entry, forecast };
        }

        let Some(city) = entry.city().map(str::to_string) else {
            return EnrichedEntry {
                entry,
                forecast: None,
            };
        };

        match self.weather.forecast_by_city(&city).await {
            Ok(Some(forecast)) => {
                let entry = self.write_back(entry, forecast.coordinates).await;
                EnrichedEntry {
                    entry,
                    forecast: Some(forecast),
                }
            }
            Ok(None) => {
                tracing::warn!(movie_id = entry.id, city = %city, "Reference city could not be resolved");
                EnrichedEntry {
                    entry,
                    forecast: None,
                }
            }
            Err(e) => {
                tracing::warn!(
                    movie_id = entry.id,
                    city = %city,
                    error = %e,
                    "Forecast unavailable for reference city"
                );
                EnrichedEntry {
                    entry,
                    forecast: None,
                }
            }
        }
    }

    /// Persists resolved coordinates; on failure the entry comes back unchanged
    async fn write_back(&self, entry: Movie, coordinates: CoordinatePair) -> Movie {
        let mut upgraded = entry.clone();
        upgraded.set_coordinates(coordinates);

        match self.repository.update(upgraded).await {
            Ok(saved) => {
                tracing::info!(
                    movie_id = saved.id,
                    coordinates = %coordinates,
                    "Stored coordinates resolved from reference city"
                );
                saved
            }
            Err(e) => {
                tracing::warn!(movie_id = entry.id, error = %e, "Coordinate write-back failed");
                entry
            }
        }
    }

    /// Fetches forecasts for every entry with stored coordinates, concurrently.
    ///
    /// Keyed by entry id. Entries whose lookup fails are left out; the rest
    /// are unaffected.
    pub async fn forecasts_for_entries(&self, entries: &[Movie]) -> HashMap<i64, ForecastResult> {
        let mut tasks = Vec::new();

        for entry in entries {
            let Some(coordinates) = entry.coordinates() else {
                continue;
            };
            let weather = Arc::clone(&self.weather);
            let id = entry.id;
            let task = tokio::spawn(async move {
                let result = weather
                    .forecast_by_coordinates(coordinates.latitude, coordinates.longitude)
                    .await;
                (id, result)
            });
            tasks.push(task);
        }

        let mut forecasts = HashMap::new();
        let mut error_count = 0;

        for task in tasks {
            match task.await {
                Ok((id, Ok(forecast))) => {
                    forecasts.insert(id, forecast);
                }
                Ok((id, Err(e))) => {
                    tracing::warn!(movie_id = id, error = %e, "Forecast fetch failed for entry");
                    error_count += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                    error_count += 1;
                }
            }
        }

        if error_count > 0 {
            tracing::warn!(
                success_count = forecasts.len(),
                error_count,
                "Partial forecast fetch failure"
            );
        }

        forecasts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockMovieRepository;
    use crate::error::{AppError, WeatherServiceError};
    use crate::models::movie::fixtures::movie;
    use crate::services::weather::MockWeatherProvider;
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    fn forecast_at(latitude: f64, longitude: f64) -> ForecastResult {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        ForecastResult {
            coordinates: CoordinatePair::new(latitude, longitude).unwrap(),
            timezone: "Europe/Paris".to_string(),
            daily_max: vec![crate::models::DailyReading {
                date,
                temperature: Some(18.5),
            }],
            daily_min: vec![crate::models::DailyReading {
                date,
                temperature: None,
            }],
        }
    }

    fn enricher(weather: MockWeatherProvider, repository: MockMovieRepository) -> LocationEnricher {
        LocationEnricher::new(Arc::new(weather), Arc::new(repository))
    }

    #[tokio::test]
    async fn test_coordinates_take_precedence_over_city() {
        let mut entry = movie(1, "Amélie");
        entry.latitude = Some(48.8566);
        entry.longitude = Some(2.3522);
        entry.reference_city = Some("Tokyo".to_string());

        let mut weather = MockWeatherProvider::new();
        weather
            .expect_forecast_by_coordinates()
            .with(eq(48.8566), eq(2.3522))
            .times(1)
            .returning(|lat, lon| Ok(forecast_at(lat, lon)));
        weather.expect_forecast_by_city().never();

        let mut repository = MockMovieRepository::new();
        repository.expect_update().never();

        let enriched = enricher(weather, repository).enrich_entry(entry.clone()).await;
        assert_eq!(enriched.entry, entry);
        assert_eq!(enriched.forecast.unwrap().coordinates.latitude, 48.8566);
    }

    #[tokio::test]
    async fn test_city_forecast_writes_back_coordinates() {
        let mut entry = movie(1, "Amélie");
        entry.reference_city = Some("Paris".to_string());

        let mut weather = MockWeatherProvider::new();
        weather
            .expect_forecast_by_city()
            .withf(|city| city == "Paris")
            .times(1)
            .returning(|_| Ok(Some(forecast_at(48.8566, 2.3522))));

        let mut repository = MockMovieRepository::new();
        repository
            .expect_update()
            .withf(|m| m.latitude == Some(48.8566) && m.longitude == Some(2.3522))
            .times(1)
            .returning(Ok);

        let enriched = enricher(weather, repository).enrich_entry(entry).await;
        assert_eq!(enriched.entry.latitude, Some(48.8566));
        assert_eq!(enriched.entry.longitude, Some(2.3522));
        assert!(enriched.forecast.is_some());
    }

    #[tokio::test]
    async fn test_enrichment_is_idempotent_after_write_back() {
        let mut entry = movie(1, "Amélie");
        entry.reference_city = Some("Paris".to_string());

        let mut weather = MockWeatherProvider::new();
        weather
            .expect_forecast_by_city()
            .times(1)
            .returning(|_| Ok(Some(forecast_at(48.8566, 2.3522))));
        weather
            .expect_forecast_by_coordinates()
            .times(1)
            .returning(|lat, lon| Ok(forecast_at(lat, lon)));

        let mut repository = MockMovieRepository::new();
        repository.expect_update().times(1).returning(Ok);

        let enricher = enricher(weather, repository);
        let first = enricher.enrich_entry(entry).await;
        let second = enricher.enrich_entry(first.entry.clone()).await;

        assert_eq!(second.entry.coordinates(), first.entry.coordinates());
        assert!(second.forecast.is_some());
    }

    #[tokio::test]
    async fn test_unresolvable_city_yields_no_forecast() {
        let mut entry = movie(1, "Amélie");
        entry.reference_city = Some("Atlantis".to_string());

        let mut weather = MockWeatherProvider::new();
        weather
            .expect_forecast_by_city()
            .times(1)
            .returning(|_| Ok(None));

        let mut repository = MockMovieRepository::new();
        repository.expect_update().never();

        let enriched = enricher(weather, repository).enrich_entry(entry.clone()).await;
        assert_eq!(enriched.entry, entry);
        assert!(enriched.forecast.is_none());
    }

    #[tokio::test]
    async fn test_weather_failures_are_swallowed() {
        let mut with_coordinates = movie(1, "Amélie");
        with_coordinates.latitude = Some(10.0);
        with_coordinates.longitude = Some(10.0);
        let mut with_city = movie(2, "Metropolis");
        with_city.reference_city = Some("Berlin".to_string());

        let mut weather = MockWeatherProvider::new();
        weather
            .expect_forecast_by_coordinates()
            .returning(|_, _| Err(WeatherServiceError::Timeout));
        weather
            .expect_forecast_by_city()
            .returning(|_| Err(WeatherServiceError::Status { status: 500 }));

        let enricher = enricher(weather, MockMovieRepository::new());

        assert!(enricher.enrich_entry(with_coordinates).await.forecast.is_none());
        assert!(enricher.enrich_entry(with_city).await.forecast.is_none());
    }

    #[tokio::test]
    async fn test_write_back_failure_keeps_forecast() {
        let mut entry = movie(1, "Amélie");
        entry.reference_city = Some("Paris".to_string());

        let mut weather = MockWeatherProvider::new();
        weather
            .expect_forecast_by_city()
            .returning(|_| Ok(Some(forecast_at(48.8566, 2.3522))));

        let mut repository = MockMovieRepository::new();
        repository
            .expect_update()
            .times(1)
            .returning(|_| Err(AppError::Internal("disk full".to_string())));

        let enriched = enricher(weather, repository).enrich_entry(entry.clone()).await;
        assert_eq!(enriched.entry, entry);
        assert!(enriched.forecast.is_some());
    }

    #[tokio::test]
    async fn test_no_location_skips_weather() {
        let mut entry = movie(1, "Amélie");
        entry.reference_city = Some("  ".to_string());

        let mut weather = MockWeatherProvider::new();
        weather.expect_forecast_by_city().never();
        weather.expect_forecast_by_coordinates().never();

        let enriched = enricher(weather, MockMovieRepository::new())
            .enrich_entry(entry)
            .await;
        assert!(enriched.forecast.is_none());
    }

    #[tokio::test]
    async fn test_batch_forecasts_tolerate_partial_failure() {
        let entries: Vec<Movie> = (1..=5)
            .map(|i| {
                let mut entry = movie(i, &format!("Movie {}", i));
                entry.latitude = Some(i as f64);
                entry.longitude = Some(i as f64);
                entry
            })
            .chain(std::iter::once(movie(6, "No location")))
            .collect();

        let mut weather = MockWeatherProvider::new();
        weather
            .expect_forecast_by_coordinates()
            .times(5)
            .returning(|lat, lon| {
                if lat == 3.0 {
                    Err(WeatherServiceError::Status { status: 503 })
                } else {
                    Ok(forecast_at(lat, lon))
                }
            });

        let forecasts = enricher(weather, MockMovieRepository::new())
            .forecasts_for_entries(&entries)
            .await;

        assert_eq!(forecasts.len(), 4);
        assert!(!forecasts.contains_key(&3));
        assert!(!forecasts.contains_key(&6));
        assert_eq!(forecasts[&5].coordinates.latitude, 5.0);
    }
}
