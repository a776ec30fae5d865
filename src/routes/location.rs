use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::{CoordinateError, ForecastResult},
};

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQueryParams {
    city: String,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Forecast by coordinates, or by city when no coordinates are given
pub async fn weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> AppResult<Json<ForecastResult>> {
    match (params.latitude, params.longitude) {
        (Some(latitude), Some(longitude)) => {
            let forecast = state
                .weather
                .forecast_by_coordinates(latitude, longitude)
                .await?;
            Ok(Json(forecast))
        }
        (None, None) => {
            let city = params
                .city
                .filter(|c| !c.trim().is_empty())
                .ok_or_else(|| {
                    AppError::InvalidInput(
                        "Provide latitude and longitude, or a city".to_string(),
                    )
                })?;

            state
                .weather
                .forecast_by_city(&city)
                .await?
                .map(Json)
                .ok_or_else(|| AppError::NotFound(format!("City '{}' could not be resolved", city.trim())))
        }
        _ => Err(CoordinateError::Incomplete.into()),
    }
}

pub async fn geocode(
    State(state): State<AppState>,
    Query(params): Query<GeocodeQueryParams>,
) -> AppResult<Json<GeocodeResponse>> {
    let city = params.city.trim().to_string();

    let coordinates = state
        .geocoder
        .resolve(&city)
        .await
        .ok_or_else(|| AppError::NotFound(format!("City '{}' could not be resolved", city)))?;

    Ok(Json(GeocodeResponse {
        city,
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
    }))
}
