use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::{ForecastResult, Movie, MovieUpdate},
    services::import::{self, ImportRequest},
};

/// A catalog entry as returned by the API
#[derive(Debug, Serialize)]
pub struct CatalogEntryView {
    #[serde(flatten)]
    pub entry: Movie,
    pub poster_url: String,
    pub forecast: Option<ForecastResult>,
}

impl CatalogEntryView {
    fn new(state: &AppState, entry: Movie, forecast: Option<ForecastResult>) -> Self {
        Self {
            poster_url: state.images.poster(entry.poster_path.as_deref(), None),
            entry,
            forecast,
        }
    }
}

async fn find_entry(state: &AppState, id: i64) -> AppResult<Movie> {
    state
        .repository
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))
}

pub async fn import(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let movie = import::import_movie(state.catalog.clone(), state.repository.clone(), request).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Lists entries by title, with forecasts for those that have coordinates
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<CatalogEntryView>>> {
    let entries = state.repository.list().await?;
    let mut forecasts = state.enricher.forecasts_for_entries(&entries).await;

    let views = entries
        .into_iter()
        .map(|entry| {
            let forecast = forecasts.remove(&entry.id);
            CatalogEntryView::new(&state, entry, forecast)
        })
        .collect();

    Ok(Json(views))
}

/// One entry with its forecast; may persist coordinates resolved from the city
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CatalogEntryView>> {
    let entry = find_entry(&state, id).await?;
    let enriched = state.enricher.enrich_entry(entry).await;

    Ok(Json(CatalogEntryView::new(
        &state,
        enriched.entry,
        enriched.forecast,
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<MovieUpdate>,
) -> AppResult<Json<Movie>> {
    if update.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }

    let mut entry = find_entry(&state, id).await?;
    entry.apply_update(update)?;

    let saved = state.repository.update(entry).await?;
    tracing::info!(id = saved.id, "Movie updated");
    Ok(Json(saved))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    if state.repository.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Movie {} not found", id)))
    }
}
