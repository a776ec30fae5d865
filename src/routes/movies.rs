use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{default_page, AppState};
use crate::{
    error::AppResult,
    models::{MovieDetails, MovieImages, SearchResponse, TmdbConfiguration},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default = "default_page")]
    page: u32,
}

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    genre_id: i64,
    #[serde(default = "default_page")]
    page: u32,
}

/// TMDb details plus ready-to-use image URLs
#[derive(Debug, Serialize)]
pub struct MovieDetailsView {
    #[serde(flatten)]
    pub details: MovieDetails,
    pub poster_url: String,
    pub backdrop_url: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let results = state.catalog.search_movies(&params.q, params.page).await?;
    Ok(Json(results))
}

pub async fn discover(
    State(state): State<AppState>,
    Query(params): Query<DiscoverQuery>,
) -> AppResult<Json<SearchResponse>> {
    let results = state
        .catalog
        .discover_by_genre(params.genre_id, params.page)
        .await?;
    Ok(Json(results))
}

pub async fn details(
    State(state): State<AppState>,
    Path(tmdb_id): Path<i64>,
) -> AppResult<Json<MovieDetailsView>> {
    let details = state.catalog.get_movie_details(tmdb_id).await?;

    Ok(Json(MovieDetailsView {
        poster_url: state.images.poster(details.poster_path.as_deref(), None),
        backdrop_url: state.images.backdrop(details.backdrop_path.as_deref(), None),
        details,
    }))
}

pub async fn images(
    State(state): State<AppState>,
    Path(tmdb_id): Path<i64>,
) -> AppResult<Json<MovieImages>> {
    let images = state.catalog.get_movie_images(tmdb_id).await?;
    Ok(Json(images))
}

pub async fn configuration(State(state): State<AppState>) -> AppResult<Json<TmdbConfiguration>> {
    let configuration = state.catalog.get_configuration().await?;
    Ok(Json(configuration))
}
