use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    db::MovieRepository,
    error::{AppError, AppResult},
    models::{CastMember, CoordinatePair, Movie, MovieDetails, NewMovie},
    services::movie_catalog::MovieCatalog,
};

/// Billed cast members kept on an imported entry
const MAIN_CAST_SIZE: usize = 5;

/// Request to add a TMDb movie to the local catalog
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRequest {
    pub tmdb_id: i64,
    #[serde(default)]
    pub reference_city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Fetches a movie from TMDb and stores it as a new catalog entry
///
/// Coordinates are validated before any remote call. An id that is already
/// in the catalog is a conflict.
pub async fn import_movie(
    catalog: Arc<dyn MovieCatalog>,
    repository: Arc<dyn MovieRepository>,
    request: ImportRequest,
) -> AppResult<Movie> {
    let coordinates = CoordinatePair::from_parts(request.latitude, request.longitude)?;

    if let Some(existing) = repository.get_by_tmdb_id(request.tmdb_id).await? {
        tracing::warn!(
            id = existing.id,
            tmdb_id = request.tmdb_id,
            "Movie already imported"
        );
        return Err(AppError::Conflict(format!(
            "Movie '{}' has already been imported",
            existing.title
        )));
    }

    let details = catalog.get_movie_details(request.tmdb_id).await?;
    tracing::info!(tmdb_id = details.id, title = %details.title, "Importing movie");

    let mut movie = new_movie_from_details(details);
    movie.reference_city = request
        .reference_city
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    movie.coordinates = coordinates;

    let saved = repository.create(movie).await?;
    tracing::info!(id = saved.id, title = %saved.title, "Movie imported");

    Ok(saved)
}

/// Maps TMDb details onto a catalog entry without location data
pub fn new_movie_from_details(details: MovieDetails) -> NewMovie {
    let genre = join_non_empty(details.genres.iter().map(|g| g.name.as_str()));
    let language = join_non_empty(details.spoken_languages.iter().map(|l| l.name.as_str()));
    let main_cast = details
        .credits
        .as_ref()
        .and_then(|credits| format_main_cast(&credits.cast));

    NewMovie {
        tmdb_id: details.id,
        title: details.title,
        original_title: details.original_title,
        overview: details.overview.filter(|o| !o.trim().is_empty()),
        release_date: details.release_date.as_deref().and_then(parse_release_date),
        genre,
        poster_path: details.poster_path,
        language,
        runtime: details.runtime.filter(|r| *r > 0),
        vote_average: (details.vote_average > 0.0).then_some(details.vote_average),
        main_cast,
        reference_city: None,
        coordinates: None,
    }
}

fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn join_non_empty<'a>(names: impl Iterator<Item = &'a str>) -> Option<String> {
    let names: Vec<&str> = names.map(str::trim).filter(|n| !n.is_empty()).collect();
    (!names.is_empty()).then(|| names.join(", "))
}

/// "Name (Character)" for the top-billed cast, in billing order
fn format_main_cast(cast: &[CastMember]) -> Option<String> {
    let mut billed: Vec<&CastMember> = cast.iter().collect();
    billed.sort_by_key(|member| member.order);

    let names = billed
        .into_iter()
        .take(MAIN_CAST_SIZE)
        .map(|member| match member.character.as_deref().map(str::trim) {
            Some(character) if !character.is_empty() => {
                format!("{} ({})", member.name, character)
            }
            _ => member.name.clone(),
        })
        .collect::<Vec<_>>();

    (!names.is_empty()).then(|| names.join(", "))
}
