/// TMDb movie metadata client
///
/// Every read follows the same flow: check the cache, on miss GET the
/// endpoint with the API key attached, decode JSON, cache the result with an
/// operation-specific TTL. Image lists are never cached.
use crate::{
    cached,
    db::{CacheKey, TtlCache},
    error::{AppError, AppResult, MovieCatalogError},
    models::{MovieDetails, MovieImages, SearchResponse, TmdbConfiguration},
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

const SEARCH_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
const DETAILS_CACHE_TTL: Duration = Duration::from_secs(10 * 60);
const CONFIG_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// TMDb refuses pages beyond this
const MAX_PAGE: u32 = 500;

pub const POSTER_PLACEHOLDER: &str = "/images/no-poster.png";
pub const BACKDROP_PLACEHOLDER: &str = "/images/no-backdrop.png";
pub const DEFAULT_POSTER_SIZE: &str = "w500";
pub const DEFAULT_BACKDROP_SIZE: &str = "w1280";

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn search_movies(&self, query: &str, page: u32) -> AppResult<SearchResponse>;

    /// Browse by genre; same paging and result shape as text search
    async fn discover_by_genre(&self, genre_id: i64, page: u32) -> AppResult<SearchResponse>;

    /// Details with credits appended
    async fn get_movie_details(&self, tmdb_id: i64) -> AppResult<MovieDetails>;

    async fn get_movie_images(&self, tmdb_id: i64) -> AppResult<MovieImages>;

    async fn get_configuration(&self) -> AppResult<TmdbConfiguration>;
}

/// Builds an image URL from a base, a size token and an optional path.
///
/// Falls back to `placeholder` when the path is missing or blank.
pub fn image_url(base_url: &str, path: Option<&str>, size: &str, placeholder: &str) -> String {
    match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => {
            let separator = if path.starts_with('/') { "" } else { "/" };
            format!(
                "{}/{}{}{}",
                base_url.trim_end_matches('/'),
                size,
                separator,
                path
            )
        }
        None => placeholder.to_string(),
    }
}

/// Image URL builder bound to the configured TMDb image host
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base_url: String,
}

impl ImageUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn poster(&self, path: Option<&str>, size: Option<&str>) -> String {
        image_url(
            &self.base_url,
            path,
            size.unwrap_or(DEFAULT_POSTER_SIZE),
            POSTER_PLACEHOLDER,
        )
    }

    pub fn backdrop(&self, path: Option<&str>, size: Option<&str>) -> String {
        image_url(
            &self.base_url,
            path,
            size.unwrap_or(DEFAULT_BACKDROP_SIZE),
            BACKDROP_PLACEHOLDER,
        )
    }
}

fn validate_page(page: u32) -> AppResult<()> {
    if page == 0 || page > MAX_PAGE {
        return Err(AppError::InvalidInput(format!(
            "Page must be between 1 and {}",
            MAX_PAGE
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    search_cache: TtlCache<CacheKey, SearchResponse>,
    details_cache: TtlCache<CacheKey, MovieDetails>,
    config_cache: TtlCache<CacheKey, TmdbConfiguration>,
}

impl TmdbClient {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
            search_cache: TtlCache::new(),
            details_cache: TtlCache::new(),
            config_cache: TtlCache::new(),
        }
    }

    /// GETs `path` and decodes the JSON body.
    ///
    /// The API key is attached as its own query pair and never logged.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, MovieCatalogError> {
        let url = format!("{}{}", self.api_url.trim_end_matches('/'), path);
        tracing::debug!(url = %url, params = ?params, "TMDb request");

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                // without_url keeps the key-bearing query string out of the message
                let e = e.without_url();
                tracing::error!(url = %url, params = ?params, error = %e, "TMDb request failed");
                MovieCatalogError::new(None, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                url = %url,
                params = ?params,
                status = status.as_u16(),
                body = %body,
                "TMDb returned an error status"
            );
            return Err(MovieCatalogError::new(
                Some(status.as_u16()),
                format!("TMDb API returned status {}", status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MovieCatalogError::new(Some(status.as_u16()), e.without_url().to_string()))?;

        serde_json::from_str::<T>(&body).map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to parse TMDb response");
            MovieCatalogError::new(
                Some(status.as_u16()),
                format!("Failed to parse TMDb response: {}", e),
            )
        })
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbClient {
    async fn search_movies(&self, query: &str, page: u32) -> AppResult<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }
        validate_page(page)?;

        cached!(
            self.search_cache,
            CacheKey::MovieSearch {
                query: query.to_lowercase(),
                page,
            },
            SEARCH_CACHE_TTL,
            async move {
                let response: SearchResponse = self
                    .get_json(
                        "/search/movie",
                        &[("query", query.to_string()), ("page", page.to_string())],
                    )
                    .await?;

                tracing::info!(
                    query = %query,
                    page,
                    results = response.results.len(),
                    total_results = response.total_results,
                    "Movie search completed"
                );

                Ok::<_, AppError>(response)
            }
        )
    }

    async fn discover_by_genre(&self, genre_id: i64, page: u32) -> AppResult<SearchResponse> {
        if genre_id <= 0 {
            return Err(AppError::InvalidInput(format!(
                "Invalid genre id: {}",
                genre_id
            )));
        }
        validate_page(page)?;

        cached!(
            self.search_cache,
            CacheKey::GenreDiscover { genre_id, page },
            SEARCH_CACHE_TTL,
            async move {
                let response: SearchResponse = self
                    .get_json(
                        "/discover/movie",
                        &[
                            ("with_genres", genre_id.to_string()),
                            ("page", page.to_string()),
                            ("sort_by", "popularity.desc".to_string()),
                        ],
                    )
                    .await?;

                tracing::info!(
                    genre_id,
                    page,
                    results = response.results.len(),
                    "Genre discovery completed"
                );

                Ok::<_, AppError>(response)
            }
        )
    }

    async fn get_movie_details(&self, tmdb_id: i64) -> AppResult<MovieDetails> {
        cached!(
            self.details_cache,
            CacheKey::MovieDetails(tmdb_id),
            DETAILS_CACHE_TTL,
            self.get_json::<MovieDetails>(
                &format!("/movie/{}", tmdb_id),
                &[("append_to_response", "credits".to_string())],
            )
        )
    }

    async fn get_movie_images(&self, tmdb_id: i64) -> AppResult<MovieImages> {
        let images: MovieImages = self
            .get_json(&format!("/movie/{}/images", tmdb_id), &[])
            .await?;

        tracing::info!(
            tmdb_id,
            posters = images.posters.len(),
            backdrops = images.backdrops.len(),
            "Movie images fetched"
        );

        Ok(images)
    }

    async fn get_configuration(&self) -> AppResult<TmdbConfiguration> {
        cached!(
            self.config_cache,
            CacheKey::Configuration,
            CONFIG_CACHE_TTL,
            self.get_json::<TmdbConfiguration>("/configuration", &[])
        )
    }
}
