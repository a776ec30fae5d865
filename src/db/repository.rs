use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, NewMovie},
};

/// Storage seam for catalog entries
///
/// Every call is a single independent statement; nothing here spans a
/// transaction across operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieRepository: Send + Sync {
    async fn create(&self, movie: NewMovie) -> AppResult<Movie>;

    async fn get(&self, id: i64) -> AppResult<Option<Movie>>;

    async fn get_by_tmdb_id(&self, tmdb_id: i64) -> AppResult<Option<Movie>>;

    /// All entries ordered by title
    async fn list(&self) -> AppResult<Vec<Movie>>;

    /// Persists every editable column and bumps `updated_at`
    async fn update(&self, movie: Movie) -> AppResult<Movie>;

    /// Returns whether a row was removed
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct SqliteMovieRepository {
    pool: SqlitePool,
}

impl SqliteMovieRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MovieRepository for SqliteMovieRepository {
    async fn create(&self, movie: NewMovie) -> AppResult<Movie> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (
                tmdb_id, title, original_title, overview, release_date, genre,
                poster_path, language, runtime, vote_average, main_cast,
                reference_city, latitude, longitude, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(movie.tmdb_id)
        .bind(&movie.title)
        .bind(&movie.original_title)
        .bind(&movie.overview)
        .bind(movie.release_date)
        .bind(&movie.genre)
        .bind(&movie.poster_path)
        .bind(&movie.language)
        .bind(movie.runtime)
        .bind(movie.vote_average)
        .bind(&movie.main_cast)
        .bind(&movie.reference_city)
        .bind(movie.coordinates.map(|c| c.latitude))
        .bind(movie.coordinates.map(|c| c.longitude))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                format!("Movie with TMDb id {} is already in the catalog", movie.tmdb_id),
            ),
            other => AppError::Database(other),
        })?;

        tracing::info!(id = created.id, tmdb_id = created.tmdb_id, "Movie saved");
        Ok(created)
    }

    async fn get(&self, id: i64) -> AppResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn get_by_tmdb_id(&self, tmdb_id: i64) -> AppResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE tmdb_id = ?")
            .bind(tmdb_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn list(&self) -> AppResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>("SELECT * FROM movies ORDER BY title, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }

    async fn update(&self, movie: Movie) -> AppResult<Movie> {
        let updated = sqlx::query_as::<_, Movie>(
            r#"
            UPDATE movies SET
                title = ?, original_title = ?, overview = ?, release_date = ?,
                genre = ?, poster_path = ?, language = ?, runtime = ?,
                vote_average = ?, main_cast = ?, reference_city = ?,
                latitude = ?, longitude = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&movie.title)
        .bind(&movie.original_title)
        .bind(&movie.overview)
        .bind(movie.release_date)
        .bind(&movie.genre)
        .bind(&movie.poster_path)
        .bind(&movie.language)
        .bind(movie.runtime)
        .bind(movie.vote_average)
        .bind(&movie.main_cast)
        .bind(&movie.reference_city)
        .bind(movie.latitude)
        .bind(movie.longitude)
        .bind(Utc::now())
        .bind(movie.id)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie.id)))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            tracing::info!(id, "Movie deleted");
        }
        Ok(removed)
    }
}
