pub mod cache;
pub mod repository;
pub mod sqlite;

mod macros;

pub use cache::CacheKey;
pub use cache::TtlCache;
pub use repository::{MovieRepository, SqliteMovieRepository};
pub use sqlite::create_pool;

#[cfg(test)]
pub use repository::MockMovieRepository;
