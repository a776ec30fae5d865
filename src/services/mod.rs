pub mod enrichment;
pub mod export;
pub mod geocoding;
pub mod import;
pub mod movie_catalog;
pub mod weather;

pub use enrichment::{EnrichedEntry, LocationEnricher};
pub use geocoding::{Geocoder, NominatimGeocoder};
pub use movie_catalog::{ImageUrls, MovieCatalog, TmdbClient};
pub use weather::{OpenMeteoWeatherProvider, WeatherProvider};
