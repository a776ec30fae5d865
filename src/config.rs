use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database URL; the file is created on first run
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// TMDb v3 API key
    pub tmdb_api_key: String,

    /// TMDb API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL that poster and backdrop paths are appended to
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Nominatim search endpoint
    #[serde(default = "default_geocoding_api_url")]
    pub geocoding_api_url: String,

    /// Open-Meteo forecast endpoint
    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,

    /// Timeout applied to every outbound HTTP call
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Nominatim rejects requests without an identifying User-Agent
    #[serde(default = "default_http_user_agent")]
    pub http_user_agent: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_database_url() -> String {
    "sqlite://data/catalog.db".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_geocoding_api_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_weather_api_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_http_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tmdb_api_key.trim().is_empty() {
            anyhow::bail!("TMDB_API_KEY must not be empty");
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("HTTP_TIMEOUT_SECS must be greater than zero");
        }

        for (name, url) in [
            ("TMDB_API_URL", &self.tmdb_api_url),
            ("TMDB_IMAGE_BASE_URL", &self.tmdb_image_base_url),
            ("GEOCODING_API_URL", &self.geocoding_api_url),
            ("WEATHER_API_URL", &self.weather_api_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{} must be an http(s) URL, got '{}'", name, url);
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        envy::from_iter::<_, Config>(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = config_from(&[("TMDB_API_KEY", "secret")]);

        assert_eq!(config.database_url, "sqlite://data/catalog.db");
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        tokio_test::assert_ok!(config.validate());
    }

    #[test]
    fn test_missing_api_key_fails() {
        let result = envy::from_iter::<_, Config>(Vec::<(String, String)>::new());
        tokio_test::assert_err!(result);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = config_from(&[("TMDB_API_KEY", "  ")]);
        assert!(config.validate().is_err());

        let config = config_from(&[("TMDB_API_KEY", "k"), ("HTTP_TIMEOUT_SECS", "0")]);
        assert!(config.validate().is_err());

        let config = config_from(&[("TMDB_API_KEY", "k"), ("WEATHER_API_URL", "ftp://x")]);
        assert!(config.validate().is_err());
    }
}
