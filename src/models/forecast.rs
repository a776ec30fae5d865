use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::CoordinatePair;

/// One day's temperature reading; `None` when the provider had no value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReading {
    pub date: NaiveDate,
    pub temperature: Option<f64>,
}

/// Multi-day temperature forecast for a location.
///
/// `daily_max` and `daily_min` are index-aligned on the same dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub coordinates: CoordinatePair,
    pub timezone: String,
    pub daily_max: Vec<DailyReading>,
    pub daily_min: Vec<DailyReading>,
}

impl ForecastResult {
    pub fn days(&self) -> usize {
        self.daily_max.len()
    }
}

// ============================================================================
// Open-Meteo API Types
// ============================================================================

/// Raw response from the Open-Meteo forecast endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct OpenMeteoForecast {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub daily: Option<OpenMeteoDaily>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenMeteoDaily {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max", default)]
    pub temperature_max: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_min", default)]
    pub temperature_min: Vec<Option<f64>>,
}

impl OpenMeteoForecast {
    /// Converts the raw payload, keeping the requested coordinates rather than
    /// the provider's grid-snapped ones.
    pub fn into_forecast(self, coordinates: CoordinatePair) -> Result<ForecastResult, String> {
        let timezone = self.timezone.unwrap_or_else(|| "UTC".to_string());
        let mut daily_max = Vec::new();
        let mut daily_min = Vec::new();

        if let Some(daily) = self.daily {
            for (i, raw_date) in daily.time.iter().enumerate() {
                let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
                    .map_err(|e| format!("invalid forecast date '{}': {}", raw_date, e))?;

                daily_max.push(DailyReading {
                    date,
                    temperature: daily.temperature_max.get(i).copied().flatten(),
                });
                daily_min.push(DailyReading {
                    date,
                    temperature: daily.temperature_min.get(i).copied().flatten(),
                });
            }
        }

        Ok(ForecastResult {
            coordinates,
            timezone,
            daily_max,
            daily_min,
        })
    }
}
