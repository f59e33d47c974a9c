//! Simple data models for the weather monitor.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---

/// Unit system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    // ---
    /// Value of the provider's `units` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    /// Convert a temperature reported in this unit system to Celsius.
    pub fn to_celsius(&self, value: f64) -> f64 {
        match self {
            Units::Metric => value,
            Units::Imperial => (value - 32.0) * 5.0 / 9.0,
            Units::Standard => value - 273.15,
        }
    }
}

impl std::str::FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            other => Err(anyhow::anyhow!("Unknown unit system: {}", other)),
        }
    }
}

/// Raw current-weather payload from the provider
#[derive(Debug, Deserialize)]
pub struct RawWeatherResponse {
    // ---
    pub weather: Vec<RawCondition>,
    pub main: RawMain,
    pub dt: i64,
}

#[derive(Debug, Deserialize)]
pub struct RawCondition {
    pub main: String,
}

#[derive(Debug, Deserialize)]
pub struct RawMain {
    pub temp: f64,
    pub feels_like: f64,
}

/// A single normalized observation, temperatures in °C
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    // ---
    pub condition: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub observed_at: i64,
}

/// Per-day statistics derived from stored readings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    // ---
    pub date: NaiveDate,
    pub avg_temp: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    pub dominant_condition: String,
    pub reading_count: usize,
}

/// Outcome of feeding one temperature to the alert tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    NoAlert,
    /// Fired; `streak` is the current run of consecutive breaches.
    Fire { streak: u32 },
}

impl AlertDecision {
    pub fn is_fire(&self) -> bool {
        matches!(self, AlertDecision::Fire { .. })
    }
}

/// Normalization helpers
impl RawWeatherResponse {
    // ---
    /// Normalize to a [`Reading`] in Celsius.
    ///
    /// Returns `None` when the payload carries no condition entry.
    pub fn to_reading(&self, units: Units) -> Option<Reading> {
        // ---
        let condition = self.weather.first()?.main.clone();

        Some(Reading {
            condition,
            temperature: units.to_celsius(self.main.temp),
            feels_like: units.to_celsius(self.main.feels_like),
            observed_at: self.dt,
        })
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn create_test_raw_response(temp: f64, feels_like: f64) -> RawWeatherResponse {
        // ---
        RawWeatherResponse {
            weather: vec![RawCondition {
                main: "Haze".to_string(),
            }],
            main: RawMain { temp, feels_like },
            dt: 1_717_236_000,
        }
    }

    #[test]
    fn test_metric_passthrough() {
        // ---
        let reading = create_test_raw_response(36.5, 39.0)
            .to_reading(Units::Metric)
            .unwrap();

        assert_eq!(reading.condition, "Haze");
        assert_eq!(reading.temperature, 36.5);
        assert_eq!(reading.feels_like, 39.0);
        assert_eq!(reading.observed_at, 1_717_236_000);
    }

    #[test]
    fn test_imperial_conversion() {
        // ---
        let reading = create_test_raw_response(95.0, 212.0)
            .to_reading(Units::Imperial)
            .unwrap();

        // 95°F is 35°C, 212°F is 100°C
        assert!((reading.temperature - 35.0).abs() < 1e-9);
        assert!((reading.feels_like - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_standard_conversion() {
        // ---
        let reading = create_test_raw_response(300.15, 273.15)
            .to_reading(Units::Standard)
            .unwrap();

        assert!((reading.temperature - 27.0).abs() < 1e-9);
        assert!(reading.feels_like.abs() < 1e-9);
    }

    #[test]
    fn test_missing_condition() {
        // ---
        let mut raw = create_test_raw_response(30.0, 30.0);
        raw.weather.clear();
        assert!(raw.to_reading(Units::Metric).is_none());
    }

    #[test]
    fn test_deserialize_provider_payload() {
        // ---
        let body = serde_json::json!({
            "weather": [{ "id": 721, "main": "Haze", "description": "haze" }],
            "main": { "temp": 34.05, "feels_like": 37.2, "humidity": 40 },
            "dt": 1717236000,
            "name": "Delhi"
        });

        let raw: RawWeatherResponse = serde_json::from_value(body).unwrap();
        let reading = raw.to_reading(Units::Metric).unwrap();
        assert_eq!(reading.temperature, 34.05);
        assert_eq!(reading.condition, "Haze");
    }

    #[test]
    fn test_units_parse() {
        // ---
        assert_eq!("METRIC".parse::<Units>().unwrap(), Units::Metric);
        assert_eq!("imperial".parse::<Units>().unwrap().as_query(), "imperial");
        assert!("kelvin".parse::<Units>().is_err());
    }

    #[test]
    fn test_alert_decision_is_fire() {
        assert!(AlertDecision::Fire { streak: 2 }.is_fire());
        assert!(!AlertDecision::NoAlert.is_fire());
    }
}
