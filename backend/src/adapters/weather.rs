//! Open-Meteo daily weather for a single location.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::AdapterError;
use crate::config::WeatherSettings;
use crate::models::WeatherRecord;

const DAILY_FIELDS: &str = "temperature_2m_max,relative_humidity_2m_max,precipitation_sum,wind_speed_10m_max,shortwave_radiation_sum";

/// Daily weather lookup. `None` means the weather could not be obtained.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn daily(&self, lat: f64, lon: f64) -> Option<WeatherRecord>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    daily: Option<DailySeries>,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    shortwave_radiation_sum: Vec<Option<f64>>,
}

fn last(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

/// Sum of the last `n` entries (the whole series when shorter); nulls count as 0.
fn trailing_sum(series: &[Option<f64>], n: usize) -> f64 {
    let start = series.len().saturating_sub(n);
    series[start..].iter().map(|v| v.unwrap_or(0.0)).sum()
}

/// Turn an Open-Meteo forecast body into a [`WeatherRecord`].
///
/// Current values are the last element of each daily series. Returns `None`
/// when the daily block is absent or a current value is missing.
pub fn parse_forecast(body: &str) -> Result<Option<WeatherRecord>, AdapterError> {
    let response: ForecastResponse = serde_json::from_str(body)?;
    let Some(daily) = response.daily else {
        return Ok(None);
    };

    Ok(current_record(&daily))
}

fn current_record(daily: &DailySeries) -> Option<WeatherRecord> {
    let precip = &daily.precipitation_sum;
    Some(WeatherRecord {
        tmax_c: last(&daily.temperature_2m_max)?,
        rhmax_pct: last(&daily.relative_humidity_2m_max)?,
        precip_sum_mm: last(precip).unwrap_or(0.0),
        precip_sum_7d: trailing_sum(precip, 7),
        precip_sum_30d: trailing_sum(precip, 30),
        wind_max_kmh: last(&daily.wind_speed_10m_max)?,
        solar_rad_j_m2: last(&daily.shortwave_radiation_sum)?,
    })
}

/// HTTP client for the Open-Meteo forecast endpoint.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    timezone: String,
    past_days: u32,
}

impl OpenMeteoClient {
    pub fn new(settings: &WeatherSettings) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            timezone: settings.timezone.clone(),
            past_days: settings.past_days,
        })
    }

    async fn request(&self, lat: f64, lon: f64) -> Result<Option<WeatherRecord>, AdapterError> {
        let body = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", self.timezone.clone()),
                ("past_days", self.past_days.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_forecast(&body)
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn daily(&self, lat: f64, lon: f64) -> Option<WeatherRecord> {
        match self.request(lat, lon).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                log::warn!("Weather response for ({}, {}) had no daily values", lat, lon);
                None
            }
            Err(e) => {
                log::warn!("Weather request for ({}, {}) failed: {}", lat, lon, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uses_last_values_and_trailing_sums() {
        let precip: Vec<String> = (1..=31).map(|v| v.to_string()).collect();
        let body = format!(
            r#"{{"daily": {{
                "time": [],
                "temperature_2m_max": [30.0, 33.5],
                "relative_humidity_2m_max": [80, 71],
                "precipitation_sum": [{}],
                "wind_speed_10m_max": [10.0, 12.4],
                "shortwave_radiation_sum": [18.0, 21.3]
            }}}}"#,
            precip.join(",")
        );
        let record = parse_forecast(&body).unwrap().unwrap();

        assert_eq!(record.tmax_c, 33.5);
        assert_eq!(record.rhmax_pct, 71.0);
        assert_eq!(record.precip_sum_mm, 31.0);
        // 25 + ... + 31
        assert_eq!(record.precip_sum_7d, 196.0);
        // 2 + ... + 31
        assert_eq!(record.precip_sum_30d, 495.0);
        assert_eq!(record.wind_max_kmh, 12.4);
        assert_eq!(record.solar_rad_j_m2, 21.3);
    }

    #[test]
    fn test_short_series_sums_everything() {
        let body = r#"{"daily": {
            "temperature_2m_max": [31],
            "relative_humidity_2m_max": [60],
            "precipitation_sum": [1.0, null, 2.0],
            "wind_speed_10m_max": [8],
            "shortwave_radiation_sum": [20]
        }}"#;
        let record = parse_forecast(body).unwrap().unwrap();
        assert_eq!(record.precip_sum_7d, 3.0);
        assert_eq!(record.precip_sum_30d, 3.0);
        assert_eq!(record.precip_sum_mm, 2.0);
    }

    #[test]
    fn test_missing_daily_block_is_none() {
        assert_eq!(parse_forecast(r#"{"error": true}"#).unwrap(), None);
    }

    #[test]
    fn test_missing_current_value_is_none() {
        let body = r#"{"daily": {
            "temperature_2m_max": [],
            "relative_humidity_2m_max": [60],
            "precipitation_sum": [],
            "wind_speed_10m_max": [8],
            "shortwave_radiation_sum": [null]
        }}"#;
        assert_eq!(parse_forecast(body).unwrap(), None);
    }

    #[test]
    fn test_empty_precipitation_defaults_to_zero() {
        let body = r#"{"daily": {
            "temperature_2m_max": [31],
            "relative_humidity_2m_max": [60],
            "wind_speed_10m_max": [8],
            "shortwave_radiation_sum": [20]
        }}"#;
        let record = parse_forecast(body).unwrap().unwrap();
        assert_eq!(record.precip_sum_mm, 0.0);
        assert_eq!(record.precip_sum_30d, 0.0);
    }

    #[test]
    fn test_malformed_body_is_error() {
        assert!(parse_forecast("not json").is_err());
    }
}
