use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime};
use reqwest::Client;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    config::Config,
    error::ProviderError,
    model::{ForecastEntry, Unit, WeatherSnapshot},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Forecast days kept from the 5-day/3-hour series.
pub const MAX_FORECAST_DAYS: usize = 5;

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Build a provider from the stored configuration.
    ///
    /// A missing API key is not an error here: preferences can be managed
    /// without one, and every fetch fails with [`ProviderError::MissingApiKey`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key();

        let mut http = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            http = http.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            api_key,
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            http: http.build().context("Failed to build HTTP client")?,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
        unit: Unit,
    ) -> Result<T, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(endpoint, city, units = unit.as_query(), "Requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", api_key),
                ("units", unit.as_query()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::NotFound {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    #[serde(deserialize_with = "deserialize_dt_txt")]
    dt_txt: NaiveDateTime,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn deserialize_dt_txt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, DT_TXT_FORMAT).map_err(serde::de::Error::custom)
}

fn first_description(weather: &[OwWeather]) -> String {
    weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

impl From<OwCurrentResponse> for WeatherSnapshot {
    fn from(parsed: OwCurrentResponse) -> Self {
        WeatherSnapshot {
            description: first_description(&parsed.weather),
            city: parsed.name,
            country: parsed.sys.country,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            pressure_hpa: parsed.main.pressure,
        }
    }
}

/// Keeps the 12:00:00 readings, first [`MAX_FORECAST_DAYS`] of them.
fn midday_series(parsed: OwForecastResponse) -> Vec<ForecastEntry> {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();

    parsed
        .list
        .into_iter()
        .filter(|e| e.dt_txt.time() == noon)
        .take(MAX_FORECAST_DAYS)
        .map(|e| ForecastEntry {
            date: e.dt_txt.date(),
            temperature: e.main.temp,
            description: first_description(&e.weather),
        })
        .collect()
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, city: &str, unit: Unit) -> Result<WeatherSnapshot, ProviderError> {
        let parsed: OwCurrentResponse = self.get_json("weather", city, unit).await?;
        let snapshot = WeatherSnapshot::from(parsed);

        tracing::info!(city = %snapshot.city, temp = snapshot.temperature, "Current weather fetched");
        Ok(snapshot)
    }

    async fn fetch_forecast(
        &self,
        city: &str,
        unit: Unit,
    ) -> Result<Vec<ForecastEntry>, ProviderError> {
        let parsed: OwForecastResponse = self.get_json("forecast", city, unit).await?;
        let series = midday_series(parsed);

        tracing::info!(city, days = series.len(), "Forecast fetched");
        Ok(series)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn forecast_json(entries: &[(&str, f64)]) -> String {
        let list: Vec<_> = entries
            .iter()
            .map(|(dt, temp)| {
                serde_json::json!({
                    "dt_txt": dt,
                    "main": { "temp": temp },
                    "weather": [{ "description": "clear sky" }]
                })
            })
            .collect();
        serde_json::json!({ "list": list }).to_string()
    }

    #[test]
    fn current_response_maps_to_snapshot() {
        let body = serde_json::json!({
            "name": "London",
            "sys": { "country": "GB" },
            "main": { "temp": 11.5, "feels_like": 10.2, "humidity": 81, "pressure": 1012 },
            "weather": [{ "description": "light rain" }, { "description": "mist" }],
            "wind": { "speed": 4.1 }
        });

        let parsed: OwCurrentResponse = serde_json::from_value(body).unwrap();
        let snap = WeatherSnapshot::from(parsed);

        assert_eq!(snap.city, "London");
        assert_eq!(snap.country, "GB");
        assert_eq!(snap.description, "light rain");
        assert_eq!(snap.humidity_pct, 81);
        assert_eq!(snap.pressure_hpa, 1012);
    }

    #[test]
    fn missing_condition_is_unknown() {
        assert_eq!(first_description(&[]), "Unknown");
    }

    #[test]
    fn only_midday_entries_are_kept() {
        let body = forecast_json(&[
            ("2026-10-16 09:00:00", 10.0),
            ("2026-10-16 12:00:00", 14.0),
            ("2026-10-16 15:00:00", 15.0),
            ("2026-10-17 12:00:00", 16.0),
            ("2026-10-17 12:30:00", 99.0),
        ]);

        let series = midday_series(serde_json::from_str(&body).unwrap());

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(series[0].temperature, 14.0);
        assert_eq!(series[1].temperature, 16.0);
    }

    #[test]
    fn series_is_capped_at_five_days() {
        let days: Vec<String> = (10..17).map(|d| format!("2026-10-{d} 12:00:00")).collect();
        let entries: Vec<(&str, f64)> = days.iter().map(|d| (d.as_str(), 1.0)).collect();

        let series = midday_series(serde_json::from_str(&forecast_json(&entries)).unwrap());

        assert_eq!(series.len(), MAX_FORECAST_DAYS);
        assert_eq!(series[4].date, NaiveDate::from_ymd_opt(2026, 10, 14).unwrap());
    }

    #[test]
    fn malformed_timestamp_fails_to_parse() {
        let body = forecast_json(&[("tomorrow at noon", 1.0)]);
        assert!(serde_json::from_str::<OwForecastResponse>(&body).is_err());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(250);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[tokio::test]
    async fn fetch_without_api_key_fails_before_any_request() {
        // Unroutable base URL: reaching the network would surface as Transport.
        let provider = OpenWeatherProvider {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
            http: Client::new(),
        };

        let err = provider.fetch_current("London", Unit::Metric).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
        assert!(err.to_string().contains("citycast configure"));
    }
}
