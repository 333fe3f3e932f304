use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::ProviderError,
    model::{ForecastEntry, Unit, WeatherSnapshot},
};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of current conditions and forecasts. One attempt per call; no
/// retries or caching.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str, unit: Unit) -> Result<WeatherSnapshot, ProviderError>;

    /// At most one entry per day, sampled at mid-day, in chronological order.
    async fn fetch_forecast(
        &self,
        city: &str,
        unit: Unit,
    ) -> Result<Vec<ForecastEntry>, ProviderError>;
}
