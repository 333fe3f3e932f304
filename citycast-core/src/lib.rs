//! Core library for the `citycast` weather lookup.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider client
//! - Persistent favorites and display preferences
//! - The search-and-favorites controller that owns application state
//!
//! It is used by `citycast-cli`, but any other front end can drive the
//! [`Controller`] the same way.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod query;
pub mod store;

pub use config::Config;
pub use controller::{AppState, CITY_NOT_FOUND, Controller};
pub use error::{ProviderError, StoreError};
pub use model::{Favorites, ForecastEntry, SearchStatus, Theme, Unit, WeatherSnapshot};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use store::{FileStore, KeyValueStore, MemoryStore, PreferenceStore, Preferences};
