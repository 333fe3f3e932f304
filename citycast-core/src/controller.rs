//! Search-and-favorites controller.
//!
//! Owns all mutable application state and is the only thing that mutates it.
//! A presentation layer reads [`AppState`] through [`Controller::state`] or a
//! subscription, and feeds user intents back in through the public methods.
//!
//! Every mutating operation takes `&mut self`, so on a single controller a
//! search always runs to completion before the next one starts and a stale
//! response can never overwrite a newer one.

use std::fmt;

use crate::{
    error::StoreError,
    model::{Favorites, ForecastEntry, SearchStatus, Theme, Unit, WeatherSnapshot},
    provider::WeatherProvider,
    query::normalize_city,
    store::PreferenceStore,
};

/// Message shown for any failed search, whatever the underlying cause.
pub const CITY_NOT_FOUND: &str = "City not found";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub weather: Option<WeatherSnapshot>,
    pub forecast: Vec<ForecastEntry>,
    pub status: SearchStatus,
    pub favorites: Favorites,
    pub unit: Unit,
    pub theme: Theme,
    /// Raw input of the last successful search.
    pub last_city: Option<String>,
}

type Subscriber = Box<dyn Fn(&AppState) + Send + Sync>;

pub struct Controller {
    provider: Box<dyn WeatherProvider>,
    store: PreferenceStore,
    state: AppState,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("provider", &self.provider)
            .field("store", &self.store)
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Controller {
    /// Restore persisted preferences. No network call happens here.
    ///
    /// `fallback_unit` applies when no unit was saved; `system_prefers_dark`
    /// when no theme was saved.
    pub fn initialize(
        provider: Box<dyn WeatherProvider>,
        store: PreferenceStore,
        fallback_unit: Unit,
        system_prefers_dark: bool,
    ) -> Self {
        let prefs = store.load();

        let state = AppState {
            favorites: prefs.favorites.unwrap_or_default(),
            unit: prefs.unit.unwrap_or(fallback_unit),
            theme: Theme::from_dark_mode(prefs.dark_mode.unwrap_or(system_prefers_dark)),
            ..AppState::default()
        };

        tracing::debug!(
            favorites = state.favorites.len(),
            unit = %state.unit,
            dark = state.theme.is_dark(),
            "Controller initialized"
        );

        Self {
            provider,
            store,
            state,
            subscribers: Vec::new(),
        }
    }

    /// Use `unit` for this controller's lifetime without saving it.
    pub fn with_session_unit(mut self, unit: Unit) -> Self {
        self.state.unit = unit;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Register a callback run synchronously after every state change.
    pub fn subscribe(&mut self, subscriber: impl Fn(&AppState) + Send + Sync + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn is_favorite(&self, city: &str) -> bool {
        self.state.favorites.contains(city)
    }

    /// Look up `city`. Blank input is ignored. Always leaves the status at
    /// success or error; failures never escape as errors.
    pub async fn search(&mut self, city: &str) {
        let Some(query) = normalize_city(city) else {
            return;
        };

        self.state.status = SearchStatus::Loading;
        self.notify();

        let unit = self.state.unit;
        let current = self.provider.fetch_current(&query, unit).await;
        match current {
            Ok(snapshot) => {
                self.state.weather = Some(snapshot);
                self.state.status = SearchStatus::Success;
                self.state.last_city = Some(city.to_string());

                let forecast = self.provider.fetch_forecast(&query, unit).await;
                self.state.forecast = match forecast {
                    Ok(series) => series,
                    Err(err) => {
                        tracing::warn!(query = %query, error = %err, "Forecast unavailable");
                        Vec::new()
                    }
                };
            }
            Err(err) => {
                tracing::warn!(
                    query = %query,
                    not_found = err.is_not_found(),
                    error = %err,
                    "Search failed"
                );
                self.state.weather = None;
                self.state.forecast.clear();
                self.state.status = SearchStatus::Error(CITY_NOT_FOUND.to_string());
            }
        }

        self.notify();
    }

    pub async fn select_favorite(&mut self, city: &str) {
        self.search(city).await;
    }

    /// Add `city` to the end of the favorites, or remove it if already there,
    /// then persist.
    pub fn toggle_favorite(&mut self, city: &str) -> Result<(), StoreError> {
        self.state.favorites.toggle(city);
        self.notify();
        self.store.save_favorites(&self.state.favorites)
    }

    pub fn remove_favorite(&mut self, city: &str) -> Result<(), StoreError> {
        if self.state.favorites.remove(city) {
            self.notify();
        }
        self.store.save_favorites(&self.state.favorites)
    }

    /// Switch units and re-run the last search so values come back from the
    /// provider already in the new unit.
    ///
    /// The choice is always saved, even when it matches the current unit,
    /// which may only be the configured fallback.
    pub async fn set_unit(&mut self, unit: Unit) -> Result<(), StoreError> {
        let saved = self.store.save_unit(unit);
        if unit == self.state.unit {
            return saved;
        }

        self.state.unit = unit;
        self.notify();

        if let Some(city) = self.state.last_city.clone() {
            self.search(&city).await;
        }

        saved
    }

    pub async fn toggle_unit(&mut self) -> Result<(), StoreError> {
        self.set_unit(self.state.unit.toggled()).await
    }

    pub fn toggle_theme(&mut self) -> Result<(), StoreError> {
        self.state.theme = self.state.theme.toggled();
        self.notify();
        self.store.save_theme(self.state.theme)
    }

    fn notify(&self) {
        for subscriber in &self.subscribers {
            subscriber(&self.state);
        }
    }
}
