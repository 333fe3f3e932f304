use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::{convert::TryFrom, fmt};

/// Unit system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl Unit {
    /// Value of the provider's `units` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Unit::Metric => "metric",
            Unit::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Unit::Metric => Unit::Imperial,
            Unit::Imperial => Unit::Metric,
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Unit::Metric => "°C",
            Unit::Imperial => "°F",
        }
    }

    pub fn wind_speed_label(&self) -> &'static str {
        match self {
            Unit::Metric => "m/s",
            Unit::Imperial => "mph",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl TryFrom<&str> for Unit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Unit::Metric),
            "imperial" => Ok(Unit::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{value}'. Supported units: metric, imperial."
            )),
        }
    }
}

/// Display theme. Persisted as the `dark_mode` boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark_mode: bool) -> Self {
        if dark_mode { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn toggled(self) -> Self {
        Theme::from_dark_mode(!self.is_dark())
    }
}

/// Current conditions for one city at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub pressure_hpa: u32,
}

/// Mid-day reading for one forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub date: NaiveDate,
    pub temperature: f64,
    pub description: String,
}

/// Status of the most recent search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl SearchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchStatus::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SearchStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Ordered list of favorite city names. A name appears at most once
/// (exact, case-sensitive match); insertion order is kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Favorites(Vec<String>);

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, city: &str) -> bool {
        self.0.iter().any(|c| c == city)
    }

    /// Removes `city` if present, otherwise appends it.
    /// Returns `true` when the city is a favorite afterwards.
    pub fn toggle(&mut self, city: &str) -> bool {
        if self.remove(city) {
            false
        } else {
            self.0.push(city.to_string());
            true
        }
    }

    /// Returns `true` if something was removed.
    pub fn remove(&mut self, city: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != city);
        self.0.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for Favorites {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut favorites = Favorites::new();
        for city in iter {
            let city = city.into();
            if !favorites.contains(&city) {
                favorites.0.push(city);
            }
        }
        favorites
    }
}

// Hand-edited storage may contain duplicates; the first occurrence wins.
impl<'de> Deserialize<'de> for Favorites {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn favs(names: &[&str]) -> Favorites {
        names.iter().copied().collect()
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut f = favs(&["Paris"]);
        assert!(f.toggle("Tokyo"));
        assert!(f.contains("Tokyo"));
        assert!(!f.toggle("Tokyo"));
        assert_eq!(f, favs(&["Paris"]));
    }

    #[test]
    fn readded_favorite_moves_to_end() {
        let mut f = favs(&["a", "b", "c"]);
        f.toggle("a");
        assert_eq!(f.as_slice(), ["b", "c"]);
        f.toggle("a");
        assert_eq!(f.as_slice(), ["b", "c", "a"]);
    }

    #[test]
    fn membership_is_case_sensitive() {
        let mut f = favs(&["London"]);
        f.toggle("london");
        assert_eq!(f.len(), 2);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut f = favs(&["a"]);
        assert!(!f.remove("b"));
        assert_eq!(f.as_slice(), ["a"]);
    }

    #[test]
    fn never_holds_duplicates() {
        let mut f = Favorites::new();
        for name in ["x", "y", "x", "x", "y", "z", "x"] {
            f.toggle(name);
            let mut seen: Vec<&str> = f.iter().collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), f.len());
        }
    }

    #[test]
    fn deserialize_drops_duplicates() {
        let f: Favorites = serde_json::from_str(r#"["Rome","Oslo","Rome"]"#).unwrap();
        assert_eq!(f.as_slice(), ["Rome", "Oslo"]);
        assert_eq!(serde_json::to_string(&f).unwrap(), r#"["Rome","Oslo"]"#);
    }

    #[test]
    fn unit_parses_and_serializes_lowercase() {
        assert_eq!(Unit::try_from("Imperial").unwrap(), Unit::Imperial);
        assert!(Unit::try_from("kelvin").is_err());
        assert_eq!(serde_json::to_string(&Unit::Metric).unwrap(), r#""metric""#);
        assert_eq!(Unit::Metric.toggled(), Unit::Imperial);
    }

    #[test]
    fn theme_toggles() {
        assert!(Theme::Light.toggled().is_dark());
        assert_eq!(Theme::from_dark_mode(false), Theme::Light);
    }
}
