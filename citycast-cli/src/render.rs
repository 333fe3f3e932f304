//! Terminal rendering of controller state.

use std::sync::Mutex;

use citycast_core::{AppState, SearchStatus, Theme};
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};

/// Terminals following the rxvt convention export `COLORFGBG="fg;bg"`;
/// background colors 0-6 and 8 are dark.
pub fn system_prefers_dark() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|v| v.rsplit(';').next().and_then(|bg| bg.trim().parse::<u8>().ok()))
        .is_some_and(|bg| bg <= 6 || bg == 8)
}

pub fn apply_theme(theme: Theme) {
    let (accent, muted) = match theme {
        Theme::Dark => (Color::LightCyan, Color::Grey),
        Theme::Light => (Color::DarkBlue, Color::DarkGrey),
    };

    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("?").with_fg(accent))
        .with_answer(StyleSheet::new().with_fg(accent))
        .with_help_message(StyleSheet::new().with_fg(muted));

    inquire::set_global_render_config(config);
}

/// Subscriber that prints only when the search status changes, so favorite
/// and theme updates don't repaint the whole result.
pub fn status_printer() -> impl Fn(&AppState) + Send + Sync + 'static {
    let last = Mutex::new(SearchStatus::Idle);

    move |state: &AppState| {
        let Ok(mut shown) = last.lock() else {
            return;
        };
        if *shown == state.status {
            return;
        }
        *shown = state.status.clone();

        match &state.status {
            SearchStatus::Idle => {}
            SearchStatus::Loading => println!("Searching..."),
            SearchStatus::Success => print_search(state),
            SearchStatus::Error(msg) => println!("✗ {msg}"),
        }
    }
}

pub fn print_search(state: &AppState) {
    let Some(w) = &state.weather else {
        return;
    };
    let temp = state.unit.temperature_symbol();

    let star = match &state.last_city {
        Some(city) if state.favorites.contains(city.trim()) => " ★",
        _ => "",
    };

    println!();
    println!("{}, {}{star}", w.city, w.country);
    println!(
        "  {:.1}{temp} (feels like {:.1}{temp}), {}",
        w.temperature, w.feels_like, w.description
    );
    println!(
        "  Humidity {}%  Wind {:.1} {}  Pressure {} hPa",
        w.humidity_pct,
        w.wind_speed,
        state.unit.wind_speed_label(),
        w.pressure_hpa
    );

    if state.forecast.is_empty() {
        println!("  (forecast unavailable)");
        return;
    }

    println!("Forecast");
    for day in &state.forecast {
        println!(
            "  {}  {:>6.1}{temp}  {}",
            day.date.format("%a %d %b"),
            day.temperature,
            day.description
        );
    }
}

pub fn print_favorites(state: &AppState) {
    if state.favorites.is_empty() {
        println!("No favorite cities yet. Search for a city and add it to favorites!");
        return;
    }

    println!("Favorite cities:");
    for city in state.favorites.iter() {
        println!("  ★ {city}");
    }
}
