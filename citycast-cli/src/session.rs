//! Interactive prompt loop: the terminal stand-in for the search page.

use std::fmt;

use anyhow::Result;
use citycast_core::Controller;
use inquire::{InquireError, Select, Text};

use crate::render;

enum Action {
    Search,
    ToggleFavorite { city: String, is_favorite: bool },
    OpenFavorite,
    RemoveFavorite,
    ToggleUnit(&'static str),
    ToggleTheme { to_dark: bool },
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Search => f.write_str("Search a city"),
            Action::ToggleFavorite { city, is_favorite: true } => {
                write!(f, "Remove {city} from favorites")
            }
            Action::ToggleFavorite { city, is_favorite: false } => {
                write!(f, "Add {city} to favorites")
            }
            Action::OpenFavorite => f.write_str("Open a favorite"),
            Action::RemoveFavorite => f.write_str("Remove a favorite"),
            Action::ToggleUnit(symbol) => write!(f, "Switch to {symbol}"),
            Action::ToggleTheme { to_dark: true } => f.write_str("Switch to dark theme"),
            Action::ToggleTheme { to_dark: false } => f.write_str("Switch to light theme"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

fn actions(controller: &Controller) -> Vec<Action> {
    let state = controller.state();
    let mut actions = vec![Action::Search];

    if let (Some(_), Some(city)) = (&state.weather, &state.last_city) {
        let city = city.trim().to_string();
        let is_favorite = controller.is_favorite(&city);
        actions.push(Action::ToggleFavorite { city, is_favorite });
    }

    if !state.favorites.is_empty() {
        actions.push(Action::OpenFavorite);
        actions.push(Action::RemoveFavorite);
    }

    actions.push(Action::ToggleUnit(state.unit.toggled().temperature_symbol()));
    actions.push(Action::ToggleTheme { to_dark: !state.theme.is_dark() });
    actions.push(Action::Quit);
    actions
}

/// `None` when the user cancelled the prompt with Esc or Ctrl-C.
fn cancelled<T>(res: Result<T, InquireError>) -> Result<Option<T>> {
    match res {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn pick_favorite(controller: &Controller, prompt: &str) -> Result<Option<String>> {
    let names: Vec<String> = controller.state().favorites.iter().map(str::to_string).collect();
    cancelled(Select::new(prompt, names).prompt())
}

fn report(saved: Result<(), citycast_core::StoreError>) {
    if let Err(err) = saved {
        tracing::warn!(error = %err, "Preference not saved");
        eprintln!("warning: {err}");
    }
}

pub async fn run(mut controller: Controller) -> Result<()> {
    controller.subscribe(render::status_printer());
    render::print_favorites(controller.state());

    loop {
        let Some(action) = cancelled(Select::new("What next?", actions(&controller)).prompt())?
        else {
            break;
        };

        match action {
            Action::Search => {
                let Some(city) = cancelled(Text::new("City:").prompt())? else {
                    continue;
                };
                controller.search(&city).await;
            }
            Action::ToggleFavorite { city, .. } => {
                report(controller.toggle_favorite(&city));
                render::print_favorites(controller.state());
            }
            Action::OpenFavorite => {
                if let Some(city) = pick_favorite(&controller, "Open favorite:")? {
                    controller.select_favorite(&city).await;
                }
            }
            Action::RemoveFavorite => {
                if let Some(city) = pick_favorite(&controller, "Remove favorite:")? {
                    report(controller.remove_favorite(&city));
                    render::print_favorites(controller.state());
                }
            }
            Action::ToggleUnit(_) => {
                report(controller.toggle_unit().await);
            }
            Action::ToggleTheme { .. } => {
                report(controller.toggle_theme());
                render::apply_theme(controller.state().theme);
            }
            Action::Quit => break,
        }
    }

    Ok(())
}
