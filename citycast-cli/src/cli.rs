use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};

use std::path::PathBuf;

use citycast_core::{
    Config, Controller, FileStore, OpenWeatherProvider, PreferenceStore, Unit,
    config::API_KEY_ENV,
};

use crate::{render, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "City weather lookup with favorites")]
pub struct Cli {
    /// Interactive session when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default unit.
    Configure,

    /// Show current weather and the 5-day forecast for a city.
    Show {
        /// City name, e.g. "London" or "Sacramento, CA".
        city: String,

        /// Unit system for this lookup: metric or imperial.
        #[arg(long, value_parser = parse_unit)]
        units: Option<Unit>,
    },

    /// List favorite cities.
    Favorites,

    /// Add a city to favorites, or remove it if it is already there.
    Favorite { city: String },

    /// Remove a city from favorites.
    Unfavorite { city: String },

    /// Save the preferred unit system: metric or imperial.
    Unit {
        #[arg(value_parser = parse_unit)]
        unit: Unit,
    },

    /// Switch between light and dark theme.
    Theme,

    /// Search, browse favorites and switch units in a prompt loop.
    Interactive,
}

fn parse_unit(value: &str) -> Result<Unit, String> {
    Unit::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let command = self.command.unwrap_or(Command::Interactive);
        if let Command::Configure = command {
            return configure();
        }

        let config = Config::load()?;
        let mut controller = controller_at(&config, Config::storage_dir()?)?;
        render::apply_theme(controller.state().theme);

        match command {
            Command::Configure => {} // returned above
            Command::Show { city, units } => {
                require_api_key(&config)?;
                if let Some(unit) = units {
                    controller = controller.with_session_unit(unit);
                }
                controller.search(&city).await;

                if let Some(msg) = controller.state().status.error_message() {
                    anyhow::bail!("{msg}: {}", city.trim());
                }
                render::print_search(controller.state());
            }
            Command::Favorites => render::print_favorites(controller.state()),
            Command::Favorite { city } => {
                controller.toggle_favorite(&city)?;
                let verb = if controller.is_favorite(&city) { "Added" } else { "Removed" };
                println!("{verb} {city}.");
                render::print_favorites(controller.state());
            }
            Command::Unfavorite { city } => {
                if controller.is_favorite(&city) {
                    controller.remove_favorite(&city)?;
                    println!("Removed {city}.");
                } else {
                    println!("{city} is not a favorite.");
                }
            }
            Command::Unit { unit } => {
                controller.set_unit(unit).await?;
                println!("Units set to {unit} ({}).", unit.temperature_symbol());
            }
            Command::Theme => {
                controller.toggle_theme()?;
                let name = if controller.state().theme.is_dark() { "dark" } else { "light" };
                println!("Theme set to {name}.");
            }
            Command::Interactive => {
                if let Err(err) = require_api_key(&config) {
                    eprintln!("warning: {err}");
                }
                session::run(controller).await?;
            }
        }

        Ok(())
    }
}

/// Controller over the configured provider and the preference store in
/// `storage_dir`. Needs no API key until something is searched.
fn controller_at(config: &Config, storage_dir: PathBuf) -> Result<Controller> {
    let provider = OpenWeatherProvider::from_config(config)?;
    let store = PreferenceStore::new(FileStore::new(storage_dir));

    Ok(Controller::initialize(
        Box::new(provider),
        store,
        config.default_unit.unwrap_or_default(),
        render::system_prefers_dark(),
    ))
}

fn require_api_key(config: &Config) -> Result<()> {
    if config.api_key().is_none() {
        anyhow::bail!(
            "No OpenWeather API key configured.\n\
             Hint: run `citycast configure` or set {API_KEY_ENV}."
        );
    }
    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("API key prompt cancelled")?;
    config.set_api_key(api_key);

    let units = vec![Unit::Metric, Unit::Imperial];
    let start = units
        .iter()
        .position(|u| Some(*u) == config.default_unit)
        .unwrap_or(0);
    let unit = Select::new("Default units:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Unit prompt cancelled")?;
    config.default_unit = Some(unit);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use citycast_core::{KeyValueStore, store::FAVORITES_KEY};

    #[test]
    fn favorites_are_listed_without_an_api_key() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = FileStore::new(dir.path());
        store.set(FAVORITES_KEY, r#"["Kyiv","Oslo"]"#).unwrap();

        let controller = controller_at(&Config::default(), dir.path().to_path_buf())
            .expect("preferences need no API key");

        assert_eq!(controller.state().favorites.as_slice(), ["Kyiv", "Oslo"]);
    }

    #[test]
    fn favorite_toggle_is_saved_without_an_api_key() {
        let dir = tempfile::tempdir().expect("temp dir");

        let mut controller = controller_at(&Config::default(), dir.path().to_path_buf()).unwrap();
        controller.toggle_favorite("Lima").unwrap();

        let reopened = controller_at(&Config::default(), dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.state().favorites.as_slice(), ["Lima"]);
    }
}
