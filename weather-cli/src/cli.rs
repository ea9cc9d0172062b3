use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use cityweather_core::{
    Config, DetailsSession, Unit, WeatherService,
    connectivity::Fixed,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "City weather with favourites")]
pub struct Cli {
    /// Skip the network probe and behave as if offline.
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current weather for a city.
    Show {
        city: String,

        /// C or F; defaults to the saved preference.
        #[arg(long)]
        unit: Option<Unit>,

        /// Add the city to favourites, or remove it if already there.
        #[arg(long)]
        toggle_favourite: bool,
    },

    /// Show weather at a latitude/longitude.
    Here {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long)]
        unit: Option<Unit>,
    },

    /// List favourite cities with their saved snapshot.
    Favourites {
        /// Delete every favourite. Recovers from an unreadable favourites file.
        #[arg(long)]
        reset: bool,
    },

    /// Remove a city from favourites.
    Unfavourite {
        city: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// List recent searches, optionally filtered.
    Recent {
        filter: Option<String>,

        /// Forget all recent searches.
        #[arg(long, conflicts_with = "filter")]
        clear: bool,
    },

    /// Show or set the temperature unit.
    Unit { unit: Option<Unit> },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(&mut config),
            command => {
                let service = if self.offline {
                    WeatherService::from_config_with(&config, Arc::new(Fixed(false)))?
                } else {
                    WeatherService::from_config(&config)?
                };
                execute(service, command).await
            }
        }
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(key.trim().to_string());
    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

const RESET_HINT: &str = "Could not read favourites; `cityweather favourites --reset` starts a new list";

/// City names are matched exactly, so surrounding whitespace is dropped once here.
fn city_arg(raw: &str) -> anyhow::Result<String> {
    let city = raw.trim();
    anyhow::ensure!(!city.is_empty(), "City name must not be empty");
    Ok(city.to_string())
}

fn confirm_removal(city: &str) -> anyhow::Result<bool> {
    inquire::Confirm::new(&format!("Remove {city} from favourites?"))
        .with_default(false)
        .prompt()
        .context("Failed to read confirmation")
}

async fn execute(service: WeatherService, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Configure => {}
        Command::Show { city, unit, toggle_favourite } => {
            let city = city_arg(&city)?;
            service.record_search(&city).await?;

            let session = DetailsSession::open(service, city, unit).await?;
            let mut state = session.load().await?;

            if toggle_favourite {
                state.is_favourite = session.toggle_favourite().await?;
            }

            print!("{}", output::details(&state));
        }
        Command::Here { lat, lon, unit } => {
            let unit = match unit {
                Some(unit) => unit,
                None => service.unit().await?,
            };
            let obs = service.load_weather_for_coordinates(lat, lon, unit).await?;
            print!("{}", output::observation(&obs, unit));
        }
        Command::Favourites { reset: true } => {
            service.reset_favourites().await?;
            println!("Cleared favourites");
        }
        Command::Favourites { reset: false } => {
            let list = service.favourites().await.context(RESET_HINT)?;
            print!("{}", output::favourites(&list));
        }
        Command::Unfavourite { city, yes } => {
            let city = city_arg(&city)?;
            if !service.is_favourite(&city).await.context(RESET_HINT)? {
                println!("{city} is not a favourite");
            } else if yes || confirm_removal(&city)? {
                service.remove_favourite(&city).await?;
                println!("Removed {city} from favourites");
            } else {
                println!("Kept {city}");
            }
        }
        Command::Recent { filter, clear } => {
            if clear {
                service.clear_recent_searches().await?;
                println!("Cleared recent searches");
            } else {
                let list = match filter {
                    Some(text) => service.suggest(&text).await?,
                    None => service.recent_searches().await?,
                };
                print!("{}", output::recent(&list));
            }
        }
        Command::Unit { unit: Some(unit) } => {
            service.set_unit(unit).await?;
            println!("Unit set to °{unit}");
        }
        Command::Unit { unit: None } => {
            println!("°{}", service.unit().await?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_unit() {
        let cli = Cli::try_parse_from(["cityweather", "show", "Paris", "--unit", "f"]).unwrap();
        match cli.command {
            Command::Show { city, unit, toggle_favourite } => {
                assert_eq!(city, "Paris");
                assert_eq!(unit, Some(Unit::Fahrenheit));
                assert!(!toggle_favourite);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_negative_coordinates_and_global_offline() {
        let cli = Cli::try_parse_from(["cityweather", "here", "--lat", "-33.9", "--lon", "18.4", "--offline"])
            .unwrap();
        assert!(cli.offline);
        assert!(matches!(cli.command, Command::Here { lat, .. } if lat == -33.9));
    }

    #[test]
    fn rejects_unknown_unit() {
        assert!(Cli::try_parse_from(["cityweather", "unit", "K"]).is_err());
    }

    #[test]
    fn unfavourite_confirms_unless_yes() {
        let cli = Cli::try_parse_from(["cityweather", "unfavourite", "Paris"]).unwrap();
        assert!(matches!(cli.command, Command::Unfavourite { yes: false, .. }));

        let cli = Cli::try_parse_from(["cityweather", "unfavourite", "Paris", "--yes"]).unwrap();
        assert!(matches!(cli.command, Command::Unfavourite { ref city, yes: true } if city == "Paris"));

        let cli = Cli::try_parse_from(["cityweather", "unfavourite", "-y", "Paris"]).unwrap();
        assert!(matches!(cli.command, Command::Unfavourite { yes: true, .. }));
    }

    #[test]
    fn parses_favourites_reset() {
        let cli = Cli::try_parse_from(["cityweather", "favourites", "--reset"]).unwrap();
        assert!(matches!(cli.command, Command::Favourites { reset: true }));

        let cli = Cli::try_parse_from(["cityweather", "favourites"]).unwrap();
        assert!(matches!(cli.command, Command::Favourites { reset: false }));
    }

    #[test]
    fn city_arg_is_trimmed_once() {
        assert_eq!(city_arg("  Paris \t").unwrap(), "Paris");
        assert_eq!(city_arg("New York").unwrap(), "New York");
        assert!(city_arg("   ").is_err());
    }

    #[test]
    fn recent_clear_conflicts_with_filter() {
        assert!(Cli::try_parse_from(["cityweather", "recent", "par", "--clear"]).is_err());
    }
}
