use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, Select};
use tracing::debug;
use weathercard_core::{
    Config, Place, ProviderId, ResourceViewer, UnitSystem, WeatherFetcher, WeatherView, cities,
    provider::provider_from_config,
};

use crate::viewer::{HtmlFileViewer, OutputFormat, TerminalViewer};

const QUIT: &str = "Quit";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathercard", version, about = "Weather card previewer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "open-meteo" or "openweather".
        provider: String,
    },

    /// List the cities offered by `pick`.
    Cities,

    /// Show the weather card for a city.
    Show {
        /// City name; defaults to the configured city (Atlanta).
        city: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Pick cities interactively and show a card for each.
    Pick {
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// "imperial" or "metric"; overrides the config file.
    #[arg(long)]
    units: Option<UnitSystem>,

    /// Provider to fetch from; overrides the config file.
    #[arg(long)]
    provider: Option<String>,

    /// Print the resource descriptor as JSON instead of raw HTML.
    #[arg(long)]
    json: bool,

    /// Write an HTML preview page to this file instead of printing.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider)?,
            Command::Cities => {
                let config = Config::load()?;
                let default = config.default_place()?;
                for city in cities::places() {
                    let marker = if city == default { "*" } else { " " };
                    println!("{marker} {city}");
                }
            }
            Command::Show { city, view } => {
                let config = Config::load()?;
                let place = match city {
                    Some(name) => Place::new(&name).context("Invalid city name")?,
                    None => config.default_place()?,
                };
                let (mut weather, mut viewer) = view.build(&config, place.clone())?;
                weather.select_and_show(place, viewer.as_mut()).await?;
            }
            Command::Pick { view } => {
                let config = Config::load()?;
                let place = config.default_place()?;
                let (mut weather, mut viewer) = view.build(&config, place.clone())?;
                pick_loop(&mut weather, viewer.as_mut(), place).await?;
            }
        }

        Ok(())
    }
}

impl ViewArgs {
    fn build(
        &self,
        config: &Config,
        place: Place,
    ) -> anyhow::Result<(WeatherView, Box<dyn ResourceViewer>)> {
        let units = match self.units {
            Some(units) => units,
            None => config.units()?,
        };
        let provider_id = match self.provider.as_deref() {
            Some(id) => ProviderId::try_from(id)?,
            None => config.default_provider_id()?,
        };
        debug!(provider = %provider_id, units = %units, "building weather view");

        if !config.is_provider_configured(provider_id) {
            anyhow::bail!(
                "Provider '{provider_id}' is not configured.\n\
                 Hint: run `weathercard configure {provider_id}`, or pass `--provider open-meteo`."
            );
        }

        let fetcher: Arc<dyn WeatherFetcher> = Arc::from(provider_from_config(provider_id, config)?);
        let weather = WeatherView::new(fetcher, place, units);

        let viewer: Box<dyn ResourceViewer> = match &self.out {
            Some(path) => Box::new(HtmlFileViewer::new(path)),
            None => {
                let format = if self.json {
                    OutputFormat::Json
                } else {
                    OutputFormat::Html
                };
                Box::new(TerminalViewer::new(std::io::stdout(), format))
            }
        };

        Ok((weather, viewer))
    }
}

async fn pick_loop(
    weather: &mut WeatherView,
    viewer: &mut dyn ResourceViewer,
    start: Place,
) -> anyhow::Result<()> {
    let mut options: Vec<&str> = cities::CITIES.to_vec();
    options.push(QUIT);
    let mut current = start;

    loop {
        let cursor = options
            .iter()
            .position(|c| *c == current.as_str())
            .unwrap_or(0);

        let choice = match Select::new("Select a city:", options.clone())
            .with_starting_cursor(cursor)
            .prompt()
        {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("City prompt failed"),
        };

        if choice == QUIT {
            break;
        }

        current = Place::new(choice)?;
        weather.select_and_show(current.clone(), viewer).await?;
    }

    Ok(())
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if id.requires_api_key() {
        let api_key = Password::new(&format!("API key for {id}:"))
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            anyhow::bail!("API key for '{id}' must not be empty");
        }
        config.upsert_provider_api_key(id, api_key);
    } else {
        println!("{id} does not need an API key.");
    }

    let make_default = Confirm::new(&format!("Make {id} the default provider?"))
        .with_default(true)
        .prompt()
        .context("Failed to read answer")?;
    if make_default {
        config.set_default_provider(id);
    }

    let units = Select::new("Preferred units:", vec![UnitSystem::Imperial, UnitSystem::Metric])
        .with_starting_cursor(match config.units()? {
            UnitSystem::Imperial => 0,
            UnitSystem::Metric => 1,
        })
        .prompt()
        .context("Failed to read unit preference")?;
    config.units = Some(units.as_str().to_string());

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
