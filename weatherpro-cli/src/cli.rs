use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::Password;
use std::{sync::Arc, time::Duration};
use tokio::time::MissedTickBehavior;
use weatherpro_core::{
    Config, Coordinate, ErrorKind, FixedLocationService, IpLocationService, LocationService,
    OpenWeatherProvider, WeatherError, WeatherProvider, WeatherSession, WeatherSnapshot,
    provider_from_config,
};

use crate::{prompt::TerminalPrompt, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherpro", version, about = "Current weather for where you are")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure {
        /// Key to store; prompted for when absent.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show current weather once.
    Show {
        #[command(flatten)]
        location: LocationArgs,

        /// Print the snapshot as JSON instead of a card.
        #[arg(long)]
        json: bool,
    },

    /// Show current weather and refresh it periodically until Ctrl-C.
    Watch {
        #[command(flatten)]
        location: LocationArgs,

        /// Seconds between refreshes; defaults to the configured interval.
        #[arg(long)]
        interval: Option<u64>,
    },
}

/// Where the coordinate comes from.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Latitude in decimal degrees.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Consent to the IP-based location lookup without prompting.
    #[arg(short, long)]
    pub yes: bool,
}

impl LocationArgs {
    fn coordinate(&self) -> Option<Coordinate> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

type Session = WeatherSession<Box<dyn LocationService>, OpenWeatherProvider>;

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key } => configure(api_key),
            Command::Show { location, json } => show(&location, json).await,
            Command::Watch { location, interval } => watch(&location, interval).await,
        }
    }
}

fn configure(api_key: Option<String>) -> anyhow::Result<()> {
    // Read the file itself so an environment override is never persisted.
    let mut cfg = Config::load_from(&Config::config_file_path()?)?;

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("OpenWeather API key:")
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    cfg.set_api_key(api_key);
    let path = cfg.save()?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

/// Pick the location source: explicit coordinates, then the configured
/// location, then an IP lookup.
fn location_service(args: &LocationArgs, cfg: &Config) -> Box<dyn LocationService> {
    if let Some(at) = args.coordinate().or_else(|| cfg.fixed_location()) {
        return Box::new(FixedLocationService::new(at));
    }

    if args.yes {
        Box::new(IpLocationService::pre_authorized(cfg.geolocation_url()))
    } else {
        Box::new(IpLocationService::new(
            cfg.geolocation_url(),
            Arc::new(TerminalPrompt),
        ))
    }
}

fn session(args: &LocationArgs) -> anyhow::Result<(Session, Config)> {
    let cfg = Config::load()?;
    let provider = provider_from_config(&cfg)?;
    let session = WeatherSession::new(location_service(args, &cfg), provider);
    Ok((session, cfg))
}

fn explain(err: WeatherError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

async fn show(args: &LocationArgs, json: bool) -> anyhow::Result<()> {
    let (session, _) = session(args)?;
    let snapshot = session.refresh().await.map_err(explain)?;
    print_snapshot(&snapshot, json)
}

async fn watch(args: &LocationArgs, interval: Option<u64>) -> anyhow::Result<()> {
    let (session, cfg) = session(args)?;
    let period = interval
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| cfg.refresh_interval());

    watch_until(&session, period, tokio::signal::ctrl_c()).await
}

/// Refresh on every tick until `shutdown` resolves, including mid-refresh.
async fn watch_until<S, P, F>(
    session: &WeatherSession<S, P>,
    period: Duration,
    shutdown: F,
) -> anyhow::Result<()>
where
    S: LocationService,
    P: WeatherProvider,
    F: Future,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        let outcome = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            outcome = session.refresh() => outcome,
        };

        match outcome {
            Ok(snapshot) => print_snapshot(&snapshot, false)?,
            // Denial is final for this session; nothing to wait for.
            Err(err) if err.kind() == ErrorKind::PermissionDenied => {
                return Err(explain(err));
            }
            Err(err) => eprintln!("{}", err.user_message()),
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &WeatherSnapshot, json: bool) -> anyhow::Result<()> {
    if json {
        let body =
            serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
        println!("{body}");
    } else {
        println!("{}", render::card(snapshot));
    }
    Ok(())
}
