use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};

use swmon_service::config::{Config, DEFAULT_CONFIG_PATH};
use swmon_service::ingest::FeedSource;
use swmon_service::ingest::replay::ReplayFeeds;
use swmon_service::ingest::swpc::SwpcClient;
use swmon_service::logging::{self, Source};
use swmon_service::risk::DEFAULT_FORECAST_DAYS;
use swmon_service::services::SpaceWeatherService;
use swmon_service::verify;

#[derive(Parser)]
#[command(name = "swmon_service", version, about = "Space-weather telemetry aggregator")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Serve feeds from `<feed-id>.json` files instead of SWPC.
    #[arg(long)]
    replay_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solar indices, sunspots, flares and the overall assessment.
    Conditions,
    /// Latest data for one spacecraft (goes or ace).
    Satellite {
        #[arg(long = "type", default_value = "goes")]
        satellite: String,
    },
    /// Storm outlook for the coming days.
    Forecast {
        #[arg(long, default_value_t = DEFAULT_FORECAST_DAYS)]
        days: u32,
    },
    /// Threshold alerts for the current conditions.
    Alerts,
    /// Brightness and edge analysis of a solar image.
    Image {
        #[arg(long)]
        url: String,
        #[arg(long = "type", default_value = "solar")]
        analysis_type: String,
    },
    /// Differential rotation rate at a heliographic latitude.
    Rotation {
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        latitude: f64,
    },
    /// Fetch every registered feed and report what came back.
    Verify,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => return fail(&anyhow::Error::new(e).context("loading configuration")),
    };

    let level = config.logging.level_filter().unwrap_or(log::LevelFilter::Info);
    if let Err(e) = logging::init_logger(level, config.logging.file.as_deref(), config.logging.timestamps) {
        eprintln!("could not open log file: {}", e);
    }

    let outcome = match &cli.replay_dir {
        Some(dir) => ReplayFeeds::from_dir(dir)
            .with_context(|| format!("loading replay directory {}", dir.display()))
            .and_then(|replay| dispatch(SpaceWeatherService::from_config(replay, &config), cli.command)),
        None => SwpcClient::new(&config.feeds)
            .context("building SWPC client")
            .and_then(|client| dispatch(SpaceWeatherService::from_config(client, &config), cli.command)),
    };

    match outcome {
        Ok(Some(data)) => {
            println!("{}", json!({"success": true, "data": data}));
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// Runs one command. `None` means the command printed its own output.
fn dispatch<S: FeedSource>(service: SpaceWeatherService<S>, command: Command) -> anyhow::Result<Option<Value>> {
    let data = match command {
        Command::Conditions => to_value(service.analyze_current_conditions())?,
        Command::Satellite { satellite } => to_value(service.fetch_latest_data(&satellite)?)?,
        Command::Forecast { days } => to_value(service.generate_forecast(days)?)?,
        Command::Alerts => to_value(service.check_alerts())?,
        Command::Image { url, analysis_type } => to_value(service.analyze_image(&url, &analysis_type)?)?,
        Command::Rotation { latitude } => to_value(service.solar_rotation(latitude))?,
        Command::Verify => {
            let report = verify::run_full_verification(service.source());
            verify::print_summary(&report);
            return Ok(None);
        }
    };
    Ok(Some(data))
}

fn to_value(data: impl Serialize) -> anyhow::Result<Value> {
    serde_json::to_value(data).context("serializing result")
}

fn fail(err: &anyhow::Error) -> ExitCode {
    logging::error(Source::System, None, &format!("{:#}", err));
    println!("{}", json!({"success": false, "error": format!("{:#}", err)}));
    ExitCode::FAILURE
}
