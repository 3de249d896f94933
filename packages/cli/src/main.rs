#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Console front end for the disaster map.
//!
//! ```text
//! disaster_map watch [--type flood] [--min-severity 3] [--max-age-days 7]
//! disaster_map list [--html]
//! disaster_map details <id>
//! disaster_map report --title ... --type flood --lat 29.7 --lng -95.3
//! disaster_map subscribe <id> --email a@example.org --method email
//! ```
//!
//! Running with no subcommand enters interactive mode. The backend URL
//! comes from `--api-url`, then `DISASTER_MAP_API_URL`, then
//! `http://127.0.0.1:5000`.

mod commands;
mod console;
mod interactive;
mod settings;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use disaster_map_client::models::{AlertMethod, ReportSubmission, SubscriptionRequest};
use disaster_map_disaster_models::{DisasterSeverity, DisasterType, RecordId};
use disaster_map_sync::MapTheme;

use crate::commands::FilterArgs;
use crate::settings::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "disaster_map", about = "Live disaster map in the terminal")]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Seconds between background refreshes
    #[arg(long, global = true)]
    refresh_secs: Option<u64>,

    /// TOML file replacing the built-in map settings
    #[arg(long, global = true)]
    map_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Default)]
struct FilterFlags {
    /// Disaster type, or "all"
    #[arg(long = "type")]
    disaster_type: Option<String>,
    /// Minimum severity (1 disables the floor)
    #[arg(long)]
    min_severity: Option<String>,
    /// Only disasters since the start of the day this many days ago (0 disables)
    #[arg(long)]
    max_age_days: Option<String>,
}

impl From<FilterFlags> for FilterArgs {
    fn from(flags: FilterFlags) -> Self {
        Self {
            disaster_type: flags.disaster_type,
            min_severity: flags.min_severity,
            max_age_days: flags.max_age_days,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Keep the map, table, and statistics refreshed until Ctrl-C
    Watch {
        #[command(flatten)]
        filters: FilterFlags,
        /// Tile theme (light or dark)
        #[arg(long, default_value = "light")]
        theme: MapTheme,
    },
    /// Fetch once and print the table and statistics
    List {
        #[command(flatten)]
        filters: FilterFlags,
        /// Print the table as HTML rows
        #[arg(long)]
        html: bool,
    },
    /// Show the details of one displayed disaster
    Details {
        /// Disaster id
        id: String,
        #[command(flatten)]
        filters: FilterFlags,
    },
    /// Report a disaster
    Report {
        /// Headline
        #[arg(long)]
        title: String,
        /// Disaster type
        #[arg(long = "type")]
        disaster_type: DisasterType,
        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Severity 1-5
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        severity: Option<u8>,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Place name
        #[arg(long)]
        location: Option<String>,
    },
    /// Subscribe to alerts for a disaster
    Subscribe {
        /// Disaster id
        id: String,
        /// Email address
        #[arg(long)]
        email: Option<String>,
        /// Phone number for SMS
        #[arg(long)]
        phone: Option<String>,
        /// Alert method (email, sms, web); repeatable
        #[arg(long = "method", required = true)]
        methods: Vec<AlertMethod>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = console::init_logger();
    let cli = Cli::parse();

    let settings = Settings::resolve(Overrides {
        api_url: cli.api_url,
        refresh_secs: cli.refresh_secs,
        map_config: cli.map_config,
    })?;
    log::debug!("Backend: {}", settings.api_url);

    let Some(command) = cli.command else {
        return interactive::run(&settings, &multi).await;
    };

    match command {
        Commands::Watch { filters, theme } => {
            commands::watch(&settings, &multi, filters.into(), theme).await?;
        }
        Commands::List { filters, html } => {
            commands::list(&settings, &multi, filters.into(), html).await?;
        }
        Commands::Details { id, filters } => {
            commands::details(&settings, &multi, filters.into(), &id).await?;
        }
        Commands::Report {
            title,
            disaster_type,
            lat,
            lng,
            severity,
            description,
            location,
        } => {
            let report = ReportSubmission {
                title,
                description,
                disaster_type,
                latitude: lat,
                longitude: lng,
                severity: severity.map(DisasterSeverity::from_value).transpose()?,
                location,
            };
            if !commands::report(&settings, &multi, &report).await {
                std::process::exit(1);
            }
        }
        Commands::Subscribe {
            id,
            email,
            phone,
            methods,
        } => {
            let request = SubscriptionRequest {
                disaster_id: RecordId(id),
                email,
                phone,
                alert_methods: methods,
            };
            if !commands::subscribe(&settings, &multi, &request).await {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
