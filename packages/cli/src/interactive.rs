//! Menu-driven mode used when no subcommand is given.

use dialoguer::{Input, MultiSelect, Select};
use disaster_map_client::models::{AlertMethod, ReportSubmission, SubscriptionRequest};
use disaster_map_disaster_models::{DisasterSeverity, DisasterType, RecordId};
use disaster_map_sync::MapTheme;
use indicatif::MultiProgress;

use crate::commands::{self, FilterArgs};
use crate::settings::Settings;

/// Top-level actions.
enum Action {
    Watch,
    List,
    Details,
    Report,
    Subscribe,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Watch,
        Self::List,
        Self::Details,
        Self::Report,
        Self::Subscribe,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Watch => "Watch the live map",
            Self::List => "List current disasters",
            Self::Details => "Show disaster details",
            Self::Report => "Report a disaster",
            Self::Subscribe => "Subscribe to alerts",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt or the chosen action fails.
pub async fn run(
    settings: &Settings,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Disaster Map");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Watch => {
            let filters = prompt_filters()?;
            let theme = prompt_theme()?;
            commands::watch(settings, multi, filters, theme).await?;
        }
        Action::List => {
            let filters = prompt_filters()?;
            commands::list(settings, multi, filters, false).await?;
        }
        Action::Details => {
            let id: String = Input::new().with_prompt("Disaster id").interact_text()?;
            commands::details(settings, multi, FilterArgs::default(), &id).await?;
        }
        Action::Report => {
            let report = prompt_report()?;
            commands::report(settings, multi, &report).await;
        }
        Action::Subscribe => {
            let request = prompt_subscription()?;
            commands::subscribe(settings, multi, &request).await;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

fn prompt_filters() -> Result<FilterArgs, dialoguer::Error> {
    let mut types = vec!["all".to_string()];
    types.extend(DisasterType::all().iter().map(ToString::to_string));
    let type_idx = Select::new()
        .with_prompt("Disaster type")
        .items(&types)
        .default(0)
        .interact()?;

    let min_severity: String = Input::new()
        .with_prompt("Minimum severity (1-5)")
        .default("1".to_string())
        .interact_text()?;
    let max_age_days: String = Input::new()
        .with_prompt("Max age in days (0 for any)")
        .default("7".to_string())
        .interact_text()?;

    Ok(FilterArgs {
        disaster_type: Some(types[type_idx].clone()),
        min_severity: Some(min_severity),
        max_age_days: Some(max_age_days),
    })
}

fn prompt_theme() -> Result<MapTheme, dialoguer::Error> {
    let themes = [MapTheme::Light, MapTheme::Dark];
    let idx = Select::new()
        .with_prompt("Map theme")
        .items(&themes)
        .default(0)
        .interact()?;
    Ok(themes[idx])
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn prompt_report() -> Result<ReportSubmission, Box<dyn std::error::Error>> {
    let title: String = Input::new().with_prompt("Title").interact_text()?;

    let types = DisasterType::all();
    let type_idx = Select::new()
        .with_prompt("Type")
        .items(types)
        .default(0)
        .interact()?;

    let latitude: f64 = Input::new()
        .with_prompt("Latitude")
        .validate_with(|v: &f64| {
            if (-90.0..=90.0).contains(v) {
                Ok(())
            } else {
                Err("latitude must be between -90 and 90")
            }
        })
        .interact_text()?;
    let longitude: f64 = Input::new()
        .with_prompt("Longitude")
        .validate_with(|v: &f64| {
            if (-180.0..=180.0).contains(v) {
                Ok(())
            } else {
                Err("longitude must be between -180 and 180")
            }
        })
        .interact_text()?;

    let severity: u8 = Input::new()
        .with_prompt("Severity (1-5)")
        .default(3)
        .validate_with(|v: &u8| {
            if (1..=5).contains(v) {
                Ok(())
            } else {
                Err("severity must be between 1 and 5")
            }
        })
        .interact_text()?;

    let description: String = Input::new()
        .with_prompt("Description")
        .allow_empty(true)
        .interact_text()?;
    let location: String = Input::new()
        .with_prompt("Location")
        .allow_empty(true)
        .interact_text()?;

    Ok(ReportSubmission {
        title,
        description: optional(description),
        disaster_type: types[type_idx],
        latitude,
        longitude,
        severity: Some(DisasterSeverity::from_value(severity)?),
        location: optional(location),
    })
}

fn prompt_subscription() -> Result<SubscriptionRequest, dialoguer::Error> {
    let id: String = Input::new().with_prompt("Disaster id").interact_text()?;

    let methods = [AlertMethod::Email, AlertMethod::Sms, AlertMethod::Web];
    let chosen = MultiSelect::new()
        .with_prompt("Alert methods (space to toggle)")
        .items(&methods)
        .defaults(&[true, false, false])
        .interact()?;
    let alert_methods: Vec<AlertMethod> = chosen.into_iter().map(|i| methods[i]).collect();

    let email = if alert_methods.contains(&AlertMethod::Email) {
        let email: String = Input::new().with_prompt("Email").interact_text()?;
        optional(email)
    } else {
        None
    };
    let phone = if alert_methods.contains(&AlertMethod::Sms) {
        let phone: String = Input::new().with_prompt("Phone").interact_text()?;
        optional(phone)
    } else {
        None
    };

    Ok(SubscriptionRequest {
        disaster_id: RecordId(id.trim().to_string()),
        email,
        phone,
        alert_methods,
    })
}
