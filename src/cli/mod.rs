//! Command line front end
//!
//! `waste-lens detect <IMAGE>` runs one image through the whole pipeline
//! (pick -> encode -> detect -> normalize) and prints the result;
//! `waste-lens health` probes the inference service.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use crate::app::{DetectionScreen, ScreenOutcome};
use crate::config::AppConfig;
use crate::domain::models::{DetectionResult, GeoPoint};
use crate::infrastructure::acquisition::{FileLibrary, ImageAcquisition};
use crate::infrastructure::api::{
    BackendClient, DetectionClient, FileTokenStore, HealthStatus, StaticTokenStore, TokenStore,
};

#[derive(Parser)]
#[command(name = "waste-lens")]
#[command(about = "Classify waste photos with the remote detection service")]
pub struct Cli {
    /// Backend base URL (overrides WASTE_LENS_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify an image file
    Detect {
        /// Path to a JPEG, PNG or WebP image
        image: PathBuf,
        /// Detection timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Print the normalized result as JSON
        #[arg(long)]
        json: bool,
        /// Store a successful detection in the backend
        #[arg(long)]
        save: bool,
        /// Latitude for the saved detection
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude for the saved detection
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Bin id for the saved detection
        #[arg(long)]
        tacho: Option<i64>,
    },
    /// Check that the inference service is up
    Health,
}

pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Detect {
            image,
            timeout,
            json,
            save,
            lat,
            lon,
            tacho,
        } => {
            let config = apply_flags(config, cli.api_url, timeout);
            let location = lat.zip(lon).map(|(lat, lon)| GeoPoint { lat, lon });
            handle_detect(&config, image, json, save.then_some((location, tacho))).await
        }
        Commands::Health => handle_health(&apply_flags(config, cli.api_url, None)).await,
    }
}

/// Command line flags take precedence over the environment
pub fn apply_flags(mut config: AppConfig, api_url: Option<String>, timeout: Option<u64>) -> AppConfig {
    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
        config = config.with_api_base_url(url);
    }
    if let Some(secs) = timeout.filter(|s| *s > 0) {
        config = config.with_detect_timeout(Duration::from_secs(secs));
    }
    config
}

async fn handle_detect(
    config: &AppConfig,
    image: PathBuf,
    json: bool,
    save: Option<(Option<GeoPoint>, Option<i64>)>,
) -> anyhow::Result<()> {
    let client = DetectionClient::new(config).context("building HTTP client")?;
    let acquisition = ImageAcquisition::new().with_library(Arc::new(FileLibrary::new(image)));
    let mut screen = DetectionScreen::new(acquisition, Arc::new(client));

    match screen.pick_from_library().await {
        ScreenOutcome::Updated => {}
        ScreenOutcome::Alert(alert) => bail!("{}: {}", alert.title, alert.message),
        ScreenOutcome::Unchanged => bail!("no image selected"),
    }

    match screen.submit().await {
        ScreenOutcome::Updated => {}
        ScreenOutcome::Alert(alert) => bail!("{}: {}", alert.title, alert.message),
        ScreenOutcome::Unchanged => bail!("detection result was discarded"),
    }

    let Some(result) = screen.state().result().cloned() else {
        bail!("no detection result");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_result(&result));
    }

    if let Some((location, tacho)) = save {
        let Some(accepted) = screen.accept() else {
            bail!("only a successful detection can be saved");
        };
        let backend = BackendClient::new(config, token_store(config))?;
        let created = backend
            .create_detection(&accepted.into_record(location, tacho))
            .await
            .context("saving detection")?;
        match created.get("id") {
            Some(id) => println!("Detección guardada (id {})", id),
            None => println!("Detección guardada"),
        }
    }

    Ok(())
}

async fn handle_health(config: &AppConfig) -> anyhow::Result<()> {
    let client = DetectionClient::new(config)?;
    let health = client
        .health()
        .await
        .with_context(|| format!("probing {}", config.health_url()))?;
    print!("{}", render_health(&health));
    Ok(())
}

fn token_store(config: &AppConfig) -> Arc<dyn TokenStore> {
    match &config.token_file {
        Some(path) => Arc::new(FileTokenStore::new(path)),
        None => Arc::new(StaticTokenStore::default()),
    }
}

/// Human readable rendering of a normalized result
pub fn render_result(result: &DetectionResult) -> String {
    let mut out = String::new();
    match result {
        DetectionResult::Success { category_info, .. } => {
            let confidence = result.display_confidence().unwrap_or_default();
            let _ = writeln!(out, "{} {} ({}%)", category_info.icon, category_info.label, confidence);
            if !category_info.description.is_empty() {
                let _ = writeln!(out, "{}", category_info.description);
            }
            for prediction in result.top_display_predictions() {
                let info = prediction.display_info();
                let _ = writeln!(
                    out,
                    "  - {}: {}%",
                    info.label,
                    prediction.display_confidence()
                );
            }
        }
        DetectionResult::NoDetection { message, suggestions }
        | DetectionResult::Failure {
            message,
            suggestions,
        } => {
            let _ = writeln!(out, "{}", message);
            for suggestion in suggestions {
                let _ = writeln!(out, "  * {}", suggestion);
            }
        }
    }
    out
}

pub fn render_health(health: &HealthStatus) -> String {
    format!(
        "status: {}\nservice: {}\nroboflow: {}\n",
        health.status.as_deref().unwrap_or("unknown"),
        health.service.as_deref().unwrap_or("unknown"),
        if health.roboflow_available {
            "available"
        } else {
            "unavailable"
        }
    )
}
