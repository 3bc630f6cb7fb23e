use std::{path::PathBuf, time::Duration};

use chrono_tz::Tz;
use clap::Args;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/leadbook.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub timezone: String,
    pub timeout_secs: u64,
    pub session_path: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            timeout_secs: 30,
            session_path: PathBuf::from("config/session.json"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reporting time zone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| AppError::InvalidConfig(format!("timezone: {err}")))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Flags shared by every subcommand.
#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://localhost:8080/api).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override reporting timezone (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
    /// Override request timeout, in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
    /// Override where the session is kept between runs.
    #[arg(long, global = true)]
    pub session_path: Option<PathBuf>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// Layer the config file, `LEADBOOK_*` variables and command line flags.
pub fn load(args: &ConfigArgs) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("LEADBOOK"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(timezone) = &args.timezone {
        settings.timezone = timezone.clone();
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.timeout_secs = timeout_secs;
    }
    if let Some(session_path) = &args.session_path {
        settings.session_path = session_path.clone();
    }
    if let Some(log_level) = &args.log_level {
        settings.log_level = log_level.clone();
    }

    settings.tz()?;
    Ok(settings)
}
