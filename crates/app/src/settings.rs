//! Handles settings for the application.
//!
//! Values are read from `settings.toml` (optional, path overridable with
//! `--config`) and then from `POCKETBOOK__<SECTION>__<KEY>` environment
//! variables, e.g. `POCKETBOOK__AUTH__SECRET`.
//!
//! See `settings.example.toml` for every key.
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";
const ENV_PREFIX: &str = "POCKETBOOK";

#[derive(Debug, Parser)]
#[command(name = "pocketbook", about = "Personal finance backend")]
struct Args {
    /// Optional config file path (TOML), without or with extension.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub secret: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

fn default_token_ttl_minutes() -> i64 {
    engine::DEFAULT_TOKEN_TTL_MINUTES
}

/// Where categories come from. The built-in set is used when neither is given.
#[derive(Debug, Default, Deserialize)]
pub struct Categories {
    pub path: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Alerts {
    pub recipient: String,
    /// Alerts are only logged when unset.
    pub webhook_url: Option<String>,
    /// Longest wait for one delivery, in seconds.
    pub timeout_secs: u64,
}

impl Default for Alerts {
    fn default() -> Self {
        Self {
            recipient: engine::DEFAULT_ALERT_RECIPIENT.to_string(),
            webhook_url: None,
            timeout_secs: engine::DEFAULT_ALERT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Budget {
    /// End months on their real last day instead of day 31.
    pub calendar_month_bounds: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    pub auth: Auth,
    #[serde(default)]
    pub categories: Categories,
    #[serde(default)]
    pub alerts: Alerts,
    #[serde(default)]
    pub budget: Budget,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        let settings = Config::builder()
            .add_source(File::with_name(path).required(args.config.is_some()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
