use crate::config::toml_config::TomlConfig;
use crate::domain::model::{Location, ServiceTier};
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use chrono::NaiveDateTime;
use clap::Parser;

/// Accepts the `datetime-local` form (`2026-10-16T14:30`) with optional seconds.
pub fn parse_pickup_time(value: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| format!("expected YYYY-MM-DDTHH:MM, got '{}'", value))
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ride-quote")]
#[command(about = "Price a ride between two locations")]
pub struct CliConfig {
    /// Pickup location: "lat,lon" or a street address
    #[arg(long)]
    pub pickup: Location,

    /// Drop-off location: "lat,lon" or a street address
    #[arg(long)]
    pub dropoff: Location,

    /// Service tier: taxi, wheelchair or stretcher
    #[arg(long, default_value = "taxi")]
    pub tier: ServiceTier,

    /// Requested pickup time, e.g. 2026-10-16T14:30
    #[arg(long, value_parser = parse_pickup_time)]
    pub pickup_at: Option<NaiveDateTime>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub routing_endpoint: Option<String>,

    #[arg(long)]
    pub geocoding_endpoint: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Show an estimate for every service tier")]
    pub all_tiers: bool,

    #[arg(long, help = "Show payment instructions for the quote")]
    pub pay: bool,

    #[arg(long, help = "Print results as JSON")]
    pub json: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 載入設定檔（若有）並套用命令列覆蓋
    pub fn load_settings(&self) -> Result<TomlConfig> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(endpoint) = &self.routing_endpoint {
            settings.routing.endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.geocoding_endpoint {
            settings.geocoding.endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.routing.timeout_seconds = timeout;
            settings.geocoding.timeout_seconds = timeout;
        }

        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.routing_endpoint {
            validate_url("--routing-endpoint", endpoint)?;
        }
        if let Some(endpoint) = &self.geocoding_endpoint {
            validate_url("--geocoding-endpoint", endpoint)?;
        }
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("--timeout-seconds", timeout, 1)?;
        }
        Ok(())
    }
}
