use color_eyre::eyre::{eyre, Result};
use dotenv::dotenv;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::domain::{FilterState, DEFAULT_CENTER, DEFAULT_RADIUS_KM, MAX_RADIUS_KM, MIN_RADIUS_KM};
use crate::geo::Coordinate;
use crate::map::{MapConfig, DEFAULT_BATCH_SIZE};
use crate::report::DEFAULT_REPORT_DELAY;
use crate::source::DEFAULT_LIMIT;

pub const DEFAULT_LOG_FILE: &str = "radar-hidrico.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    /// Bundled fixture data
    Seed,
    /// Monitoring HTTP API
    Api,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seed" => Ok(Self::Seed),
            "api" => Ok(Self::Api),
            other => Err(format!("expected 'seed' or 'api', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceKind,
    pub api_url: String,
    pub seed_file: Option<PathBuf>,
    pub center: Coordinate,
    pub radius_km: f64,
    pub point_limit: usize,
    pub map: MapConfig,
    pub report_delay: Duration,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Seed,
            api_url: DEFAULT_BASE_URL.to_string(),
            seed_file: None,
            center: DEFAULT_CENTER,
            radius_km: DEFAULT_RADIUS_KM,
            point_limit: DEFAULT_LIMIT,
            map: MapConfig::default(),
            report_delay: DEFAULT_REPORT_DELAY,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Reads `key`, falling back to `default` when unset or blank.
/// A value that is present but does not parse is an error.
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key).map(|raw| raw.trim().to_string()) {
        Some(raw) if !raw.is_empty() => raw
            .parse()
            .map_err(|e| eyre!("Invalid value for {key}: '{raw}' ({e})")),
        _ => Ok(default),
    }
}

impl AppConfig {
    /// Loads `.env` and reads the `RADAR_*` variables.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let center = Coordinate::new(
            parse_var(&lookup, "RADAR_CENTER_LAT", defaults.center.lat)?,
            parse_var(&lookup, "RADAR_CENTER_LNG", defaults.center.lng)?,
        );
        if !center.is_valid() {
            return Err(eyre!("Center {center} is outside the WGS84 range"));
        }

        let radius_km: f64 = parse_var(&lookup, "RADAR_RADIUS_KM", defaults.radius_km)?;
        if !(MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&radius_km) {
            return Err(eyre!(
                "RADAR_RADIUS_KM {radius_km} is not between {MIN_RADIUS_KM} and {MAX_RADIUS_KM} km"
            ));
        }

        let map = match lookup("RADAR_MAP_PRESET") {
            Some(name) if !name.trim().is_empty() => MapConfig::preset(&name)
                .ok_or_else(|| eyre!("Unknown map preset '{name}' (expected full, basic or hackathon)"))?,
            _ => defaults.map,
        };
        let batch_size: usize = parse_var(&lookup, "RADAR_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;

        let delay_ms: u64 = parse_var(
            &lookup,
            "RADAR_REPORT_DELAY_MS",
            u64::try_from(defaults.report_delay.as_millis()).unwrap_or(u64::MAX),
        )?;

        Ok(Self {
            source: parse_var(&lookup, "RADAR_SOURCE", defaults.source)?,
            api_url: lookup("RADAR_API_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.api_url),
            seed_file: lookup("RADAR_SEED_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            center,
            radius_km,
            point_limit: parse_var(&lookup, "RADAR_POINT_LIMIT", defaults.point_limit)?,
            map: map.with_batch_size(batch_size),
            report_delay: Duration::from_millis(delay_ms),
            log_file: lookup("RADAR_LOG_FILE")
                .filter(|path| !path.trim().is_empty())
                .map_or(defaults.log_file, PathBuf::from),
        })
    }

    /// Filter state the dashboard starts from.
    pub fn initial_filters(&self) -> FilterState {
        FilterState::new(self.center, self.radius_km)
    }
}
