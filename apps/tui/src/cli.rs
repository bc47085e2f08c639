use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use color_eyre::eyre::{eyre, Result};

use crate::config::SourceKind;
use crate::domain::{CategorySelection, DateRange, FilterState, ReportSelection};

#[derive(Debug, Parser)]
#[command(name = "radar-hidrico", version, about = "Radar de Riesgo Hídrico dashboard")]
pub struct CliArgs {
    /// Print the filtered points and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Where points come from
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Base URL of the monitoring API
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Seed fixture to load instead of the bundled one
    #[arg(long = "seed-file", value_name = "PATH")]
    pub seed_file: Option<String>,

    /// Map preset: full, basic or hackathon
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Center latitude
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Center longitude
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Search radius in km, from 1 to 100
    #[arg(long)]
    pub radius: Option<f64>,

    /// Do not restrict points to the radius
    #[arg(long = "no-radius")]
    pub no_radius: bool,

    /// Category: all, oefa, educacion, salud or poblacion
    #[arg(long)]
    pub category: Option<String>,

    /// Inspection report id
    #[arg(long)]
    pub report: Option<String>,

    /// Start of the sampling date range (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// End of the sampling date range (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Location text to match
    #[arg(long)]
    pub location: Option<String>,

    /// Generate the report for the filtered view (headless only)
    #[arg(long = "generate-report")]
    pub generate_report: bool,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(source) = self.source {
            let value = match source {
                SourceKind::Seed => "seed",
                SourceKind::Api => "api",
            };
            std::env::set_var("RADAR_SOURCE", value);
        }
        if let Some(url) = &self.api_url {
            std::env::set_var("RADAR_API_URL", url);
        }
        if let Some(path) = &self.seed_file {
            std::env::set_var("RADAR_SEED_FILE", path);
        }
        if let Some(preset) = &self.preset {
            std::env::set_var("RADAR_MAP_PRESET", preset);
        }
        if let Some(lat) = self.lat {
            std::env::set_var("RADAR_CENTER_LAT", lat.to_string());
        }
        if let Some(lng) = self.lng {
            std::env::set_var("RADAR_CENTER_LNG", lng.to_string());
        }
        if let Some(radius) = self.radius {
            std::env::set_var("RADAR_RADIUS_KM", radius.to_string());
        }
    }

    /// Applies the filter flags on top of the configured starting state.
    pub fn apply_filters(&self, state: &mut FilterState) -> Result<()> {
        if self.no_radius {
            state.radius_enabled = false;
        }
        if let Some(category) = &self.category {
            state.category = CategorySelection::parse(category).map_err(|e| eyre!("{e}"))?;
        }
        if let Some(report) = &self.report {
            state.report = ReportSelection::parse(report);
        }
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => {
                return Err(eyre!("--from {from} is after --to {to}"));
            }
            (Some(_), Some(_)) => state.date_range = DateRange::new(self.from, self.to),
            (Some(_), None) => {
                return Err(eyre!("--from needs --to; the date filter uses both bounds"));
            }
            (None, Some(_)) => {
                return Err(eyre!("--to needs --from; the date filter uses both bounds"));
            }
            (None, None) => {}
        }
        if let Some(location) = &self.location {
            *state = state.clone().with_location(Some(location));
        }
        Ok(())
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    #[test]
    fn filter_flags_shape_the_state() {
        let args = CliArgs::parse_from([
            "radar-hidrico",
            "--lat",
            "-11.5",
            "--category",
            "salud",
            "--report",
            "2BAE47A5CEC153E01BB8B857C88F5EA492259423",
            "--from",
            "2018-02-15",
            "--to",
            "2018-02-25",
            "--location",
            "Lima",
            "--no-radius",
        ]);
        assert_eq!(args.lat, Some(-11.5));

        let mut state = FilterState::default();
        args.apply_filters(&mut state).unwrap();
        assert_eq!(state.category, CategorySelection::Only(Category::Health));
        assert!(!state.radius_enabled);
        assert!(state.date_range.bounds().is_some());
        assert_eq!(state.location.as_deref(), Some("Lima"));
        assert_eq!(
            state.report.as_option(),
            Some("2BAE47A5CEC153E01BB8B857C88F5EA492259423")
        );
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let args = CliArgs::parse_from(["radar-hidrico", "--from", "2018-03-01", "--to", "2018-02-01"]);
        assert!(args.apply_filters(&mut FilterState::default()).is_err());
    }

    #[test]
    fn half_open_date_ranges_are_rejected() {
        let args = CliArgs::parse_from(["radar-hidrico", "--from", "2018-02-15"]);
        let mut state = FilterState::default();
        let err = args.apply_filters(&mut state).unwrap_err();
        assert!(err.to_string().contains("--from needs --to"));
        assert_eq!(state.date_range, DateRange::default());

        let args = CliArgs::parse_from(["radar-hidrico", "--to", "2018-02-25"]);
        let err = args.apply_filters(&mut FilterState::default()).unwrap_err();
        assert!(err.to_string().contains("--to needs --from"));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let args = CliArgs::parse_from(["radar-hidrico", "--category", "rivers"]);
        assert!(args.apply_filters(&mut FilterState::default()).is_err());
    }

    #[test]
    fn help_mentions_headless() {
        assert!(CliArgs::help_text().contains("--headless"));
    }
}
