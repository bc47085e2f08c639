//! Where monitoring points come from: the HTTP API or the bundled seed data.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::eyre::WrapErr;
use serde::Serialize;

use crate::api::{ApiClient, Result};
use crate::config::{AppConfig, SourceKind};
use crate::domain::{Category, FilterState, MonitoringPoint};
use crate::geo::{Coordinate, WORLD_RADIUS_KM};
use crate::seed::SeedSource;

pub const DEFAULT_LIMIT: usize = 200;

/// Parameters of a points query, mirroring `/api/mapa/puntos`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointQuery {
    pub center: Coordinate,
    pub radius_km: f64,
    pub categories: Vec<Category>,
    pub limit: usize,
    pub location: Option<String>,
}

impl PointQuery {
    pub fn new(center: Coordinate, radius_km: f64) -> Self {
        Self {
            center,
            radius_km,
            categories: Category::ALL.to_vec(),
            limit: DEFAULT_LIMIT,
            location: None,
        }
    }

    /// Candidate set for the dashboard: every category around the current
    /// center, with radius and location left to the local filter pipeline.
    pub fn candidates(state: &FilterState, limit: usize) -> Self {
        Self::new(state.center, WORLD_RADIUS_KM).with_limit(limit)
    }

    #[must_use]
    pub fn with_categories(mut self, categories: &[Category]) -> Self {
        self.categories = categories.to_vec();
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<&str>) -> Self {
        self.location = location.map(str::trim).filter(|l| !l.is_empty()).map(String::from);
        self
    }

    /// The limit is split evenly between the requested categories.
    pub fn per_type_limit(&self) -> usize {
        if self.categories.is_empty() {
            0
        } else {
            self.limit / self.categories.len()
        }
    }

    pub fn types_param(&self) -> String {
        self.categories
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageEntry {
    pub point: MonitoringPoint,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointsPage {
    pub entries: Vec<PageEntry>,
    pub total: usize,
    pub counts: BTreeMap<Category, usize>,
}

impl PointsPage {
    pub fn into_points(self) -> Vec<MonitoringPoint> {
        self.entries.into_iter().map(|entry| entry.point).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub counts: BTreeMap<Category, u64>,
    pub last_update: Option<String>,
}

impl SourceStats {
    pub fn count(&self, category: Category) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointDetail {
    pub id: String,
    pub category: Category,
    pub name: String,
    pub coordinate: Coordinate,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub locations: Vec<String>,
    pub categories: Vec<Category>,
    pub total_records: u64,
}

#[async_trait]
pub trait PointSource: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    async fn fetch_points(&self, query: &PointQuery) -> Result<PointsPage>;

    async fn fetch_stats(&self) -> Result<SourceStats>;

    async fn fetch_detail(&self, category: Category, id: &str) -> Result<PointDetail>;

    async fn fetch_filter_options(&self) -> Result<FilterOptions>;
}

pub fn build_source(config: &AppConfig) -> color_eyre::Result<Arc<dyn PointSource>> {
    match config.source {
        SourceKind::Seed => {
            let seed = match &config.seed_file {
                Some(path) => SeedSource::from_path(path)
                    .wrap_err_with(|| format!("Failed to load seed file {}", path.display()))?,
                None => SeedSource::bundled().wrap_err("Failed to load bundled seed data")?,
            };
            tracing::info!(points = seed.points().len(), "using seed data source");
            Ok(Arc::new(seed))
        }
        SourceKind::Api => {
            tracing::info!(url = %config.api_url, "using monitoring API source");
            Ok(Arc::new(ApiClient::new(&config.api_url)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_CENTER;

    #[test]
    fn per_type_limit_splits_the_limit() {
        let query = PointQuery::new(DEFAULT_CENTER, 20.0);
        assert_eq!(query.per_type_limit(), 50);
        let two = query.clone().with_categories(&[Category::Health, Category::Education]);
        assert_eq!(two.per_type_limit(), 100);
        assert_eq!(query.with_categories(&[]).per_type_limit(), 0);
    }

    #[test]
    fn types_param_uses_wire_names() {
        let query = PointQuery::new(DEFAULT_CENTER, 20.0);
        assert_eq!(query.types_param(), "oefa,educacion,salud,poblacion");
    }

    #[test]
    fn blank_location_is_dropped() {
        let query = PointQuery::new(DEFAULT_CENTER, 20.0).with_location(Some("   "));
        assert_eq!(query.location, None);
    }

    #[test]
    fn candidate_query_covers_the_globe() {
        let query = PointQuery::candidates(&FilterState::default(), 200);
        assert!(query.radius_km > 20_000.0);
        assert_eq!(query.categories.len(), 4);
    }
}
