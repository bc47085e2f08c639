//! Bundled demonstration data served through the same interface as the API.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::api::{ApiError, Result};
use crate::domain::{parse_sample_date, Category, MonitoringPoint};
use crate::geo::Coordinate;
use crate::source::{
    FilterOptions, PageEntry, PointDetail, PointQuery, PointSource, PointsPage, SourceStats,
};
use crate::utm::{utm_to_wgs84, Hemisphere};

const BUNDLED_SEED: &str = include_str!("../fixtures/seed_points.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed seed data: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    points: Vec<SeedRow>,
}

#[derive(Debug, Deserialize)]
struct SeedRow {
    id: String,
    category: String,
    name: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    este: Option<f64>,
    norte: Option<f64>,
    zona: Option<u8>,
    hemisferio: Option<String>,
    report_id: Option<String>,
    parameter: Option<String>,
    sample_date: Option<String>,
    location: Option<String>,
    #[serde(default)]
    details: BTreeMap<String, String>,
}

impl SeedRow {
    fn coordinate(&self) -> Option<Coordinate> {
        if let (Some(lat), Some(lng)) = (self.latitude, self.longitude) {
            return Some(Coordinate::new(lat, lng));
        }
        let (easting, northing, zone) = (self.este?, self.norte?, self.zona?);
        // Peruvian sampling sheets are all south of the equator.
        let hemisphere = match self.hemisferio.as_deref() {
            Some(raw) => Hemisphere::parse(raw).ok()?,
            None => Hemisphere::South,
        };
        utm_to_wgs84(easting, northing, zone, hemisphere).ok()
    }

    fn into_point(self) -> Option<MonitoringPoint> {
        let Some(category) = Category::parse(&self.category) else {
            tracing::warn!(id = %self.id, category = %self.category, "dropping seed row with unknown category");
            return None;
        };
        let Some(coordinate) = self.coordinate() else {
            tracing::warn!(id = %self.id, "dropping seed row without usable coordinates");
            return None;
        };

        let point = match MonitoringPoint::new(&self.id, category, coordinate, &self.name) {
            Ok(point) => point,
            Err(e) => {
                tracing::warn!(id = %self.id, "dropping seed row: {e}");
                return None;
            }
        };

        let mut point = point.with_sample(
            self.report_id.as_deref(),
            self.parameter.as_deref(),
            self.sample_date.as_deref().and_then(parse_sample_date),
        );
        if let Some(location) = self.location.as_deref() {
            point = point.with_location(location);
        }
        point.details = self.details;
        Some(point)
    }
}

#[derive(Debug, Clone)]
pub struct SeedSource {
    points: Vec<MonitoringPoint>,
    loaded_at: DateTime<Utc>,
}

impl SeedSource {
    pub fn bundled() -> std::result::Result<Self, SeedError> {
        Self::from_json(BUNDLED_SEED)
    }

    pub fn from_path(path: &Path) -> std::result::Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> std::result::Result<Self, SeedError> {
        let file: SeedFile = serde_json::from_str(raw)?;
        let rows = file.points.len();
        let points: Vec<MonitoringPoint> =
            file.points.into_iter().filter_map(SeedRow::into_point).collect();
        if points.len() < rows {
            tracing::warn!(dropped = rows - points.len(), "seed rows dropped");
        }
        Ok(Self::from_points(points))
    }

    pub fn from_points(points: Vec<MonitoringPoint>) -> Self {
        Self {
            points,
            loaded_at: Utc::now(),
        }
    }

    pub fn points(&self) -> &[MonitoringPoint] {
        &self.points
    }

    /// Answers a points query the way the monitoring backend does: per
    /// category, nearest first, within the radius, capped at an equal share
    /// of the limit.
    pub fn query(&self, query: &PointQuery) -> PointsPage {
        let per_type = query.per_type_limit();
        let location = query.location.as_deref().map(str::to_lowercase);
        let mut page = PointsPage::default();

        for category in &query.categories {
            let mut ranked: Vec<(f64, &MonitoringPoint)> = self
                .points
                .iter()
                .filter(|p| p.category == *category)
                .filter(|p| {
                    location.as_deref().is_none_or(|needle| {
                        p.location
                            .as_deref()
                            .is_some_and(|l| l.to_lowercase().contains(needle))
                    })
                })
                .map(|p| (p.distance_from(&query.center), p))
                .filter(|(distance, _)| *distance <= query.radius_km)
                .collect();
            ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
            ranked.truncate(per_type);

            page.counts.insert(*category, ranked.len());
            page.entries
                .extend(ranked.into_iter().map(|(distance, point)| PageEntry {
                    point: point.clone(),
                    distance_km: Some((distance * 100.0).round() / 100.0),
                }));
        }

        page.total = page.entries.len();
        page
    }

    pub fn stats(&self) -> SourceStats {
        let mut counts: BTreeMap<Category, u64> =
            Category::ALL.iter().map(|c| (*c, 0)).collect();
        for point in &self.points {
            *counts.entry(point.category).or_insert(0) += 1;
        }
        SourceStats {
            counts,
            last_update: Some(self.loaded_at.to_rfc3339()),
        }
    }

    pub fn detail(&self, category: Category, id: &str) -> Result<PointDetail> {
        let point = self
            .points
            .iter()
            .find(|p| p.category == category && p.matches_report(id))
            .ok_or_else(|| ApiError::NotFound {
                category,
                id: id.to_string(),
            })?;

        let mut fields = point.details.clone();
        if let Some(report) = &point.report_id {
            fields.entry("id_informe".to_string()).or_insert_with(|| report.clone());
        }
        if let Some(location) = &point.location {
            fields.entry("ubicacion".to_string()).or_insert_with(|| location.clone());
        }

        Ok(PointDetail {
            id: point.id.clone(),
            category,
            name: point.name.clone(),
            coordinate: point.coordinate(),
            fields,
        })
    }

    /// Distinct departments (the part of the location before the comma).
    pub fn filter_options(&self) -> FilterOptions {
        let locations: BTreeSet<String> = self
            .points
            .iter()
            .filter_map(|p| p.location.as_deref())
            .filter_map(|l| l.split(',').next())
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        FilterOptions {
            locations: locations.into_iter().collect(),
            categories: Category::ALL.to_vec(),
            total_records: self.points.len() as u64,
        }
    }
}

#[async_trait]
impl PointSource for SeedSource {
    fn name(&self) -> &'static str {
        "seed"
    }

    async fn fetch_points(&self, query: &PointQuery) -> Result<PointsPage> {
        Ok(self.query(query))
    }

    async fn fetch_stats(&self) -> Result<SourceStats> {
        Ok(self.stats())
    }

    async fn fetch_detail(&self, category: Category, id: &str) -> Result<PointDetail> {
        self.detail(category, id)
    }

    async fn fetch_filter_options(&self) -> Result<FilterOptions> {
        Ok(self.filter_options())
    }
}
