use crate::domain::{Category, MonitoringPoint};
use crate::source::{FilterOptions, PointDetail, PointQuery, PointSource, SourceStats};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use std::sync::Arc;

/// Async calls the dashboard makes against its point source.
#[derive(Debug, Clone)]
pub struct AppActions {
    pub source: Arc<dyn PointSource>,
    pub point_limit: usize,
}

impl AppActions {
    pub fn new(source: Arc<dyn PointSource>, point_limit: usize) -> Self {
        Self {
            source,
            point_limit,
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub async fn load_candidates(&self, query: &PointQuery) -> Result<Vec<MonitoringPoint>> {
        let page = self
            .source
            .fetch_points(query)
            .await
            .wrap_err("Failed to load points")?;
        tracing::debug!(total = page.total, source = self.source_name(), "candidates loaded");
        Ok(page.into_points())
    }

    pub async fn load_stats(&self) -> Result<SourceStats> {
        self.source
            .fetch_stats()
            .await
            .wrap_err("Failed to load stats")
    }

    pub async fn load_filter_options(&self) -> Result<FilterOptions> {
        self.source
            .fetch_filter_options()
            .await
            .wrap_err("Failed to load filter options")
    }

    pub async fn load_detail(&self, category: Category, id: &str) -> Result<PointDetail> {
        self.source
            .fetch_detail(category, id)
            .await
            .wrap_err_with(|| format!("Failed to load {} {id}", category.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_CENTER;
    use crate::seed::SeedSource;

    fn actions() -> AppActions {
        let seed = SeedSource::bundled().unwrap();
        AppActions::new(Arc::new(seed), 200)
    }

    #[tokio::test]
    async fn candidates_come_from_the_source() {
        let actions = actions();
        let query = PointQuery::new(DEFAULT_CENTER, 20_000.0);
        let points = actions.load_candidates(&query).await.unwrap();
        assert_eq!(points.len(), 19);
        assert_eq!(actions.source_name(), "seed");
    }

    #[tokio::test]
    async fn missing_detail_keeps_the_source_error() {
        let err = actions()
            .load_detail(Category::Health, "EESS_999")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load salud EESS_999"));
        assert!(format!("{err:?}").contains("EESS_999"));
    }
}
