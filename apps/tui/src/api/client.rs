use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::error::{ApiError, Result};
use super::types::{DetailResponse, FilterOptionsResponse, PointsResponse, StatsResponse};
use crate::domain::Category;
use crate::source::{FilterOptions, PointDetail, PointQuery, PointSource, PointsPage, SourceStats};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn points(&self, query: &PointQuery) -> Result<PointsResponse> {
        let url = self.endpoint(&["api", "mapa", "puntos"])?;
        let params = query_params(query);
        tracing::debug!(%url, ?params, "fetching points");
        self.get_json(self.client.get(url).query(&params)).await
    }

    pub async fn stats(&self) -> Result<StatsResponse> {
        let url = self.endpoint(&["api", "stats"])?;
        tracing::debug!(%url, "fetching stats");
        self.get_json(self.client.get(url)).await
    }

    pub async fn point_detail(&self, category: Category, id: &str) -> Result<DetailResponse> {
        let url = self.endpoint(&["api", "punto", category.as_str(), id])?;
        tracing::debug!(%url, "fetching point detail");
        self.get_json(self.client.get(url)).await
    }

    pub async fn filter_options(&self) -> Result<FilterOptionsResponse> {
        let url = self.endpoint(&["api", "filtros", "opciones"])?;
        self.get_json(self.client.get(url)).await
    }
}

/// Query string of `/api/mapa/puntos`.
pub fn query_params(query: &PointQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("centro_lat", query.center.lat.to_string()),
        ("centro_lng", query.center.lng.to_string()),
        ("radio_km", query.radius_km.to_string()),
        ("tipos", query.types_param()),
        ("limit", query.limit.to_string()),
    ];
    if let Some(location) = &query.location {
        params.push(("ubicacion", location.clone()));
    }
    params
}

#[async_trait]
impl PointSource for ApiClient {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn fetch_points(&self, query: &PointQuery) -> Result<PointsPage> {
        let response = self.points(query).await?;
        let page = response.into_page();
        tracing::info!(total = page.total, "points loaded from API");
        Ok(page)
    }

    async fn fetch_stats(&self) -> Result<SourceStats> {
        Ok(self.stats().await?.into())
    }

    async fn fetch_detail(&self, category: Category, id: &str) -> Result<PointDetail> {
        match self.point_detail(category, id).await {
            Ok(detail) => Ok(detail.into_detail(category)),
            Err(ApiError::Api { status: 404, .. }) => Err(ApiError::NotFound {
                category,
                id: id.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn fetch_filter_options(&self) -> Result<FilterOptions> {
        Ok(self.filter_options().await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_CENTER;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn endpoint_escapes_ids() {
        let client = ApiClient::new("http://localhost:8000/base/");
        let url = client.endpoint(&["api", "punto", "salud", "EESS 001"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/base/api/punto/salud/EESS%20001");
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let client = ApiClient::new("not a url");
        assert!(matches!(client.endpoint(&["api"]), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn query_params_include_location_only_when_set() {
        let query = PointQuery::new(DEFAULT_CENTER, 20.0);
        let params = query_params(&query);
        assert!(params.contains(&("limit", "200".to_string())));
        assert!(params.contains(&("tipos", "oefa,educacion,salud,poblacion".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "ubicacion"));

        let params = query_params(&query.with_location(Some("Lima")));
        assert!(params.contains(&("ubicacion", "Lima".to_string())));
    }
}
