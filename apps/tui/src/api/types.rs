//! Wire payloads of the monitoring API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{clean_text, parse_sample_date, Category, MonitoringPoint};
use crate::geo::Coordinate;
use crate::source::{FilterOptions, PageEntry, PointDetail, PointsPage, SourceStats};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiPoint {
    pub id: String,
    pub tipo: String,
    pub latitud: f64,
    pub longitud: f64,
    #[serde(default)]
    pub distancia_km: Option<f64>,
    pub nombre: String,
    #[serde(default)]
    pub ubicacion: Option<String>,
    #[serde(default)]
    pub info_especifica: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PointsResponse {
    pub puntos: Vec<ApiPoint>,
    pub total: usize,
    #[serde(default)]
    pub tipos_count: BTreeMap<String, usize>,
    #[serde(default)]
    pub filtros_aplicados: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub total_puntos_oefa: u64,
    #[serde(default)]
    pub total_centros_educacion: u64,
    #[serde(default)]
    pub total_centros_salud: u64,
    #[serde(default)]
    pub total_centros_poblacion: u64,
    #[serde(default)]
    pub ultimo_update: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Coordenadas {
    pub latitud: f64,
    pub longitud: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetailResponse {
    pub id: String,
    pub tipo: String,
    pub nombre: String,
    pub coordenadas: Coordenadas,
    #[serde(default)]
    pub info_completa: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterOptionsResponse {
    #[serde(default)]
    pub ubicaciones: Vec<String>,
    #[serde(default)]
    pub tipos: Vec<String>,
    #[serde(default)]
    pub total_registros: u64,
}

/// Flattens a JSON value to display text; nulls and dataframe blanks vanish.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => clean_text(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn text_fields(values: &BTreeMap<String, Value>) -> BTreeMap<String, String> {
    values
        .iter()
        .filter_map(|(key, value)| value_text(value).map(|text| (key.clone(), text)))
        .collect()
}

impl ApiPoint {
    /// Converts to a domain point; unknown categories and bad coordinates yield `None`.
    pub fn into_point(self) -> Option<MonitoringPoint> {
        let category = Category::parse(&self.tipo)?;
        let details = text_fields(&self.info_especifica);
        let point = MonitoringPoint::new(
            self.id,
            category,
            Coordinate::new(self.latitud, self.longitud),
            self.nombre,
        )
        .ok()?;

        let point = if category == Category::CausalityEvaluation {
            // OEFA points are keyed by their inspection report.
            let report_id = Some(point.id.clone());
            point.with_sample(
                report_id.as_deref(),
                details.get("parametro").map(String::as_str),
                details.get("fecha_muestra").and_then(|d| parse_sample_date(d)),
            )
        } else {
            point
        };

        let mut point = match self.ubicacion.as_deref() {
            Some(location) => point.with_location(location),
            None => point,
        };
        point.details = details;
        Some(point)
    }
}

impl PointsResponse {
    pub fn into_page(self) -> PointsPage {
        let received = self.puntos.len();
        let entries: Vec<PageEntry> = self
            .puntos
            .into_iter()
            .filter_map(|raw| {
                let distance_km = raw.distancia_km;
                let id = raw.id.clone();
                let point = raw.into_point();
                if point.is_none() {
                    tracing::warn!(%id, "dropping API point with unknown type or bad coordinates");
                }
                point.map(|point| PageEntry { point, distance_km })
            })
            .collect();
        if entries.len() < received {
            tracing::debug!(received, kept = entries.len(), "API points dropped during conversion");
        }

        let counts = self
            .tipos_count
            .iter()
            .filter_map(|(tipo, count)| Category::parse(tipo).map(|c| (c, *count)))
            .collect();

        PointsPage {
            total: entries.len(),
            entries,
            counts,
        }
    }
}

impl From<StatsResponse> for SourceStats {
    fn from(stats: StatsResponse) -> Self {
        let counts = [
            (Category::CausalityEvaluation, stats.total_puntos_oefa),
            (Category::Education, stats.total_centros_educacion),
            (Category::Health, stats.total_centros_salud),
            (Category::Population, stats.total_centros_poblacion),
        ]
        .into_iter()
        .collect();
        Self {
            counts,
            last_update: stats.ultimo_update,
        }
    }
}

impl DetailResponse {
    pub fn into_detail(self, requested: Category) -> PointDetail {
        PointDetail {
            category: Category::parse(&self.tipo).unwrap_or(requested),
            fields: text_fields(&self.info_completa),
            coordinate: Coordinate::new(self.coordenadas.latitud, self.coordenadas.longitud),
            id: self.id,
            name: self.nombre,
        }
    }
}

impl From<FilterOptionsResponse> for FilterOptions {
    fn from(options: FilterOptionsResponse) -> Self {
        let mut locations: Vec<String> = options
            .ubicaciones
            .iter()
            .filter_map(|l| clean_text(l))
            .collect();
        locations.sort();
        locations.dedup();
        Self {
            locations,
            categories: options.tipos.iter().filter_map(|t| Category::parse(t)).collect(),
            total_records: options.total_registros,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn oefa_point_carries_sample_metadata() {
        let raw: ApiPoint = serde_json::from_value(json!({
            "id": "2BAE47A5",
            "tipo": "oefa",
            "latitud": -11.525,
            "longitud": -76.975,
            "distancia_km": 0.0,
            "nombre": "Punto OEFA",
            "ubicacion": "Lima",
            "info_especifica": {
                "tipo_oefa": "Causalidad",
                "fecha_muestra": "2018-02-20",
                "parametro": "NITRITOS (NO2-N)"
            }
        }))
        .unwrap();
        let point = raw.into_point().unwrap();
        assert_eq!(point.category, Category::CausalityEvaluation);
        assert_eq!(point.report_id.as_deref(), Some("2BAE47A5"));
        assert_eq!(point.parameter.as_deref(), Some("NITRITOS (NO2-N)"));
        assert_eq!(point.sample_date, NaiveDate::from_ymd_opt(2018, 2, 20));
        assert_eq!(point.location.as_deref(), Some("Lima"));
    }

    #[test]
    fn malformed_fields_default_to_none() {
        let raw: ApiPoint = serde_json::from_value(json!({
            "id": "X",
            "tipo": "oefa",
            "latitud": -11.5,
            "longitud": -76.9,
            "nombre": "X",
            "info_especifica": { "fecha_muestra": "nan", "parametro": "", "extra": null }
        }))
        .unwrap();
        let point = raw.into_point().unwrap();
        assert_eq!(point.sample_date, None);
        assert_eq!(point.parameter, None);
        assert!(!point.details.contains_key("extra"));
    }

    #[test]
    fn unknown_type_is_dropped_from_page() {
        let response: PointsResponse = serde_json::from_value(json!({
            "puntos": [
                {"id": "1", "tipo": "salud", "latitud": -11.5, "longitud": -76.9, "nombre": "a"},
                {"id": "2", "tipo": "rios", "latitud": -11.5, "longitud": -76.9, "nombre": "b"}
            ],
            "total": 2,
            "tipos_count": {"salud": 1, "rios": 1}
        }))
        .unwrap();
        let page = response.into_page();
        assert_eq!(page.total, 1);
        assert_eq!(page.counts.len(), 1);
        assert_eq!(page.counts[&Category::Health], 1);
    }

    #[test]
    fn numbers_in_details_become_text() {
        assert_eq!(value_text(&json!(12)), Some("12".to_string()));
        assert_eq!(value_text(&json!(" None ")), None);
    }
}
