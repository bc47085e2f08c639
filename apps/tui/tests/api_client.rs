use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use radar_hidrico::api::{ApiClient, ApiError};
use radar_hidrico::app::{App, LoadState};
use radar_hidrico::config::{AppConfig, SourceKind};
use radar_hidrico::domain::{Category, DEFAULT_CENTER};
use radar_hidrico::report::SimulatedReportGenerator;
use radar_hidrico::source::{PointQuery, PointSource};
use serde_json::{json, Value};

async fn points(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "puntos": [
            {
                "id": "2BAE47A5CEC153E01BB8B857C88F5EA492259423",
                "tipo": "oefa",
                "latitud": -11.525,
                "longitud": -76.975,
                "distancia_km": 0.0,
                "nombre": "Punto OEFA - Casma Central",
                "ubicacion": "Lima, Huarochirí",
                "info_especifica": {
                    "parametro": "PLOMO TOTAL",
                    "fecha_muestra": "2018-02-20",
                    "valor": null
                }
            },
            {
                "id": "EESS_001",
                "tipo": "salud",
                "latitud": -11.515,
                "longitud": -76.965,
                "distancia_km": 1.56,
                "nombre": "Centro de Salud Casma",
                "ubicacion": "Lima, Huarochirí",
                "info_especifica": { "categoria": "I-3" }
            },
            {
                "id": "R-1",
                "tipo": "rios",
                "latitud": -11.5,
                "longitud": -76.9,
                "nombre": "Río Rímac"
            }
        ],
        "total": 3,
        "tipos_count": { "oefa": 1, "salud": 1 },
        "filtros_aplicados": params,
    }))
}

async fn stats() -> Json<Value> {
    Json(json!({
        "total_puntos_oefa": 120,
        "total_centros_educacion": 45,
        "total_centros_salud": 12,
        "total_centros_poblacion": 30,
        "ultimo_update": "2024-05-01T10:00:00"
    }))
}

async fn detail(Path((tipo, id)): Path<(String, String)>) -> Response {
    if id != "EESS_001" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Punto no encontrado" })),
        )
            .into_response();
    }
    Json(json!({
        "id": id,
        "tipo": tipo,
        "nombre": "Centro de Salud Casma",
        "coordenadas": { "latitud": -11.515, "longitud": -76.965 },
        "info_completa": { "categoria": "I-3", "telefono": "nan", "camas": 12 }
    }))
    .into_response()
}

async fn filter_options() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "detail": "Datasets no cargados" })),
    )
        .into_response()
}

async fn spawn_server() -> SocketAddr {
    let router = Router::new()
        .route("/api/mapa/puntos", get(points))
        .route("/api/stats", get(stats))
        .route("/api/punto/{tipo}/{id}", get(detail))
        .route("/api/filtros/opciones", get(filter_options));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> ApiClient {
    ApiClient::new(&format!("http://{addr}/"))
}

#[tokio::test]
async fn points_are_converted_and_unknown_types_dropped() {
    let addr = spawn_server().await;
    let client = client(addr);

    let query = PointQuery::new(DEFAULT_CENTER, 20.0)
        .with_categories(&[Category::CausalityEvaluation, Category::Health])
        .with_location(Some("Lima"));
    let page = client.fetch_points(&query).await.unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.counts.get(&Category::Health), Some(&1));

    let oefa = &page.entries[0].point;
    assert_eq!(oefa.category, Category::CausalityEvaluation);
    assert_eq!(oefa.report_id.as_deref(), Some(oefa.id.as_str()));
    assert_eq!(oefa.parameter.as_deref(), Some("PLOMO TOTAL"));
    assert_eq!(oefa.sample_date.map(|d| d.to_string()).as_deref(), Some("2018-02-20"));
    assert!(!oefa.details.contains_key("valor"));
    assert_eq!(page.entries[1].distance_km, Some(1.56));
}

#[tokio::test]
async fn query_parameters_reach_the_server() {
    let addr = spawn_server().await;
    let query = PointQuery::new(DEFAULT_CENTER, 15.0)
        .with_categories(&[Category::Education])
        .with_limit(50)
        .with_location(Some("Ica"));

    let raw = client(addr).points(&query).await.unwrap();
    let applied = &raw.filtros_aplicados;
    assert_eq!(applied["centro_lat"], "-11.525");
    assert_eq!(applied["radio_km"], "15");
    assert_eq!(applied["tipos"], "educacion");
    assert_eq!(applied["limit"], "50");
    assert_eq!(applied["ubicacion"], "Ica");
}

#[tokio::test]
async fn stats_map_to_categories() {
    let addr = spawn_server().await;
    let stats = client(addr).fetch_stats().await.unwrap();
    assert_eq!(stats.count(Category::CausalityEvaluation), 120);
    assert_eq!(stats.total(), 207);
    assert_eq!(stats.last_update.as_deref(), Some("2024-05-01T10:00:00"));
}

#[tokio::test]
async fn detail_found_and_missing() {
    let addr = spawn_server().await;
    let client = client(addr);

    let detail = client.fetch_detail(Category::Health, "EESS_001").await.unwrap();
    assert_eq!(detail.name, "Centro de Salud Casma");
    assert_eq!(detail.fields.get("camas").map(String::as_str), Some("12"));
    assert!(!detail.fields.contains_key("telefono"));

    let err = client
        .fetch_detail(Category::Health, "EESS_404")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn http_errors_carry_status_text() {
    let addr = spawn_server().await;
    let err = client(addr).fetch_filter_options().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "Error 503: Service Unavailable");
}

fn api_config(addr: SocketAddr) -> AppConfig {
    AppConfig {
        source: SourceKind::Api,
        api_url: format!("http://{addr}"),
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn dashboard_loads_from_the_api_despite_option_errors() {
    let addr = spawn_server().await;
    let config = api_config(addr);
    let source = radar_hidrico::source::build_source(&config).unwrap();
    let mut app = App::new(config, source, Arc::new(SimulatedReportGenerator::default()));

    app.refresh().await;
    assert_eq!(app.load_state, LoadState::Ready);
    assert_eq!(app.points.len(), 2);
    assert!(app.options.locations.is_empty());
    assert_eq!(app.visible_points().len(), 2);
}

#[tokio::test]
async fn unreachable_api_is_a_failed_load_not_a_crash() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = api_config(addr);
    let source = radar_hidrico::source::build_source(&config).unwrap();
    let mut app = App::new(config, source, Arc::new(SimulatedReportGenerator::default()));

    app.refresh().await;
    assert!(matches!(app.load_state, LoadState::Failed(_)));
    assert!(app.points.is_empty());
    assert!(app.visible_points().is_empty());
}
