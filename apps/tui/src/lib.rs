pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod event;
pub mod filter;
pub mod geo;
pub mod logging;
pub mod map;
pub mod report;
pub mod risk;
pub mod seed;
pub mod source;
pub mod terminal;
pub mod ui;
pub mod utm;

pub use domain::{Category, MonitoringPoint};
pub use geo::{haversine_km, Coordinate};
