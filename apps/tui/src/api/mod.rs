// Client for the water-risk monitoring API

pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
