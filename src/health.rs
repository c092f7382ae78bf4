//! `GET /health` and `GET /` handlers.
//!
//! Both return fixed JSON documents: the health status with the current
//! time, and a service description listing every supported endpoint.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::proxy::routing::documented_endpoints;

pub const SERVICE_NAME: &str = "Pokemon API Proxy";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub message: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn info_handler() -> Json<InfoResponse> {
    Json(InfoResponse {
        message: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: documented_endpoints()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}
