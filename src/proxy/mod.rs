//! The `/api/v2` pass-through handler.
//!
//! [`forward_handler`] resolves the captured path segments against the
//! route table ([`routing`]) and hands the resulting resource request to
//! the shared [`Forwarder`](forwarder::Forwarder). An upstream success
//! becomes `200` with the upstream body; any upstream failure becomes an
//! empty `404`, whatever its cause.

pub mod forwarder;
pub mod routing;

use std::sync::Arc;

use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::server::AppState;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    Path(segments): Path<Vec<String>>,
    RawQuery(query): RawQuery,
    req_headers: HeaderMap,
) -> Response {
    let correlation_id = req_headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    let resource = match routing::match_route(&segments, query.as_deref()) {
        Ok(Some(resource)) => resource,
        Ok(None) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                segments = ?segments,
                "no route matched"
            );
            return with_correlation_id(StatusCode::NOT_FOUND.into_response(), &correlation_id);
        }
        Err(e) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                error = %e,
                "rejected request parameters"
            );
            let body = Json(serde_json::json!({ "error": e.to_string() }));
            return with_correlation_id(
                (StatusCode::BAD_REQUEST, body).into_response(),
                &correlation_id,
            );
        }
    };

    tracing::debug!(
        correlation_id = %correlation_id,
        resource = %resource.path(),
        "request received"
    );

    let response = match state.forwarder.forward(&resource, &correlation_id).await {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )],
            body,
        )
            .into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    };

    with_correlation_id(response, &correlation_id)
}

fn with_correlation_id(mut response: Response, correlation_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(correlation_id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}
