// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP dispatcher for the `ProxyRule` REST surface.
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | `GET`    | `/api/proxyrules`        | 200 with a `ProxyruleList` |
//! | `POST`   | `/api/proxyrules`        | 201 with the stored rule |
//! | `GET`    | `/api/proxyrules/{name}` | 200 with the rule |
//! | `PUT`    | `/api/proxyrules/{name}` | 200 with the stored rule |
//! | `DELETE` | `/api/proxyrules/{name}` | 204 |
//! | `GET`    | `/healthz`               | 200 `ok` |
//! | `GET`    | `/metrics`               | 200 Prometheus text |
//!
//! Failures are answered with a Kubernetes-style `Status` object carrying the message,
//! a CamelCase reason, and the HTTP code.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::constants::{
    API_GROUP_VERSION, HEALTH_PATH, KIND_PROXY_RULE_LIST, MAX_REQUEST_BODY_SIZE,
    METRICS_SERVER_PATH, PROXY_RULES_PATH,
};
use crate::manager::RuleManager;
use crate::metrics::gather_metrics;
use crate::record::Record;
use crate::rule_errors::RuleError;

/// Content types accepted on `POST` and `PUT`.
const ACCEPTED_CONTENT_TYPES: [&str; 2] = ["application/json", "application/json; charset=utf-8"];

/// Content type of the Prometheus text exposition format.
const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Errors produced while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was rejected before reaching the rule manager
    #[error("{0}")]
    BadRequest(String),

    #[error("request body too large (max {MAX_REQUEST_BODY_SIZE} bytes)")]
    PayloadTooLarge,

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Rule(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BadRequest",
            Self::PayloadTooLarge => "RequestEntityTooLarge",
            Self::Rule(e) => e.status_reason(),
            Self::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            debug!("Request rejected ({}): {}", status.as_u16(), self);
        }

        let mut body = json!({
            "kind": "Status",
            "apiVersion": "v1",
            "status": "Failure",
            "message": self.to_string(),
            "reason": self.reason(),
            "code": status.as_u16()
        });

        if let Self::Rule(RuleError::ValidationFailed(errors)) = &self {
            let causes: Vec<Value> = errors
                .iter()
                .map(|e| json!({"field": e.field, "message": e.message}))
                .collect();
            body["details"] = json!({ "causes": causes });
        }

        (status, Json(body)).into_response()
    }
}

/// Build the router serving every endpoint.
pub fn router(manager: Arc<RuleManager>) -> Router {
    Router::new()
        .route(PROXY_RULES_PATH, get(list_rules).post(create_rule))
        .route(
            &format!("{PROXY_RULES_PATH}/{{name}}"),
            get(get_rule).put(update_rule).delete(delete_rule),
        )
        .route(HEALTH_PATH, get(|| async { "ok" }))
        .route(METRICS_SERVER_PATH, get(metrics))
        .with_state(manager)
}

async fn list_rules(State(manager): State<Arc<RuleManager>>) -> Result<Json<Value>, ApiError> {
    let items = manager.list().await?;
    Ok(Json(json!({
        "apiVersion": API_GROUP_VERSION,
        "kind": KIND_PROXY_RULE_LIST,
        "items": items
    })))
}

async fn create_rule(
    State(manager): State<Arc<RuleManager>>,
    headers: HeaderMap,
    body: Body,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let record = read_record(&headers, body).await?;
    let stored = manager.create(record).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn get_rule(
    State(manager): State<Arc<RuleManager>>,
    Path(name): Path<String>,
) -> Result<Json<Record>, ApiError> {
    Ok(Json(manager.get(&name).await?))
}

async fn update_rule(
    State(manager): State<Arc<RuleManager>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<Record>, ApiError> {
    let record = read_record(&headers, body).await?;
    Ok(Json(manager.update(&name, record).await?))
}

async fn delete_rule(
    State(manager): State<Arc<RuleManager>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    manager.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn metrics() -> Result<Response, ApiError> {
    let text = gather_metrics().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(([(CONTENT_TYPE, METRICS_CONTENT_TYPE)], text).into_response())
}

/// Check the content type, read the body under the size limit, and decode a JSON object.
async fn read_record(headers: &HeaderMap, body: Body) -> Result<Record, ApiError> {
    check_content_type(headers)?;
    let bytes = read_body(body).await?;
    parse_record(&bytes)
}

pub(crate) fn check_content_type(headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Err(ApiError::BadRequest(
            "Content-Type header is required".to_string(),
        ));
    };

    if value.is_empty() {
        return Err(ApiError::BadRequest(
            "Content-Type header is required".to_string(),
        ));
    }
    match value.to_str() {
        Ok(content_type) if ACCEPTED_CONTENT_TYPES.contains(&content_type) => Ok(()),
        _ => Err(ApiError::BadRequest(format!(
            "Content-Type must be 'application/json', got '{}'",
            String::from_utf8_lossy(value.as_bytes())
        ))),
    }
}

async fn read_body(body: Body) -> Result<Bytes, ApiError> {
    let bytes = axum::body::to_bytes(body, MAX_REQUEST_BODY_SIZE)
        .await
        .map_err(|_| ApiError::PayloadTooLarge)?;

    if bytes.is_empty() {
        return Err(ApiError::BadRequest("request body is required".to_string()));
    }
    Ok(bytes)
}

pub(crate) fn parse_record(bytes: &[u8]) -> Result<Record, ApiError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::BadRequest(format!("Error parsing JSON: {e}")))?;

    Record::from_value(value).ok_or_else(|| {
        ApiError::BadRequest("Error parsing JSON: expected a JSON object".to_string())
    })
}
