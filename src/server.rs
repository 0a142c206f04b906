//! HTTP surface for report generation.
//!
//! A single endpoint, `POST /api/reports`, takes the application record plus
//! captured screenshots and answers with the assembled PDF. Assembly is CPU
//! and I/O heavy, so it runs on the blocking pool.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::model::{DocumentList, ReportRequest};
use crate::storage::ObjectStore;
use crate::{Error, assemble_report};

#[derive(Clone)]
pub struct AppState {
    /// `None` until storage is configured; report requests then answer 500.
    pub store: Option<Arc<dyn ObjectStore>>,
    pub documents: DocumentList,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/reports", post(create_report))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn create_report(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    // Validate by hand so malformed requests get a 400 with a usable
    // message instead of an extractor rejection.
    let Some(application_id) = body
        .get("applicationId")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
    else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "applicationId is required and must be a non-empty string",
        );
    };
    if !body.get("data").is_some_and(|v| v.is_object()) {
        return error_response(StatusCode::BAD_REQUEST, "data is required and must be an object");
    }

    let request: ReportRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("malformed request: {e}"));
        }
    };

    let Some(store) = state.store.clone() else {
        log::error!("report request for {application_id} rejected: storage is not configured");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage is not configured");
    };
    let documents = state.documents.clone();

    let result =
        tokio::task::spawn_blocking(move || assemble_report(&request, store.as_ref(), &documents))
            .await;

    match result {
        Ok(Ok(bytes)) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"application-{application_id}.pdf\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(Err(Error::InvalidInput(msg))) => error_response(StatusCode::BAD_REQUEST, &msg),
        Ok(Err(e)) => {
            log::error!("report assembly failed for {application_id}: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        Err(e) => {
            log::error!("report task panicked for {application_id}: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "report generation failed")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
