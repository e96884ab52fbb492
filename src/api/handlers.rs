//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::AppState;
use super::types::{BillRequest, ErrorResponse};
use crate::billing::{BillResult, compute_bill};
use crate::tariff::{Tariff, TariffSummary};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn not_found(err: impl ToString) -> ApiError {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(err)))
}

/// `GET /tariffs` → 200 + `Vec<TariffSummary>` JSON
pub async fn list_tariffs(State(state): State<Arc<AppState>>) -> Json<Vec<TariffSummary>> {
    Json(state.catalog.summaries())
}

/// `GET /tariffs/{id}` → 200 + `Tariff` JSON, or 404 + `ErrorResponse`
pub async fn get_tariff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Tariff>, ApiError> {
    state
        .catalog
        .get(&id)
        .map(|t| Json(t.clone()))
        .map_err(not_found)
}

/// Computes a bill.
///
/// `POST /bill` → 200 + `BillResult` JSON
/// Unknown tariff → 404; readings the tariff cannot bill → 422
pub async fn compute(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BillRequest>,
) -> Result<Json<BillResult>, ApiError> {
    let tariff = state.catalog.get(&req.tariff_id).map_err(not_found)?;
    compute_bill(tariff, &req.readings).map(Json).map_err(|e| {
        tracing::debug!(tariff = %req.tariff_id, error = %e, "bill rejected");
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(e)),
        )
    })
}
