//! Request Handlers - Bet, Simulation, Round and Probe Endpoints

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use super::ApiState;
use super::error::ApiError;
use crate::domain::{BetType, DrawResult, EvaluationRequest, EvaluationStatus};
use crate::ports::exposure_store::ExposureStore;
use crate::ports::journal::BetJournal;
use crate::usecases::SimulationOverrides;

/// Body of `POST /v1/evaluate`.
#[derive(Debug, Deserialize)]
pub struct SimulateBody {
    pub bet_type: BetType,
    pub number: String,
    pub amount: Decimal,
    #[serde(default)]
    pub has_referrer: bool,
    pub capital: Option<Decimal>,
    pub total_sales: Option<Decimal>,
    pub current_exposure: Option<Decimal>,
}

impl SimulateBody {
    fn into_parts(self) -> (EvaluationRequest, SimulationOverrides) {
        let request = EvaluationRequest {
            bet_type: self.bet_type,
            number: self.number,
            amount: self.amount,
            has_referrer: self.has_referrer,
        };
        let overrides = SimulationOverrides {
            capital: self.capital,
            total_sales: self.total_sales,
            current_exposure: self.current_exposure,
        };
        (request, overrides)
    }
}

/// Body of `POST /v1/rounds/:id/announce`.
#[derive(Debug, Deserialize)]
pub struct AnnounceBody {
    pub top: String,
    pub bottom: String,
    /// Identities of the admins confirming the result.
    pub confirmations: Vec<String>,
}

pub(super) async fn simulate<S: ExposureStore, J: BetJournal>(
    State(state): State<Arc<ApiState<S, J>>>,
    Json(body): Json<SimulateBody>,
) -> Result<Response, ApiError> {
    let (request, overrides) = body.into_parts();
    let result = state.desk.simulate(&request, overrides).await?;
    Ok(Json(result).into_response())
}

pub(super) async fn place_bet<S: ExposureStore, J: BetJournal>(
    State(state): State<Arc<ApiState<S, J>>>,
    Json(request): Json<EvaluationRequest>,
) -> Result<Response, ApiError> {
    if state.limiter.check().is_err() {
        warn!(bet_type = %request.bet_type, "Bet rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    let placement = state.desk.place(&request).await?;
    let status = if placement.result.status == EvaluationStatus::Rejected {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    Ok((status, Json(placement)).into_response())
}

pub(super) async fn current_round<S: ExposureStore, J: BetJournal>(
    State(state): State<Arc<ApiState<S, J>>>,
) -> Result<Response, ApiError> {
    Ok(Json(state.desk.current_round().await?).into_response())
}

pub(super) async fn announce<S: ExposureStore, J: BetJournal>(
    State(state): State<Arc<ApiState<S, J>>>,
    Path(round_id): Path<u64>,
    Json(body): Json<AnnounceBody>,
) -> Result<Response, ApiError> {
    let result = DrawResult {
        top: body.top,
        bottom: body.bottom,
    };
    let archive = state
        .rounds
        .announce(round_id, result, &body.confirmations)
        .await?;
    Ok(Json(archive).into_response())
}

/// Liveness probe: always 200 while the process runs.
pub(super) async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe: 200 only while accepting bets with healthy ports.
pub(super) async fn readiness<S: ExposureStore, J: BetJournal>(
    State(state): State<Arc<ApiState<S, J>>>,
) -> impl IntoResponse {
    if state.health.is_accepting() && state.desk.is_healthy().await {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

pub(super) async fn metrics<S: ExposureStore, J: BetJournal>(
    State(state): State<Arc<ApiState<S, J>>>,
) -> Response {
    if !state.metrics_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }
    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
