//! HTTP API - Bet Desk, Simulator, Rounds and Probes
//!
//! Exposes the desk via axum 0.7:
//! - `POST /v1/evaluate`: what-if evaluation, never commits
//! - `POST /v1/bets`: place a bet (rate limited)
//! - `GET /v1/rounds/current`: current round and pool
//! - `POST /v1/rounds/:id/announce`: announce a draw result
//! - `/live`, `/ready`, `/metrics`

pub mod error;
pub mod handlers;

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::adapters::metrics::{HealthState, MetricsRegistry};
use crate::config::RateLimitConfig;
use crate::ports::exposure_store::ExposureStore;
use crate::ports::journal::BetJournal;
use crate::usecases::{BetDesk, RoundManager};

/// State shared by all handlers.
pub struct ApiState<S: ExposureStore, J: BetJournal> {
    pub desk: Arc<BetDesk<S, J>>,
    pub rounds: Arc<RoundManager<S, J>>,
    pub metrics: Arc<MetricsRegistry>,
    pub health: HealthState,
    /// Global bet placement limiter.
    pub limiter: DefaultDirectRateLimiter,
    /// Serve `/metrics`.
    pub metrics_enabled: bool,
}

/// Build the bet placement limiter from config.
pub fn bet_limiter(config: &RateLimitConfig) -> DefaultDirectRateLimiter {
    let rate = NonZeroU32::new(config.max_bets_per_second).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(config.burst).unwrap_or(rate);
    RateLimiter::direct(Quota::per_second(rate).allow_burst(burst))
}

/// Build the API router.
pub fn router<S: ExposureStore, J: BetJournal>(state: Arc<ApiState<S, J>>) -> Router {
    Router::new()
        .route("/v1/evaluate", post(handlers::simulate::<S, J>))
        .route("/v1/bets", post(handlers::place_bet::<S, J>))
        .route("/v1/rounds/current", get(handlers::current_round::<S, J>))
        .route("/v1/rounds/:id/announce", post(handlers::announce::<S, J>))
        .route("/live", get(handlers::liveness))
        .route("/ready", get(handlers::readiness::<S, J>))
        .route("/metrics", get(handlers::metrics::<S, J>))
        .with_state(state)
}

/// Serve the API until shutdown is broadcast.
#[instrument(skip(state, shutdown_rx))]
pub async fn serve<S: ExposureStore, J: BetJournal>(
    bind_address: &str,
    state: Arc<ApiState<S, J>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!(address = %bind_address, "Bet API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;

    Ok(())
}
