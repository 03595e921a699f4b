//! Routes gateway: merges every sub-router and attaches shared state.

use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use sqlx::PgPool;

use crate::dashboard::Dashboard;
use crate::refresh::Refresher;
use crate::Config;

mod health;
mod sensors;
mod views;

// ---

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub dashboard: Arc<Dashboard>,
    pub refresher: Arc<Refresher>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config, dashboard: Arc<Dashboard>, refresher: Arc<Refresher>) -> Self {
        // ---
        Self {
            pool,
            config,
            dashboard,
            refresher,
        }
    }
}

/// JSON error body returned by every failing handler.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(sensors::router())
        .merge(views::router())
        .merge(health::router())
        .with_state(state)
}
