//! Create/list endpoints used by the sensor nodes.

use axum::{
    extract::Query,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{AppState, ErrorBody};
use crate::models::RawRecord;
use crate::store::{self, NewReading, StoredReading};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/sensors", get(list).post(create))
}

#[derive(Serialize)]
struct Created {
    message: &'static str,
    id: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

async fn create(State(state): State<AppState>, Json(reading): Json<NewReading>) -> impl IntoResponse {
    // ---
    debug!("POST /api/sensors - {:?}", reading);

    match store::insert_reading(&state.pool, &reading).await {
        Ok(stored) => {
            info!("Stored reading {}", stored.id);
            saved(stored)
        }
        Err(e) => {
            error!("Failed to store reading: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(e))).into_response()
        }
    }
}

/// Sensor nodes expect a plain 200 with `"Data Saved"`.
fn saved(stored: StoredReading) -> Response {
    // ---
    (
        StatusCode::OK,
        Json(Created {
            message: "Data Saved",
            id: stored.id,
            created_at: stored.created_at,
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u32>,
}

#[derive(Serialize)]
struct ListResponse {
    data: Vec<RawRecord>,
}

/// Latest rows exactly as stored, newest first.
async fn list(Query(params): Query<ListQuery>, State(state): State<AppState>) -> impl IntoResponse {
    // ---
    let limit = params.limit.unwrap_or(state.config.fetch_limit).min(1000);
    debug!("GET /api/sensors - limit {}", limit);

    let result = async {
        let mut conn = state.pool.acquire().await?;
        store::latest_rows(&mut *conn, limit).await
    }
    .await;

    match result {
        Ok(data) => (StatusCode::OK, Json(ListResponse { data })).into_response(),
        Err(e) => {
            error!("Failed to list readings: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(e))).into_response()
        }
    }
}
