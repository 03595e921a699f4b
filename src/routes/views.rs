//! Read-side endpoints for the map and chart front end.
//!
//! Handlers only read the published snapshot (or the date selection); none
//! of them wait on the reading source except `POST /api/refresh`.

use std::collections::BTreeSet;

use axum::{
    extract::Query,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{AppState, ErrorBody};
use crate::dashboard::RefreshStatus;
use crate::encoding::encode;
use crate::focus::{Focus, MoveViewport};
use crate::models::{Channel, Position, VisualEncoding};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/series", get(series))
        .route("/api/series/filtered", get(filtered_series))
        .route("/api/dates", get(dates))
        .route("/api/dates/selected", put(select_date))
        .route("/api/encode", get(encode_value))
        .route("/api/focus", get(focus))
        .route("/api/map", get(map))
        .route("/api/charts", get(charts))
        .route("/api/status", get(status))
        .route("/api/refresh", post(refresh))
}

fn parse_channel(raw: Option<&str>) -> Result<Channel, (StatusCode, Json<ErrorBody>)> {
    // ---
    match raw {
        None => Ok(Channel::Temperature),
        Some(s) => s
            .parse::<Channel>()
            .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorBody::new(e)))),
    }
}

/// Full series, most recent first.
async fn series(State(state): State<AppState>) -> impl IntoResponse {
    // ---
    let snapshot = state.dashboard.snapshot().await;
    Json(snapshot.series.clone())
}

async fn filtered_series(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.day_view().await)
}

#[derive(Serialize)]
struct DatesResponse {
    available: BTreeSet<NaiveDate>,
    selected: Option<NaiveDate>,
}

async fn dates(State(state): State<AppState>) -> impl IntoResponse {
    // ---
    let (available, selected) = state.dashboard.dates().await;
    Json(DatesResponse { available, selected })
}

#[derive(Debug, Deserialize)]
struct SelectDate {
    date: NaiveDate,
}

async fn select_date(State(state): State<AppState>, Json(body): Json<SelectDate>) -> impl IntoResponse {
    // ---
    match state.dashboard.select_date(body.date).await {
        Ok(()) => {
            debug!("Selected date {}", body.date);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => (StatusCode::NOT_FOUND, Json(ErrorBody::new(e))).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct EncodeQuery {
    channel: String,
    value: f64,
}

#[derive(Serialize)]
struct EncodeResponse {
    channel: Channel,
    value: f64,
    valid: bool,
    /// Absent when the value is a sentinel; such points are not drawn.
    encoding: Option<VisualEncoding>,
    css_color: Option<String>,
}

async fn encode_value(State(state): State<AppState>, Query(q): Query<EncodeQuery>) -> impl IntoResponse {
    // ---
    let channel = match parse_channel(Some(&q.channel)) {
        Ok(c) => c,
        Err(e) => return e.into_response(),
    };

    let valid = state
        .dashboard
        .policy()
        .is_valid_channel_value(channel, Some(q.value));
    let encoding = valid.then(|| encode(channel, q.value));

    Json(EncodeResponse {
        channel,
        value: q.value,
        valid,
        css_color: encoding.map(|e| e.color.to_css()),
        encoding,
    })
    .into_response()
}

#[derive(Serialize)]
struct FocusResponse {
    focus: Focus,
    lat: f64,
    lng: f64,
    is_fallback: bool,
    last_move: Option<MoveViewport>,
}

async fn focus(State(state): State<AppState>) -> impl IntoResponse {
    // ---
    let snapshot = state.dashboard.snapshot().await;
    let Position { lat, lng } = snapshot.focus.position();
    Json(FocusResponse {
        focus: snapshot.focus,
        lat,
        lng,
        is_fallback: snapshot.focus.is_fallback(),
        last_move: snapshot.last_move,
    })
}

#[derive(Debug, Deserialize)]
struct MapQuery {
    channel: Option<String>,
}

/// Circles for the selected day on one channel (default temperature).
async fn map(State(state): State<AppState>, Query(q): Query<MapQuery>) -> impl IntoResponse {
    // ---
    match parse_channel(q.channel.as_deref()) {
        Ok(channel) => Json(state.dashboard.map_points(channel).await).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn charts(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dashboard.charts().await)
}

#[derive(Serialize)]
struct StatusResponse {
    generation: u64,
    fetched_at: Option<DateTime<Utc>>,
    readings: usize,
    #[serde(flatten)]
    refresh: RefreshStatus,
}

async fn status(State(state): State<AppState>) -> impl IntoResponse {
    // ---
    let snapshot = state.dashboard.snapshot().await;
    Json(StatusResponse {
        generation: snapshot.generation,
        fetched_at: snapshot.fetched_at,
        readings: snapshot.series.len(),
        refresh: state.dashboard.status().await,
    })
}

#[derive(Serialize)]
struct RefreshResponse {
    readings: usize,
}

/// Run a refresh cycle now, outside the timer.
async fn refresh(State(state): State<AppState>) -> impl IntoResponse {
    // ---
    info!("POST /api/refresh");
    match state.refresher.refresh_once().await {
        Ok(readings) => (StatusCode::OK, Json(RefreshResponse { readings })).into_response(),
        Err(e) => {
            warn!("Manual refresh failed: {}", e);
            (StatusCode::BAD_GATEWAY, Json(ErrorBody::new(e))).into_response()
        }
    }
}
