//! Shared dashboard state.
//!
//! The current series and everything derived from it live in one immutable
//! [`Snapshot`] that is swapped wholesale on publish. Readers clone the
//! `Arc` and can never observe a half-updated view. The user's date
//! selection and the focus tracker sit next to it under the same lock so a
//! publish reconciles them atomically.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::charts::{build_charts, Charts};
use crate::encoding::{map_points, MapPoint};
use crate::focus::{Focus, FocusTracker, MoveViewport};
use crate::models::{Channel, NormalizedReading, Position};
use crate::partition::{DateSelection, DayPartitioner, SelectionError};
use crate::series::Series;
use crate::source::FetchError;
use crate::validity::SentinelPolicy;

// ---

/// Everything derived from one fetched batch.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Refresh ticket that produced this snapshot; 0 before the first fetch.
    pub generation: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    pub series: Series,
    pub available_dates: BTreeSet<NaiveDate>,
    pub focus: Focus,
    /// Most recent viewport command, kept until a newer one replaces it.
    pub last_move: Option<MoveViewport>,
}

/// Outcome of recent refresh cycles.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshStatus {
    pub consecutive_failures: u32,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Readings for the selected day.
#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub date: Option<NaiveDate>,
    pub readings: Vec<NormalizedReading>,
}

struct Inner {
    snapshot: Arc<Snapshot>,
    selection: DateSelection,
    tracker: FocusTracker,
    status: RefreshStatus,
}

pub struct Dashboard {
    partitioner: DayPartitioner,
    policy: SentinelPolicy,
    inner: RwLock<Inner>,
}

impl Dashboard {
    pub fn new(partitioner: DayPartitioner, policy: SentinelPolicy, fallback: Position) -> Self {
        // ---
        let snapshot = Snapshot {
            generation: 0,
            fetched_at: None,
            series: Series::default(),
            available_dates: BTreeSet::new(),
            focus: Focus::Fallback(fallback),
            last_move: None,
        };
        Self {
            partitioner,
            policy,
            inner: RwLock::new(Inner {
                snapshot: Arc::new(snapshot),
                selection: DateSelection::default(),
                tracker: FocusTracker::new(fallback),
                status: RefreshStatus::default(),
            }),
        }
    }

    pub fn policy(&self) -> &SentinelPolicy {
        &self.policy
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.read().await.snapshot.clone()
    }

    pub async fn status(&self) -> RefreshStatus {
        self.inner.read().await.status.clone()
    }

    /// Replace the current series with one produced by refresh `ticket`.
    ///
    /// Returns `false` and changes nothing when a newer ticket has already
    /// been published.
    pub async fn publish(&self, ticket: u64, series: Series, at: DateTime<Utc>) -> bool {
        // ---
        let mut inner = self.inner.write().await;

        if ticket <= inner.snapshot.generation {
            tracing::debug!(
                "Discarding stale refresh #{} (current #{})",
                ticket,
                inner.snapshot.generation
            );
            return false;
        }

        let available_dates = self.partitioner.available_dates(&series);
        let latest = self.partitioner.latest_date(&series);
        inner.selection.reconcile(&available_dates, latest);

        let (focus, moved) = inner.tracker.observe(&series);
        let last_move = moved.or(inner.snapshot.last_move);

        tracing::debug!(
            "Published refresh #{}: {} readings over {} days",
            ticket,
            series.len(),
            available_dates.len()
        );

        inner.snapshot = Arc::new(Snapshot {
            generation: ticket,
            fetched_at: Some(at),
            series,
            available_dates,
            focus,
            last_move,
        });
        inner.status.consecutive_failures = 0;
        inner.status.last_success = Some(at);
        true
    }

    /// Record a failed fetch. The current snapshot stays in place.
    pub async fn record_failure(&self, err: &FetchError, at: DateTime<Utc>) {
        // ---
        let mut inner = self.inner.write().await;
        inner.status.consecutive_failures += 1;
        inner.status.last_failure = Some(at);
        inner.status.last_error = Some(err.to_string());
    }

    /// Available dates and the selection, read under one guard.
    pub async fn dates(&self) -> (BTreeSet<NaiveDate>, Option<NaiveDate>) {
        // ---
        let inner = self.inner.read().await;
        (inner.snapshot.available_dates.clone(), inner.selection.selected())
    }

    pub async fn select_date(&self, date: NaiveDate) -> Result<(), SelectionError> {
        // ---
        let mut inner = self.inner.write().await;
        let available = inner.snapshot.available_dates.clone();
        inner.selection.select(date, &available)
    }

    /// Readings on the selected day, oldest first.
    pub async fn day_view(&self) -> DayView {
        // ---
        let (snapshot, date) = {
            let inner = self.inner.read().await;
            (inner.snapshot.clone(), inner.selection.selected())
        };
        let readings = match date {
            Some(d) => self
                .partitioner
                .readings_on(&snapshot.series, d)
                .into_iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        DayView { date, readings }
    }

    /// Map circles for `channel` on the selected day.
    pub async fn map_points(&self, channel: Channel) -> Vec<MapPoint> {
        let view = self.day_view().await;
        map_points(&view.readings, channel, &self.policy)
    }

    /// Climate and gas charts for the selected day.
    pub async fn charts(&self) -> Charts {
        // ---
        let view = self.day_view().await;
        let readings: Vec<&NormalizedReading> = view.readings.iter().collect();
        build_charts(&readings, self.partitioner.offset(), &self.policy)
    }
}
