//! Scheduled refresh: fetch → normalize → publish.
//!
//! Each cycle draws a ticket before fetching. Cycles driven by [`Refresher::run`]
//! never overlap because the loop awaits one before taking the next tick;
//! manual refreshes can overlap with it, and then the dashboard keeps the
//! result of the newest ticket and drops older ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::dashboard::Dashboard;
use crate::series::build_series;
use crate::source::{FetchError, ReadingSource};

// ---

/// Source of "now" for refresh bookkeeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct Refresher {
    source: Arc<dyn ReadingSource>,
    dashboard: Arc<Dashboard>,
    clock: Arc<dyn Clock>,
    fetch_limit: u32,
    tickets: AtomicU64,
}

impl Refresher {
    pub fn new(
        source: Arc<dyn ReadingSource>,
        dashboard: Arc<Dashboard>,
        clock: Arc<dyn Clock>,
        fetch_limit: u32,
    ) -> Self {
        // ---
        Self {
            source,
            dashboard,
            clock,
            fetch_limit,
            tickets: AtomicU64::new(0),
        }
    }

    /// Run one cycle. Returns the number of readings in the new series.
    ///
    /// On failure the error is logged and recorded, and the previously
    /// published series stays current.
    pub async fn refresh_once(&self) -> Result<usize, FetchError> {
        // ---
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;

        let raw = match self.source.fetch_latest(self.fetch_limit).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    "Refresh #{} from {} failed, keeping last series: {}",
                    ticket,
                    self.source.name(),
                    e
                );
                self.dashboard.record_failure(&e, self.clock.now()).await;
                return Err(e);
            }
        };

        let series = build_series(&raw);
        let count = series.len();
        if self.dashboard.publish(ticket, series, self.clock.now()).await {
            tracing::info!(
                "Refresh #{}: {} raw records -> {} readings",
                ticket,
                raw.len(),
                count
            );
        }
        Ok(count)
    }

    /// Refresh every `period` until `shutdown` turns true or its sender is
    /// dropped. The first cycle runs immediately.
    pub async fn run(self: Arc<Self>, period: Duration, mut shutdown: watch::Receiver<bool>) {
        // ---
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Refreshing from {} every {:?} (limit {})",
            self.source.name(),
            period,
            self.fetch_limit
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    // Errors are already logged and recorded.
                    let _ = self.refresh_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Refresh loop stopped");
    }
}
