//! Viewport auto-focus.
//!
//! The map centers on the most recent reading with a real GPS fix. A move
//! command is emitted only when that point actually changes, so polling
//! every few seconds does not keep yanking the viewport around.

use serde::Serialize;

use crate::models::Position;
use crate::series::Series;
use crate::validity::is_valid_position;

// ---

/// Center of São Paulo, used until any reading has a GPS fix.
pub const DEFAULT_FALLBACK: Position = Position::new(-23.5505, -46.6333);

/// Where the viewport should be centered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Focus {
    /// Position of the most recent reading with a valid fix.
    Reading(Position),
    /// No reading has a valid fix.
    Fallback(Position),
}

impl Focus {
    pub fn position(&self) -> Position {
        // ---
        match self {
            Focus::Reading(p) | Focus::Fallback(p) => *p,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Focus::Fallback(_))
    }
}

/// Pick the focus point for `series` (descending order).
pub fn focus_point(series: &Series, fallback: Position) -> Focus {
    // ---
    series
        .descending()
        .iter()
        .find(|r| is_valid_position(r.latitude, r.longitude))
        .and_then(|r| Some(Focus::Reading(Position::new(r.latitude?, r.longitude?))))
        .unwrap_or(Focus::Fallback(fallback))
}

/// Command to move the viewport. `seq` increases with every command so a
/// polling client can tell a new command from one it already applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveViewport {
    pub seq: u64,
    pub to: Position,
}

/// Debounces move commands by coordinate equality.
#[derive(Debug, Clone)]
pub struct FocusTracker {
    fallback: Position,
    last_emitted: Option<Position>,
    seq: u64,
}

impl FocusTracker {
    pub fn new(fallback: Position) -> Self {
        // ---
        Self {
            fallback,
            last_emitted: None,
            seq: 0,
        }
    }

    pub fn fallback(&self) -> Position {
        self.fallback
    }

    /// Compute the focus for a freshly published series and return a move
    /// command if the point differs from the last one emitted.
    pub fn observe(&mut self, series: &Series) -> (Focus, Option<MoveViewport>) {
        // ---
        let focus = focus_point(series, self.fallback);

        if series.is_empty() && focus.is_fallback() {
            return (focus, None);
        }

        let to = focus.position();
        if self.last_emitted == Some(to) {
            return (focus, None);
        }

        self.last_emitted = Some(to);
        self.seq += 1;
        tracing::debug!("Viewport move #{} to ({}, {})", self.seq, to.lat, to.lng);
        (focus, Some(MoveViewport { seq: self.seq, to }))
    }
}
