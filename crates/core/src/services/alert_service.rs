use crate::models::notice::{DismissTiming, Notice};

/// Where an alert is in its show → slide up → close lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertPhase {
    Visible,
    /// Sliding away; `progress` runs from 0.0 towards 1.0.
    Closing { progress: f64 },
    Closed,
}

impl DismissTiming {
    /// Phase of an alert `elapsed_ms` after it was shown.
    pub fn phase_at(&self, elapsed_ms: u64) -> AlertPhase {
        if elapsed_ms >= self.total_ms() {
            AlertPhase::Closed
        } else if elapsed_ms < self.delay_ms {
            AlertPhase::Visible
        } else {
            let into_slide = (elapsed_ms - self.delay_ms) as f64;
            AlertPhase::Closing {
                progress: into_slide / self.slide_ms as f64,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertId(u64);

/// A notice that has been put on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAlert {
    pub id: AlertId,
    pub notice: Notice,
    pub posted_at_ms: u64,
}

impl ActiveAlert {
    pub fn phase(&self, now_ms: u64) -> AlertPhase {
        self.notice
            .timing
            .phase_at(now_ms.saturating_sub(self.posted_at_ms))
    }
}

/// Tracks on-screen notices against a caller-supplied millisecond clock.
///
/// Pure bookkeeping: the caller owns the clock and the rendering.
#[derive(Debug, Default)]
pub struct AlertBoard {
    alerts: Vec<ActiveAlert>,
    next_id: u64,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a notice as of `now_ms`. Ids are never reused.
    pub fn post(&mut self, notice: Notice, now_ms: u64) -> AlertId {
        self.next_id += 1;
        let id = AlertId(self.next_id);
        self.alerts.push(ActiveAlert {
            id,
            notice,
            posted_at_ms: now_ms,
        });
        id
    }

    /// Drop every alert that has finished closing and return them, oldest first.
    pub fn sweep(&mut self, now_ms: u64) -> Vec<ActiveAlert> {
        let (closed, open): (Vec<_>, Vec<_>) = std::mem::take(&mut self.alerts)
            .into_iter()
            .partition(|a| a.phase(now_ms) == AlertPhase::Closed);
        self.alerts = open;
        closed
    }

    /// Alerts still on screen at `now_ms`, with their phase.
    pub fn visible(&self, now_ms: u64) -> Vec<(&ActiveAlert, AlertPhase)> {
        self.alerts
            .iter()
            .map(|a| (a, a.phase(now_ms)))
            .filter(|(_, phase)| *phase != AlertPhase::Closed)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
