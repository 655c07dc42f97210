//! Cancellable timers on the engine's deterministic millisecond clock.
//!
//! A timer is owned by exactly one run or loop. It never reads wall time:
//! the owner polls it with the engine's current `now`, and each due deadline
//! is yielded once, so a large `dt` catches up tick by tick. Endless owners
//! use `poll_skipping` to drop periods missed while the host was suspended.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    due_ms: u64,
    period_ms: Option<u64>,
    cancelled: bool,
}

impl Timer {
    /// Fire once at `at_ms`.
    pub fn once(at_ms: u64) -> Self {
        Self {
            due_ms: at_ms,
            period_ms: None,
            cancelled: false,
        }
    }

    /// Fire every `period_ms`, first at `start_ms + period_ms` (setInterval semantics).
    pub fn every(start_ms: u64, period_ms: u64) -> Self {
        let period_ms = period_ms.max(1);
        Self {
            due_ms: start_ms.saturating_add(period_ms),
            period_ms: Some(period_ms),
            cancelled: false,
        }
    }

    /// Deadline of the next firing, or None once cancelled/spent.
    pub fn next_due(&self) -> Option<u64> {
        if self.cancelled {
            None
        } else {
            Some(self.due_ms)
        }
    }

    /// Yield the next deadline at or before `now_ms`, re-arming periodic timers.
    pub fn poll(&mut self, now_ms: u64) -> Option<u64> {
        if self.cancelled || self.due_ms > now_ms {
            return None;
        }
        let fired = self.due_ms;
        match self.period_ms {
            Some(p) => self.due_ms = self.due_ms.saturating_add(p),
            None => self.cancelled = true,
        }
        Some(fired)
    }

    /// Like `poll`, but a periodic timer that fell several periods behind
    /// fires once and re-arms at the first period after `now_ms`.
    pub fn poll_skipping(&mut self, now_ms: u64) -> Option<u64> {
        let fired = self.poll(now_ms)?;
        if let Some(p) = self.period_ms {
            if self.due_ms <= now_ms {
                let behind = (now_ms - self.due_ms) / p + 1;
                self.due_ms = self.due_ms.saturating_add(behind.saturating_mul(p));
            }
        }
        Some(fired)
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
