//! Numeric count-ups.

use crate::format::{format_thousands, parse_target};
use crate::outputs::ChangeOp;

use super::Next;

/// Terminal-metric count-up: a fixed number of integer steps toward the target.
///
/// The step is `max(1, floor(target / ticks))`, so the duration stays constant
/// regardless of the target's magnitude.
#[derive(Clone, Debug)]
pub struct CountUp {
    target: i64,
    step: i64,
    current: i64,
    prefix: String,
    suffix: String,
    tick_ms: u64,
}

impl CountUp {
    pub fn new(raw_target: &str, prefix: &str, suffix: &str, ticks: u64, tick_ms: u64) -> Self {
        let target = parse_target(raw_target);
        let divisor = i64::try_from(ticks.max(1)).unwrap_or(i64::MAX);
        Self {
            target,
            step: (target / divisor).max(1),
            current: 0,
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            tick_ms,
        }
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub(crate) fn begin(&mut self, out: &mut Vec<ChangeOp>) -> Next {
        out.push(ChangeOp::text("0"));
        Next::Every(self.tick_ms)
    }

    pub(crate) fn tick(&mut self, out: &mut Vec<ChangeOp>) -> Next {
        self.current = self.current.saturating_add(self.step);
        let done = self.current >= self.target;
        if done {
            self.current = self.target;
        }
        out.push(ChangeOp::text(format!(
            "{}{}{}",
            self.prefix,
            format_thousands(self.current),
            self.suffix
        )));
        if done {
            Next::Done
        } else {
            Next::Continue
        }
    }
}

/// Ticker-metric count-up: a fractional increment per display frame, shown floored.
#[derive(Clone, Debug)]
pub struct TickerCount {
    target: f64,
    increment: f64,
    current: f64,
    keep_plus: bool,
    frame_ms: u64,
}

impl TickerCount {
    pub fn new(raw_target: &str, original_text: &str, duration_ms: u64, frame_ms: u64) -> Self {
        let target = parse_target(raw_target) as f64;
        let frames = duration_ms as f64 / frame_ms.max(1) as f64;
        let increment = if frames > 0.0 { target / frames } else { target };
        Self {
            target,
            increment,
            current: 0.0,
            keep_plus: original_text.contains('+'),
            frame_ms,
        }
    }

    pub(crate) fn begin(&mut self, _out: &mut Vec<ChangeOp>) -> Next {
        Next::Every(self.frame_ms)
    }

    pub(crate) fn tick(&mut self, out: &mut Vec<ChangeOp>) -> Next {
        self.current += self.increment;
        let done = self.current >= self.target;
        if done {
            self.current = self.target;
        }
        let shown = format_thousands(self.current.floor() as i64);
        let text = if self.keep_plus {
            format!("{shown}+")
        } else {
            shown
        };
        out.push(ChangeOp::text(text));
        if done {
            Next::Done
        } else {
            Next::Continue
        }
    }
}
