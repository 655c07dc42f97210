//! Timing constants and thresholds for the reveal engine.

use serde::{Deserialize, Serialize};

use crate::error::RevealError;

/// Configuration for reveal timings and viewport thresholds.
/// Defaults reproduce the portfolio page; every field may be overridden from JSON.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RevealConfig {
    /// Terminal-metric count-up duration (ms). Ticks every `duration / counter_ticks`.
    pub counter_duration_ms: u64,
    /// Number of ticks a count-up is divided into; also the step divisor.
    pub counter_ticks: u64,
    /// Per-sibling delay for terminal metrics.
    pub counter_stagger_ms: u64,

    /// Ticker-metric count-up duration (ms).
    pub ticker_duration_ms: u64,
    /// Ticker-metric frame tick (ms).
    pub ticker_frame_ms: u64,

    /// Typewriter tick for metric boxes.
    pub typed_tick_ms: u64,
    /// Per-sibling delay for metric-box typewriters.
    pub typed_stagger_ms: u64,
    /// Typewriter tick for terminal command lines.
    pub command_tick_ms: u64,
    /// Delay between page load and command-line typing.
    pub command_delay_ms: u64,

    /// Per-sibling delay for fade cards.
    pub fade_stagger_ms: u64,
    /// Delay between a chart container becoming visible and its parts animating.
    pub chart_delay_ms: u64,

    /// Visible-area fractions required to trigger each group kind.
    pub metrics_threshold: f32,
    pub fade_threshold: f32,
    pub chart_threshold: f32,
    pub lazy_image_threshold: f32,

    /// Cursor blink half-period (ms).
    pub blink_interval_ms: u64,
    /// Hero badge hue cycle tick (ms).
    pub hue_interval_ms: u64,
    /// Degrees added to the badge hue per tick.
    pub hue_step: f32,
    /// Initial badge hue (cyan).
    pub hue_start: f32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            counter_duration_ms: 1000,
            counter_ticks: 30,
            counter_stagger_ms: 200,
            ticker_duration_ms: 2000,
            ticker_frame_ms: 16,
            typed_tick_ms: 50,
            typed_stagger_ms: 100,
            command_tick_ms: 30,
            command_delay_ms: 500,
            fade_stagger_ms: 100,
            chart_delay_ms: 300,
            metrics_threshold: 0.2,
            fade_threshold: 0.1,
            chart_threshold: 0.2,
            lazy_image_threshold: 0.0,
            blink_interval_ms: 530,
            hue_interval_ms: 50,
            hue_step: 0.5,
            hue_start: 180.0,
        }
    }
}

impl RevealConfig {
    /// Parse a JSON config (missing fields fall back to defaults) and validate it.
    pub fn from_json_str(s: &str) -> Result<Self, RevealError> {
        let cfg: RevealConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject thresholds outside [0, 1] and zero-length ticks or durations.
    pub fn validate(&self) -> Result<(), RevealError> {
        let thresholds = [
            ("metrics_threshold", self.metrics_threshold),
            ("fade_threshold", self.fade_threshold),
            ("chart_threshold", self.chart_threshold),
            ("lazy_image_threshold", self.lazy_image_threshold),
        ];
        for (name, t) in thresholds {
            if !t.is_finite() || !(0.0..=1.0).contains(&t) {
                log::warn!("rejecting {name}={t}");
                return Err(RevealError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {t}"
                )));
            }
        }

        let periods = [
            ("counter_duration_ms", self.counter_duration_ms),
            ("counter_ticks", self.counter_ticks),
            ("ticker_duration_ms", self.ticker_duration_ms),
            ("ticker_frame_ms", self.ticker_frame_ms),
            ("typed_tick_ms", self.typed_tick_ms),
            ("command_tick_ms", self.command_tick_ms),
            ("blink_interval_ms", self.blink_interval_ms),
            ("hue_interval_ms", self.hue_interval_ms),
        ];
        for (name, v) in periods {
            if v == 0 {
                log::warn!("rejecting {name}=0");
                return Err(RevealError::InvalidConfig(format!("{name} must be > 0")));
            }
        }

        if !self.hue_step.is_finite() || !self.hue_start.is_finite() {
            return Err(RevealError::InvalidConfig(
                "hue_step and hue_start must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Tick interval for terminal-metric count-ups (never below 1 ms).
    pub fn counter_tick_ms(&self) -> u64 {
        (self.counter_duration_ms / self.counter_ticks.max(1)).max(1)
    }
}
