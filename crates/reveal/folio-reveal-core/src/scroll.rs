//! Scroll-driven helpers: max scroll depth, hero parallax and ticker speed.

use serde::{Deserialize, Serialize};

/// Parallax factor applied to the hero section.
pub const PARALLAX_SPEED: f64 = 0.5;
/// Ticker marquee speed in px per second.
pub const TICKER_PX_PER_SEC: f64 = 50.0;

/// Monotonic maximum scroll depth in whole percent. Single writer: scroll samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollDepth {
    max_percent: u32,
}

impl ScrollDepth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scroll sample and return the (possibly unchanged) max.
    pub fn record(&mut self, scroll_y: f64, viewport_h: f64, document_h: f64) -> u32 {
        if !(document_h.is_finite() && document_h > 0.0) {
            return self.max_percent;
        }
        let pct = ((scroll_y + viewport_h) / document_h * 100.0).floor();
        if pct.is_finite() && pct > 0.0 {
            let pct = pct.min(f64::from(u32::MAX)) as u32;
            self.max_percent = self.max_percent.max(pct);
        }
        self.max_percent
    }

    pub fn max_percent(&self) -> u32 {
        self.max_percent
    }
}

/// Transform for the hero at the given scroll offset.
pub fn parallax_transform(scroll_y: f64) -> String {
    format!("translateY({}px)", scroll_y * PARALLAX_SPEED)
}

/// Marquee duration in seconds when the ticker content overflows its container.
pub fn ticker_duration(content_width: f64, container_width: f64) -> Option<f64> {
    (content_width > container_width).then(|| content_width / TICKER_PX_PER_SEC)
}
