//! Ambient loops started at page load that never finish: cursor blink and
//! the hero badge's border hue cycle.

use serde::{Deserialize, Serialize};

use crate::config::RevealConfig;
use crate::ids::LoopId;
use crate::outputs::ChangeOp;
use crate::registry::ElementKey;
use crate::timer::Timer;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    CursorBlink,
    HueCycle,
}

#[derive(Clone, Debug)]
enum LoopState {
    Blink { visible: bool },
    Hue { hue: f32, step: f32 },
}

#[derive(Clone, Debug)]
pub struct AmbientLoop {
    pub id: LoopId,
    pub key: ElementKey,
    timer: Timer,
    state: LoopState,
}

impl AmbientLoop {
    pub fn new(id: LoopId, key: ElementKey, kind: LoopKind, now_ms: u64, cfg: &RevealConfig) -> Self {
        let (period, state) = match kind {
            LoopKind::CursorBlink => (cfg.blink_interval_ms, LoopState::Blink { visible: true }),
            LoopKind::HueCycle => (
                cfg.hue_interval_ms,
                LoopState::Hue {
                    hue: cfg.hue_start,
                    step: cfg.hue_step,
                },
            ),
        };
        Self {
            id,
            key,
            timer: Timer::every(now_ms, period),
            state,
        }
    }

    pub fn next_due(&self) -> Option<u64> {
        self.timer.next_due()
    }

    /// Fire once if due. Returns false when nothing was due. Periods missed
    /// during a long gap (a hidden tab) are dropped, not replayed.
    pub fn fire_one(&mut self, now_ms: u64, out: &mut Vec<ChangeOp>) -> bool {
        if self.timer.poll_skipping(now_ms).is_none() {
            return false;
        }
        match &mut self.state {
            LoopState::Blink { visible } => {
                *visible = !*visible;
                out.push(ChangeOp::style("opacity", if *visible { "1" } else { "0" }));
            }
            LoopState::Hue { hue, step } => {
                *hue = (*hue + *step).rem_euclid(360.0);
                out.push(ChangeOp::style(
                    "border-color",
                    format!("hsla({hue}, 70%, 50%, 0.3)"),
                ));
            }
        }
        true
    }
}
