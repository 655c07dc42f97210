//! Opacity/transform transitions and attribute swaps.

use crate::outputs::ChangeOp;

use super::Next;

/// When the final style lands after the initial one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Settle {
    /// On the next animation frame (the engine's next update).
    NextFrame,
    /// After a fixed hold in ms.
    After(u64),
}

/// Write an initial style, then a final style across a CSS transition.
#[derive(Clone, Debug)]
pub struct StyledReveal {
    initial: Vec<(&'static str, String)>,
    finals: Vec<(&'static str, String)>,
    settle: Settle,
}

impl StyledReveal {
    /// Card fade/slide-up; the transition is set with the initial style.
    pub fn fade_card() -> Self {
        Self {
            initial: vec![
                ("opacity", "0".into()),
                ("transform", "translateY(20px)".into()),
                (
                    "transition",
                    "opacity 0.6s ease-out, transform 0.6s ease-out".into(),
                ),
            ],
            finals: vec![
                ("opacity", "1".into()),
                ("transform", "translateY(0)".into()),
            ],
            settle: Settle::NextFrame,
        }
    }

    pub fn strategy_line() -> Self {
        Self::hidden_then_shown(
            "translateX(-100%)",
            "translateX(0)",
            "opacity 1.5s ease-out, transform 1.5s ease-out",
            300,
        )
    }

    pub fn algo_node(index: usize) -> Self {
        Self::hidden_then_shown(
            "scale(0)",
            "scale(1)",
            "all 0.5s ease-out",
            500 + index as u64 * 200,
        )
    }

    pub fn code_line(index: usize) -> Self {
        Self::hidden_then_shown(
            "translateY(10px)",
            "translateY(0)",
            "all 0.3s ease-out",
            300 + index as u64 * 100,
        )
    }

    fn hidden_then_shown(from: &str, to: &str, transition: &str, hold_ms: u64) -> Self {
        Self {
            initial: vec![("opacity", "0".into()), ("transform", from.into())],
            finals: vec![
                ("transition", transition.into()),
                ("opacity", "1".into()),
                ("transform", to.into()),
            ],
            settle: Settle::After(hold_ms),
        }
    }

    pub fn settle(&self) -> Settle {
        self.settle
    }

    pub(crate) fn begin(&mut self, out: &mut Vec<ChangeOp>) -> Next {
        out.extend(self.initial.iter().map(|(p, v)| ChangeOp::style(p, v.clone())));
        match self.settle {
            Settle::NextFrame => Next::NextFrame,
            Settle::After(ms) => Next::After(ms),
        }
    }

    pub(crate) fn tick(&mut self, out: &mut Vec<ChangeOp>) -> Next {
        out.extend(self.finals.iter().map(|(p, v)| ChangeOp::style(p, v.clone())));
        Next::Done
    }
}

/// Swap a lazy image's real source in and mark it loaded.
#[derive(Clone, Debug)]
pub struct ImageSwap {
    src: String,
}

impl ImageSwap {
    pub fn new(src: &str) -> Self {
        Self {
            src: src.to_string(),
        }
    }

    pub(crate) fn begin(&mut self, out: &mut Vec<ChangeOp>) -> Next {
        out.push(ChangeOp::SetAttribute {
            name: "src".into(),
            value: self.src.clone(),
        });
        out.push(ChangeOp::AddClass {
            class: "loaded".into(),
        });
        Next::Done
    }
}
