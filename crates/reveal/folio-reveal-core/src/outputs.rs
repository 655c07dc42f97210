//! Output contracts from the reveal engine.
//!
//! Outputs carry the element writes for this step, keyed by the host element
//! key, and a separate list of lifecycle events. Adapters apply changes to the
//! DOM in order.

use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, LoopId};
use crate::registry::ElementKey;

/// One write to a host element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ChangeOp {
    SetText { text: String },
    SetStyle { property: String, value: String },
    SetAttribute { name: String, value: String },
    AddClass { class: String },
}

impl ChangeOp {
    pub fn text(text: impl Into<String>) -> Self {
        ChangeOp::SetText { text: text.into() }
    }

    pub fn style(property: &str, value: impl Into<String>) -> Self {
        ChangeOp::SetStyle {
            property: property.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub key: ElementKey,
    pub op: ChangeOp,
}

/// Lifecycle signals emitted during stepping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RevealEvent {
    /// The group's reveal started; it will never trigger again.
    GroupTriggered { group: GroupId, at_ms: u64 },
    /// The host should stop observing the group's target.
    Unobserve { group: GroupId },
    /// A member's animation reached its final state.
    RevealFinished { key: ElementKey, at_ms: u64 },
    LoopStarted { id: LoopId },
}

/// Outputs returned by RevealEngine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<RevealEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, key: &str, op: ChangeOp) {
        self.changes.push(Change {
            key: key.to_string(),
            op,
        });
    }

    #[inline]
    pub fn push_event(&mut self, event: RevealEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Last text written to `key` this step, if any.
    pub fn last_text(&self, key: &str) -> Option<&str> {
        self.changes.iter().rev().find_map(|c| match &c.op {
            ChangeOp::SetText { text } if c.key == key => Some(text.as_str()),
            _ => None,
        })
    }
}
