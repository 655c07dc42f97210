//! Input contracts for the reveal engine.
//!
//! Adapters translate viewport-intersection notifications into these and pass
//! them to RevealEngine::update() together with the elapsed time.

use serde::{Deserialize, Serialize};

use crate::ids::GroupId;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    /// Intersection notifications observed since the previous update.
    #[serde(default)]
    pub intersections: Vec<Intersection>,
}

impl Inputs {
    pub fn visible(group: GroupId, ratio: f32) -> Self {
        Self {
            intersections: vec![Intersection {
                group,
                ratio,
                is_intersecting: true,
            }],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Intersection {
    pub group: GroupId,
    /// Visible fraction of the group's target area.
    pub ratio: f32,
    #[serde(default = "default_true")]
    pub is_intersecting: bool,
}

fn default_true() -> bool {
    true
}
