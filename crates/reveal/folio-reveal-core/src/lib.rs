//! Folio Reveal Core (DOM-agnostic)
//!
//! One-shot, visibility-triggered reveal effects for the portfolio page:
//! count-ups, typewriter text, fade/slide cards, chart transitions and lazy
//! images, plus the ambient loops and scroll helpers that run beside them.
//! Hosts (the wasm adapter, tests) feed intersection signals and elapsed
//! time into [`RevealEngine::update`] and apply the returned [`Outputs`].

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod ids;
pub mod inputs;
pub mod loops;
pub mod outputs;
pub mod registry;
pub mod runs;
pub mod scroll;
pub mod timer;

// Re-exports for consumers (adapters)
pub use config::RevealConfig;
pub use engine::RevealEngine;
pub use error::RevealError;
pub use format::{format_thousands, parse_target};
pub use ids::{GroupId, LoopId};
pub use inputs::{Inputs, Intersection};
pub use loops::LoopKind;
pub use outputs::{Change, ChangeOp, Outputs, RevealEvent};
pub use registry::{
    ChartPart, ElementKey, GroupKind, GroupSpec, Member, Registry, RegistryBuilder, RevealKind,
    Trigger,
};
pub use scroll::{parallax_transform, ticker_duration, ScrollDepth};
pub use timer::Timer;
