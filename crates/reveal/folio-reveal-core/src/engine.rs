//! RevealEngine: registry ownership, once-only triggering and the step loop.
//!
//! Methods:
//! - new, start_loop, trigger, update (frames → inputs → advance clock → fire due timers)

use crate::config::RevealConfig;
use crate::error::RevealError;
use crate::ids::{GroupId, IdAllocator, LoopId};
use crate::inputs::{Inputs, Intersection};
use crate::loops::{AmbientLoop, LoopKind};
use crate::outputs::{Outputs, RevealEvent};
use crate::registry::{ElementKey, GroupKind, Registry, Trigger};
use crate::runs::{group_delay, plan, ActiveRun};

#[derive(Debug)]
pub struct RevealEngine {
    cfg: RevealConfig,
    registry: Registry,
    /// Indexed by GroupId; a released group never triggers again.
    released: Vec<bool>,
    now_ms: u64,
    loaded: bool,
    ids: IdAllocator,
    runs: Vec<ActiveRun>,
    loops: Vec<AmbientLoop>,
    outputs: Outputs,
    /// Events raised between updates (manual triggers, loop starts).
    pending: Vec<RevealEvent>,
    scratch: Vec<crate::outputs::ChangeOp>,
}

impl RevealEngine {
    /// Create an engine over a registry built at page init.
    pub fn new(cfg: RevealConfig, registry: Registry) -> Result<Self, RevealError> {
        cfg.validate()?;
        let released = vec![false; registry.len()];
        Ok(Self {
            cfg,
            registry,
            released,
            now_ms: 0,
            loaded: false,
            ids: IdAllocator::new(),
            runs: Vec::new(),
            loops: Vec::new(),
            outputs: Outputs::default(),
            pending: Vec::new(),
            scratch: Vec::new(),
        })
    }

    pub fn config(&self) -> &RevealConfig {
        &self.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Engine clock in ms since construction.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_released(&self, group: GroupId) -> bool {
        self.released.get(group.0 as usize).copied().unwrap_or(false)
    }

    /// Number of reveal runs still animating.
    pub fn active_runs(&self) -> usize {
        self.runs.len()
    }

    /// Viewport threshold for a group kind.
    pub fn threshold(&self, kind: GroupKind) -> f32 {
        match kind {
            GroupKind::Metrics | GroupKind::Commands => self.cfg.metrics_threshold,
            GroupKind::Fade => self.cfg.fade_threshold,
            GroupKind::Chart => self.cfg.chart_threshold,
            GroupKind::LazyImage => self.cfg.lazy_image_threshold,
        }
    }

    /// Start an ambient loop on an element; it ticks from the current clock.
    pub fn start_loop(&mut self, key: impl Into<ElementKey>, kind: LoopKind) -> LoopId {
        let id = self.ids.alloc_loop();
        self.loops.push(AmbientLoop::new(
            id,
            key.into(),
            kind,
            self.now_ms,
            &self.cfg,
        ));
        self.pending.push(RevealEvent::LoopStarted { id });
        id
    }

    /// Trigger a group now, bypassing the viewport check. Returns false if it
    /// was already released or does not exist.
    pub fn trigger(&mut self, group: GroupId) -> bool {
        let Some(entry) = self.registry.group(group) else {
            log::debug!("trigger: unknown group {group:?}");
            return false;
        };
        let Some(flag) = self.released.get_mut(group.0 as usize) else {
            return false;
        };
        if *flag {
            return false;
        }
        *flag = true;

        let start = self.now_ms.saturating_add(group_delay(entry.spec.kind, &self.cfg));
        for member in &entry.members {
            let (run, delay) = plan(member, entry.spec.kind, &self.cfg);
            self.runs
                .push(ActiveRun::new(member.key.clone(), run, start, delay));
        }
        log::debug!(
            "group {:?} ({:?}) triggered at {}ms with {} member(s)",
            group,
            entry.spec.kind,
            self.now_ms,
            entry.members.len()
        );
        self.pending.push(RevealEvent::GroupTriggered {
            group,
            at_ms: self.now_ms,
        });
        self.pending.push(RevealEvent::Unobserve { group });
        true
    }

    fn apply_intersection(&mut self, i: &Intersection) {
        let Some(entry) = self.registry.group(i.group) else {
            log::debug!("ignoring intersection for unknown group {:?}", i.group);
            return;
        };
        if entry.spec.trigger != Trigger::Visible {
            log::debug!("ignoring intersection for load-triggered group {:?}", i.group);
            return;
        }
        let threshold = self.threshold(entry.spec.kind);
        if i.is_intersecting && i.ratio.is_finite() && i.ratio >= threshold {
            self.trigger(i.group);
        }
    }

    /// Step by `dt_ms` with the intersections observed since the last call.
    pub fn update(&mut self, dt_ms: u64, inputs: Inputs) -> &Outputs {
        self.outputs.clear();

        // 1) Frame callbacks requested during the previous step
        for run in self.runs.iter_mut().filter(|r| r.awaits_frame()) {
            self.scratch.clear();
            run.frame(self.now_ms, &mut self.scratch);
            for op in self.scratch.drain(..) {
                self.outputs.push_change(&run.key, op);
            }
        }

        // 2) Load triggers, then viewport signals
        if !self.loaded {
            self.loaded = true;
            let on_load: Vec<GroupId> = self
                .registry
                .groups()
                .filter(|g| g.spec.trigger == Trigger::Load)
                .map(|g| g.id)
                .collect();
            for g in on_load {
                self.trigger(g);
            }
        }
        for i in &inputs.intersections {
            self.apply_intersection(i);
        }
        self.outputs.events.append(&mut self.pending);

        // 3) Advance the clock and fire due timers in deadline order
        self.now_ms = self.now_ms.saturating_add(dt_ms);
        self.fire_due();

        // 4) Drop finished runs
        let now = self.now_ms;
        let outputs = &mut self.outputs;
        self.runs.retain(|r| {
            if r.is_done() {
                log::debug!("reveal of '{}' finished", r.key);
                outputs.push_event(RevealEvent::RevealFinished {
                    key: r.key.clone(),
                    at_ms: now,
                });
                false
            } else {
                true
            }
        });

        &self.outputs
    }

    fn fire_due(&mut self) {
        let now = self.now_ms;
        loop {
            let run_next = self
                .runs
                .iter()
                .enumerate()
                .filter_map(|(i, r)| r.next_due().filter(|d| *d <= now).map(|d| (d, i)))
                .min();
            let loop_next = self
                .loops
                .iter()
                .enumerate()
                .filter_map(|(i, l)| l.next_due().filter(|d| *d <= now).map(|d| (d, i)))
                .min();

            self.scratch.clear();
            let key = match (run_next, loop_next) {
                (Some((rd, ri)), Some((ld, _))) if rd <= ld => {
                    let run = &mut self.runs[ri];
                    run.fire_one(now, &mut self.scratch);
                    run.key.clone()
                }
                (Some((_, ri)), None) => {
                    let run = &mut self.runs[ri];
                    run.fire_one(now, &mut self.scratch);
                    run.key.clone()
                }
                (_, Some((_, li))) => {
                    let l = &mut self.loops[li];
                    l.fire_one(now, &mut self.scratch);
                    l.key.clone()
                }
                (None, None) => break,
            };
            for op in self.scratch.drain(..) {
                self.outputs.push_change(&key, op);
            }
        }
    }
}
