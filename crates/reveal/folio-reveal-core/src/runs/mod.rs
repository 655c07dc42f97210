//! Animation runs: the ephemeral per-element state created when a group triggers.
//!
//! Each [`ActiveRun`] owns exactly one [`Timer`] and walks
//! arm → begin → tick… → done. Nothing outside the run touches its timer.

pub mod count_up;
pub mod styled;
pub mod typewriter;

pub use count_up::{CountUp, TickerCount};
pub use styled::{ImageSwap, Settle, StyledReveal};
pub use typewriter::Typewriter;

use crate::config::RevealConfig;
use crate::outputs::ChangeOp;
use crate::registry::{ChartPart, ElementKey, GroupKind, Member, RevealKind};
use crate::timer::Timer;

/// What a run wants after a hook.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Next {
    /// Keep the current timer.
    Continue,
    /// Tick periodically from now.
    Every(u64),
    /// Tick once after a hold.
    After(u64),
    /// Tick on the next frame.
    NextFrame,
    Done,
}

#[derive(Clone, Debug)]
pub enum Run {
    CountUp(CountUp),
    Ticker(TickerCount),
    Typewriter(Typewriter),
    Styled(StyledReveal),
    Image(ImageSwap),
}

impl Run {
    fn arm(&mut self, out: &mut Vec<ChangeOp>) {
        if let Run::Typewriter(t) = self {
            t.arm(out);
        }
    }

    fn begin(&mut self, out: &mut Vec<ChangeOp>) -> Next {
        match self {
            Run::CountUp(c) => c.begin(out),
            Run::Ticker(t) => t.begin(out),
            Run::Typewriter(t) => t.begin(out),
            Run::Styled(s) => s.begin(out),
            Run::Image(i) => i.begin(out),
        }
    }

    fn tick(&mut self, out: &mut Vec<ChangeOp>) -> Next {
        match self {
            Run::CountUp(c) => c.tick(out),
            Run::Ticker(t) => t.tick(out),
            Run::Typewriter(t) => t.tick(out),
            Run::Styled(s) => s.tick(out),
            Run::Image(_) => Next::Done,
        }
    }
}

#[derive(Clone, Debug)]
enum Phase {
    /// Waiting for the group start; arms (e.g. clears text) when due.
    Arming(Timer),
    /// Waiting out the member's stagger.
    Starting(Timer),
    Running(Timer),
    AwaitFrame,
    Done,
}

#[derive(Clone, Debug)]
pub struct ActiveRun {
    pub key: ElementKey,
    run: Run,
    delay_ms: u64,
    phase: Phase,
}

impl ActiveRun {
    /// Create a run whose group starts at `group_start_ms`.
    pub fn new(key: ElementKey, run: Run, group_start_ms: u64, delay_ms: u64) -> Self {
        Self {
            key,
            run,
            delay_ms,
            phase: Phase::Arming(Timer::once(group_start_ms)),
        }
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    pub fn awaits_frame(&self) -> bool {
        matches!(self.phase, Phase::AwaitFrame)
    }

    /// Next timer deadline; None while waiting for a frame or when done.
    pub fn next_due(&self) -> Option<u64> {
        match &self.phase {
            Phase::Arming(t) | Phase::Starting(t) | Phase::Running(t) => t.next_due(),
            Phase::AwaitFrame | Phase::Done => None,
        }
    }

    /// Fire the run's timer once if due at `now_ms`. Returns false when nothing was due.
    pub fn fire_one(&mut self, now_ms: u64, out: &mut Vec<ChangeOp>) -> bool {
        let (at, next) = match &mut self.phase {
            Phase::Arming(t) => match t.poll(now_ms) {
                Some(at) => {
                    self.run.arm(out);
                    self.phase = Phase::Starting(Timer::once(at.saturating_add(self.delay_ms)));
                    return true;
                }
                None => return false,
            },
            Phase::Starting(t) => match t.poll(now_ms) {
                Some(at) => (at, self.run.begin(out)),
                None => return false,
            },
            Phase::Running(t) => match t.poll(now_ms) {
                Some(at) => (at, self.run.tick(out)),
                None => return false,
            },
            Phase::AwaitFrame | Phase::Done => return false,
        };
        self.apply(at, next);
        true
    }

    /// Deliver an animation frame to a run waiting on one.
    pub fn frame(&mut self, now_ms: u64, out: &mut Vec<ChangeOp>) {
        if self.awaits_frame() {
            let next = self.run.tick(out);
            self.apply(now_ms, next);
        }
    }

    fn apply(&mut self, at: u64, next: Next) {
        match next {
            Next::Continue => {
                if let Phase::Running(t) = &self.phase {
                    if t.is_cancelled() {
                        self.phase = Phase::Done;
                    }
                }
            }
            Next::Every(p) => self.phase = Phase::Running(Timer::every(at, p)),
            Next::After(ms) => self.phase = Phase::Running(Timer::once(at.saturating_add(ms))),
            Next::NextFrame => self.phase = Phase::AwaitFrame,
            Next::Done => {
                if let Phase::Running(t) = &mut self.phase {
                    t.cancel();
                }
                self.phase = Phase::Done;
            }
        }
    }
}

/// Build the run for a member and its stagger delay relative to the group start.
pub fn plan(member: &Member, group: GroupKind, cfg: &RevealConfig) -> (Run, u64) {
    let idx = member.index as u64;
    match &member.kind {
        RevealKind::Counter {
            target,
            prefix,
            suffix,
        } => (
            Run::CountUp(CountUp::new(
                target,
                prefix,
                suffix,
                cfg.counter_ticks,
                cfg.counter_tick_ms(),
            )),
            idx * cfg.counter_stagger_ms,
        ),
        RevealKind::TickerMetric {
            target,
            original_text,
        } => (
            Run::Ticker(TickerCount::new(
                target,
                original_text,
                cfg.ticker_duration_ms,
                cfg.ticker_frame_ms,
            )),
            0,
        ),
        RevealKind::TypedText { text } => match group {
            GroupKind::Commands => (Run::Typewriter(Typewriter::new(text, cfg.command_tick_ms)), 0),
            _ => (
                Run::Typewriter(Typewriter::new(text, cfg.typed_tick_ms)),
                idx * cfg.typed_stagger_ms,
            ),
        },
        RevealKind::FadeCard => (
            Run::Styled(StyledReveal::fade_card()),
            idx * cfg.fade_stagger_ms,
        ),
        RevealKind::ChartNode { part } => {
            let styled = match part {
                ChartPart::StrategyLine => StyledReveal::strategy_line(),
                ChartPart::AlgoNode => StyledReveal::algo_node(member.index),
                ChartPart::CodeLine => StyledReveal::code_line(member.index),
            };
            (Run::Styled(styled), 0)
        }
        RevealKind::LazyImage { src } => (Run::Image(ImageSwap::new(src)), 0),
    }
}

/// Delay between a group's trigger and its start.
pub fn group_delay(kind: GroupKind, cfg: &RevealConfig) -> u64 {
    match kind {
        GroupKind::Commands => cfg.command_delay_ms,
        GroupKind::Chart => cfg.chart_delay_ms,
        GroupKind::Metrics | GroupKind::Fade | GroupKind::LazyImage => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_then_stagger_then_tick() {
        let mut run = ActiveRun::new(
            "t".into(),
            Run::Typewriter(Typewriter::new("ab", 50)),
            0,
            100,
        );
        let mut ops = Vec::new();
        assert!(run.fire_one(0, &mut ops));
        assert_eq!(ops, vec![ChangeOp::text("")]);
        assert_eq!(run.next_due(), Some(100));
        assert!(!run.fire_one(99, &mut ops));
        assert!(run.fire_one(100, &mut ops));
        assert_eq!(run.next_due(), Some(150));
        while run.fire_one(1_000, &mut ops) {}
        assert!(run.is_done());
        assert_eq!(ops.last(), Some(&ChangeOp::text("ab")));
    }

    #[test]
    fn fade_waits_for_a_frame() {
        let mut run = ActiveRun::new("c".into(), Run::Styled(StyledReveal::fade_card()), 0, 0);
        let mut ops = Vec::new();
        while run.fire_one(0, &mut ops) {}
        assert!(run.awaits_frame());
        assert_eq!(run.next_due(), None);
        run.frame(16, &mut ops);
        assert!(run.is_done());
    }

    #[test]
    fn counters_stagger_by_index() {
        let cfg = RevealConfig::default();
        let member = Member {
            key: "m".into(),
            kind: RevealKind::Counter {
                target: "10".into(),
                prefix: String::new(),
                suffix: String::new(),
            },
            index: 3,
        };
        let (_, delay) = plan(&member, GroupKind::Metrics, &cfg);
        assert_eq!(delay, 600);
    }
}
