//! Character-by-character text reveal.

use crate::outputs::ChangeOp;

use super::Next;

#[derive(Clone, Debug)]
pub struct Typewriter {
    source: Vec<char>,
    shown: String,
    tick_ms: u64,
}

impl Typewriter {
    pub fn new(text: &str, tick_ms: u64) -> Self {
        Self {
            source: text.chars().collect(),
            shown: String::with_capacity(text.len()),
            tick_ms,
        }
    }

    /// Clear the element as soon as the group starts, before any stagger.
    pub(crate) fn arm(&mut self, out: &mut Vec<ChangeOp>) {
        out.push(ChangeOp::text(""));
    }

    pub(crate) fn begin(&mut self, _out: &mut Vec<ChangeOp>) -> Next {
        Next::Every(self.tick_ms)
    }

    /// Tick k shows the first k characters; the tick after the last one stops.
    pub(crate) fn tick(&mut self, out: &mut Vec<ChangeOp>) -> Next {
        let typed = self.shown.chars().count();
        match self.source.get(typed) {
            Some(ch) => {
                self.shown.push(*ch);
                out.push(ChangeOp::text(self.shown.clone()));
                Next::Continue
            }
            None => Next::Done,
        }
    }
}
