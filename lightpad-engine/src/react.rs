//! Per-column press reaction.
//!
//! Two states, no more: a column shows its baseline color while idle and
//! the configured feedback color while its debounced input says pressed.
//! Debouncing happens upstream; this machine consumes only the stable
//! boolean. The baseline is configuration and is never written here — the
//! effective color is derived fresh every time the column is scanned.

use smart_leds::RGB8;

use crate::config::Feedback;
use crate::gamma;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Touch {
    #[default]
    Idle,
    Pressed,
}

impl Touch {
    /// Consume the debounced level. Returns true when the state changed,
    /// i.e. on a press or release edge.
    pub fn update(&mut self, pressed: bool) -> bool {
        let next = if pressed { Touch::Pressed } else { Touch::Idle };
        let changed = next != *self;
        *self = next;
        changed
    }

    /// The color this column should display right now.
    pub fn effective(
        self,
        baseline: RGB8,
        feedback: Feedback,
        table: Option<&[u8; 256]>,
    ) -> RGB8 {
        let shown = match self {
            Touch::Idle => baseline,
            Touch::Pressed => feedback.color(),
        };
        match table {
            Some(table) => gamma::corrected(shown, table),
            None => shown,
        }
    }
}
