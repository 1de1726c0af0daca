//! Raw sense-line levels to a stable pressed/released signal.
//!
//! Mechanical contacts bounce for a while after every edge. Under the
//! window policy a press only counts once the line has stayed active for
//! the whole debounce window; a release is trusted immediately, so there
//! is no released-side filtering. The immediate policy skips filtering
//! entirely and simply remembers the previous level — simpler, cheaper,
//! and bounce-prone (see [`DebouncePolicy::Immediate`]).

use crate::config::DebouncePolicy;

/// Per-column debounce state.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    policy: DebouncePolicy,
    pressed: bool,
    /// First active sample of a pending press, window policy only.
    pending_since: Option<u64>,
}

impl Debouncer {
    pub const fn new(policy: DebouncePolicy) -> Self {
        Self {
            policy,
            pressed: false,
            pending_since: None,
        }
    }

    /// Feed one raw sample taken at `now_us`; returns the debounced
    /// pressed state. Only call this while the column is the active scan
    /// slot, so the sample actually belongs to this column.
    pub fn update(&mut self, active: bool, now_us: u64) -> bool {
        match self.policy {
            DebouncePolicy::Immediate => {
                self.pressed = active;
            }
            DebouncePolicy::Window { us } => {
                if active {
                    let since = *self.pending_since.get_or_insert(now_us);
                    if now_us.saturating_sub(since) >= us {
                        self.pressed = true;
                    }
                } else {
                    // A bouncing press restarts its window from the next
                    // active sample.
                    self.pending_since = None;
                    self.pressed = false;
                }
            }
        }
        self.pressed
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}
