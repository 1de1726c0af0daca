//! Per-channel duty-cycle evaluation.
//!
//! A channel has no analog drive, only on/off, so brightness is faked by
//! deciding at every visit whether the channel should be electrically on
//! *at this instant*. Time is treated as a repeating 256 µs ramp; a
//! channel is on while the ramp phase sits inside a leading-edge window
//! proportional to its brightness value. Averaged over many ramps the
//! on-fraction tracks `level / 255`, which the eye reads as dimming.
//!
//! Multiplexing complicates this: a column's LEDs are forced dark the
//! whole time the other columns hold the bus. The evaluator therefore
//! widens the window by the gap since the column's last committed frame,
//! paying back the dark time and restoring the intended average duty
//! cycle. The payback term is a heuristic, calibrated for a four-column
//! panel; retune it against the real LEDs if the column count changes.

/// Length of the repeating phase ramp, in microseconds.
pub const PHASE_PERIOD_US: u64 = 256;

/// Should this channel be electrically on at `now_us`?
///
/// Pure function of the brightness level, the current time, and the time
/// of the column's previous committed frame. `255` is always on — the
/// window would fold back to the ramp length, so it is pinned explicitly
/// to keep full brightness from ever flickering off. `0` is always off.
pub fn is_on(level: u8, now_us: u64, last_us: u64) -> bool {
    if level == 0 {
        return false;
    }
    if level == u8::MAX {
        return true;
    }
    let gap = now_us.saturating_sub(last_us);
    let window = u64::from(level) + 1 + gap;
    now_us % PHASE_PERIOD_US < window
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    /// On-fraction over one full ramp with no multiplexing gap.
    fn on_fraction(level: u8) -> f64 {
        let on = (0..PHASE_PERIOD_US).filter(|&t| is_on(level, t, t)).count();
        on as f64 / PHASE_PERIOD_US as f64
    }

    #[test]
    fn zero_never_lights() {
        for t in 0..4 * PHASE_PERIOD_US {
            assert!(!is_on(0, t, t.saturating_sub(40)));
        }
    }

    #[test]
    fn full_never_flickers() {
        for t in 0..4 * PHASE_PERIOD_US {
            assert!(is_on(255, t, t));
            assert!(is_on(255, t, t.saturating_sub(1000)));
        }
    }

    #[test]
    fn intermediate_levels_produce_both_states() {
        for level in 1..=254u8 {
            let mut saw_on = false;
            let mut saw_off = false;
            for t in 0..PHASE_PERIOD_US {
                if is_on(level, t, t) {
                    saw_on = true;
                } else {
                    saw_off = true;
                }
            }
            assert!(saw_on, "level {level} never switched on");
            assert!(saw_off, "level {level} never switched off");
        }
    }

    #[test]
    fn on_fraction_tracks_level() {
        for level in [1u8, 20, 64, 127, 200, 254] {
            let want = f64::from(level) / 255.0;
            let got = on_fraction(level);
            assert!(
                (got - want).abs() < 0.01,
                "level {level}: fraction {got} vs {want}"
            );
        }
    }

    #[test]
    fn gap_only_widens_the_window() {
        for level in [1u8, 10, 100, 200] {
            for t in 0..PHASE_PERIOD_US {
                if is_on(level, t, t) {
                    assert!(is_on(level, t, t.saturating_sub(30)));
                }
            }
        }
    }

    #[test]
    fn full_period_gap_forces_on() {
        // A column starved for an entire ramp has earned an unconditional
        // on-slot, whatever its phase.
        for level in [1u8, 10, 100] {
            for t in PHASE_PERIOD_US..2 * PHASE_PERIOD_US {
                assert!(is_on(level, t, t - PHASE_PERIOD_US));
            }
        }
    }
}
