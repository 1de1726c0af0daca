//! Panel wiring and tuning constants as a typed configuration structure.
//!
//! Everything here is a fixed design decision: bit order and latch polarity
//! must match how the shift register is wired, the sense polarity matches
//! the button pull direction, and the timing fields trade scan rate against
//! apparent brightness. None of it is negotiated at runtime; a board crate
//! instantiates [`PanelConfig`] once as a `const`.

use smart_leds::RGB8;

/// Order in which frame bits are shifted onto the data line.
///
/// Must match the receiving device's wiring; `MsbFirst` puts frame bit 7
/// on the device's first parallel output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// Resting-vs-pulsed level of the latch line.
///
/// `ActiveHigh` rests low and pulses high to commit; `ActiveLow` the
/// inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchPolarity {
    ActiveHigh,
    ActiveLow,
}

/// How the selected column is encoded in the frame's address bits.
///
/// `ActiveHigh` sets only the selected column's bit; `ActiveLow` clears
/// only the selected column's bit (all others set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectPolarity {
    ActiveHigh,
    ActiveLow,
}

/// Electrical level of the shared sense line while a button is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseLevel {
    ActiveHigh,
    ActiveLow,
}

impl SenseLevel {
    /// Map a raw pin level to "button held".
    pub fn is_active(self, raw_high: bool) -> bool {
        match self {
            SenseLevel::ActiveHigh => raw_high,
            SenseLevel::ActiveLow => !raw_high,
        }
    }
}

/// Color shown on a column while its button is held down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// A fixed alert color.
    Alert(RGB8),
    /// Full white.
    White,
}

impl Feedback {
    pub fn color(self) -> RGB8 {
        match self {
            Feedback::Alert(color) => color,
            Feedback::White => RGB8 { r: 255, g: 255, b: 255 },
        }
    }
}

/// Debounce policy for the shared sense line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebouncePolicy {
    /// Edge-timestamp policy: a press is trusted only once the line has
    /// stayed active for the window, measured from the first active
    /// sample. Releases are trusted immediately. A window of zero is
    /// valid and behaves like [`DebouncePolicy::Immediate`].
    Window { us: u64 },
    /// Edge-memory policy: every single sample is trusted as-is, and
    /// transitions fall out of comparing against the previous level. A
    /// column sampled faster than its contacts settle may report spurious
    /// press/release toggles under this policy; that is an accepted
    /// limitation, not something this crate papers over.
    Immediate,
}

/// Complete compile-time configuration for one panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelConfig<const N: usize> {
    /// Idle color per column.
    pub baselines: [RGB8; N],
    /// Color shown while a column's button is held.
    pub feedback: Feedback,
    pub debounce: DebouncePolicy,
    /// How long a committed frame is held before the next column is
    /// serviced, in microseconds. Longer holds mean brighter, steadier
    /// output per column but a lower refresh rate across the panel.
    pub settle_us: u32,
    /// Pause between full scan cycles, in microseconds.
    pub cycle_pause_us: u64,
    /// Latch pulse hold time, in microseconds.
    pub latch_hold_us: u32,
    pub bit_order: BitOrder,
    pub latch: LatchPolarity,
    pub select: SelectPolarity,
    pub sense: SenseLevel,
    /// Optional perceptual-brightness table, e.g. [`crate::gamma::GAMMA8`].
    /// Consulted once per reaction update, never inside duty evaluation.
    pub gamma: Option<&'static [u8; 256]>,
}
