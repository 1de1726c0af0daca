#![no_std]

//! # Illuminated Button Panel Scan Engine
//!
//! Time-multiplexed software PWM for a small panel of RGB-lit buttons,
//! addressed through a serial-to-parallel shift register and sensed over a
//! shared input line.
//!
//! ## How a panel is driven
//!
//! The panel has far fewer controller pins than LEDs, so columns (one
//! button + RGB LED each) are serviced one at a time in round-robin order.
//! Each scan step selects a column, samples and debounces its button,
//! derives the column's effective color from its press state, decides per
//! color channel whether the LED should be electrically on *right now*,
//! and commits the result as one 8-bit frame through the shift register.
//! Revisiting columns fast enough makes the whole panel appear lit at
//! once, and toggling each channel in proportion to its brightness value
//! fakes analog dimming from purely digital outputs.
//!
//! Hardware access goes through the `embedded-hal` digital and delay
//! traits, so the engine is board-agnostic and its logic runs on the host
//! as ordinary unit tests.
//!
//! ## Module map
//!
//! - [`config`] — wiring and tuning constants as a typed structure
//! - [`duty`] — per-channel on/off decision from brightness and elapsed time
//! - [`gamma`] — fixed perceptual brightness lookup table
//! - [`debounce`] — raw sense-line level to stable pressed/released state
//! - [`react`] — per-column press reaction and effective color
//! - [`frame`] — packing of column address and channel states into a frame
//! - [`bus`] — bit-banged shift-register output with atomic latch commit
//! - [`scanner`] — the panel itself: columns, cursor, and the scan step

pub mod bus;
pub mod config;
pub mod debounce;
pub mod duty;
pub mod frame;
pub mod gamma;
pub mod react;
pub mod scanner;

pub use bus::ShiftRegister;
pub use config::{
    BitOrder, DebouncePolicy, Feedback, LatchPolarity, PanelConfig, SelectPolarity, SenseLevel,
};
pub use gamma::GAMMA8;
pub use scanner::{Panel, PressEvent};

// Re-export the color type so dependents don't need their own `smart-leds`.
pub use smart_leds::RGB8;
