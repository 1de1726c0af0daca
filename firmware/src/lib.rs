#![no_std]

//! # Board Integration for the Four-Button Light Pad
//!
//! Wiring, configuration and shared state for the illuminated button
//! panel on a micro:bit v2. The scan engine itself lives in
//! `lightpad-engine`; this crate pins it to real pins, owns the shared
//! baseline palette, and provides the pieces both scheduling binaries
//! (`polled` and `ticked`) have in common.
//!
//! ## Wiring
//!
//! The shift register hangs off the edge connector: serial clock on P8,
//! serial data on P9, latch on P16. The buttons share one sense line on
//! P2, pulled up; the register's address outputs gate each button onto
//! the line, so the level read during a column's scan slot belongs to
//! that column. Pressing pulls the line low.
//!
//! ## Shared palette
//!
//! The idle palette lives behind a mutex so another task — here the demo
//! rotator, in a bigger system a radio or USB command channel — can
//! rewrite it without ever touching the panel mid-frame. The scan task
//! copies the palette in only at cycle start.

use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Delay, Timer};
use lightpad_engine::{
    BitOrder, DebouncePolicy, Feedback, LatchPolarity, Panel, PanelConfig, PressEvent,
    SelectPolarity, SenseLevel, GAMMA8, RGB8,
};
use microbit_bsp::embassy_nrf::gpio::{AnyPin, Input, Level, Output, OutputDrive, Pull};
use microbit_bsp::Microbit;
use rtt_target::rprintln;

/// Number of button columns on the panel.
pub const COLUMNS: usize = 4;

/// Idle palette shown when no button is held.
pub const DEFAULT_BASELINES: [RGB8; COLUMNS] = [
    RGB8 { r: 200, g: 0, b: 0 },
    RGB8 { r: 0, g: 200, b: 0 },
    RGB8 { r: 0, g: 0, b: 200 },
    RGB8 { r: 40, g: 40, b: 40 },
];

/// Wiring and tuning for this board. All fixed design decisions; change
/// them here, not at runtime.
pub const CONFIG: PanelConfig<COLUMNS> = PanelConfig {
    baselines: DEFAULT_BASELINES,
    feedback: Feedback::White,
    debounce: DebouncePolicy::Window { us: 120 },
    settle_us: 8,
    cycle_pause_us: 30,
    latch_hold_us: 2,
    bit_order: BitOrder::MsbFirst,
    latch: LatchPolarity::ActiveHigh,
    select: SelectPolarity::ActiveHigh,
    sense: SenseLevel::ActiveLow,
    gamma: Some(&GAMMA8),
};

pub type PanelPins = Panel<
    COLUMNS,
    Output<'static, AnyPin>,
    Output<'static, AnyPin>,
    Output<'static, AnyPin>,
    Input<'static, AnyPin>,
    Delay,
>;

/// Shared idle palette, rewritten between scan cycles by other tasks.
static BASELINES: Mutex<ThreadModeRawMutex, [RGB8; COLUMNS]> = Mutex::new(DEFAULT_BASELINES);

pub async fn get_baselines() -> [RGB8; COLUMNS] {
    let baselines = BASELINES.lock().await;
    *baselines
}

pub async fn set_baselines<F>(setter: F)
where
    F: FnOnce(&mut [RGB8; COLUMNS]),
{
    let mut baselines = BASELINES.lock().await;
    setter(&mut baselines);
}

/// Non-blocking palette read for contexts that must not suspend, like the
/// batched scan loop. Returns `None` when a writer holds the lock; the
/// caller just keeps last cycle's palette for one more round.
pub fn try_get_baselines() -> Option<[RGB8; COLUMNS]> {
    BASELINES.try_lock().ok().map(|baselines| *baselines)
}

/// Wire the panel to the edge connector.
pub fn wire_panel(board: Microbit) -> PanelPins {
    let out = |p| Output::new(p, Level::Low, OutputDrive::Standard);
    let clock = out(AnyPin::from(board.p8));
    let data = out(AnyPin::from(board.p9));
    let latch = out(AnyPin::from(board.p16));
    let sense = Input::new(AnyPin::from(board.p2), Pull::Up);
    Panel::new(CONFIG, clock, data, latch, sense, Delay)
}

/// Run one scan step. GPIO on this board cannot fail, so the engine's
/// error channel is discharged here once instead of at every call site.
pub fn step(panel: &mut PanelPins, now_us: u64) -> Option<PressEvent> {
    match panel.scan_step(now_us) {
        Ok(event) => event,
        Err(never) => match never {},
    }
}

pub fn log_event(event: &PressEvent) {
    rprintln!(
        "button {}: {}",
        event.column,
        if event.pressed { "pressed" } else { "released" }
    );
}

pub fn log_banner(mode: &str) {
    rprintln!(
        "lightpad: {} columns, {} scan, debounce {:?}, settle {} us",
        COLUMNS,
        mode,
        CONFIG.debounce,
        CONFIG.settle_us
    );
}

/// Demo writer: rotate the idle palette one position every few seconds,
/// exercising the shared setter the way an external command channel
/// would.
pub async fn rotate_palette() -> ! {
    loop {
        Timer::after_secs(5).await;
        set_baselines(|palette| palette.rotate_left(1)).await;
    }
}
