#![no_std]
#![no_main]

//! Timer-driven batched variant: a periodic 1 ms tick whose handler
//! scans columns flat out until its budget expires, then yields until
//! the next tick. The main context is otherwise idle, so the only state
//! crossing the tick boundary is the mutex-guarded palette.

use panic_rtt_target as _;
use rtt_target::rtt_init_print;

use embassy_executor::Spawner;
use embassy_futures::join;
use embassy_time::{Duration, Instant, Ticker};
use microbit_bsp::Microbit;

use mb2_lightpad::{
    log_banner, log_event, rotate_palette, step, try_get_baselines, wire_panel, PanelPins,
};

/// Tick period of the batch scheduler.
const TICK: Duration = Duration::from_millis(1);

/// Scanning budget per tick. The remainder of the tick absorbs handler
/// overhead so a batch can never run into the next tick.
const SCAN_BUDGET_US: u64 = 990;

async fn scan_batches(mut panel: PanelPins) -> ! {
    let mut ticker = Ticker::every(TICK);
    loop {
        ticker.next().await;
        let deadline = Instant::now() + Duration::from_micros(SCAN_BUDGET_US);
        while Instant::now() < deadline {
            // Palette swaps are only honored between cycles, and only
            // when the writer isn't mid-update; the batch never blocks.
            if panel.at_cycle_start() {
                if let Some(palette) = try_get_baselines() {
                    panel.set_baselines(palette);
                }
            }
            if let Some(event) = step(&mut panel, Instant::now().as_micros()) {
                log_event(&event);
            }
        }
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    rtt_init_print!();
    let board = Microbit::default();
    let panel = wire_panel(board);
    log_banner("ticked");

    join::join(scan_batches(panel), rotate_palette()).await;

    panic!("fell off end of main loop");
}
