#![no_std]
#![no_main]

//! Cooperative polling variant: one task scans columns back to back,
//! pausing briefly after each full cycle.

use panic_rtt_target as _;
use rtt_target::rtt_init_print;

use embassy_executor::Spawner;
use embassy_futures::join;
use embassy_time::{Duration, Instant, Timer};
use microbit_bsp::Microbit;

use mb2_lightpad::{
    get_baselines, log_banner, log_event, rotate_palette, step, wire_panel, PanelPins,
};

async fn scan(mut panel: PanelPins) -> ! {
    let pause = panel.config().cycle_pause_us;
    loop {
        if panel.at_cycle_start() {
            let palette = get_baselines().await;
            panel.set_baselines(palette);
        }
        if let Some(event) = step(&mut panel, Instant::now().as_micros()) {
            log_event(&event);
        }
        if panel.at_cycle_start() {
            Timer::after(Duration::from_micros(pause)).await;
        }
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    rtt_init_print!();
    let board = Microbit::default();
    let panel = wire_panel(board);
    log_banner("polled");

    join::join(scan(panel), rotate_palette()).await;

    panic!("fell off end of main loop");
}
