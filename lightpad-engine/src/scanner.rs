//! The column scanner: round-robin servicing of button+LED columns.
//!
//! All per-column state lives in one array owned by the panel; a column
//! is only touched during its own scan slot, so there is exactly one
//! mutator context per column at any instant. Within a scan step the
//! order is fixed: sample, debounce, react, evaluate each channel, emit,
//! then stamp the scan time and hold the frame for the settle delay.
//! Evaluating duty before the reaction has updated the effective color
//! would display stale colors, so the order is load-bearing.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use smart_leds::RGB8;

use crate::bus::ShiftRegister;
use crate::config::PanelConfig;
use crate::debounce::Debouncer;
use crate::duty;
use crate::frame;
use crate::react::Touch;

/// A debounced press or release edge, reported from [`Panel::scan_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressEvent {
    pub column: usize,
    /// True on press, false on release.
    pub pressed: bool,
}

/// One button+LED unit and the scan bookkeeping that belongs to it.
#[derive(Debug, Clone, Copy)]
struct Column {
    /// Idle color; configuration, never touched by the reaction.
    baseline: RGB8,
    /// Displayed color, derived fresh on every scan of this column.
    effective: RGB8,
    /// Time of this column's last committed frame.
    last_scan_us: u64,
    debounce: Debouncer,
    touch: Touch,
}

/// A complete panel: columns, scan cursor, and the physical lines.
pub struct Panel<const N: usize, Clk, Dat, Lat, In, D> {
    cfg: PanelConfig<N>,
    bus: ShiftRegister<Clk, Dat, Lat>,
    sense: In,
    delay: D,
    columns: [Column; N],
    cursor: usize,
}

impl<const N: usize, Clk, Dat, Lat, In, D, E> Panel<N, Clk, Dat, Lat, In, D>
where
    Clk: OutputPin<Error = E>,
    Dat: OutputPin<Error = E>,
    Lat: OutputPin<Error = E>,
    In: InputPin<Error = E>,
    D: DelayNs,
{
    pub fn new(cfg: PanelConfig<N>, clock: Clk, data: Dat, latch: Lat, sense: In, delay: D) -> Self {
        assert!(N >= 1 && N <= frame::MAX_COLUMNS);
        let bus = ShiftRegister::new(clock, data, latch, cfg.bit_order, cfg.latch, cfg.latch_hold_us);
        let columns = core::array::from_fn(|i| Column {
            baseline: cfg.baselines[i],
            effective: cfg.baselines[i],
            last_scan_us: 0,
            debounce: Debouncer::new(cfg.debounce),
            touch: Touch::Idle,
        });
        Self {
            cfg,
            bus,
            sense,
            delay,
            columns,
            cursor: 0,
        }
    }

    pub fn config(&self) -> &PanelConfig<N> {
        &self.cfg
    }

    /// Column the next [`Panel::scan_step`] will service.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True between full rounds, when the next step services column 0.
    /// The window where outside writers may safely swap the palette in.
    pub fn at_cycle_start(&self) -> bool {
        self.cursor == 0
    }

    /// Replace one column's idle color.
    pub fn set_baseline(&mut self, column: usize, color: RGB8) {
        debug_assert!(column < N, "column {column} out of range");
        self.columns[column % N].baseline = color;
    }

    /// Replace the whole idle palette at once.
    pub fn set_baselines(&mut self, palette: [RGB8; N]) {
        for (column, color) in self.columns.iter_mut().zip(palette) {
            column.baseline = color;
        }
    }

    /// Debounced press state of a column.
    pub fn is_pressed(&self, column: usize) -> bool {
        debug_assert!(column < N, "column {column} out of range");
        self.columns[column % N].debounce.is_pressed()
    }

    /// Service the active column, then advance the cursor round-robin.
    ///
    /// Returns the debounced press or release edge if this step produced
    /// one. `now_us` is the caller's monotonic microsecond clock; it must
    /// not run backwards.
    pub fn scan_step(&mut self, now_us: u64) -> Result<Option<PressEvent>, E> {
        let index = self.cursor;
        let column = &mut self.columns[index];

        let raw_high = self.sense.is_high()?;
        let pressed = column.debounce.update(self.cfg.sense.is_active(raw_high), now_us);
        let edge = column
            .touch
            .update(pressed)
            .then_some(PressEvent { column: index, pressed });
        column.effective = column
            .touch
            .effective(column.baseline, self.cfg.feedback, self.cfg.gamma);

        let channels = [
            duty::is_on(column.effective.r, now_us, column.last_scan_us),
            duty::is_on(column.effective.g, now_us, column.last_scan_us),
            duty::is_on(column.effective.b, now_us, column.last_scan_us),
        ];
        self.bus
            .emit(frame::compose(index, channels, self.cfg.select), &mut self.delay)?;
        // Stamped only after the commit, so the next visit measures its
        // gap from the moment the LEDs actually lit.
        column.last_scan_us = now_us;

        // Hold the frame so the LED visibly illuminates before the bus
        // moves on to the next column.
        self.delay.delay_us(self.cfg.settle_us);

        self.cursor = (self.cursor + 1) % N;
        Ok(edge)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use core::convert::Infallible;

    use embedded_hal::digital::ErrorType;

    use super::*;
    use crate::config::{BitOrder, DebouncePolicy, Feedback, LatchPolarity, SelectPolarity, SenseLevel};

    /// Simulated shift register + sense line. Rising clock edges shift the
    /// data line in MSB-first; a rising latch edge publishes the byte.
    #[derive(Default)]
    struct Wires {
        clock: bool,
        data: bool,
        latch: bool,
        shifting: u8,
        latched: Vec<u8>,
        sense_active: bool,
    }

    type Shared = Rc<RefCell<Wires>>;

    #[derive(Clone, Copy)]
    enum Line {
        Clock,
        Data,
        Latch,
    }

    struct OutLine {
        line: Line,
        wires: Shared,
    }

    impl ErrorType for OutLine {
        type Error = Infallible;
    }

    impl OutputPin for OutLine {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.set(true);
            Ok(())
        }
    }

    impl OutLine {
        fn set(&mut self, high: bool) {
            let mut wires = self.wires.borrow_mut();
            match self.line {
                Line::Data => wires.data = high,
                Line::Clock => {
                    if high && !wires.clock {
                        wires.shifting = (wires.shifting << 1) | u8::from(wires.data);
                    }
                    wires.clock = high;
                }
                Line::Latch => {
                    if high && !wires.latch {
                        let byte = wires.shifting;
                        wires.latched.push(byte);
                    }
                    wires.latch = high;
                }
            }
        }
    }

    struct SenseLine {
        wires: Shared,
    }

    impl ErrorType for SenseLine {
        type Error = Infallible;
    }

    impl InputPin for SenseLine {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            // Active-low button: held pulls the line down.
            Ok(!self.wires.borrow().sense_active)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    const BASELINES: [RGB8; 4] = [
        RGB8 { r: 200, g: 0, b: 0 },
        RGB8 { r: 0, g: 200, b: 0 },
        RGB8 { r: 0, g: 0, b: 200 },
        RGB8 { r: 40, g: 40, b: 40 },
    ];

    fn test_config() -> PanelConfig<4> {
        PanelConfig {
            baselines: BASELINES,
            feedback: Feedback::White,
            debounce: DebouncePolicy::Window { us: 200 },
            settle_us: 0,
            cycle_pause_us: 0,
            latch_hold_us: 0,
            bit_order: BitOrder::MsbFirst,
            latch: LatchPolarity::ActiveHigh,
            select: SelectPolarity::ActiveHigh,
            sense: SenseLevel::ActiveLow,
            gamma: None,
        }
    }

    type TestPanel = Panel<4, OutLine, OutLine, OutLine, SenseLine, NoDelay>;

    fn rig(cfg: PanelConfig<4>) -> (TestPanel, Shared) {
        let wires: Shared = Rc::new(RefCell::new(Wires::default()));
        let out = |line| OutLine { line, wires: Rc::clone(&wires) };
        let sense = SenseLine { wires: Rc::clone(&wires) };
        let panel = Panel::new(cfg, out(Line::Clock), out(Line::Data), out(Line::Latch), sense, NoDelay);
        (panel, wires)
    }

    fn selected_column(frame: u8) -> usize {
        let select = frame & frame::SELECT_MASK;
        assert_eq!(select.count_ones(), 1, "frame {frame:#010b} not one-hot");
        select.trailing_zeros() as usize
    }

    fn channel_states(frame: u8) -> [bool; 3] {
        [
            frame & (1 << frame::CHANNEL_BITS[0]) != 0,
            frame & (1 << frame::CHANNEL_BITS[1]) != 0,
            frame & (1 << frame::CHANNEL_BITS[2]) != 0,
        ]
    }

    #[test]
    fn visits_columns_round_robin() {
        let (mut panel, wires) = rig(test_config());
        for step in 0..32u64 {
            panel.scan_step(step).unwrap();
        }
        let order: Vec<usize> = wires.borrow().latched.iter().map(|&f| selected_column(f)).collect();
        for (step, column) in order.iter().enumerate() {
            assert_eq!(*column, step % 4);
        }
    }

    #[test]
    fn single_column_panel_scans() {
        let wires: Shared = Rc::new(RefCell::new(Wires::default()));
        let out = |line| OutLine { line, wires: Rc::clone(&wires) };
        let sense = SenseLine { wires: Rc::clone(&wires) };
        let cfg = PanelConfig::<1> {
            baselines: [RGB8 { r: 128, g: 0, b: 0 }],
            feedback: Feedback::White,
            debounce: DebouncePolicy::Window { us: 200 },
            settle_us: 0,
            cycle_pause_us: 0,
            latch_hold_us: 0,
            bit_order: BitOrder::MsbFirst,
            latch: LatchPolarity::ActiveHigh,
            select: SelectPolarity::ActiveHigh,
            sense: SenseLevel::ActiveLow,
            gamma: None,
        };
        let mut panel = Panel::new(cfg, out(Line::Clock), out(Line::Data), out(Line::Latch), sense, NoDelay);
        for step in 0..8u64 {
            panel.scan_step(step).unwrap();
            assert!(panel.at_cycle_start());
        }
        assert_eq!(wires.borrow().latched.len(), 8);
    }

    /// Unpressed panel: each column's channel on-fractions track its
    /// baseline color.
    #[test]
    fn emitted_duty_tracks_baselines() {
        let (mut panel, wires) = rig(test_config());
        let steps = 8 * 1024u64;
        for step in 0..steps {
            panel.scan_step(step).unwrap();
        }
        let latched = wires.borrow().latched.clone();
        let mut on_counts = [[0u32; 3]; 4];
        let mut visits = [0u32; 4];
        for &frame in &latched {
            let column = selected_column(frame);
            visits[column] += 1;
            for (channel, on) in channel_states(frame).iter().enumerate() {
                if *on {
                    on_counts[column][channel] += 1;
                }
            }
        }
        for column in 0..4 {
            let baseline = [BASELINES[column].r, BASELINES[column].g, BASELINES[column].b];
            for channel in 0..3 {
                let got = f64::from(on_counts[column][channel]) / f64::from(visits[column]);
                let want = f64::from(baseline[channel]) / 255.0;
                assert!(
                    (got - want).abs() < 0.05,
                    "column {column} channel {channel}: fraction {got} vs {want}"
                );
            }
        }
    }

    /// Pressing column 2 past the debounce window turns exactly that
    /// column white, and releasing restores its baseline exactly.
    #[test]
    fn press_feedback_is_isolated_to_the_column() {
        let (mut panel, wires) = rig(test_config());
        let mut events = Vec::new();
        // Press from 1000 µs to 3000 µs, one step per microsecond.
        for step in 0..6000u64 {
            let held = (1000..3000).contains(&step);
            wires.borrow_mut().sense_active = held && panel.cursor() == 2;
            if let Some(event) = panel.scan_step(step).unwrap() {
                events.push((step, event));
            }
        }
        assert_eq!(events.len(), 2);
        let (press_at, press) = events[0];
        let (release_at, release) = events[1];
        assert_eq!(press, PressEvent { column: 2, pressed: true });
        assert_eq!(release, PressEvent { column: 2, pressed: false });
        // The press registered only after the window elapsed.
        assert!(press_at >= 1200, "registered at {press_at}");
        assert!(release_at >= 3000);

        // While held, column 2 emits all three channels on (white);
        // nothing else leaves its baseline pattern.
        let latched = wires.borrow().latched.clone();
        let held_frames: Vec<u8> = latched[press_at as usize..release_at as usize]
            .iter()
            .copied()
            .filter(|&f| selected_column(f) == 2)
            .collect();
        assert!(!held_frames.is_empty());
        for frame in held_frames {
            assert_eq!(channel_states(frame), [true, true, true]);
        }
        // Column 1's green keeps running regardless of the press.
        let after: Vec<u8> = latched[4000..]
            .iter()
            .copied()
            .filter(|&f| selected_column(f) == 1)
            .collect();
        assert!(after.iter().any(|&f| channel_states(f)[1]));
        assert!(after.iter().all(|&f| !channel_states(f)[0] && !channel_states(f)[2]));
    }

    /// A tap shorter than the debounce window never surfaces at all.
    #[test]
    fn short_tap_is_swallowed() {
        let (mut panel, wires) = rig(test_config());
        for step in 0..2000u64 {
            let held = (500..620).contains(&step);
            wires.borrow_mut().sense_active = held && panel.cursor() == 2;
            assert_eq!(panel.scan_step(step).unwrap(), None);
        }
        assert!(!panel.is_pressed(2));
    }

    #[test]
    fn palette_swap_applies_from_the_next_visit() {
        let (mut panel, wires) = rig(test_config());
        for step in 0..64u64 {
            panel.scan_step(step).unwrap();
        }
        // Swap column 0 to full off.
        panel.set_baseline(0, RGB8 { r: 0, g: 0, b: 0 });
        let before = wires.borrow().latched.len();
        for step in 64..1088u64 {
            panel.scan_step(step).unwrap();
        }
        let latched = wires.borrow().latched.clone();
        for &frame in &latched[before..] {
            if selected_column(frame) == 0 {
                assert_eq!(channel_states(frame), [false, false, false]);
            }
        }
    }
}
