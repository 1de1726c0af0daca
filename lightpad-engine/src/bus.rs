//! Bit-banged serial output driver.
//!
//! Three lines to a 74HC595-style serial-in/parallel-out device: clock,
//! data, latch. A frame is shifted out one bit per clock pulse and then
//! committed atomically by pulsing the latch, so the parallel outputs
//! never show a half-shifted frame. The write is open loop — nothing
//! reports whether the device saw the bits, so the only failure mode
//! surfaced here is the pin error type, infallible on most targets.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{BitOrder, LatchPolarity};

pub struct ShiftRegister<Clk, Dat, Lat> {
    clock: Clk,
    data: Dat,
    latch: Lat,
    bit_order: BitOrder,
    latch_polarity: LatchPolarity,
    latch_hold_us: u32,
}

impl<Clk, Dat, Lat, E> ShiftRegister<Clk, Dat, Lat>
where
    Clk: OutputPin<Error = E>,
    Dat: OutputPin<Error = E>,
    Lat: OutputPin<Error = E>,
{
    pub fn new(
        clock: Clk,
        data: Dat,
        latch: Lat,
        bit_order: BitOrder,
        latch_polarity: LatchPolarity,
        latch_hold_us: u32,
    ) -> Self {
        Self {
            clock,
            data,
            latch,
            bit_order,
            latch_polarity,
            latch_hold_us,
        }
    }

    /// Shift `frame` out and commit it to the parallel outputs.
    pub fn emit(&mut self, frame: u8, delay: &mut impl DelayNs) -> Result<(), E> {
        // Known clock state before the first data bit.
        self.clock.set_low()?;
        for bit in 0..8 {
            let mask = match self.bit_order {
                BitOrder::MsbFirst => 0x80 >> bit,
                BitOrder::LsbFirst => 0x01 << bit,
            };
            if frame & mask != 0 {
                self.data.set_high()?;
            } else {
                self.data.set_low()?;
            }
            self.clock.set_high()?;
            self.clock.set_low()?;
        }
        self.pulse_latch(delay)
    }

    fn pulse_latch(&mut self, delay: &mut impl DelayNs) -> Result<(), E> {
        match self.latch_polarity {
            LatchPolarity::ActiveHigh => {
                self.latch.set_high()?;
                delay.delay_us(self.latch_hold_us);
                self.latch.set_low()
            }
            LatchPolarity::ActiveLow => {
                self.latch.set_low()?;
                delay.delay_us(self.latch_hold_us);
                self.latch.set_high()
            }
        }
    }
}
