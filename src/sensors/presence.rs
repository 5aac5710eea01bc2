//! IR obstacle sensor at the intake.
//!
//! The module pulls its output LOW while something reflects the beam.
//! The pin is configured as an input with pull-up, so a disconnected
//! sensor reads "clear" rather than triggering a cycle.
//!
//! ## Dual-target design
//!
//! Generic over [`InputPin`]: `PinDriver<Input>` on ESP-IDF, a mock on
//! host/test.

use embedded_hal::digital::InputPin;
use log::warn;

pub struct PresenceSensor<P> {
    pin: P,
    last: bool,
    read_failures: u32,
}

impl<P: InputPin> PresenceSensor<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            last: false,
            read_failures: 0,
        }
    }

    /// Sample the sensor.  A failed read counts as "no object".
    pub fn read(&mut self) -> bool {
        match self.pin.is_low() {
            Ok(present) => {
                self.last = present;
            }
            Err(_) => {
                self.read_failures = self.read_failures.wrapping_add(1);
                warn!("presence: GPIO read failed ({} total)", self.read_failures);
                self.last = false;
            }
        }
        self.last
    }

    /// Result of the previous [`read`](Self::read).
    pub fn last(&self) -> bool {
        self.last
    }

    pub fn read_failures(&self) -> u32 {
        self.read_failures
    }
}
