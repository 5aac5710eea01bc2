//! Four-coil unipolar stepper driver (28BYJ-48 on a ULN2003 board).
//!
//! Half-step drive: eight phases per electrical cycle, one phase advance
//! per step.  Positive steps walk the table forward, negative steps walk
//! it backward, so `rotate(n)` followed by `rotate(-n)` returns the rotor
//! to the same mechanical position.
//!
//! The coils stay energised between moves (holding torque) until
//! [`HalfStepMotor::release`] drives them all low.
//!
//! ## Dual-target design
//!
//! Generic over [`OutputPin`] and [`DelayNs`]: on ESP-IDF the coils are
//! `PinDriver`s and the delay is `Ets`, on host/test recording mocks.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

/// Coil patterns, IN1..IN4.
const HALF_STEP_SEQUENCE: [[bool; 4]; 8] = [
    [true, false, false, false],
    [true, true, false, false],
    [false, true, false, false],
    [false, true, true, false],
    [false, false, true, false],
    [false, false, true, true],
    [false, false, false, true],
    [true, false, false, true],
];

pub const PHASES: usize = HALF_STEP_SEQUENCE.len();

pub struct HalfStepMotor<P, D> {
    coils: [P; 4],
    delay: D,
    step_delay_us: u32,
    /// Index into the half-step table of the last pattern written.
    phase: usize,
    /// Net signed steps since construction.
    position: i64,
    energised: bool,
}

impl<P: OutputPin, D: DelayNs> HalfStepMotor<P, D> {
    pub fn new(coils: [P; 4], delay: D, step_delay_us: u32) -> Self {
        Self {
            coils,
            delay,
            step_delay_us,
            phase: 0,
            position: 0,
            energised: false,
        }
    }

    /// Step `steps` times; the sign picks the direction.  Blocks for
    /// `|steps| * step_delay_us`.
    pub fn step(&mut self, steps: i32) -> Result<(), ActuatorError> {
        let forward = steps >= 0;
        for _ in 0..steps.unsigned_abs() {
            self.phase = if forward {
                (self.phase + 1) % PHASES
            } else {
                (self.phase + PHASES - 1) % PHASES
            };
            self.write_pattern(HALF_STEP_SEQUENCE[self.phase])?;
            self.position += if forward { 1 } else { -1 };
            self.delay.delay_us(self.step_delay_us);
        }
        Ok(())
    }

    /// Drive every coil low.  Safe to call repeatedly.
    pub fn release(&mut self) -> Result<(), ActuatorError> {
        let mut result = Ok(());
        for coil in &mut self.coils {
            if coil.set_low().is_err() {
                result = Err(ActuatorError::GpioWriteFailed);
            }
        }
        self.energised = false;
        result
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn is_energised(&self) -> bool {
        self.energised
    }

    fn write_pattern(&mut self, pattern: [bool; 4]) -> Result<(), ActuatorError> {
        for (coil, high) in self.coils.iter_mut().zip(pattern) {
            coil.set_state(high.into())
                .map_err(|_| ActuatorError::GpioWriteFailed)?;
        }
        self.energised = true;
        Ok(())
    }
}
