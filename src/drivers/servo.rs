//! Hobby-servo pair driver (two LEDC channels at 50 Hz).
//!
//! Logical angles (0 – 180°) map to native duty through a fixed linear
//! law: `duty = base + (angle / max_angle) * span`, where duty is
//! expressed against `full_scale` (1023 for the 10-bit LEDC timer).  The
//! fractional part is truncated.
//!
//! Both servos of a pair are always written together.  No position
//! feedback exists: the driver is open-loop.
//!
//! ## Dual-target design
//!
//! Generic over [`SetDutyCycle`]: on ESP-IDF the channels are
//! `LedcDriver`s, on host/test any recording mock.

use embedded_hal::pwm::SetDutyCycle;

use crate::config::SorterConfig;
use crate::error::ActuatorError;

/// Lowest accepted logical angle.
pub const MIN_ANGLE: f32 = 0.0;
/// Highest accepted logical angle.
pub const MAX_ANGLE: f32 = 180.0;

/// Angle → native duty law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServoMapping {
    pub base: u16,
    pub span: u16,
    pub max_angle: f32,
    pub full_scale: u16,
}

impl ServoMapping {
    pub fn from_config(config: &SorterConfig) -> Self {
        Self {
            base: config.servo_duty_base,
            span: config.servo_duty_span,
            max_angle: config.servo_max_angle,
            full_scale: config.servo_duty_full_scale,
        }
    }

    /// Clamp to [0, 180].  NaN is treated as 0°.
    pub fn clamp_angle(angle: f32) -> f32 {
        if angle.is_nan() {
            return MIN_ANGLE;
        }
        angle.clamp(MIN_ANGLE, MAX_ANGLE)
    }

    /// Native duty for `angle`, after clamping.
    pub fn duty_for(&self, angle: f32) -> u16 {
        let angle = Self::clamp_angle(angle);
        let offset = (angle / self.max_angle) * f32::from(self.span);
        let duty = (f32::from(self.base) + offset) as u32;
        duty.min(u32::from(self.full_scale)) as u16
    }
}

/// Two servos that always move as a unit.
pub struct ServoPair<Ch> {
    first: Ch,
    second: Ch,
    mapping: ServoMapping,
    /// Native duties last written, `None` while released.
    last_duty: Option<(u16, u16)>,
}

impl<Ch: SetDutyCycle> ServoPair<Ch> {
    pub fn new(first: Ch, second: Ch, mapping: ServoMapping) -> Self {
        Self {
            first,
            second,
            mapping,
            last_duty: None,
        }
    }

    /// Move both servos.  Out-of-range angles are clamped.
    pub fn set_angles(&mut self, first: f32, second: f32) -> Result<(), ActuatorError> {
        let d1 = self.mapping.duty_for(first);
        let d2 = self.mapping.duty_for(second);
        let scale = self.mapping.full_scale;

        self.first
            .set_duty_cycle_fraction(d1, scale)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.second
            .set_duty_cycle_fraction(d2, scale)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;

        self.last_duty = Some((d1, d2));
        Ok(())
    }

    /// Stop driving pulses so both servos go limp.
    pub fn release(&mut self) -> Result<(), ActuatorError> {
        let a = self.first.set_duty_cycle_fully_off();
        let b = self.second.set_duty_cycle_fully_off();
        self.last_duty = None;
        a.and(b).map_err(|_| ActuatorError::PwmWriteFailed)
    }

    pub fn last_duty(&self) -> Option<(u16, u16)> {
        self.last_duty
    }
}
