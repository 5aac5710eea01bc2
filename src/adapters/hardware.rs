//! Hardware adapter — bridges the station drivers to domain port traits.
//!
//! Owns the presence sensor, both servo pairs, the conveyor stepper, the
//! light strip and the status display, exposing them through
//! [`SensorPort`], [`ActuatorPort`] and [`DisplayPort`].  Driver errors
//! stop here: control is open-loop, so a failed write is logged and the
//! cycle carries on.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::model::{GatePair, PairPosition, Rgb};
use crate::app::ports::{ActuatorPort, DisplayPort, SensorPort};
use crate::drivers::lcd::Lcd2004;
use crate::drivers::light_strip::{LightStrip, PixelBus};
use crate::drivers::servo::ServoPair;
use crate::drivers::stepper::HalfStepMotor;
use crate::error::ActuatorError;
use crate::sensors::presence::PresenceSensor;

/// Concrete adapter that combines all station hardware behind port traits.
///
/// * `In` — presence input pin
/// * `Ch` — servo PWM channel
/// * `Coil` — stepper coil output pin
/// * `Bus` — light strip frame bus
/// * `I` — display I²C bus
/// * `D` — delay used by the stepper and the display
pub struct HardwareAdapter<In, Ch, Coil, Bus, I, D> {
    presence: PresenceSensor<In>,
    intake: ServoPair<Ch>,
    drop_gate: ServoPair<Ch>,
    conveyor: HalfStepMotor<Coil, D>,
    light: LightStrip<Bus>,
    display: Lcd2004<I, D>,
    write_failures: u32,
}

impl<In, Ch, Coil, Bus, I, D> HardwareAdapter<In, Ch, Coil, Bus, I, D>
where
    In: InputPin,
    Ch: SetDutyCycle,
    Coil: OutputPin,
    Bus: PixelBus,
    I: I2c,
    D: DelayNs,
{
    pub fn new(
        presence: PresenceSensor<In>,
        intake: ServoPair<Ch>,
        drop_gate: ServoPair<Ch>,
        conveyor: HalfStepMotor<Coil, D>,
        light: LightStrip<Bus>,
        display: Lcd2004<I, D>,
    ) -> Self {
        Self {
            presence,
            intake,
            drop_gate,
            conveyor,
            light,
            display,
            write_failures: 0,
        }
    }

    /// Driver writes that failed since boot.
    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    pub fn conveyor(&self) -> &HalfStepMotor<Coil, D> {
        &self.conveyor
    }

    pub fn display(&self) -> &Lcd2004<I, D> {
        &self.display
    }

    pub fn light(&self) -> &LightStrip<Bus> {
        &self.light
    }

    pub fn servo_pair(&self, pair: GatePair) -> &ServoPair<Ch> {
        match pair {
            GatePair::Intake => &self.intake,
            GatePair::Drop => &self.drop_gate,
        }
    }

    fn check(&mut self, what: &str, result: Result<(), ActuatorError>) {
        if let Err(e) = result {
            self.write_failures = self.write_failures.wrapping_add(1);
            warn!("hw: {} failed: {}", what, e);
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<In, Ch, Coil, Bus, I, D> SensorPort for HardwareAdapter<In, Ch, Coil, Bus, I, D>
where
    In: InputPin,
    Ch: SetDutyCycle,
    Coil: OutputPin,
    Bus: PixelBus,
    I: I2c,
    D: DelayNs,
{
    fn is_present(&mut self) -> bool {
        self.presence.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<In, Ch, Coil, Bus, I, D> ActuatorPort for HardwareAdapter<In, Ch, Coil, Bus, I, D>
where
    In: InputPin,
    Ch: SetDutyCycle,
    Coil: OutputPin,
    Bus: PixelBus,
    I: I2c,
    D: DelayNs,
{
    fn set_pair(&mut self, pair: GatePair, position: PairPosition) {
        let result = match pair {
            GatePair::Intake => self.intake.set_angles(position.first, position.second),
            GatePair::Drop => self.drop_gate.set_angles(position.first, position.second),
        };
        self.check("servo pair", result);
    }

    fn rotate(&mut self, steps: i32) {
        let result = self.conveyor.step(steps);
        self.check("conveyor", result);
    }

    fn fill_light(&mut self, colour: Rgb) {
        let result = self.light.fill(colour);
        self.check("light", result);
    }

    fn release_all(&mut self) {
        let results = [
            self.intake.release(),
            self.drop_gate.release(),
            self.conveyor.release(),
            self.light.off(),
        ];
        for result in results {
            self.check("release", result);
        }
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<In, Ch, Coil, Bus, I, D> DisplayPort for HardwareAdapter<In, Ch, Coil, Bus, I, D>
where
    In: InputPin,
    Ch: SetDutyCycle,
    Coil: OutputPin,
    Bus: PixelBus,
    I: I2c,
    D: DelayNs,
{
    fn clear(&mut self) {
        let result = self.display.clear();
        self.check("display clear", result);
    }

    fn put_str(&mut self, text: &str) {
        let result = self.display.put_str(text);
        self.check("display write", result);
    }
}
