//! Addressable RGB strip (WS2812 / NeoPixel) used as the capture light.
//!
//! The strip is only ever filled with a single colour.  Frame encoding is
//! pure (GRB byte order, one triple per pixel) and happens here; putting
//! the bits on the wire is delegated to a [`PixelBus`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`RmtPixelBus`] clocks the frame out through an RMT
//! channel.  On host/test: any `PixelBus` mock.

use crate::app::model::Rgb;
use crate::error::ActuatorError;

/// Bytes per pixel on the wire.
pub const BYTES_PER_PIXEL: usize = 3;

/// Raw frame sink for WS2812-style strips.
pub trait PixelBus {
    /// Transmit one full frame, `BYTES_PER_PIXEL` bytes per pixel in wire
    /// order.  Blocks until the frame has latched.
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), ActuatorError>;
}

/// Encode `colour` for every one of `num_pixels` pixels in GRB order.
pub fn encode_fill(colour: Rgb, num_pixels: usize, frame: &mut Vec<u8>) {
    frame.clear();
    frame.reserve(num_pixels * BYTES_PER_PIXEL);
    for _ in 0..num_pixels {
        frame.extend_from_slice(&[colour.g, colour.r, colour.b]);
    }
}

pub struct LightStrip<B> {
    bus: B,
    num_pixels: usize,
    frame: Vec<u8>,
    current: Rgb,
}

impl<B: PixelBus> LightStrip<B> {
    pub fn new(bus: B, num_pixels: usize) -> Self {
        Self {
            bus,
            num_pixels,
            frame: Vec::with_capacity(num_pixels * BYTES_PER_PIXEL),
            current: Rgb::OFF,
        }
    }

    pub fn fill(&mut self, colour: Rgb) -> Result<(), ActuatorError> {
        encode_fill(colour, self.num_pixels, &mut self.frame);
        self.bus.write_frame(&self.frame)?;
        self.current = colour;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.fill(Rgb::OFF)
    }

    /// Colour of the last frame that reached the bus.
    pub fn current(&self) -> Rgb {
        self.current
    }
}

// ── ESP-IDF RMT backend ───────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp_impl::RmtPixelBus;

#[cfg(target_os = "espidf")]
mod esp_impl {
    use core::time::Duration;

    use esp_idf_hal::rmt::{PinState, Pulse, TxRmtDriver, VariableLengthSignal};
    use esp_idf_svc::sys::EspError;

    use super::PixelBus;
    use crate::error::ActuatorError;

    // WS2812 bit timings.
    const T0H_NS: u64 = 350;
    const T0L_NS: u64 = 800;
    const T1H_NS: u64 = 700;
    const T1L_NS: u64 = 600;

    pub struct RmtPixelBus {
        tx: TxRmtDriver<'static>,
        zero: (Pulse, Pulse),
        one: (Pulse, Pulse),
    }

    impl RmtPixelBus {
        pub fn new(tx: TxRmtDriver<'static>) -> Result<Self, EspError> {
            let hz = tx.counter_clock()?;
            let pulse = |state, ns| Pulse::new_with_duration(hz, state, &Duration::from_nanos(ns));
            Ok(Self {
                zero: (pulse(PinState::High, T0H_NS)?, pulse(PinState::Low, T0L_NS)?),
                one: (pulse(PinState::High, T1H_NS)?, pulse(PinState::Low, T1L_NS)?),
                tx,
            })
        }
    }

    impl PixelBus for RmtPixelBus {
        fn write_frame(&mut self, frame: &[u8]) -> Result<(), ActuatorError> {
            let mut signal = VariableLengthSignal::new();
            for byte in frame {
                for bit in (0..8).rev() {
                    let (hi, lo) = if byte & (1 << bit) != 0 { &self.one } else { &self.zero };
                    signal
                        .push([hi, lo])
                        .map_err(|_| ActuatorError::GpioWriteFailed)?;
                }
            }
            self.tx
                .start_blocking(&signal)
                .map_err(|_| ActuatorError::GpioWriteFailed)
        }
    }
}
