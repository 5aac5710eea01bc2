//! Time adapters: a monotonic clock and the blocking delay every timed
//! hold in the sort cycle goes through.
//!
//! - **`target_os = "espidf"`** — uptime from `esp_timer_get_time()`;
//!   millisecond holds yield to FreeRTOS, sub-millisecond waits busy-wait
//!   on the ROM delay.
//! - **`not(target_os = "espidf")`** — `std::time::Instant` and
//!   `thread::sleep` for host-side simulation.

use embedded_hal::delay::DelayNs;

/// Monotonic uptime source.
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    pub fn uptime_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }
}

/// Blocking [`DelayNs`] for the controller's holds and the drivers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDelay;

/// How a nanosecond wait is carried out on the device.  Both arms round
/// up, so a wait never ends early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceWait {
    /// Yield to the scheduler for this many milliseconds.
    Millis(u32),
    /// Busy-wait on the ROM delay for this many microseconds.
    Micros(u32),
}

impl DeviceWait {
    pub fn for_ns(ns: u32) -> Self {
        if ns >= 1_000_000 {
            Self::Millis(ns.div_ceil(1_000_000))
        } else {
            Self::Micros(ns.div_ceil(1_000))
        }
    }
}

impl DelayNs for SystemDelay {
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        match DeviceWait::for_ns(ns) {
            DeviceWait::Millis(ms) => esp_idf_hal::delay::FreeRtos::delay_ms(ms),
            DeviceWait::Micros(us) => esp_idf_hal::delay::Ets::delay_us(us),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
