//! WasteSort Firmware — Main Entry Point
//!
//! Hexagonal architecture: every peripheral is wrapped in an adapter and
//! injected into the sort controller, which owns the cycle.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter          CameraAdapter     GeminiClassifier   │
//! │  (Sensor+Actuator+Display)(CapturePort)     (ClassifierPort)   │
//! │  LogEventSink   SystemDelay   WifiAdapter   EspHttpTransport   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            SortController (pure sequencing)            │    │
//! │  │  IDLE → OBJECT_DETECTED → … → RETURNING → IDLE         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Stop button ISR ──▶ ShutdownToken                             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, InterruptType, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, config::TimerConfig};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::rmt::{TxRmtDriver, config::TransmitConfig};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{info, warn};

use wastesort::adapters::camera::{self, CameraAdapter};
use wastesort::adapters::hardware::HardwareAdapter;
use wastesort::adapters::http::EspHttpTransport;
use wastesort::adapters::log_sink::LogEventSink;
use wastesort::adapters::time::SystemDelay;
use wastesort::adapters::wifi::{ConnectivityPort, WifiAdapter};
use wastesort::app::service::SortController;
use wastesort::app::shutdown::ShutdownToken;
use wastesort::classifier::GeminiClassifier;
use wastesort::config::SorterConfig;
use wastesort::drivers::lcd::Lcd2004;
use wastesort::drivers::light_strip::{LightStrip, RmtPixelBus};
use wastesort::drivers::servo::{ServoMapping, ServoPair};
use wastesort::drivers::stepper::HalfStepMotor;
use wastesort::error::Error;
use wastesort::pins;
use wastesort::sensors::presence::PresenceSensor;

/// Connect attempts before giving up on the network at boot.
const WIFI_CONNECT_ATTEMPTS: u32 = 5;

// Build-time secrets.  Never logged.
const WIFI_SSID: &str = match option_env!("WASTESORT_WIFI_SSID") {
    Some(s) => s,
    None => "",
};
const WIFI_PASS: &str = match option_env!("WASTESORT_WIFI_PASS") {
    Some(s) => s,
    None => "",
};
const API_KEY: &str = match option_env!("WASTESORT_API_KEY") {
    Some(s) => s,
    None => "",
};

fn load_config() -> Result<SorterConfig> {
    let config = match option_env!("WASTESORT_CONFIG_JSON") {
        Some(raw) => {
            info!("Config: applying build-time override");
            SorterConfig::from_json(raw).map_err(Error::from)?
        }
        None => SorterConfig::default(),
    };
    config.validate().map_err(Error::from)?;
    Ok(config)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  WasteSort v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config()?;
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 2. Network ────────────────────────────────────────────
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?);
    // Classification degrades to Unknown while offline.
    match wifi.set_credentials(WIFI_SSID, WIFI_PASS) {
        Ok(()) => {
            if let Err(e) = wifi.connect_with_retry(WIFI_CONNECT_ATTEMPTS, &mut SystemDelay) {
                warn!("WiFi unavailable ({}), continuing offline", e);
            }
        }
        Err(e) => warn!("WiFi credentials rejected ({}), continuing offline", e),
    }

    // SAFETY (all `Any*Pin::new` below): each GPIO number in `pins` is
    // claimed exactly once and never taken from `peripherals.pins`.

    // ── 3. Display ────────────────────────────────────────────
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        unsafe { AnyIOPin::new(pins::I2C_SDA_GPIO) },
        unsafe { AnyIOPin::new(pins::I2C_SCL_GPIO) },
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let mut display = Lcd2004::new(i2c, Ets, pins::LCD_I2C_ADDR);
    if let Err(e) = display.init() {
        warn!("LCD init failed ({}), continuing without display", e);
    }

    // ── 4. Servos (LEDC timer 0, channels 0-3) ────────────────
    let servo_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::new()
            .frequency(Hertz(pins::SERVO_PWM_FREQ_HZ))
            // Duties are written as fractions, so the resolution only
            // sets the pulse granularity.
            .resolution(esp_idf_hal::ledc::Resolution::Bits10),
    )?;
    let mapping = ServoMapping::from_config(&config);
    let intake = ServoPair::new(
        LedcDriver::new(peripherals.ledc.channel0, &servo_timer, unsafe {
            AnyOutputPin::new(pins::SERVO_INTAKE_A_GPIO)
        })?,
        LedcDriver::new(peripherals.ledc.channel1, &servo_timer, unsafe {
            AnyOutputPin::new(pins::SERVO_INTAKE_B_GPIO)
        })?,
        mapping,
    );
    let drop_gate = ServoPair::new(
        LedcDriver::new(peripherals.ledc.channel2, &servo_timer, unsafe {
            AnyOutputPin::new(pins::SERVO_DROP_A_GPIO)
        })?,
        LedcDriver::new(peripherals.ledc.channel3, &servo_timer, unsafe {
            AnyOutputPin::new(pins::SERVO_DROP_B_GPIO)
        })?,
        mapping,
    );

    // ── 5. Conveyor stepper ───────────────────────────────────
    let [in1, in2, in3, in4] = pins::STEPPER_GPIOS;
    let coils = [
        PinDriver::output(unsafe { AnyOutputPin::new(in1) })?,
        PinDriver::output(unsafe { AnyOutputPin::new(in2) })?,
        PinDriver::output(unsafe { AnyOutputPin::new(in3) })?,
        PinDriver::output(unsafe { AnyOutputPin::new(in4) })?,
    ];
    let conveyor = HalfStepMotor::new(coils, Ets, config.step_delay_us);

    // ── 6. Capture light ──────────────────────────────────────
    let tx = TxRmtDriver::new(
        peripherals.rmt.channel0,
        unsafe { AnyOutputPin::new(pins::LIGHT_DATA_GPIO) },
        &TransmitConfig::new().clock_divider(1),
    )?;
    let light = LightStrip::new(RmtPixelBus::new(tx)?, pins::LIGHT_NUM_PIXELS);

    // ── 7. Presence sensor ────────────────────────────────────
    let mut presence_pin = PinDriver::input(unsafe { AnyIOPin::new(pins::PRESENCE_GPIO) })?;
    presence_pin.set_pull(Pull::Up)?;
    let presence = PresenceSensor::new(presence_pin);

    let hw = HardwareAdapter::new(presence, intake, drop_gate, conveyor, light, display);

    // ── 8. Camera + artifact store ────────────────────────────
    // Neither failure stops the station: captures report no artifact and
    // every cycle returns to "Ready".
    if let Err(e) = camera::mount_artifact_fs() {
        warn!("{}, artifacts will not be stored", e);
    }
    let mut cam = CameraAdapter::new(config.artifact_path.as_str());
    if let Err(e) = camera::init_camera() {
        warn!("Camera init failed ({}), continuing without capture", e);
        cam.mark_unavailable();
    }

    // ── 9. Classifier ─────────────────────────────────────────
    if API_KEY.is_empty() {
        warn!("Classifier: no API key configured, requests will be rejected");
    }
    let classifier = GeminiClassifier::new(
        EspHttpTransport::new(config.http_timeout_ms),
        config.endpoint_with_key(API_KEY),
        config.classifier_prompt.clone(),
    );

    // ── 10. Stop button → shutdown token ──────────────────────
    let shutdown = ShutdownToken::new();
    let mut stop_button = PinDriver::input(unsafe { AnyIOPin::new(pins::STOP_BUTTON_GPIO) })?;
    stop_button.set_pull(Pull::Up)?;
    stop_button.set_interrupt_type(InterruptType::NegEdge)?;
    {
        let token = shutdown.clone();
        // SAFETY: the callback only performs an atomic store.
        unsafe { stop_button.subscribe(move || token.request())? };
    }
    stop_button.enable_interrupt()?;

    // ── 11. Run ───────────────────────────────────────────────
    let mut controller =
        SortController::new(config, hw, cam, classifier, SystemDelay, LogEventSink::new());
    let cycles = controller.run(&shutdown);

    info!("Stopped after {} cycles", cycles);
    wifi.disconnect();
    Ok(())
}
