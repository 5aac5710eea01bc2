//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements     | Connects to                     |
//! |-------------|----------------|---------------------------------|
//! | `hardware`  | SensorPort     | IR sensor GPIO                  |
//! |             | ActuatorPort   | LEDC servos, stepper, WS2812    |
//! |             | DisplayPort    | HD44780 over I²C                |
//! | `camera`    | CapturePort    | esp32-camera (OV2640)           |
//! | `http`      | HttpTransport  | ESP-IDF HTTPS client            |
//! | `log_sink`  | EventSink      | Serial log output               |
//! | `time`      | DelayNs        | FreeRTOS / ROM delay, esp_timer |
//! | `wifi`      | ConnectivityPort | ESP-IDF WiFi STA              |

pub mod camera;
pub mod hardware;
#[cfg(target_os = "espidf")]
pub mod http;
pub mod log_sink;
pub mod time;
pub mod wifi;
