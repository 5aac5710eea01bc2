//! GPIO / peripheral pin assignments for the sorter station.
//!
//! Single source of truth — `main` wires peripherals from these numbers
//! rather than hard-coding them at each call site.  The board is a Seeed
//! XIAO ESP32-S3 Sense (OV2640 camera on the expansion board).

// ---------------------------------------------------------------------------
// Servo pairs (LEDC PWM, 50 Hz)
// ---------------------------------------------------------------------------

/// Intake (front) gate, first servo.
pub const SERVO_INTAKE_A_GPIO: i32 = 9;
/// Intake (front) gate, second servo.
pub const SERVO_INTAKE_B_GPIO: i32 = 8;
/// Drop gate, first servo.
pub const SERVO_DROP_A_GPIO: i32 = 7;
/// Drop gate, second servo.
pub const SERVO_DROP_B_GPIO: i32 = 44;

/// Servo PWM frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;

// ---------------------------------------------------------------------------
// Presence sensor
// ---------------------------------------------------------------------------

/// IR obstacle sensor output.  LOW = object present.
pub const PRESENCE_GPIO: i32 = 41;

// ---------------------------------------------------------------------------
// Conveyor stepper (ULN2003 + 28BYJ-48)
// ---------------------------------------------------------------------------

/// Coil lines IN1 – IN4, in sequence order.
pub const STEPPER_GPIOS: [i32; 4] = [2, 3, 4, 43];

// ---------------------------------------------------------------------------
// Indicator light (WS2812 ring)
// ---------------------------------------------------------------------------

pub const LIGHT_DATA_GPIO: i32 = 1;
pub const LIGHT_NUM_PIXELS: usize = 16;

// ---------------------------------------------------------------------------
// Status display (HD44780 20×4 behind a PCF8574 backpack)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 5;
pub const I2C_SCL_GPIO: i32 = 6;
pub const I2C_FREQ_HZ: u32 = 400_000;
pub const LCD_I2C_ADDR: u8 = 0x27;
pub const LCD_ROWS: usize = 4;
pub const LCD_COLS: usize = 20;

// ---------------------------------------------------------------------------
// Stop button (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Requests a controlled shutdown; wired to the BOOT button.
pub const STOP_BUTTON_GPIO: i32 = 0;

// ---------------------------------------------------------------------------
// Camera (OV2640 on the Sense expansion board)
// ---------------------------------------------------------------------------

pub const CAM_PWDN_GPIO: i32 = -1;
pub const CAM_RESET_GPIO: i32 = -1;
pub const CAM_XCLK_GPIO: i32 = 10;
pub const CAM_SIOD_GPIO: i32 = 40;
pub const CAM_SIOC_GPIO: i32 = 39;
/// Data lines D0 (Y2) … D7 (Y9).
pub const CAM_DATA_GPIOS: [i32; 8] = [15, 17, 18, 16, 14, 12, 11, 48];
pub const CAM_VSYNC_GPIO: i32 = 38;
pub const CAM_HREF_GPIO: i32 = 47;
pub const CAM_PCLK_GPIO: i32 = 13;
pub const CAM_XCLK_FREQ_HZ: i32 = 20_000_000;
