//! HD44780 character display (20×4) behind a PCF8574 I²C backpack.
//!
//! The controller runs in 4-bit mode.  Each byte goes out as two nibbles;
//! each nibble is written to the expander twice, once with EN high and
//! once with EN low, which latches it into the HD44780.
//!
//! ```text
//!  PCF8574 bit:  7   6   5   4   3   2   1   0
//!  HD44780:     D7  D6  D5  D4  BL  EN  RW  RS
//! ```
//!
//! Text wraps onto the next row at `LCD_COLS`; anything past the last
//! cell is dropped.  A shadow copy of the visible cells is kept so the
//! current text can be logged or inspected without reading the module.
//!
//! ## Dual-target design
//!
//! Generic over embedded-hal [`I2c`] and [`DelayNs`]: `I2cDriver` + `Ets`
//! on ESP-IDF, mocks on host/test.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::ActuatorError;
use crate::pins::{LCD_COLS, LCD_ROWS};

// Expander control bits.
const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

// HD44780 instructions.
const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_INCREMENT: u8 = 0x06;
const CMD_DISPLAY_OFF: u8 = 0x08;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM address of column 0 on each row of a 20×4 module.
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Shown in place of characters outside the printable ASCII range.
const REPLACEMENT: u8 = b'?';

pub struct Lcd2004<I, D> {
    i2c: I,
    delay: D,
    addr: u8,
    row: usize,
    col: usize,
    shadow: [[u8; LCD_COLS]; LCD_ROWS],
}

impl<I: I2c, D: DelayNs> Lcd2004<I, D> {
    pub fn new(i2c: I, delay: D, addr: u8) -> Self {
        Self {
            i2c,
            delay,
            addr,
            row: 0,
            col: 0,
            shadow: [[b' '; LCD_COLS]; LCD_ROWS],
        }
    }

    /// Power-on sequence: force 8-bit mode three times, drop to 4-bit,
    /// then configure two-line mode, clear and switch the display on.
    pub fn init(&mut self) -> Result<(), ActuatorError> {
        self.delay.delay_ms(50);

        self.write_nibble(0x30, 0)?;
        self.delay.delay_ms(5);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x20, 0)?;
        self.delay.delay_us(150);

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_OFF)?;
        self.clear()?;
        self.command(CMD_ENTRY_INCREMENT)?;
        self.command(CMD_DISPLAY_ON)?;
        Ok(())
    }

    /// Blank every cell and home the cursor.
    pub fn clear(&mut self) -> Result<(), ActuatorError> {
        self.shadow = [[b' '; LCD_COLS]; LCD_ROWS];
        self.row = 0;
        self.col = 0;
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    /// Write `text` at the cursor.  `\n` starts the next row.
    pub fn put_str(&mut self, text: &str) -> Result<(), ActuatorError> {
        for ch in text.chars() {
            if self.row >= LCD_ROWS {
                break;
            }
            if ch == '\n' {
                self.next_row()?;
                continue;
            }
            let byte = if ch.is_ascii() && !ch.is_ascii_control() {
                ch as u8
            } else {
                REPLACEMENT
            };
            self.data(byte)?;
            self.shadow[self.row][self.col] = byte;
            self.col += 1;
            if self.col >= LCD_COLS {
                self.next_row()?;
            }
        }
        Ok(())
    }

    /// Visible text of `row`, trailing blanks included.
    pub fn row_text(&self, row: usize) -> &str {
        self.shadow
            .get(row)
            .and_then(|r| core::str::from_utf8(r).ok())
            .unwrap_or("")
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    // ── Internal ──────────────────────────────────────────────

    fn next_row(&mut self) -> Result<(), ActuatorError> {
        self.row += 1;
        self.col = 0;
        if self.row < LCD_ROWS {
            self.command(CMD_SET_DDRAM | ROW_OFFSETS[self.row])?;
        }
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), ActuatorError> {
        self.write_byte(cmd, 0)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn data(&mut self, byte: u8) -> Result<(), ActuatorError> {
        self.write_byte(byte, RS)
    }

    fn write_byte(&mut self, byte: u8, mode: u8) -> Result<(), ActuatorError> {
        self.write_nibble(byte & 0xF0, mode)?;
        self.write_nibble((byte << 4) & 0xF0, mode)
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), ActuatorError> {
        // Backlight stays on for every latch.
        let out = nibble | mode | BACKLIGHT;
        self.expander_write(&[out | EN, out])
    }

    fn expander_write(&mut self, bytes: &[u8]) -> Result<(), ActuatorError> {
        self.i2c
            .write(self.addr, bytes)
            .map_err(|_| ActuatorError::BusWriteFailed)
    }
}
