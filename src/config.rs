//! Compile-time monitor configuration
//!
//! The monitor has no persistent storage, so every setting is fixed when the firmware is
//! built. `MonitorConfig::default()` reproduces the classic setup: 8 MHz core clock,
//! 9600 baud with 16x oversampling and a one second tick.

use core::fmt;

/// Serial line speed in baud
pub const BAUD_RATE: u32 = 9600;

/// Periodic tick rate in Hz
pub const TICK_HZ: u32 = 1;

/// System clock feeding USART1 (APB2) and TIM2 (APB1), both undivided
pub const SYSCLK_HZ: u32 = 8_000_000;

/// Oversampling factor of the USART receiver
const OVERSAMPLING: u32 = 16;

/// Oscillator driving the 8 MHz system clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Internal RC oscillator (power-on default)
    Hsi,
    /// External 8 MHz crystal fitted on the Blue Pill
    Hse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonitorConfig {
    pub baud_rate: u32,
    pub tick_hz: u32,
    pub clock: ClockSource,
}

/// Rejected configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    ZeroBaudRate,
    /// The baud divisor does not fit the 16-bit BRR register
    BaudRateOutOfRange(u32),
    ZeroTickRate,
    /// Ticks faster than the timer input clock cannot be produced
    TickRateTooHigh(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroBaudRate => write!(f, "baud rate must be non-zero"),
            ConfigError::BaudRateOutOfRange(baud) => {
                write!(f, "baud rate {} not reachable from {} Hz", baud, SYSCLK_HZ)
            }
            ConfigError::ZeroTickRate => write!(f, "tick rate must be non-zero"),
            ConfigError::TickRateTooHigh(hz) => {
                write!(f, "tick rate {} Hz exceeds timer clock {} Hz", hz, SYSCLK_HZ)
            }
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            baud_rate: BAUD_RATE,
            tick_hz: TICK_HZ,
            clock: ClockSource::Hsi,
        }
    }
}

impl MonitorConfig {
    /// Check that the serial and tick settings can be produced from `SYSCLK_HZ`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::ZeroBaudRate);
        }
        let divisor = self.raw_divisor();
        if divisor < OVERSAMPLING || divisor > u16::MAX as u32 {
            return Err(ConfigError::BaudRateOutOfRange(self.baud_rate));
        }
        if self.tick_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.tick_hz > SYSCLK_HZ {
            return Err(ConfigError::TickRateTooHigh(self.tick_hz));
        }
        Ok(())
    }

    /// USARTDIV in 1/16 units, i.e. `mantissa << 4 | fraction` as written to BRR.
    ///
    /// 8 MHz / 9600 baud gives 0x0341: mantissa 52, fraction 1 (52.0625).
    pub fn baud_divisor(&self) -> Result<u16, ConfigError> {
        self.validate()?;
        Ok(self.raw_divisor() as u16)
    }

    /// Length of one tick in milliseconds, truncated.
    pub fn tick_period_ms(&self) -> u32 {
        if self.tick_hz == 0 {
            return 0;
        }
        1000 / self.tick_hz
    }

    // Rounded to nearest; the caller guarantees a non-zero baud rate.
    fn raw_divisor(&self) -> u32 {
        (SYSCLK_HZ + self.baud_rate / 2) / self.baud_rate
    }
}
