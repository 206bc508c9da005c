//! UART Variable Monitor Core
//! =============================================================================================
//!
//! Interrupt-side logic of the serial variable monitor firmware for the STM32F103 Blue Pill.
//! Everything that can be reasoned about without hardware lives here so it can be
//! exercised on the host:
//! 1. `config`   - compile-time monitor settings (baud rate, tick rate, clock source)
//! 2. `event`    - decoding of interrupt status registers into monitor events
//! 3. `monitor`  - device state, receive dispatcher and periodic tick handler
//! 4. `hardware` - traits for the diagnostic pins, the byte source and the byte sink
//!
//! The firmware binary (`src/bin/uart_monitor.rs`, `firmware` feature) wires these to the
//! USART1 and TIM2 interrupt vectors.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

pub mod config;
pub mod event;
pub mod hardware;
pub mod monitor;

pub use config::{ClockSource, ConfigError, MonitorConfig};
pub use event::{Action, Event, TimerStatus, UsartStatus};
pub use hardware::traits::{ByteSink, ByteSource, Led};
pub use monitor::{DeviceState, MonitorStats, TickCounter, boot};
