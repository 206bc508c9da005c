//! Receive side of USART1 as seen from its interrupt handler
//!
//! The embassy blocking driver configures the peripheral (pins, baud rate, frame format);
//! this wrapper keeps both driver halves alive and talks to the data register directly so
//! a single interrupt reads exactly one byte.

use super::traits::ByteSource;
use crate::event::UsartStatus;
use embassy_stm32::{
    mode::Blocking,
    pac,
    usart::{UartRx, UartTx},
};

pub struct UsartReceiver {
    _tx: UartTx<'static, Blocking>,
    _rx: UartRx<'static, Blocking>,
}

impl UsartReceiver {
    /// Take over the halves of a configured USART1 and enable its receive interrupt.
    pub fn new(tx: UartTx<'static, Blocking>, rx: UartRx<'static, Blocking>) -> Self {
        pac::USART1.cr1().modify(|w| w.set_rxneie(true));
        Self { _tx: tx, _rx: rx }
    }

    pub fn status(&self) -> UsartStatus {
        let regs = pac::USART1;
        UsartStatus::new(regs.sr().read().0, regs.cr1().read().0)
    }
}

impl ByteSource for UsartReceiver {
    fn read_byte(&mut self) -> u8 {
        // Reading DR after SR clears RXNE and any overrun flag
        pac::USART1.dr().read().dr() as u8
    }
}
