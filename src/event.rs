//! Interrupt events and their dispatch actions
//!
//! Both interrupt vectors used by the monitor can fire for several sub-causes. The handlers
//! first reduce the raw status registers to one [`Event`], then look up the [`Action`] for
//! it. Keeping the two steps pure lets the dispatch table be driven by injected events.

/// One interrupt sub-cause, as seen by a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Vector entered with no pending flag
    None,
    /// A byte is waiting in the receive data register
    ReceiveComplete,
    /// The last frame has left the shift register
    TransmitComplete,
    /// A start bit was seen on the line
    StartDetected,
    /// The transmit data register can take another byte
    TransmitEmpty,
    /// The tick timer wrapped
    TimerOverflow,
    /// A byte arrived before the previous one was read; the data register holds stale data
    Overrun,
}

/// What a handler does for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Read the received byte and hand it to the command sink
    ForwardByte,
    /// Advance the tick counter
    CountTick,
    /// Read the data register to clear the receive condition, dropping the value
    DiscardByte,
    /// Recognised sub-cause with nothing to do
    Ignore,
}

impl Event {
    pub const fn action(self) -> Action {
        match self {
            Event::ReceiveComplete => Action::ForwardByte,
            Event::TimerOverflow => Action::CountTick,
            Event::Overrun => Action::DiscardByte,
            Event::None
            | Event::TransmitComplete
            | Event::StartDetected
            | Event::TransmitEmpty => Action::Ignore,
        }
    }
}

/// Snapshot of the USART status (SR) and control (CR1) registers
///
/// On the F1 USART the interrupt enable bits in CR1 sit at the same positions as the
/// matching flags in SR, so a flag only counts as pending when both are set. The one
/// exception is ORE, which has no enable of its own and interrupts whenever RXNEIE is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsartStatus {
    pub sr: u32,
    pub cr1: u32,
}

impl UsartStatus {
    pub const ORE: u32 = 1 << 3;
    pub const RXNE: u32 = 1 << 5;
    pub const TC: u32 = 1 << 6;
    pub const TXE: u32 = 1 << 7;

    pub const fn new(sr: u32, cr1: u32) -> Self {
        Self { sr, cr1 }
    }

    /// Highest-priority enabled flag: receive, then overrun, then transmit-empty, then
    /// transmit-complete.
    pub const fn pending_event(&self) -> Event {
        let pending = self.sr & self.cr1;
        if pending & Self::RXNE != 0 {
            Event::ReceiveComplete
        } else if self.sr & Self::ORE != 0 && self.cr1 & Self::RXNE != 0 {
            Event::Overrun
        } else if pending & Self::TXE != 0 {
            Event::TransmitEmpty
        } else if pending & Self::TC != 0 {
            Event::TransmitComplete
        } else {
            Event::None
        }
    }
}

/// Snapshot of a general-purpose timer's status (SR) and interrupt enable (DIER) registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerStatus {
    pub sr: u32,
    pub dier: u32,
}

impl TimerStatus {
    pub const UIF: u32 = 1 << 0;

    pub const fn new(sr: u32, dier: u32) -> Self {
        Self { sr, dier }
    }

    pub const fn pending_event(&self) -> Event {
        if self.sr & self.dier & Self::UIF != 0 {
            Event::TimerOverflow
        } else {
            Event::None
        }
    }
}
