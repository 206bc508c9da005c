/// A single output line used as an activity indicator
pub trait Led {
    fn on(&mut self);
    fn off(&mut self);
    fn toggle(&mut self);
}

/// Receiver data register of a serial port
pub trait ByteSource {
    /// Read the byte that raised the receive interrupt.
    ///
    /// The read itself clears the receive condition in hardware, so it must happen even
    /// when the value is not needed.
    fn read_byte(&mut self) -> u8;
}

/// Consumer of received bytes, typically a command parser
///
/// Called once per byte, in arrival order, from interrupt context. Implementations should
/// return promptly: the receive vector stays blocked until they do.
pub trait ByteSink {
    fn receive(&mut self, byte: u8);

    /// Reset the sink's internal buffers. Called once at boot before interrupts run.
    fn reset(&mut self) {}
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn receive(&mut self, byte: u8) {
        (**self).receive(byte)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
