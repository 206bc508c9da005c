use crate::event::TimerStatus;
use embassy_stm32::{
    time::Hertz,
    timer::{CoreInstance, low_level::Timer},
};

/// General-purpose timer producing the periodic tick interrupt
pub struct TickTimer<T: CoreInstance + 'static> {
    timer: Timer<'static, T>,
}

impl<T: CoreInstance + 'static> TickTimer<T> {
    /// Program the timer for `tick_hz` overflows per second and start it.
    pub fn start(timer: Timer<'static, T>, tick_hz: u32) -> Self {
        timer.stop();
        timer.set_frequency(Hertz(tick_hz));
        timer.clear_update_interrupt();
        timer.enable_update_interrupt(true);
        timer.start();
        Self { timer }
    }

    pub fn status(&self) -> TimerStatus {
        let regs = self.timer.regs_core();
        TimerStatus::new(regs.sr().read().0, regs.dier().read().0)
    }

    /// Acknowledge the overflow so the vector does not re-enter.
    pub fn clear(&self) {
        self.timer.clear_update_interrupt();
    }
}
