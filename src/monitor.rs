//! Device state and the two interrupt-side handlers
//!
//! State machine of the firmware:
//!
//! ```text
//! Initializing -> Idle <-> { HandlingReceive | HandlingTick }
//! ```
//!
//! `Idle` is the only resting state and has no exit. Each handler runs to completion on
//! the state passed to it; the two never touch each other's fields.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::event::{Action, Event};
use crate::hardware::traits::{ByteSink, ByteSource, Led};

/// Process-wide count of timer overflows
///
/// Written only by the tick handler. Lives in a `static` in the firmware so a debug probe
/// can read it by symbol; such reads are asynchronous to the firmware and accepted as is.
#[derive(Debug)]
pub struct TickCounter(AtomicU32);

impl TickCounter {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    pub const fn starting_at(value: u32) -> Self {
        Self(AtomicU32::new(value))
    }

    /// Add one tick, wrapping at `u32::MAX`. Returns the new value.
    pub fn increment(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Activity counters, each field owned by the handler named in it
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonitorStats {
    pub bytes_forwarded: u32,
    pub overruns: u32,
    pub receive_ignored: u32,
    pub tick_ignored: u32,
}

/// Everything the interrupt handlers mutate
///
/// | field            | written by      |
/// |------------------|-----------------|
/// | `ticks`          | tick handler    |
/// | `rx_indicator`   | receive handler |
/// | `tick_indicator` | tick handler    |
pub struct DeviceState<'a, R, T> {
    ticks: &'a TickCounter,
    rx_indicator: R,
    tick_indicator: T,
    stats: MonitorStats,
}

impl<'a, R: Led, T: Led> DeviceState<'a, R, T> {
    /// Build the state with both indicators switched off.
    pub fn new(ticks: &'a TickCounter, mut rx_indicator: R, mut tick_indicator: T) -> Self {
        rx_indicator.off();
        tick_indicator.off();
        Self {
            ticks,
            rx_indicator,
            tick_indicator,
            stats: MonitorStats::default(),
        }
    }

    /// Receive dispatcher, called from the serial vector.
    ///
    /// On `ReceiveComplete` the indicator toggles, the data register is read (clearing the
    /// interrupt) and the byte goes to `sink`. On `Overrun` the data register is read and
    /// the stale value dropped, so the vector does not re-enter. Any other event is a
    /// no-op on this vector.
    pub fn on_receive<B, S>(&mut self, event: Event, source: &mut B, sink: &mut S) -> Action
    where
        B: ByteSource + ?Sized,
        S: ByteSink + ?Sized,
    {
        match event.action() {
            Action::ForwardByte => {
                self.rx_indicator.toggle();
                let byte = source.read_byte();
                sink.receive(byte);
                self.stats.bytes_forwarded = self.stats.bytes_forwarded.wrapping_add(1);
                log_trace!("rx byte {=u8:#x}", byte);
                Action::ForwardByte
            }
            Action::DiscardByte => {
                let _stale = source.read_byte();
                self.stats.overruns = self.stats.overruns.wrapping_add(1);
                log_warn!("rx overrun, dropped {=u8:#x} ({})", _stale, self.stats);
                Action::DiscardByte
            }
            Action::CountTick | Action::Ignore => {
                self.stats.receive_ignored = self.stats.receive_ignored.wrapping_add(1);
                log_debug!("serial event {} ignored ({})", event, self.stats);
                Action::Ignore
            }
        }
    }

    /// Periodic tick handler, called from the timer vector.
    pub fn on_tick(&mut self, event: Event) -> Action {
        match event.action() {
            Action::CountTick => {
                let _now = self.ticks.increment();
                self.tick_indicator.toggle();
                log_trace!("tick {=u32}", _now);
                Action::CountTick
            }
            Action::ForwardByte | Action::DiscardByte | Action::Ignore => {
                self.stats.tick_ignored = self.stats.tick_ignored.wrapping_add(1);
                log_debug!("timer event {} ignored ({})", event, self.stats);
                Action::Ignore
            }
        }
    }

    pub fn ticks(&self) -> u32 {
        self.ticks.get()
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn rx_indicator(&self) -> &R {
        &self.rx_indicator
    }

    pub fn tick_indicator(&self) -> &T {
        &self.tick_indicator
    }
}

/// Reset the command sink's buffers. Runs once, before interrupts are unmasked.
pub fn boot<S: ByteSink + ?Sized>(sink: &mut S) {
    sink.reset();
    log_info!("monitor sink reset");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::UsartStatus;

    #[derive(Default)]
    struct MockLed {
        lit: bool,
        toggles: usize,
    }

    impl Led for MockLed {
        fn on(&mut self) {
            self.lit = true;
        }

        fn off(&mut self) {
            self.lit = false;
        }

        fn toggle(&mut self) {
            self.lit = !self.lit;
            self.toggles += 1;
        }
    }

    struct ScriptedSource {
        bytes: Vec<u8>,
        reads: usize,
    }

    impl ScriptedSource {
        fn new(bytes: &[u8]) -> Self {
            Self {
                bytes: bytes.to_vec(),
                reads: 0,
            }
        }
    }

    impl ByteSource for ScriptedSource {
        fn read_byte(&mut self) -> u8 {
            let byte = self.bytes[self.reads];
            self.reads += 1;
            byte
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        received: Vec<u8>,
        resets: usize,
    }

    impl ByteSink for RecordingSink {
        fn receive(&mut self, byte: u8) {
            self.received.push(byte);
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn state(ticks: &TickCounter) -> DeviceState<'_, MockLed, MockLed> {
        DeviceState::new(ticks, MockLed::default(), MockLed::default())
    }

    #[test]
    fn new_state_switches_indicators_off() {
        let ticks = TickCounter::new();
        let rx = MockLed {
            lit: true,
            toggles: 0,
        };
        let dev = DeviceState::new(&ticks, rx, MockLed::default());
        assert!(!dev.rx_indicator().lit);
        assert!(!dev.tick_indicator().lit);
        assert_eq!(dev.rx_indicator().toggles, 0);
    }

    #[test]
    fn receive_forwards_byte_and_toggles() {
        let ticks = TickCounter::new();
        let mut dev = state(&ticks);
        let mut source = ScriptedSource::new(&[0x55]);
        let mut sink = RecordingSink::default();

        let action = dev.on_receive(Event::ReceiveComplete, &mut source, &mut sink);

        assert_eq!(action, Action::ForwardByte);
        assert_eq!(sink.received, vec![0x55]);
        assert_eq!(source.reads, 1);
        assert_eq!(dev.rx_indicator().toggles, 1);
        assert!(dev.rx_indicator().lit);
        assert_eq!(dev.tick_indicator().toggles, 0);
        assert_eq!(dev.stats().bytes_forwarded, 1);
    }

    #[test]
    fn receive_ignores_other_sub_causes() {
        let ticks = TickCounter::new();
        let mut dev = state(&ticks);
        let mut source = ScriptedSource::new(&[]);
        let mut sink = RecordingSink::default();

        for event in [
            Event::None,
            Event::TransmitComplete,
            Event::StartDetected,
            Event::TransmitEmpty,
            Event::TimerOverflow,
        ] {
            assert_eq!(
                dev.on_receive(event, &mut source, &mut sink),
                Action::Ignore
            );
        }

        assert!(sink.received.is_empty());
        assert_eq!(source.reads, 0);
        assert_eq!(dev.rx_indicator().toggles, 0);
        assert_eq!(dev.ticks(), 0);
        assert_eq!(dev.stats().receive_ignored, 5);
    }

    #[test]
    fn overrun_reads_data_register_without_forwarding() {
        let ticks = TickCounter::new();
        let mut dev = state(&ticks);
        let mut source = ScriptedSource::new(&[0x10, 0x11, 0x12]);
        let mut sink = RecordingSink::default();
        // ORE left set after the byte was read, RXNE clear, receive interrupt enabled
        let status = UsartStatus::new(
            UsartStatus::ORE | UsartStatus::TXE | UsartStatus::TC,
            UsartStatus::RXNE,
        );

        for _ in 0..3 {
            assert_eq!(
                dev.on_receive(status.pending_event(), &mut source, &mut sink),
                Action::DiscardByte
            );
        }

        assert_eq!(source.reads, 3);
        assert!(sink.received.is_empty());
        assert_eq!(dev.rx_indicator().toggles, 0);
        assert_eq!(dev.stats().overruns, 3);
        assert_eq!(dev.stats().receive_ignored, 0);
    }

    #[test]
    fn tick_counts_and_toggles() {
        let ticks = TickCounter::new();
        let mut dev = state(&ticks);

        assert_eq!(dev.on_tick(Event::TimerOverflow), Action::CountTick);
        assert_eq!(dev.on_tick(Event::TimerOverflow), Action::CountTick);

        assert_eq!(ticks.get(), 2);
        assert_eq!(dev.tick_indicator().toggles, 2);
        assert!(!dev.tick_indicator().lit);
        assert_eq!(dev.rx_indicator().toggles, 0);
    }

    #[test]
    fn tick_ignores_other_sub_causes() {
        let ticks = TickCounter::new();
        let mut dev = state(&ticks);

        assert_eq!(dev.on_tick(Event::None), Action::Ignore);
        assert_eq!(dev.on_tick(Event::ReceiveComplete), Action::Ignore);
        assert_eq!(dev.on_tick(Event::Overrun), Action::Ignore);

        assert_eq!(ticks.get(), 0);
        assert_eq!(dev.tick_indicator().toggles, 0);
        assert_eq!(dev.stats().tick_ignored, 3);
    }

    #[test]
    fn counter_wraps() {
        let ticks = TickCounter::starting_at(u32::MAX - 1);
        let mut dev = state(&ticks);

        dev.on_tick(Event::TimerOverflow);
        assert_eq!(ticks.get(), u32::MAX);
        dev.on_tick(Event::TimerOverflow);
        assert_eq!(ticks.get(), 0);
        assert_eq!(ticks.increment(), 1);
    }

    #[test]
    fn boot_resets_sink_once() {
        let mut sink = RecordingSink::default();
        boot(&mut sink);
        assert_eq!(sink.resets, 1);
        assert!(sink.received.is_empty());
    }

    #[test]
    fn sink_by_mutable_reference() {
        let ticks = TickCounter::new();
        let mut dev = state(&ticks);
        let mut source = ScriptedSource::new(b"ok");
        let mut sink = RecordingSink::default();
        {
            let mut borrowed = &mut sink;
            dev.on_receive(Event::ReceiveComplete, &mut source, &mut borrowed);
            dev.on_receive(Event::ReceiveComplete, &mut source, &mut borrowed);
        }
        assert_eq!(sink.received, b"ok".to_vec());
    }
}
