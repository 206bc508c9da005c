//! STM32F103 Blue Pill UART Variable Monitor
//! =============================================================================================
//!
//! Date			Author          Notes
//! 18/10/2026	    -               Initial release
//!
//!==============================================================================================
//!
//! Interrupt-only firmware: after start-up the core sleeps and all work happens in two
//! interrupt handlers.
//! - USART1: every received byte toggles PA1 and is handed to the command sink
//! - TIM2:   every overflow increments `TICK_COUNTER` and toggles the PC13 LED
//!
//! Hardware Connections:
//!   USB-serial adapter -> Blue Pill (9600 baud, 8N1)
//!      GND  -> GND
//!      TXD  -> PA10 (USART1_RX)
//!      RXD  -> PA9  (USART1_TX)
//!
//!   Indicators:
//!      PA1  -> receive activity (scope or LED to GND)
//!      PC13 -> onboard LED, one toggle per tick
//!
//! Start-up order:
//! 1. Clocks (embassy init waits for the oscillator to settle)
//! 2. Indicator outputs, USART1 with RX interrupt, TIM2 with update interrupt
//! 3. Device state handed to the interrupt handlers, sink reset
//! 4. Interrupts unmasked, core parked in sleep-on-exit

#![no_std]
#![no_main]

use core::cell::RefCell;

use cortex_m_rt::entry;
use defmt::{info, unwrap};
use embassy_stm32::interrupt;
use embassy_stm32::{
    gpio::{Level, Output, Speed},
    interrupt::InterruptExt,
    peripherals,
    timer::low_level::Timer,
    usart::{self, Uart},
};
use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use {defmt_rtt as _, panic_probe as _}; // Logging and panic handlers

use uart_monitor::{
    ByteSink, ClockSource, DeviceState, MonitorConfig, TickCounter, boot,
    hardware::{gpio_led::GpioLed, tick_timer::TickTimer, usart_rx::UsartReceiver},
};

type Indicator = GpioLed<Output<'static>>;

/// Tick count, readable by symbol from a debug probe
#[unsafe(no_mangle)]
static TICK_COUNTER: TickCounter = TickCounter::new();

/// Everything the two handlers share, installed once before interrupts are unmasked
///
/// Locking masks all interrupts, not just those at or below the caller's priority. Both
/// vectors run at the same default priority, so nothing that could preempt a handler is
/// held off any longer than the hardware already would.
static DEVICE: Mutex<CriticalSectionRawMutex, RefCell<Option<Device>>> =
    Mutex::new(RefCell::new(None));

struct Device {
    state: DeviceState<'static, Indicator, Indicator>,
    rx: UsartReceiver,
    timer: TickTimer<peripherals::TIM2>,
    sink: TraceSink,
}

/// Command sink that reports each byte over RTT
///
/// Stands in for the variable-monitor command parser, which is linked in separately.
struct TraceSink;

impl ByteSink for TraceSink {
    fn receive(&mut self, byte: u8) {
        defmt::debug!("cmd byte {=u8:#x}", byte);
    }

    fn reset(&mut self) {
        defmt::debug!("cmd buffer cleared");
    }
}

/// Main application entry point
#[entry]
fn main() -> ! {
    let monitor = MonitorConfig::default();
    unwrap!(monitor.validate());

    // Clock tree: 8 MHz from HSI or the external crystal, no PLL
    let mut config = embassy_stm32::Config::default();
    if monitor.clock == ClockSource::Hse {
        use embassy_stm32::rcc::*;
        config.rcc.hse = Some(Hse {
            freq: embassy_stm32::time::Hertz(8_000_000),
            mode: HseMode::Oscillator,
        });
        config.rcc.sys = Sysclk::HSE;
    }
    let p = embassy_stm32::init(config);
    info!("UART monitor starting: {}", monitor);

    // Both indicators start dark (PC13 LED is active-low)
    let rx_led = GpioLed::active_high(Output::new(p.PA1, Level::Low, Speed::Low));
    let tick_led = GpioLed::new(Output::new(p.PC13, Level::High, Speed::Low));

    // USART1 at 9600 baud, 8N1, 16x oversampling
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = monitor.baud_rate;
    let uart = unwrap!(Uart::new_blocking(p.USART1, p.PA10, p.PA9, uart_config));
    let (tx, rx) = uart.split();
    let rx = UsartReceiver::new(tx, rx);

    // TIM2 update interrupt once per tick period
    let timer = TickTimer::start(Timer::new(p.TIM2), monitor.tick_hz);

    let mut device = Device {
        state: DeviceState::new(&TICK_COUNTER, rx_led, tick_led),
        rx,
        timer,
        sink: TraceSink,
    };
    boot(&mut device.sink);
    DEVICE.lock(|cell| cell.replace(Some(device)));

    // Unmask both vectors only once the state is in place
    interrupt::USART1.unpend();
    interrupt::TIM2.unpend();
    unsafe {
        interrupt::USART1.enable();
        interrupt::TIM2.enable();
    }
    info!("idle, tick period {} ms", monitor.tick_period_ms());

    // Return to sleep straight after every handler
    let mut core = unwrap!(cortex_m::Peripherals::take());
    core.SCB.set_sleeponexit();
    loop {
        cortex_m::asm::wfi();
    }
}

#[interrupt]
fn USART1() {
    DEVICE.lock(|cell| {
        if let Some(dev) = cell.borrow_mut().as_mut() {
            let event = dev.rx.status().pending_event();
            dev.state.on_receive(event, &mut dev.rx, &mut dev.sink);
        }
    });
}

#[interrupt]
fn TIM2() {
    DEVICE.lock(|cell| {
        if let Some(dev) = cell.borrow_mut().as_mut() {
            let event = dev.timer.status().pending_event();
            dev.timer.clear();
            dev.state.on_tick(event);
        }
    });
}

// Implementation Notes:
// 1. Both handlers take the same critical-section mutex; neither needs to nest
// 2. SLEEPONEXIT means the `wfi` loop body runs only once in practice
// 3. TICK_COUNTER reads from a probe may race a handler; the value is informational
