use super::traits::Led;
use core::convert::Infallible;
use embedded_hal::digital::StatefulOutputPin;

/// Indicator on any push-pull output that reports its own state
pub struct GpioLed<P> {
    pin: P,
    active_low: bool,
}

impl<P> GpioLed<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    /// Indicator lit by driving the pin low (Blue Pill PC13 LED)
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    /// Indicator lit by driving the pin high (probe or external LED)
    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    pub fn is_on(&mut self) -> bool {
        let Ok(high) = self.pin.is_set_high();
        high != self.active_low
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> Led for GpioLed<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    fn on(&mut self) {
        let Ok(()) = if self.active_low {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        };
    }

    fn off(&mut self) {
        let Ok(()) = if self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }

    fn toggle(&mut self) {
        let Ok(()) = self.pin.toggle();
    }
}
