pub mod gpio_led;
pub mod traits;

#[cfg(feature = "firmware")]
pub mod tick_timer;
#[cfg(feature = "firmware")]
pub mod usart_rx;
