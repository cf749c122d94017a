use rppal::gpio::{self, Gpio, InputPin};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("unable to acquire button pin: {0}")]
    Gpio(#[from] gpio::Error),
}

/// Source of the "primary click" signal, sampled once per frame.
pub trait InputSource {
    fn clicked(&mut self) -> bool;
}

/// No input device attached; pages only rotate on the timer.
pub struct NoInput;

impl InputSource for NoInput {
    fn clicked(&mut self) -> bool {
        false
    }
}

/// Reports a press once, on the frame the level goes from released to pressed.
#[derive(Debug, Default)]
pub struct Edge {
    pressed: bool,
}

impl Edge {
    pub fn update(&mut self, pressed: bool) -> bool {
        let rising = pressed && !self.pressed;
        self.pressed = pressed;
        rising
    }
}

/// Momentary push button between a GPIO pin and ground.
pub struct Button {
    pin: InputPin,
    edge: Edge,
}

impl Button {
    pub fn new(bcm_pin: u8) -> Result<Self, InputError> {
        Ok(Self {
            pin: Gpio::new()?.get(bcm_pin)?.into_input_pullup(),
            edge: Edge::default(),
        })
    }
}

impl InputSource for Button {
    fn clicked(&mut self) -> bool {
        let pressed = self.pin.is_low();
        self.edge.update(pressed)
    }
}
