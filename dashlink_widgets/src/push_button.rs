use crate::color::Rgb;
use dashlink_core::DashboardWidget;

/// Background used until the peer sends a colour
pub const DEFAULT_BASE_COLOR: Rgb = Rgb::new(0x3d, 0x3f, 0x46);

/// Darkening applied while the button is held, in percent
const PRESSED_DARKEN: u32 = 120;

/// Momentary button reporting presses to the peer.
///
/// Input (3 bytes): base colour `[r, g, b]`.
/// Output (1 byte): press counter, wrapping at 255.
///
/// The peer detects presses by watching the counter change; several presses
/// within one tick show up as a jump of several steps.
#[derive(Debug, Clone)]
pub struct PushButton {
    label: String,
    counter: u8,
    pressed: bool,
    base_color: Rgb,
}

impl PushButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            counter: 0,
            pressed: false,
            base_color: DEFAULT_BASE_COLOR,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn counter(&self) -> u8 {
        self.counter
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn base_color(&self) -> Rgb {
        self.base_color
    }

    pub fn press(&mut self) {
        self.counter = self.counter.wrapping_add(1);
        self.pressed = true;
        log::trace!("'{}' pressed, counter {}", self.label, self.counter);
    }

    pub fn release(&mut self) {
        self.pressed = false;
    }

    /// Background to draw: the base colour, darkened while held
    pub fn display_color(&self) -> Rgb {
        if self.pressed {
            self.base_color.darker(PRESSED_DARKEN)
        } else {
            self.base_color
        }
    }

    /// Label colour, chosen against the undarkened base colour
    pub fn text_color(&self) -> Rgb {
        self.base_color.contrasting_text()
    }
}

impl DashboardWidget for PushButton {
    fn name(&self) -> &'static str {
        "PushButton"
    }

    fn required_sizes(&self) -> (u32, u32) {
        (3, 1)
    }

    fn pack_output(&self) -> Vec<u8> {
        vec![self.counter]
    }

    fn unpack_input(&mut self, data: &[u8]) {
        if let Some(color) = Rgb::from_bytes(data) {
            self.base_color = color;
        }
    }
}
