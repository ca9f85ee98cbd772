use crate::color::Rgb;
use dashlink_core::DashboardWidget;

/// Digits after the decimal point unless configured otherwise
pub const DEFAULT_NUM_DIGITS: u32 = 4;

const DEFAULT_FOREGROUND: Rgb = Rgb::BLACK;
const DEFAULT_BACKGROUND: Rgb = Rgb::WHITE;

/// Colours shared by both numeric displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayStyle {
    pub foreground: Rgb,
    pub background: Rgb,
}

impl Default for DisplayStyle {
    fn default() -> Self {
        Self {
            foreground: DEFAULT_FOREGROUND,
            background: DEFAULT_BACKGROUND,
        }
    }
}

impl DisplayStyle {
    /// Decode `[fr, fg, fb, br, bg, bb]`
    fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() != 6 {
            return None;
        }
        Some(Self {
            foreground: Rgb::from_bytes(&data[0..3])?,
            background: Rgb::from_bytes(&data[3..6])?,
        })
    }

    pub fn style_sheet(&self) -> String {
        format!("color: {}; background-color: {};", self.foreground, self.background)
    }
}

/// Split a 10-byte numeric display input into value bytes and style
fn split_input(data: &[u8]) -> Option<([u8; 4], DisplayStyle)> {
    let (value, style) = data.split_first_chunk::<4>()?;
    Some((*value, DisplayStyle::from_bytes(style)?))
}

/// Round to `digits` decimals, keeping at least one decimal in the text.
///
/// Printed as the shortest f32 form. Digit counts beyond f64 range leave
/// the value unrounded.
fn format_rounded(value: f32, digits: u32) -> String {
    let Some(factor) = i32::try_from(digits)
        .ok()
        .map(|digits| 10f64.powi(digits))
        .filter(|factor| factor.is_finite())
    else {
        return format!("{:?}", value);
    };
    let scaled = f64::from(value) * factor;
    if !scaled.is_finite() {
        return format!("{:?}", value);
    }
    format!("{:?}", (scaled.round() / factor) as f32)
}

/// Read-only float readout.
///
/// Input (10 bytes): little-endian f32 value, foreground `[r, g, b]`,
/// background `[r, g, b]`. No output.
#[derive(Debug, Clone)]
pub struct NumericDisplayFloat32 {
    num_digits: u32,
    value: f32,
    style: DisplayStyle,
    text: String,
}

impl NumericDisplayFloat32 {
    pub fn new(num_digits: u32) -> Self {
        Self {
            num_digits,
            value: 0.0,
            style: DisplayStyle::default(),
            text: String::new(),
        }
    }

    pub fn num_digits(&self) -> u32 {
        self.num_digits
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn style(&self) -> DisplayStyle {
        self.style
    }

    /// Text shown, empty until the first valid input
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for NumericDisplayFloat32 {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_DIGITS)
    }
}

impl DashboardWidget for NumericDisplayFloat32 {
    fn name(&self) -> &'static str {
        "NumericDisplayFloat32"
    }

    fn required_sizes(&self) -> (u32, u32) {
        (10, 0)
    }

    fn pack_output(&self) -> Vec<u8> {
        Vec::new()
    }

    fn unpack_input(&mut self, data: &[u8]) {
        let Some((value, style)) = split_input(data) else {
            return;
        };
        self.value = f32::from_le_bytes(value);
        self.style = style;
        self.text = format_rounded(self.value, self.num_digits);
    }
}

/// Read-only integer readout.
///
/// Input (10 bytes): little-endian i32 value, foreground `[r, g, b]`,
/// background `[r, g, b]`. No output.
#[derive(Debug, Clone, Default)]
pub struct NumericDisplayInt32 {
    value: i32,
    style: DisplayStyle,
    text: String,
}

impl NumericDisplayInt32 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn style(&self) -> DisplayStyle {
        self.style
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl DashboardWidget for NumericDisplayInt32 {
    fn name(&self) -> &'static str {
        "NumericDisplayInt32"
    }

    fn required_sizes(&self) -> (u32, u32) {
        (10, 0)
    }

    fn pack_output(&self) -> Vec<u8> {
        Vec::new()
    }

    fn unpack_input(&mut self, data: &[u8]) {
        let Some((value, style)) = split_input(data) else {
            return;
        };
        self.value = i32::from_le_bytes(value);
        self.style = style;
        self.text = self.value.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(value: [u8; 4], fg: [u8; 3], bg: [u8; 3]) -> Vec<u8> {
        let mut data = value.to_vec();
        data.extend_from_slice(&fg);
        data.extend_from_slice(&bg);
        data
    }

    #[test]
    fn test_float_display_rounds_to_digits() {
        let mut display = NumericDisplayFloat32::new(2);
        display.unpack_input(&input(3.14159f32.to_le_bytes(), [255, 0, 0], [0, 0, 0]));

        assert_relative_eq!(display.value(), 3.14159);
        assert_eq!(display.text(), "3.14");
        assert_eq!(display.style().foreground, Rgb::new(255, 0, 0));
        assert_eq!(display.style().background, Rgb::BLACK);
    }

    #[test]
    fn test_float_display_default_digits() {
        let mut display = NumericDisplayFloat32::default();
        assert_eq!(display.num_digits(), 4);
        assert_eq!(display.text(), "");

        display.unpack_input(&input(2.0f32.to_le_bytes(), [0; 3], [255; 3]));
        assert_eq!(display.text(), "2.0");

        display.unpack_input(&input((-0.123456f32).to_le_bytes(), [0; 3], [255; 3]));
        assert_eq!(display.text(), "-0.1235");
    }

    #[test]
    fn test_float_display_prints_shortest_f32() {
        let mut display = NumericDisplayFloat32::new(10);
        display.unpack_input(&input(1.2345679f32.to_le_bytes(), [0; 3], [255; 3]));
        assert_eq!(display.text(), "1.2345679");
    }

    #[test]
    fn test_float_display_huge_digit_count() {
        let mut display = NumericDisplayFloat32::new(400);
        display.unpack_input(&input(3.5f32.to_le_bytes(), [0; 3], [255; 3]));
        assert_eq!(display.text(), "3.5");

        let mut display = NumericDisplayFloat32::new(u32::MAX);
        display.unpack_input(&input((-0.25f32).to_le_bytes(), [0; 3], [255; 3]));
        assert_eq!(display.text(), "-0.25");

        let mut display = NumericDisplayFloat32::new(300);
        display.unpack_input(&input(f32::MAX.to_le_bytes(), [0; 3], [255; 3]));
        assert_eq!(display.text(), format!("{:?}", f32::MAX));
    }

    #[test]
    fn test_int_display() {
        let mut display = NumericDisplayInt32::new();
        display.unpack_input(&input((-42i32).to_le_bytes(), [1, 2, 3], [4, 5, 6]));

        assert_eq!(display.value(), -42);
        assert_eq!(display.text(), "-42");
        assert_eq!(
            display.style().style_sheet(),
            "color: #010203; background-color: #040506;"
        );
    }

    #[test]
    fn test_wrong_length_input_ignored() {
        let mut display = NumericDisplayInt32::new();
        display.unpack_input(&input(7i32.to_le_bytes(), [0; 3], [0; 3]));
        display.unpack_input(&[1u8; 9]);
        display.unpack_input(&[1u8; 11]);
        assert_eq!(display.value(), 7);
        assert_eq!(display.style(), DisplayStyle {
            foreground: Rgb::BLACK,
            background: Rgb::BLACK,
        });
    }

    #[test]
    fn test_default_style() {
        let display = NumericDisplayFloat32::default();
        assert_eq!(display.style().foreground, Rgb::BLACK);
        assert_eq!(display.style().background, Rgb::WHITE);
    }
}
