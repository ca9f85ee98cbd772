use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 8-bit RGB colour as it appears on the wire: three bytes, red first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(C)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid colour '{0}', expected #rrggbb")]
pub struct ParseColorError(String);

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode from exactly three bytes
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() != std::mem::size_of::<Rgb>() {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(data))
    }

    pub fn to_bytes(self) -> [u8; 3] {
        bytemuck::cast(self)
    }

    /// Perceived brightness, 0.0 to 255.0
    pub fn luminance(&self) -> f64 {
        0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64
    }

    pub fn is_dark(&self) -> bool {
        self.luminance() < 128.0
    }

    /// White on dark backgrounds, black otherwise
    pub fn contrasting_text(&self) -> Rgb {
        if self.is_dark() {
            Rgb::WHITE
        } else {
            Rgb::BLACK
        }
    }

    /// Darken by `factor` percent: 120 scales brightness to 100/120.
    ///
    /// Factors of 100 or less return the colour unchanged.
    pub fn darker(&self, factor: u32) -> Rgb {
        if factor <= 100 {
            return *self;
        }
        let scale = |c: u8| ((c as u32 * 100) / factor) as u8;
        Rgb::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ParseColorError(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}
