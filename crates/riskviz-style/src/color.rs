#![forbid(unsafe_code)]

//! Color types and conversions.
//!
//! Colors reach the engine in two shapes: hex strings from configuration
//! (`#28a745`, `#fff`) and CSS `rgb(...)` strings read back from an element's
//! inline style. [`Color`] records which shape was supplied; every
//! computation runs on the normalized [`Rgb`] triplet.
//!
//! Rendering-path parsing is lenient: a malformed hex string resolves to
//! black instead of failing. Use [`Color::from_str`] to get the error.

use std::fmt;
use std::str::FromStr;

/// RGB color (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red channel (0–255).
    pub r: u8,
    /// Green channel (0–255).
    pub g: u8,
    /// Blue channel (0–255).
    pub b: u8,
}

impl Rgb {
    /// Pure black, also the fallback for unparseable input.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a new RGB color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness with BT.601 luma weights (0.0 = black, 255.0 = white).
    #[must_use]
    pub fn luma(self) -> f64 {
        let weighted = 299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32;
        f64::from(weighted) / 1000.0
    }

    /// Move every channel toward 255 by `factor` (0 = unchanged, 1 = white).
    ///
    /// The factor is not validated; results are clamped to the channel range.
    #[must_use]
    pub fn lighten(self, factor: f64) -> Self {
        let lift = |c: u8| round_channel(f64::from(c) + (255.0 - f64::from(c)) * factor);
        Self::new(lift(self.r), lift(self.g), lift(self.b))
    }

    /// Linear blend toward `to`. `t` is not clamped, so values past 1.0
    /// extrapolate beyond `to`; channels saturate at 0 and 255.
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| {
            let a = f64::from(a);
            round_channel(a + t * (f64::from(b) - a))
        };
        Self::new(mix(self.r, to.r), mix(self.g, to.g), mix(self.b, to.b))
    }

    /// Lowercase `#rrggbb` form.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// A color as supplied at the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Color {
    /// Hex notation, 3 or 6 digits, `#` optional. Stored verbatim.
    Hex(String),
    /// An already-decoded channel triplet.
    Rgb(Rgb),
}

impl Color {
    /// Wrap a hex string without validating it.
    #[must_use]
    pub fn hex(value: impl Into<String>) -> Self {
        Self::Hex(value.into())
    }

    /// Create a color from channel values.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb(Rgb::new(r, g, b))
    }

    /// Classify a CSS color string.
    ///
    /// `rgb(...)` and `rgba(...)` strings are decoded from their first three
    /// digit runs. Everything else is kept as [`Color::Hex`] and resolved
    /// lazily by [`to_rgb`](Self::to_rgb).
    #[must_use]
    pub fn parse(css: &str) -> Self {
        let css = css.trim();
        if css.starts_with("rgb") {
            if let Some(rgb) = parse_rgb_function(css) {
                return Self::Rgb(rgb);
            }
        }
        Self::Hex(css.to_owned())
    }

    /// Normalize to a channel triplet. Malformed hex yields black.
    #[must_use]
    pub fn to_rgb(&self) -> Rgb {
        match self {
            Self::Hex(hex) => hex_to_rgb(hex),
            Self::Rgb(rgb) => *rgb,
        }
    }

    /// Normalized `#rrggbb` form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_rgb().to_hex()
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::Rgb(rgb)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Strict parse: rejects anything [`Color::parse`] would map to black by fallback.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with("rgb") {
            return parse_rgb_function(trimmed)
                .map(Self::Rgb)
                .ok_or_else(|| ColorParseError::new(s));
        }
        parse_hex(trimmed)
            .map(|_| Self::Hex(trimmed.to_owned()))
            .ok_or_else(|| ColorParseError::new(s))
    }
}

/// A color string that is neither valid hex nor an `rgb(...)` function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError {
    input: String,
}

impl ColorParseError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_owned(),
        }
    }

    /// The rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid color {:?}: expected #rgb, #rrggbb or rgb(r, g, b)",
            self.input
        )
    }
}

impl std::error::Error for ColorParseError {}

/// Decode a hex color; anything that does not match yields black.
#[must_use]
pub fn hex_to_rgb(hex: &str) -> Rgb {
    parse_hex(hex).unwrap_or(Rgb::BLACK)
}

/// Encode channels as `#rrggbb`.
#[must_use]
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    Rgb::new(r, g, b).to_hex()
}

/// Lighten any boundary color and return the result as hex.
#[must_use]
pub fn lighten(color: &Color, factor: f64) -> String {
    color.to_rgb().lighten(factor).to_hex()
}

/// Blend two colors channel by channel. See [`Rgb::lerp`].
#[must_use]
pub fn interpolate(from: Rgb, to: Rgb, factor: f64) -> Rgb {
    from.lerp(to, factor)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        3 => {
            let v = u16::from_str_radix(digits, 16).ok()?;
            let nibble = |shift: u16| ((v >> shift) & 0xf) as u8 * 17;
            Some(Rgb::new(nibble(8), nibble(4), nibble(0)))
        }
        6 => {
            let v = u32::from_str_radix(digits, 16).ok()?;
            Some(Rgb::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
        }
        _ => None,
    }
}

fn parse_rgb_function(css: &str) -> Option<Rgb> {
    let mut channels = css
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .map(|run| run.parse::<u32>().map_or(255, |v| v.min(255)) as u8);
    let r = channels.next()?;
    let g = channels.next()?;
    let b = channels.next()?;
    Some(Rgb::new(r, g, b))
}

/// Round half up, then clamp into the channel range.
fn round_channel(value: f64) -> u8 {
    (value + 0.5).floor().clamp(0.0, 255.0) as u8
}
