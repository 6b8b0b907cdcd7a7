#![forbid(unsafe_code)]

//! Threshold color mapping.
//!
//! A [`RiskRamp`] maps a [`RiskScore`] onto a four-stop palette. Scores at or
//! below `low` take the low color; between two breakpoints the color is a
//! linear blend of the neighbouring stops; above `high` the blend runs from
//! the high color toward the critical color.
//!
//! # Invariants
//!
//! 1. Breakpoints are strictly ascending (`low < medium < high < critical`).
//! 2. Each breakpoint maps to exactly its band color.
//! 3. Scores above `critical` are not clamped: the last segment keeps going
//!    past the critical color (channels saturate at 0 and 255).

use std::fmt;

use crate::color::Rgb;

/// A risk score. Any `f64` except NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RiskScore(f64);

impl RiskScore {
    /// Validate a raw score.
    pub fn new(value: f64) -> Result<Self, InvalidScore> {
        if value.is_nan() {
            Err(InvalidScore::NotANumber)
        } else {
            Ok(Self(value))
        }
    }

    /// Parse a score attribute.
    ///
    /// Leading whitespace is skipped and the longest numeric prefix is used,
    /// so `"75%"` reads as 75. `"Infinity"` is accepted with an optional sign.
    pub fn parse(text: &str) -> Result<Self, InvalidScore> {
        let text = text.trim_start();
        let prefix = numeric_prefix(text);
        let value = match prefix.trim_start_matches(['+', '-']) {
            "" => return Err(InvalidScore::NotNumeric(text.to_owned())),
            "Infinity" if prefix.starts_with('-') => f64::NEG_INFINITY,
            "Infinity" => f64::INFINITY,
            _ => prefix
                .parse::<f64>()
                .map_err(|_| InvalidScore::NotNumeric(text.to_owned()))?,
        };
        Self::new(value)
    }

    /// The raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for RiskScore {
    type Error = InvalidScore;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// Infinities print as `Infinity` so the attribute text parses back.
impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            f64::INFINITY => f.write_str("Infinity"),
            f64::NEG_INFINITY => f.write_str("-Infinity"),
            v => write!(f, "{v}"),
        }
    }
}

/// Why a score was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidScore {
    /// The value was NaN.
    NotANumber,
    /// The text had no numeric prefix.
    NotNumeric(String),
}

impl fmt::Display for InvalidScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => write!(f, "risk score is NaN"),
            Self::NotNumeric(text) => write!(f, "risk score {text:?} is not numeric"),
        }
    }
}

impl std::error::Error for InvalidScore {}

/// Longest prefix of `text` that reads as a decimal float.
fn numeric_prefix(text: &str) -> &str {
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if text[end..].starts_with("Infinity") {
        return &text[..end + "Infinity".len()];
    }

    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let int_digits = digits_from(end);
    end += int_digits;
    let mut mantissa_digits = int_digits;
    if bytes.get(end) == Some(&b'.') {
        let frac_digits = digits_from(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
            mantissa_digits += frac_digits;
        }
    }
    if mantissa_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits_from(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    &text[..end]
}

/// Ascending score breakpoints delimiting the four bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    low: f64,
    medium: f64,
    high: f64,
    critical: f64,
}

impl Thresholds {
    /// 25 / 50 / 75 / 100.
    pub const DEFAULT: Self = Self {
        low: 25.0,
        medium: 50.0,
        high: 75.0,
        critical: 100.0,
    };

    /// Build breakpoints, enforcing `low < medium < high < critical`.
    pub fn new(low: f64, medium: f64, high: f64, critical: f64) -> Result<Self, ThresholdError> {
        let named = [
            ("low", low),
            ("medium", medium),
            ("high", high),
            ("critical", critical),
        ];
        if let Some(&(name, value)) = named.iter().find(|(_, v)| v.is_nan()) {
            return Err(ThresholdError::NotANumber { name, value });
        }
        for pair in named.windows(2) {
            let (lower, lower_value) = pair[0];
            let (upper, upper_value) = pair[1];
            if lower_value >= upper_value {
                return Err(ThresholdError::NotAscending {
                    lower,
                    lower_value,
                    upper,
                    upper_value,
                });
            }
        }
        Ok(Self {
            low,
            medium,
            high,
            critical,
        })
    }

    /// Upper bound of the low band.
    #[must_use]
    pub const fn low(&self) -> f64 {
        self.low
    }

    /// Upper bound of the medium band; also the minimum score that pulses.
    #[must_use]
    pub const fn medium(&self) -> f64 {
        self.medium
    }

    /// Scores strictly above this glow.
    #[must_use]
    pub const fn high(&self) -> f64 {
        self.high
    }

    /// Score that maps exactly to the critical color.
    #[must_use]
    pub const fn critical(&self) -> f64 {
        self.critical
    }

    /// Classify a score.
    #[must_use]
    pub fn band(&self, score: RiskScore) -> RiskBand {
        let s = score.value();
        if s <= self.low {
            RiskBand::Low
        } else if s <= self.medium {
            RiskBand::Medium
        } else if s <= self.high {
            RiskBand::High
        } else {
            RiskBand::Critical
        }
    }

    /// Whether `score` lies strictly above `high`.
    #[must_use]
    pub fn exceeds_high(&self, score: RiskScore) -> bool {
        score.value() > self.high
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Threshold validation failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdError {
    /// A breakpoint was NaN.
    NotANumber {
        /// Breakpoint name.
        name: &'static str,
        /// The offending value.
        value: f64,
    },
    /// Two neighbouring breakpoints were not strictly ascending.
    NotAscending {
        /// Name of the lower breakpoint.
        lower: &'static str,
        /// Its value.
        lower_value: f64,
        /// Name of the upper breakpoint.
        upper: &'static str,
        /// Its value.
        upper_value: f64,
    },
}

impl fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber { name, value } => {
                write!(f, "threshold {name} is not a number ({value})")
            }
            Self::NotAscending {
                lower,
                lower_value,
                upper,
                upper_value,
            } => write!(
                f,
                "threshold {lower} ({lower_value}) must be below {upper} ({upper_value})"
            ),
        }
    }
}

impl std::error::Error for ThresholdError {}

/// The band a score falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskBand {
    /// At or below `low`.
    Low,
    /// Above `low`, at or below `medium`.
    Medium,
    /// Above `medium`, at or below `high`.
    High,
    /// Above `high`.
    Critical,
}

impl RiskBand {
    /// Lowercase label as used by dashboard badges.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Colors anchored at each breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskPalette {
    /// Color at and below `low` (default green `#28a745`).
    pub low: Rgb,
    /// Color at `medium` (default yellow `#ffc107`).
    pub medium: Rgb,
    /// Color at `high` (default orange `#fd7e14`).
    pub high: Rgb,
    /// Color at `critical` (default red `#dc3545`).
    pub critical: Rgb,
}

impl RiskPalette {
    /// Green, yellow, orange, red.
    pub const DEFAULT: Self = Self {
        low: Rgb::new(0x28, 0xa7, 0x45),
        medium: Rgb::new(0xff, 0xc1, 0x07),
        high: Rgb::new(0xfd, 0x7e, 0x14),
        critical: Rgb::new(0xdc, 0x35, 0x45),
    };
}

impl Default for RiskPalette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Piecewise-linear score → color mapping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiskRamp {
    thresholds: Thresholds,
    palette: RiskPalette,
}

impl RiskRamp {
    /// Create a ramp from validated breakpoints and a palette.
    #[must_use]
    pub const fn new(thresholds: Thresholds, palette: RiskPalette) -> Self {
        Self {
            thresholds,
            palette,
        }
    }

    /// The breakpoints.
    #[must_use]
    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// The palette.
    #[must_use]
    pub const fn palette(&self) -> &RiskPalette {
        &self.palette
    }

    /// Color for `score`.
    #[must_use]
    pub fn color_for(&self, score: RiskScore) -> Rgb {
        let s = score.value();
        let t = &self.thresholds;
        let p = &self.palette;
        if s <= t.low {
            p.low
        } else if s <= t.medium {
            p.low.lerp(p.medium, segment(s, t.low, t.medium))
        } else if s <= t.high {
            p.medium.lerp(p.high, segment(s, t.medium, t.high))
        } else {
            p.high.lerp(p.critical, segment(s, t.high, t.critical))
        }
    }
}

fn segment(score: f64, from: f64, to: f64) -> f64 {
    (score - from) / (to - from)
}
