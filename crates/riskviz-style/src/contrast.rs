#![forbid(unsafe_code)]

//! Foreground selection and glow.

use std::fmt;

use crate::color::Rgb;

/// Default luma above which text switches to the dark foreground.
pub const DEFAULT_LUMA_THRESHOLD: f64 = 125.0;

/// Default dark foreground (`#212529`).
pub const DARK_TEXT: Rgb = Rgb::new(0x21, 0x25, 0x29);

/// Default light foreground (`#ffffff`).
pub const LIGHT_TEXT: Rgb = Rgb::WHITE;

/// Blur radius of the resting glow on high-risk elements.
pub const RESTING_GLOW_PX: u16 = 10;

/// Blur radius of the glow while a pulse is at its peak.
pub const PULSE_GLOW_PX: u16 = 15;

/// Chooses a readable text color for a background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastPolicy {
    /// Backgrounds with luma strictly above this get the dark foreground.
    pub luma_threshold: f64,
    /// Foreground for bright backgrounds.
    pub dark: Rgb,
    /// Foreground for dark backgrounds.
    pub light: Rgb,
}

impl ContrastPolicy {
    /// Foreground for `background`. A luma exactly at the threshold gets the
    /// light foreground.
    #[must_use]
    pub fn foreground_for(&self, background: Rgb) -> Rgb {
        if background.luma() > self.luma_threshold {
            self.dark
        } else {
            self.light
        }
    }
}

impl Default for ContrastPolicy {
    fn default() -> Self {
        Self {
            luma_threshold: DEFAULT_LUMA_THRESHOLD,
            dark: DARK_TEXT,
            light: LIGHT_TEXT,
        }
    }
}

/// A soft outward shadow in the element's own color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glow {
    /// Blur radius in pixels.
    pub blur_px: u16,
    /// Shadow color.
    pub color: Rgb,
}

impl Glow {
    /// Resting glow for `color`.
    #[must_use]
    pub const fn resting(color: Rgb) -> Self {
        Self {
            blur_px: RESTING_GLOW_PX,
            color,
        }
    }

    /// Peak-of-pulse glow for `color`.
    #[must_use]
    pub const fn pulse(color: Rgb) -> Self {
        Self {
            blur_px: PULSE_GLOW_PX,
            color,
        }
    }

    /// CSS `box-shadow` value, or `none` when there is no glow.
    #[must_use]
    pub fn box_shadow(glow: Option<Self>) -> String {
        glow.map_or_else(|| "none".to_owned(), |g| g.to_string())
    }
}

impl fmt::Display for Glow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0 0 {}px {}", self.blur_px, self.color)
    }
}
