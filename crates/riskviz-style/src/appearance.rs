#![forbid(unsafe_code)]

//! Complete visual treatment for a score.
//!
//! [`RiskStyler`] runs the ramp, the contrast policy and the glow rule in one
//! pass so callers can apply the result as a single unit.

use crate::color::Rgb;
use crate::contrast::{ContrastPolicy, Glow};
use crate::ramp::{RiskBand, RiskRamp, RiskScore};

/// Background, foreground and glow for one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    /// Band the score falls in.
    pub band: RiskBand,
    /// Interpolated background color.
    pub background: Rgb,
    /// Readable text color on that background.
    pub foreground: Rgb,
    /// Present when the score is above the `high` breakpoint.
    pub glow: Option<Glow>,
}

impl Appearance {
    /// CSS `box-shadow` value.
    #[must_use]
    pub fn box_shadow(&self) -> String {
        Glow::box_shadow(self.glow)
    }
}

/// Ramp plus contrast policy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiskStyler {
    ramp: RiskRamp,
    contrast: ContrastPolicy,
}

impl RiskStyler {
    /// Create a styler.
    #[must_use]
    pub const fn new(ramp: RiskRamp, contrast: ContrastPolicy) -> Self {
        Self { ramp, contrast }
    }

    /// The underlying ramp.
    #[must_use]
    pub const fn ramp(&self) -> &RiskRamp {
        &self.ramp
    }

    /// The contrast policy.
    #[must_use]
    pub const fn contrast(&self) -> &ContrastPolicy {
        &self.contrast
    }

    /// Appearance for `score`.
    #[must_use]
    pub fn appearance(&self, score: RiskScore) -> Appearance {
        let thresholds = self.ramp.thresholds();
        let background = self.ramp.color_for(score);
        Appearance {
            band: thresholds.band(score),
            background,
            foreground: self.contrast.foreground_for(background),
            glow: thresholds
                .exceeds_high(score)
                .then(|| Glow::resting(background)),
        }
    }
}
