#![forbid(unsafe_code)]

//! Risk visualization style primitives.
//!
//! Pure functions and value types: no element handles, no timers.
//!
//! - [`color`] - hex/RGB conversion, lighten, interpolate
//! - [`ramp`] - scores, thresholds, bands, and the four-stop color ramp
//! - [`contrast`] - foreground selection and glow
//! - [`appearance`] - all of the above for one score

pub mod appearance;
pub mod color;
pub mod contrast;
pub mod ramp;

pub use appearance::{Appearance, RiskStyler};
pub use color::{Color, ColorParseError, Rgb, hex_to_rgb, interpolate, lighten, rgb_to_hex};
pub use contrast::{ContrastPolicy, DARK_TEXT, Glow, LIGHT_TEXT};
pub use ramp::{
    InvalidScore, RiskBand, RiskPalette, RiskRamp, RiskScore, ThresholdError, Thresholds,
};
