#![forbid(unsafe_code)]

//! Risk score visualization engine, public facade crate.
//!
//! This crate provides the stable surface area for users. It re-exports the
//! color math from `riskviz-style` and the registry, scheduler and
//! configuration from `riskviz-runtime`, and offers a prelude.
//!
//! ```
//! use riskviz::prelude::*;
//!
//! let queue = TimerQueue::new();
//! let mut viz = RiskScoreVisualizer::new(queue.clone(), VisualizerConfig::default());
//! let mut doc = Document::new();
//! let badge = doc.add_scored("100", true);
//! assert_eq!(viz.initialize_all(&doc), 1);
//! assert_eq!(badge.style().background_color.as_deref(), Some("#dc3545"));
//! ```

use std::fmt;

// --- Style re-exports ------------------------------------------------------

pub use riskviz_style::{
    Appearance, Color, ColorParseError, ContrastPolicy, DARK_TEXT, Glow, InvalidScore,
    LIGHT_TEXT, Rgb, RiskBand, RiskPalette, RiskRamp, RiskScore, RiskStyler, ThresholdError,
    Thresholds, hex_to_rgb, interpolate, lighten, rgb_to_hex,
};

// --- Runtime re-exports ----------------------------------------------------

pub use riskviz_runtime::{
    ANIMATED_ATTR, CancelToken, ConfigError, ConfigParse, Document, ElementHandle, ElementId,
    ElementSource, FramePump, InlineStyle, PulseAnimator, PulseHandle, PulseTiming,
    RISK_SCORE_ATTR, ReversionPolicy, RiskScoreVisualizer, Scheduler, TaskId, ThresholdOptions,
    TimerQueue, VisualState, VisualizerConfig, VisualizerOptions,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for riskviz setup.
///
/// Visualizer operations never fail; errors only arise while loading
/// configuration or validating inputs up front.
#[derive(Debug)]
pub enum Error {
    /// One or more configuration values were rejected.
    Config(Vec<ConfigError>),
    /// A color string could not be parsed.
    Color(ColorParseError),
    /// Breakpoints were not ascending or not numbers.
    Threshold(ThresholdError),
    /// A score was NaN or not numeric.
    Score(InvalidScore),
    /// I/O failure while reading a configuration file.
    Io(std::io::Error),
    /// Malformed JSON options.
    #[cfg(feature = "json-config")]
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(errors) => {
                write!(f, "invalid configuration: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{err}")?;
                }
                Ok(())
            }
            Self::Color(err) => write!(f, "{err}"),
            Self::Threshold(err) => write!(f, "{err}"),
            Self::Score(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            #[cfg(feature = "json-config")]
            Self::Json(err) => write!(f, "invalid JSON options: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(errors) => errors
                .first()
                .map(|e| e as &(dyn std::error::Error + 'static)),
            Self::Color(err) => Some(err),
            Self::Threshold(err) => Some(err),
            Self::Score(err) => Some(err),
            Self::Io(err) => Some(err),
            #[cfg(feature = "json-config")]
            Self::Json(err) => Some(err),
        }
    }
}

impl From<Vec<ConfigError>> for Error {
    fn from(errors: Vec<ConfigError>) -> Self {
        Self::Config(errors)
    }
}

impl From<ColorParseError> for Error {
    fn from(err: ColorParseError) -> Self {
        Self::Color(err)
    }
}

impl From<ThresholdError> for Error {
    fn from(err: ThresholdError) -> Self {
        Self::Threshold(err)
    }
}

impl From<InvalidScore> for Error {
    fn from(err: InvalidScore) -> Self {
        Self::Score(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "json-config")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Standard result type for riskviz APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Strict loaders --------------------------------------------------------

/// Turn diagnostics into an error instead of silently keeping defaults.
pub fn strict(parse: ConfigParse) -> Result<VisualizerConfig> {
    if parse.errors.is_empty() {
        Ok(parse.config)
    } else {
        Err(Error::Config(parse.errors))
    }
}

/// Load configuration from `RISKVIZ_*` variables, rejecting any invalid value.
pub fn config_from_env() -> Result<VisualizerConfig> {
    strict(VisualizerConfig::from_env_with_diagnostics())
}

/// Load a JSON options object, rejecting any invalid value.
#[cfg(feature = "json-config")]
pub fn config_from_json(json: &str) -> Result<VisualizerConfig> {
    strict(VisualizerConfig::from_json(json)?)
}

/// Read and load a JSON options file, rejecting any invalid value.
#[cfg(feature = "json-config")]
pub fn config_from_file(path: impl AsRef<std::path::Path>) -> Result<VisualizerConfig> {
    let json = std::fs::read_to_string(path)?;
    config_from_json(&json)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Appearance, Document, ElementHandle, ElementSource, Error, FramePump, ReversionPolicy,
        Result, RiskBand, RiskScore, RiskScoreVisualizer, Scheduler, TimerQueue,
        VisualizerConfig,
    };

    pub use crate::{runtime, style};
}

pub use riskviz_runtime as runtime;
pub use riskviz_style as style;
