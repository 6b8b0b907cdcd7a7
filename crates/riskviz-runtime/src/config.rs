#![forbid(unsafe_code)]

//! Visualizer configuration.
//!
//! Options arrive either from `RISKVIZ_*` environment variables or from a
//! camelCase JSON object (feature `json-config`). Both sources are first
//! collected into [`VisualizerOptions`] and then resolved by the same code, so
//! an invalid value is reported identically regardless of where it came from.
//!
//! Resolution never fails outright: every invalid value keeps its default and
//! adds a [`ConfigError`] to the returned [`ConfigParse`].
//!
//! # Environment variables
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `RISKVIZ_ANIMATION_DURATION_MS` | full pulse duration (ms) | `2000` |
//! | `RISKVIZ_PULSE_INTERVAL_MS` | time between pulses (ms) | `3000` |
//! | `RISKVIZ_LOW_COLOR` .. `RISKVIZ_CRITICAL_COLOR` | band colors | green/yellow/orange/red |
//! | `RISKVIZ_THRESHOLDS` | `low,medium,high,critical` | `25,50,75,100` |
//! | `RISKVIZ_LUMA_THRESHOLD` | dark-text cutoff | `125` |
//! | `RISKVIZ_DARK_TEXT` / `RISKVIZ_LIGHT_TEXT` | foreground colors | `#212529` / `#ffffff` |
//! | `RISKVIZ_REVERSION_POLICY` | `let-finish` or `settle` | `let-finish` |

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use riskviz_style::{Color, ContrastPolicy, Rgb, RiskPalette, RiskRamp, RiskStyler, Thresholds};

pub const ENV_ANIMATION_DURATION_MS: &str = "RISKVIZ_ANIMATION_DURATION_MS";
pub const ENV_PULSE_INTERVAL_MS: &str = "RISKVIZ_PULSE_INTERVAL_MS";
pub const ENV_LOW_COLOR: &str = "RISKVIZ_LOW_COLOR";
pub const ENV_MEDIUM_COLOR: &str = "RISKVIZ_MEDIUM_COLOR";
pub const ENV_HIGH_COLOR: &str = "RISKVIZ_HIGH_COLOR";
pub const ENV_CRITICAL_COLOR: &str = "RISKVIZ_CRITICAL_COLOR";
pub const ENV_THRESHOLDS: &str = "RISKVIZ_THRESHOLDS";
pub const ENV_LUMA_THRESHOLD: &str = "RISKVIZ_LUMA_THRESHOLD";
pub const ENV_DARK_TEXT: &str = "RISKVIZ_DARK_TEXT";
pub const ENV_LIGHT_TEXT: &str = "RISKVIZ_LIGHT_TEXT";
pub const ENV_REVERSION_POLICY: &str = "RISKVIZ_REVERSION_POLICY";

/// Default full pulse duration.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(2000);
/// Default time between pulses.
pub const DEFAULT_PULSE_INTERVAL: Duration = Duration::from_millis(3000);

/// What happens to a pulse that is mid-flight when its animation stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReversionPolicy {
    /// The pending reversion still fires at its scheduled time.
    #[default]
    LetFinish,
    /// The pending reversion is cancelled and the pre-pulse style is
    /// restored immediately.
    Settle,
}

impl ReversionPolicy {
    /// Parse `let-finish` / `settle` (case-insensitive, `_` accepted).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "let-finish" | "letfinish" => Some(Self::LetFinish),
            "settle" => Some(Self::Settle),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LetFinish => "let-finish",
            Self::Settle => "settle",
        }
    }
}

impl fmt::Display for ReversionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved visualizer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualizerConfig {
    /// Full pulse duration; the lighten/revert half takes half of it.
    pub animation_duration: Duration,
    /// Time between pulse starts.
    pub pulse_interval: Duration,
    pub palette: RiskPalette,
    pub thresholds: Thresholds,
    pub contrast: ContrastPolicy,
    pub reversion: ReversionPolicy,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            animation_duration: DEFAULT_ANIMATION_DURATION,
            pulse_interval: DEFAULT_PULSE_INTERVAL,
            palette: RiskPalette::DEFAULT,
            thresholds: Thresholds::DEFAULT,
            contrast: ContrastPolicy::default(),
            reversion: ReversionPolicy::LetFinish,
        }
    }
}

/// Configuration plus every diagnostic produced while resolving it.
#[derive(Debug, Clone)]
pub struct ConfigParse {
    pub config: VisualizerConfig,
    pub errors: Vec<ConfigError>,
}

impl ConfigParse {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl VisualizerConfig {
    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> ConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// Parse a camelCase options object.
    ///
    /// Malformed JSON is an error; well-formed JSON with bad values resolves
    /// with diagnostics like the environment loader.
    #[cfg(feature = "json-config")]
    pub fn from_json(json: &str) -> Result<ConfigParse, serde_json::Error> {
        let options: VisualizerOptions = serde_json::from_str(json)?;
        Ok(options.resolve())
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if self.animation_duration.is_zero() {
            errors.push(ConfigError::new(
                "animation_duration",
                "0",
                "must be greater than zero",
            ));
        }
        if self.pulse_interval.is_zero() {
            errors.push(ConfigError::new(
                "pulse_interval",
                "0",
                "must be greater than zero",
            ));
        }
        if !self.contrast.luma_threshold.is_finite() {
            errors.push(ConfigError::new(
                "luma_threshold",
                self.contrast.luma_threshold.to_string(),
                "must be finite",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Styler for this palette, breakpoints and contrast policy.
    #[must_use]
    pub fn styler(&self) -> RiskStyler {
        RiskStyler::new(RiskRamp::new(self.thresholds, self.palette), self.contrast)
    }

    /// Short human-readable summary.
    #[must_use]
    pub fn summary_short(&self) -> String {
        let t = &self.thresholds;
        format!(
            "pulse every {}ms for {}ms · thresholds {}/{}/{}/{} · {}",
            self.pulse_interval.as_millis(),
            self.animation_duration.as_millis(),
            t.low(),
            t.medium(),
            t.high(),
            t.critical(),
            self.reversion
        )
    }
}

/// Unresolved options, one field per externally settable value.
///
/// Missing fields keep their defaults. Threshold keys fall back individually.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json-config", derive(serde::Deserialize))]
#[cfg_attr(feature = "json-config", serde(rename_all = "camelCase", default))]
pub struct VisualizerOptions {
    /// Milliseconds.
    pub animation_duration: Option<f64>,
    /// Milliseconds.
    pub pulse_interval: Option<f64>,
    pub low_color: Option<String>,
    pub medium_color: Option<String>,
    pub high_color: Option<String>,
    pub critical_color: Option<String>,
    pub thresholds: Option<ThresholdOptions>,
    pub luma_threshold: Option<f64>,
    pub dark_text: Option<String>,
    pub light_text: Option<String>,
    pub reversion_policy: Option<String>,
}

/// Partial breakpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "json-config", derive(serde::Deserialize))]
#[cfg_attr(feature = "json-config", serde(default))]
pub struct ThresholdOptions {
    pub low: Option<f64>,
    pub medium: Option<f64>,
    pub high: Option<f64>,
    pub critical: Option<f64>,
}

impl VisualizerOptions {
    /// Resolve against the defaults, collecting every diagnostic.
    #[must_use]
    pub fn resolve(self) -> ConfigParse {
        let mut config = VisualizerConfig::default();
        let mut errors = Vec::new();

        if let Some(ms) = self.animation_duration {
            resolve_millis("animation_duration", ms, &mut config.animation_duration, &mut errors);
        }
        if let Some(ms) = self.pulse_interval {
            resolve_millis("pulse_interval", ms, &mut config.pulse_interval, &mut errors);
        }

        let palette = &mut config.palette;
        for (field, value, slot) in [
            ("low_color", self.low_color, &mut palette.low),
            ("medium_color", self.medium_color, &mut palette.medium),
            ("high_color", self.high_color, &mut palette.high),
            ("critical_color", self.critical_color, &mut palette.critical),
        ] {
            if let Some(value) = value {
                resolve_color(field, &value, slot, &mut errors);
            }
        }

        if let Some(t) = self.thresholds {
            let d = Thresholds::DEFAULT;
            let low = t.low.unwrap_or(d.low());
            let medium = t.medium.unwrap_or(d.medium());
            let high = t.high.unwrap_or(d.high());
            let critical = t.critical.unwrap_or(d.critical());
            match Thresholds::new(low, medium, high, critical) {
                Ok(parsed) => config.thresholds = parsed,
                Err(err) => errors.push(ConfigError::new(
                    "thresholds",
                    format!("{low},{medium},{high},{critical}"),
                    err.to_string(),
                )),
            }
        }

        if let Some(luma) = self.luma_threshold {
            if luma.is_finite() {
                config.contrast.luma_threshold = luma;
            } else {
                errors.push(ConfigError::new(
                    "luma_threshold",
                    luma.to_string(),
                    "expected finite number",
                ));
            }
        }
        if let Some(value) = self.dark_text {
            resolve_color("dark_text", &value, &mut config.contrast.dark, &mut errors);
        }
        if let Some(value) = self.light_text {
            resolve_color("light_text", &value, &mut config.contrast.light, &mut errors);
        }

        if let Some(value) = self.reversion_policy {
            match ReversionPolicy::parse(&value) {
                Some(parsed) => config.reversion = parsed,
                None => errors.push(ConfigError::new(
                    "reversion_policy",
                    value,
                    "expected let-finish|settle",
                )),
            }
        }

        if let Err(mut violations) = config.validate() {
            errors.append(&mut violations);
        }

        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "visualizer config resolved with errors");
        }
        ConfigParse { config, errors }
    }
}

fn resolve_millis(
    field: &'static str,
    ms: f64,
    slot: &mut Duration,
    errors: &mut Vec<ConfigError>,
) {
    match Duration::try_from_secs_f64(ms / 1000.0) {
        Ok(parsed) if !parsed.is_zero() => *slot = parsed,
        _ => errors.push(ConfigError::new(
            field,
            ms.to_string(),
            "expected positive milliseconds",
        )),
    }
}

fn resolve_color(field: &'static str, value: &str, slot: &mut Rgb, errors: &mut Vec<ConfigError>) {
    match Color::from_str(value) {
        Ok(color) => *slot = color.to_rgb(),
        Err(err) => errors.push(ConfigError::new(field, value, err.to_string())),
    }
}

fn from_env_with<F>(mut get: F) -> ConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut options = VisualizerOptions::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_ANIMATION_DURATION_MS) {
        match parse_f64(&value) {
            Some(parsed) => options.animation_duration = Some(parsed),
            None => errors.push(ConfigError::new(
                "animation_duration",
                value,
                "expected milliseconds",
            )),
        }
    }

    if let Some(value) = get(ENV_PULSE_INTERVAL_MS) {
        match parse_f64(&value) {
            Some(parsed) => options.pulse_interval = Some(parsed),
            None => errors.push(ConfigError::new(
                "pulse_interval",
                value,
                "expected milliseconds",
            )),
        }
    }

    options.low_color = get(ENV_LOW_COLOR);
    options.medium_color = get(ENV_MEDIUM_COLOR);
    options.high_color = get(ENV_HIGH_COLOR);
    options.critical_color = get(ENV_CRITICAL_COLOR);

    if let Some(value) = get(ENV_THRESHOLDS) {
        match parse_thresholds(&value) {
            Some(parsed) => options.thresholds = Some(parsed),
            None => errors.push(ConfigError::new(
                "thresholds",
                value,
                "expected low,medium,high,critical",
            )),
        }
    }

    if let Some(value) = get(ENV_LUMA_THRESHOLD) {
        match parse_f64(&value) {
            Some(parsed) => options.luma_threshold = Some(parsed),
            None => errors.push(ConfigError::new(
                "luma_threshold",
                value,
                "expected number",
            )),
        }
    }

    options.dark_text = get(ENV_DARK_TEXT);
    options.light_text = get(ENV_LIGHT_TEXT);
    options.reversion_policy = get(ENV_REVERSION_POLICY);

    let mut parse = options.resolve();
    errors.append(&mut parse.errors);
    ConfigParse {
        config: parse.config,
        errors,
    }
}

fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

fn parse_thresholds(value: &str) -> Option<ThresholdOptions> {
    let parts: Vec<f64> = value
        .split(',')
        .map(parse_f64)
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        &[low, medium, high, critical] => Some(ThresholdOptions {
            low: Some(low),
            medium: Some(medium),
            high: Some(high),
            critical: Some(critical),
        }),
        _ => None,
    }
}
