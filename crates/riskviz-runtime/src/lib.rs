#![forbid(unsafe_code)]

//! Risk Visualization Runtime
//!
//! Stateful half of the engine: it owns decorated elements, applies the
//! colors computed by `riskviz-style`, and drives pulse animations on a
//! cancellable scheduler.
//!
//! # Key Components
//!
//! - [`RiskScoreVisualizer`] - Registry of decorated elements and their pulses
//! - [`PulseAnimator`] - Starts the periodic lighten/revert pulse
//! - [`Scheduler`] - Trait for periodic and one-shot timers
//! - [`TimerQueue`] - Deterministic single-threaded scheduler
//! - [`FramePump`] - Drives a `TimerQueue` from wall-clock time
//! - [`VisualizerConfig`] - Palette, breakpoints, timing and contrast options
//! - [`ElementHandle`] / [`Document`] - Minimal host element model
//!
//! # How it fits in the system
//! Collaborators hand the registry element handles with a score attribute.
//! The registry asks the styler for an [`Appearance`](riskviz_style::Appearance),
//! writes it to the element's inline style, and for animated elements asks the
//! animator to pulse. Nothing here blocks: all timed work runs when the
//! embedding application advances its scheduler.

pub mod config;
pub mod element;
pub mod pulse;
pub mod registry;
pub mod scheduler;

pub use config::{
    ConfigError, ConfigParse, ReversionPolicy, ThresholdOptions, VisualizerConfig,
    VisualizerOptions,
};
pub use element::{
    ANIMATED_ATTR, Document, ElementHandle, ElementId, ElementSource, InlineStyle,
    RISK_SCORE_ATTR,
};
pub use pulse::{PulseAnimator, PulseHandle, PulseTiming};
pub use registry::{RiskScoreVisualizer, VisualState};
pub use scheduler::{CancelToken, FramePump, Scheduler, TaskId, TimerQueue};
