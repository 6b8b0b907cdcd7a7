#![forbid(unsafe_code)]

//! Pulse animation for elevated scores.
//!
//! An element whose score is at or above the `medium` breakpoint pulses: every
//! `pulse_interval` its background is briefly lightened (and, above `high`,
//! given a stronger glow), then reverted after half the animation duration.
//!
//! ```text
//!   Idle ──start(score ≥ medium)──▶ Pulsing ──stop──▶ Idle
//!                                      │  ▲
//!                              tick    ▼  │ revert (after half)
//!                                   lightened
//! ```
//!
//! Each tick snapshots the background and box-shadow it is about to change and
//! schedules a one-shot that restores exactly that snapshot. What happens to a
//! restore still pending when the pulse stops is decided by
//! [`ReversionPolicy`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use riskviz_style::{Color, Glow, RiskScore, Thresholds};

use crate::config::{ReversionPolicy, VisualizerConfig};
use crate::element::ElementHandle;
use crate::scheduler::{CancelToken, Scheduler};

/// Peak lighten factor at full intensity.
pub const PULSE_LIGHTEN: f64 = 0.2;

/// Interval and half-duration of a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTiming {
    /// Time between pulse starts.
    pub interval: Duration,
    /// Time the element stays lightened; also the CSS transition length.
    pub half: Duration,
}

impl PulseTiming {
    #[must_use]
    pub fn from_config(config: &VisualizerConfig) -> Self {
        Self {
            interval: config.pulse_interval,
            half: config.animation_duration / 2,
        }
    }

    /// CSS `transition` value, e.g. `all 1s ease-in-out`.
    #[must_use]
    pub fn transition(&self) -> String {
        format!("all {}s ease-in-out", self.half.as_secs_f64())
    }
}

/// Pulse intensity for a score: `score / 100`, capped at 1.
///
/// There is no lower bound. With a negative `medium` breakpoint, negative
/// scores pulse with a negative factor and darken the background.
#[must_use]
pub fn intensity(score: RiskScore) -> f64 {
    (score.value() / 100.0).min(1.0)
}

/// Starts pulses on a scheduler.
#[derive(Clone)]
pub struct PulseAnimator<S: Scheduler> {
    scheduler: S,
    timing: PulseTiming,
    thresholds: Thresholds,
}

impl<S: Scheduler> PulseAnimator<S> {
    #[must_use]
    pub fn new(scheduler: S, config: &VisualizerConfig) -> Self {
        Self {
            scheduler,
            timing: PulseTiming::from_config(config),
            thresholds: config.thresholds,
        }
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    #[must_use]
    pub fn timing(&self) -> PulseTiming {
        self.timing
    }

    /// Start pulsing `element` for `score`.
    ///
    /// Returns `None` when the score is below `medium`; such elements stay idle.
    pub fn start(&self, element: &ElementHandle, score: RiskScore) -> Option<PulseHandle> {
        if score.value() < self.thresholds.medium() {
            tracing::trace!(
                element = %element.id(),
                score = score.value(),
                "below medium, not pulsing"
            );
            return None;
        }

        let pending = Rc::new(RefCell::new(Vec::new()));
        let mut tick = PulseTick {
            element: element.clone(),
            scheduler: self.scheduler.clone(),
            intensity: intensity(score),
            glow: self.thresholds.exceeds_high(score),
            timing: self.timing,
            pending: Rc::clone(&pending),
            next_seq: Rc::new(Cell::new(0)),
        };
        let token = self
            .scheduler
            .schedule_periodic(self.timing.interval, move || tick.fire());

        tracing::debug!(
            element = %element.id(),
            score = score.value(),
            interval_ms = self.timing.interval.as_millis() as u64,
            task_id = token.id(),
            "pulse started"
        );
        Some(PulseHandle {
            element: element.clone(),
            tick: token,
            pending,
        })
    }
}

impl<S: Scheduler + fmt::Debug> fmt::Debug for PulseAnimator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PulseAnimator")
            .field("scheduler", &self.scheduler)
            .field("timing", &self.timing)
            .finish()
    }
}

/// A restore scheduled by a tick and not yet run.
struct PendingRevert {
    seq: u64,
    token: CancelToken,
    background: Option<String>,
    box_shadow: Option<String>,
}

type PendingList = Rc<RefCell<Vec<PendingRevert>>>;

struct PulseTick<S> {
    element: ElementHandle,
    scheduler: S,
    intensity: f64,
    glow: bool,
    timing: PulseTiming,
    pending: PendingList,
    next_seq: Rc<Cell<u64>>,
}

impl<S: Scheduler> PulseTick<S> {
    fn fire(&mut self) {
        let snapshot = self.element.style();
        let base = Color::parse(snapshot.background_color.as_deref().unwrap_or_default()).to_rgb();
        let enhanced = base.lighten(PULSE_LIGHTEN * self.intensity);
        let transition = self.timing.transition();
        let glow = self.glow;

        self.element.update_style(|style| {
            style.transition = Some(transition);
            style.background_color = Some(enhanced.to_hex());
            if glow {
                style.box_shadow = Some(Glow::pulse(enhanced).to_string());
            }
        });

        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        let element = self.element.clone();
        let pending = Rc::clone(&self.pending);
        let (background, box_shadow) = (snapshot.background_color, snapshot.box_shadow);
        let (bg, shadow) = (background.clone(), box_shadow.clone());
        let token = self.scheduler.schedule_once(self.timing.half, move || {
            pending.borrow_mut().retain(|p| p.seq != seq);
            element.update_style(|style| {
                style.background_color = bg;
                style.box_shadow = shadow;
            });
        });
        self.pending.borrow_mut().push(PendingRevert {
            seq,
            token,
            background,
            box_shadow,
        });
        tracing::trace!(element = %self.element.id(), lightened = %enhanced, "pulse tick");
    }
}

/// Control handle for one running pulse.
pub struct PulseHandle {
    element: ElementHandle,
    tick: CancelToken,
    pending: PendingList,
}

impl PulseHandle {
    /// Whether pulses are still being scheduled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.tick.is_cancelled()
    }

    /// Restores scheduled but not yet run.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Stop pulsing. Idempotent.
    ///
    /// Under [`ReversionPolicy::Settle`] any pending restore is cancelled and
    /// the style from before the oldest pending pulse is applied at once.
    /// Returns `true` if the pulse was active.
    pub fn stop(&self, policy: ReversionPolicy) -> bool {
        let was_active = self.is_active();
        self.tick.cancel();
        if policy == ReversionPolicy::Settle {
            let drained: Vec<PendingRevert> = self.pending.borrow_mut().drain(..).collect();
            for revert in &drained {
                revert.token.cancel();
            }
            if let Some(first) = drained.into_iter().next() {
                self.element.update_style(|style| {
                    style.background_color = first.background;
                    style.box_shadow = first.box_shadow;
                });
                tracing::trace!(element = %self.element.id(), "pulse settled");
            }
        }
        if was_active {
            tracing::debug!(
                element = %self.element.id(),
                task_id = self.tick.id(),
                "pulse stopped"
            );
        }
        was_active
    }
}

impl fmt::Debug for PulseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PulseHandle")
            .field("element", &self.element.id())
            .field("tick", &self.tick)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
