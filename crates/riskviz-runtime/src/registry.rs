#![forbid(unsafe_code)]

//! The visualizer registry.
//!
//! [`RiskScoreVisualizer`] owns one [`VisualState`] per decorated element and,
//! through it, that element's pulse. Every public operation absorbs bad input
//! (missing element, non-numeric or NaN score) and reports what it did through
//! its return value instead of an error.
//!
//! # Invariants
//!
//! 1. At most one pulse per element. Installing a pulse first stops the
//!    previous one.
//! 2. Colors are applied in a single style update: background, text color
//!    and glow change together or not at all.
//! 3. Stopping animations never forgets scores; only [`detach`] and
//!    [`teardown`] remove records.
//! 4. Dropping the registry cancels every pulse it started.
//! 5. A pulse stopped under `LetFinish` stays reachable until its last restore
//!    has run, so [`detach`] can still cancel it.
//!
//! [`detach`]: RiskScoreVisualizer::detach
//! [`teardown`]: RiskScoreVisualizer::teardown

use std::collections::BTreeMap;
use std::fmt;

use riskviz_style::{Appearance, RiskScore, RiskStyler};

use crate::config::{ReversionPolicy, VisualizerConfig};
use crate::element::{
    ANIMATED_ATTR, ElementHandle, ElementId, ElementSource, InlineStyle, RISK_SCORE_ATTR,
};
use crate::pulse::{PulseAnimator, PulseHandle};
use crate::scheduler::{Scheduler, TimerQueue};

/// Per-element record.
pub struct VisualState {
    score: RiskScore,
    element: ElementHandle,
    original: InlineStyle,
    animation: Option<PulseHandle>,
    /// Stopped pulses whose restores are still queued.
    draining: Vec<PulseHandle>,
}

impl VisualState {
    /// Last applied score.
    #[must_use]
    pub fn score(&self) -> RiskScore {
        self.score
    }

    #[must_use]
    pub fn element(&self) -> &ElementHandle {
        &self.element
    }

    /// Inline style captured before the element was first decorated.
    #[must_use]
    pub fn original(&self) -> &InlineStyle {
        &self.original
    }

    /// Whether a pulse is currently scheduled.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.as_ref().is_some_and(PulseHandle::is_active)
    }

    fn stop(&mut self, policy: ReversionPolicy) -> bool {
        self.draining.retain(|handle| handle.in_flight() > 0);
        let Some(handle) = self.animation.take() else {
            return false;
        };
        let stopped = handle.stop(policy);
        if handle.in_flight() > 0 {
            self.draining.push(handle);
        }
        stopped
    }

    /// Stop the pulse and cancel every restore still queued, including those
    /// of pulses stopped earlier.
    fn settle(&mut self) {
        self.stop(ReversionPolicy::Settle);
        for handle in self.draining.drain(..) {
            handle.stop(ReversionPolicy::Settle);
        }
    }
}

impl fmt::Debug for VisualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualState")
            .field("score", &self.score)
            .field("element", &self.element.id())
            .field("animation", &self.animation)
            .field("draining", &self.draining.len())
            .finish()
    }
}

/// Tracks decorated elements and their pulses.
pub struct RiskScoreVisualizer<S: Scheduler = TimerQueue> {
    config: VisualizerConfig,
    styler: RiskStyler,
    animator: PulseAnimator<S>,
    states: BTreeMap<ElementId, VisualState>,
}

impl<S: Scheduler> RiskScoreVisualizer<S> {
    /// Create an empty registry that schedules pulses on `scheduler`.
    #[must_use]
    pub fn new(scheduler: S, config: VisualizerConfig) -> Self {
        tracing::debug!(config = %config.summary_short(), "visualizer created");
        Self {
            styler: config.styler(),
            animator: PulseAnimator::new(scheduler, &config),
            config,
            states: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        self.animator.scheduler()
    }

    /// Initialize every element in `source` carrying a risk score attribute.
    ///
    /// Elements whose score is not numeric are skipped. Returns how many were
    /// initialized.
    pub fn initialize_all<E>(&mut self, source: &E) -> usize
    where
        E: ElementSource + ?Sized,
    {
        let elements = source.query_all(RISK_SCORE_ATTR);
        let found = elements.len();
        let initialized = elements
            .iter()
            .filter(|element| self.initialize_element(Some(*element)))
            .count();
        tracing::debug!(found, initialized, "initialize_all");
        initialized
    }

    /// Read the element's score attribute and decorate it.
    ///
    /// Re-initializing a tracked element replaces its pulse and keeps the
    /// originally captured style. Returns `false` (and changes nothing) when
    /// the element is absent or its score is not numeric.
    pub fn initialize_element(&mut self, element: Option<&ElementHandle>) -> bool {
        let Some(element) = element else {
            return false;
        };
        let Some(text) = element.attribute(RISK_SCORE_ATTR) else {
            tracing::debug!(element = %element.id(), "no risk score attribute, skipped");
            return false;
        };
        match RiskScore::parse(&text) {
            Ok(score) => {
                self.install(element, score);
                true
            }
            Err(err) => {
                tracing::debug!(element = %element.id(), error = %err, "skipped");
                false
            }
        }
    }

    /// Write a new score to the element and re-decorate it.
    ///
    /// Animated elements restart their pulse at the new score. A NaN score or
    /// an absent element changes nothing and returns `false`. Untracked
    /// elements become tracked.
    pub fn update_risk_score(&mut self, element: Option<&ElementHandle>, score: f64) -> bool {
        let Some(element) = element else {
            return false;
        };
        let score = match RiskScore::new(score) {
            Ok(score) => score,
            Err(err) => {
                tracing::debug!(element = %element.id(), error = %err, "update ignored");
                return false;
            }
        };
        element.set_attribute(RISK_SCORE_ATTR, score.to_string());
        self.install(element, score);
        true
    }

    /// Stop the element's pulse. Idempotent.
    ///
    /// Returns `true` if a running pulse was stopped.
    pub fn stop_animation(&mut self, element: Option<&ElementHandle>) -> bool {
        let policy = self.config.reversion;
        element
            .and_then(|element| self.states.get_mut(&element.id()))
            .is_some_and(|state| state.stop(policy))
    }

    /// Stop every pulse, keeping score records. Returns how many were running.
    pub fn stop_all_animations(&mut self) -> usize {
        let policy = self.config.reversion;
        let stopped = self
            .states
            .values_mut()
            .map(|state| state.stop(policy))
            .filter(|&stopped| stopped)
            .count();
        if stopped > 0 {
            tracing::debug!(stopped, "stopped all animations");
        }
        stopped
    }

    /// Stop the element's pulse, forget it and restore its original style.
    ///
    /// Returns `false` if the element was not tracked.
    pub fn detach(&mut self, element: &ElementHandle) -> bool {
        let Some(mut state) = self.states.remove(&element.id()) else {
            return false;
        };
        state.settle();
        let original = state.original;
        element.update_style(|style| *style = original);
        tracing::debug!(element = %element.id(), "detached");
        true
    }

    /// Detach every tracked element. Returns how many were detached.
    pub fn teardown(&mut self) -> usize {
        let elements: Vec<ElementHandle> = self
            .states
            .values()
            .map(|state| state.element.clone())
            .collect();
        for element in &elements {
            self.detach(element);
        }
        elements.len()
    }

    /// Record for `element`, if tracked.
    #[must_use]
    pub fn state(&self, element: &ElementHandle) -> Option<&VisualState> {
        self.states.get(&element.id())
    }

    /// Tracked elements, ordered by element identity.
    pub fn tracked(&self) -> impl Iterator<Item = &ElementHandle> {
        self.states.values().map(|state| &state.element)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of elements currently pulsing.
    #[must_use]
    pub fn active_animations(&self) -> usize {
        self.states.values().filter(|s| s.is_animating()).count()
    }

    /// Appearance for a score without touching any element. `None` for NaN.
    #[must_use]
    pub fn appearance_for(&self, score: f64) -> Option<Appearance> {
        RiskScore::new(score)
            .ok()
            .map(|score| self.styler.appearance(score))
    }

    /// Apply colors, replace the pulse and record the score.
    fn install(&mut self, element: &ElementHandle, score: RiskScore) {
        let policy = self.config.reversion;
        let id = element.id();
        let (original, draining, previous) = match self.states.get_mut(&id) {
            Some(state) => {
                state.stop(policy);
                (state.original.clone(), std::mem::take(&mut state.draining), true)
            }
            None => (element.style(), Vec::new(), false),
        };

        let appearance = self.styler.appearance(score);
        apply_appearance(element, &appearance);

        let animation = if element.has_attribute(ANIMATED_ATTR) {
            self.animator.start(element, score)
        } else {
            None
        };

        tracing::debug!(
            element = %id,
            score = score.value(),
            band = appearance.band.label(),
            background = %appearance.background,
            animated = animation.is_some(),
            reinitialized = previous,
            "risk colors applied"
        );
        self.states.insert(
            id,
            VisualState {
                score,
                element: element.clone(),
                original,
                animation,
                draining,
            },
        );
    }
}

fn apply_appearance(element: &ElementHandle, appearance: &Appearance) {
    let background = appearance.background.to_hex();
    let foreground = appearance.foreground.to_hex();
    let shadow = appearance.box_shadow();
    element.update_style(|style| {
        style.background_color = Some(background);
        style.color = Some(foreground);
        style.box_shadow = Some(shadow);
    });
}

impl<S: Scheduler> Drop for RiskScoreVisualizer<S> {
    fn drop(&mut self) {
        let stopped = self.stop_all_animations();
        if stopped > 0 {
            tracing::debug!(stopped, "visualizer dropped, pulses cancelled");
        }
    }
}

impl<S: Scheduler> fmt::Debug for RiskScoreVisualizer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskScoreVisualizer")
            .field("config", &self.config)
            .field("tracked", &self.states.len())
            .field("active_animations", &self.active_animations())
            .finish()
    }
}
