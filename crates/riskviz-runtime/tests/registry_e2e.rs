#![forbid(unsafe_code)]

//! Registry end-to-end tests driven by a deterministic `TimerQueue`.
//!
//! ```sh
//! cargo test -p riskviz-runtime --test registry_e2e
//! ```
//!
//! # Invariants
//!
//! 1. **Exact colors**: breakpoints map to their palette color, midpoints
//!    interpolate, out-of-range scores extrapolate.
//! 2. **Medium gate**: only scores at or above `medium` ever schedule a pulse.
//! 3. **No leaked timers**: any sequence of updates leaves at most one
//!    periodic task per element.
//! 4. **Graceful degradation**: bad input never changes an element.
//! 5. **Reversion policy**: `LetFinish` lets an in-flight restore fire late,
//!    `Settle` restores immediately. `detach` cancels every queued restore,
//!    including those of pulses stopped earlier.

use std::time::Duration;

use riskviz_runtime::{
    ANIMATED_ATTR, Document, ElementHandle, InlineStyle, RISK_SCORE_ATTR, ReversionPolicy,
    RiskScoreVisualizer, ThresholdOptions, TimerQueue, VisualizerConfig, VisualizerOptions,
};
use riskviz_style::RiskBand;

// ============================================================================
// Test Utilities
// ============================================================================

const MS: Duration = Duration::from_millis(1);

fn visualizer(config: VisualizerConfig) -> (TimerQueue, RiskScoreVisualizer) {
    let queue = TimerQueue::new();
    let viz = RiskScoreVisualizer::new(queue.clone(), config);
    (queue, viz)
}

fn bg(el: &ElementHandle) -> Option<String> {
    el.style().background_color
}

fn settle_config() -> VisualizerConfig {
    VisualizerConfig {
        reversion: ReversionPolicy::Settle,
        ..VisualizerConfig::default()
    }
}

// ============================================================================
// 1. Color scenario
// ============================================================================

#[test]
fn scenario_default_thresholds() {
    let (_, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let low = doc.add_scored("10", false);
    let mid = doc.add_scored("37.5", false);
    let crit = doc.add_scored("100", false);
    let over = doc.add_scored("120", false);

    assert_eq!(viz.initialize_all(&doc), 4);

    assert_eq!(bg(&low).as_deref(), Some("#28a745"));
    assert_eq!(bg(&mid).as_deref(), Some("#94b426"));
    assert_eq!(bg(&crit).as_deref(), Some("#dc3545"));
    assert_eq!(bg(&over).as_deref(), Some("#c2006c"));
}

#[test]
fn text_color_and_glow_follow_background() {
    let (_, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let low = doc.add_scored("10", false);
    let medium = doc.add_scored("50", false);
    let crit = doc.add_scored("100", false);
    viz.initialize_all(&doc);

    let s = low.style();
    assert_eq!(s.color.as_deref(), Some("#ffffff"));
    assert_eq!(s.box_shadow.as_deref(), Some("none"));

    let s = medium.style();
    assert_eq!(s.color.as_deref(), Some("#212529"));
    assert_eq!(s.box_shadow.as_deref(), Some("none"));

    let s = crit.style();
    assert_eq!(s.color.as_deref(), Some("#ffffff"));
    assert_eq!(s.box_shadow.as_deref(), Some("0 0 10px #dc3545"));
}

#[test]
fn custom_palette_and_thresholds_apply() {
    let parse = VisualizerOptions {
        low_color: Some("#000000".into()),
        medium_color: Some("#ffffff".into()),
        thresholds: Some(ThresholdOptions {
            low: Some(0.0),
            medium: Some(10.0),
            high: Some(20.0),
            critical: Some(30.0),
        }),
        ..VisualizerOptions::default()
    }
    .resolve();
    assert!(parse.is_clean(), "{:?}", parse.errors);
    let (_, mut viz) = visualizer(parse.config);
    let el = ElementHandle::new().with_attribute(RISK_SCORE_ATTR, "5");
    assert!(viz.initialize_element(Some(&el)));
    assert_eq!(bg(&el).as_deref(), Some("#808080"));
    assert_eq!(viz.appearance_for(5.0).map(|a| a.band), Some(RiskBand::Medium));
}

// ============================================================================
// 2. Medium gate
// ============================================================================

#[test]
fn only_medium_and_above_pulse() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let calm = doc.add_scored("49.99", true);
    let edge = doc.add_scored("50", true);
    viz.initialize_all(&doc);

    assert!(!viz.state(&calm).unwrap().is_animating());
    assert!(viz.state(&edge).unwrap().is_animating());
    assert_eq!(queue.pending(), 1);
}

#[test]
fn animation_requires_opt_in() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let el = ElementHandle::new().with_attribute(RISK_SCORE_ATTR, "99");
    viz.initialize_element(Some(&el));
    assert_eq!(viz.active_animations(), 0);
    assert_eq!(queue.pending(), 0);

    // Any value of the attribute opts in.
    el.set_attribute(ANIMATED_ATTR, "");
    viz.initialize_element(Some(&el));
    assert_eq!(viz.active_animations(), 1);
}

#[test]
fn pulse_lightens_then_reverts() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let el = doc.add_scored("100", true);
    viz.initialize_all(&doc);

    queue.advance(3000 * MS);
    let peak = el.style();
    assert_eq!(peak.background_color.as_deref(), Some("#e35d6a"));
    assert_eq!(peak.box_shadow.as_deref(), Some("0 0 15px #e35d6a"));
    assert_eq!(peak.transition.as_deref(), Some("all 1s ease-in-out"));

    queue.advance(1000 * MS);
    let rest = el.style();
    assert_eq!(rest.background_color.as_deref(), Some("#dc3545"));
    assert_eq!(rest.box_shadow.as_deref(), Some("0 0 10px #dc3545"));

    // Keeps pulsing.
    queue.advance(2000 * MS);
    assert_eq!(bg(&el).as_deref(), Some("#e35d6a"));
}

// ============================================================================
// 3. No leaked timers
// ============================================================================

#[test]
fn repeated_updates_keep_one_periodic_task() {
    let (queue, mut viz) = visualizer(settle_config());
    let mut doc = Document::new();
    let el = doc.add_scored("60", true);
    viz.initialize_all(&doc);

    for step in 0..50 {
        let score = 50.0 + f64::from(step);
        assert!(viz.update_risk_score(Some(&el), score));
        queue.advance(700 * MS);
    }
    assert_eq!(viz.active_animations(), 1);
    assert!(queue.pending() <= 2, "pending = {}", queue.pending());
}

#[test]
fn update_below_medium_stops_pulsing() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let el = doc.add_scored("80", true);
    viz.initialize_all(&doc);
    assert_eq!(viz.active_animations(), 1);

    viz.update_risk_score(Some(&el), 10.0);
    assert_eq!(viz.active_animations(), 0);
    assert_eq!(queue.pending(), 0);
    assert_eq!(bg(&el).as_deref(), Some("#28a745"));
}

#[test]
fn stop_animation_is_idempotent() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let el = doc.add_scored("90", true);
    let idle = doc.add_scored("90", false);
    viz.initialize_all(&doc);

    let before = idle.style();
    assert!(!viz.stop_animation(Some(&idle)));
    assert_eq!(idle.style(), before);

    assert!(viz.stop_animation(Some(&el)));
    assert!(!viz.stop_animation(Some(&el)));
    assert_eq!(queue.pending(), 0);
    assert_eq!(viz.state(&el).map(|s| s.score().value()), Some(90.0));
}

#[test]
fn stop_all_keeps_scores() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    doc.add_scored("55", true);
    doc.add_scored("85", true);
    doc.add_scored("20", true);
    viz.initialize_all(&doc);

    assert_eq!(viz.stop_all_animations(), 2);
    assert_eq!(viz.active_animations(), 0);
    assert_eq!(viz.len(), 3);
    assert_eq!(queue.advance(Duration::from_secs(30)), 0);
}

#[test]
fn stop_all_with_nothing_running_changes_nothing() {
    let (_, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let a = doc.add_scored("10", false);
    let b = doc.add_scored("90", false);
    viz.initialize_all(&doc);
    let (sa, sb) = (a.style(), b.style());

    assert_eq!(viz.stop_all_animations(), 0);
    assert_eq!(a.style(), sa);
    assert_eq!(b.style(), sb);

    let (_, mut empty) = visualizer(VisualizerConfig::default());
    assert_eq!(empty.stop_all_animations(), 0);
}

// ============================================================================
// 4. Graceful degradation
// ============================================================================

#[test]
fn non_numeric_scores_are_skipped() {
    let (_, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let bad = doc.add_scored("high", true);
    let empty = doc.add_scored("", false);
    let good = doc.add_scored("42abc", false);

    assert_eq!(viz.initialize_all(&doc), 1);
    assert_eq!(bad.style(), InlineStyle::default());
    assert_eq!(empty.style(), InlineStyle::default());
    assert!(viz.state(&good).is_some());
}

#[test]
fn infinite_score_round_trips_through_attribute() {
    let (_, mut viz) = visualizer(VisualizerConfig::default());
    let el = ElementHandle::new();
    assert!(viz.update_risk_score(Some(&el), f64::INFINITY));
    assert_eq!(el.attribute(RISK_SCORE_ATTR).as_deref(), Some("Infinity"));
    assert!(viz.initialize_element(Some(&el)));
}

// ============================================================================
// 5. Reversion policy and detach
// ============================================================================

#[test]
fn let_finish_reversion_fires_after_restart() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let el = doc.add_scored("100", true);
    viz.initialize_all(&doc);

    queue.advance(3000 * MS);
    viz.update_risk_score(Some(&el), 60.0);
    let applied = bg(&el);

    // The old pulse's restore still lands and puts back the 100-score color.
    queue.advance(1000 * MS);
    assert_eq!(bg(&el).as_deref(), Some("#dc3545"));
    assert_ne!(bg(&el), applied);
}

#[test]
fn settle_cancels_in_flight_reversion() {
    let (queue, mut viz) = visualizer(settle_config());
    let mut doc = Document::new();
    let el = doc.add_scored("100", true);
    viz.initialize_all(&doc);

    queue.advance(3000 * MS);
    viz.update_risk_score(Some(&el), 60.0);
    let applied = bg(&el);

    queue.advance(1000 * MS);
    assert_eq!(bg(&el), applied);
}

#[test]
fn detach_restores_original_style() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let el = doc.add_scored("95", true);
    el.update_style(|s| s.background_color = Some("#123456".into()));
    viz.initialize_all(&doc);
    queue.advance(3000 * MS);

    assert!(viz.detach(&el));
    assert!(!viz.detach(&el));
    assert_eq!(bg(&el).as_deref(), Some("#123456"));
    assert_eq!(el.style().color, None);
    assert_eq!(queue.pending(), 0);
    assert!(viz.state(&el).is_none());
}

#[test]
fn detach_after_stop_cancels_lingering_restore() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let el = doc.add_scored("100", true);
    el.update_style(|s| s.background_color = Some("#123456".into()));
    viz.initialize_all(&doc);

    queue.advance(3000 * MS);
    assert!(viz.stop_animation(Some(&el)));
    // LetFinish keeps the tick's restore queued after the stop.
    assert_eq!(queue.pending(), 1);

    assert!(viz.detach(&el));
    assert_eq!(queue.pending(), 0);
    queue.advance(1000 * MS);
    assert_eq!(bg(&el).as_deref(), Some("#123456"));
    assert_eq!(el.style().box_shadow, None);
}

#[test]
fn teardown_after_drop_below_medium_cancels_lingering_restore() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let el = doc.add_scored("100", true);
    viz.initialize_all(&doc);

    queue.advance(3000 * MS);
    viz.update_risk_score(Some(&el), 10.0);
    assert!(!viz.state(&el).unwrap().is_animating());

    assert_eq!(viz.teardown(), 1);
    assert_eq!(queue.pending(), 0);
    queue.advance(1000 * MS);
    assert_eq!(el.style(), InlineStyle::default());
}

#[test]
fn lingering_restore_survives_reinitialize_until_detach() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    let el = doc.add_scored("90", true);
    viz.initialize_all(&doc);

    queue.advance(3000 * MS);
    viz.stop_all_animations();
    viz.update_risk_score(Some(&el), 95.0);
    // New periodic task plus the earlier tick's restore.
    assert_eq!(queue.pending(), 2);

    assert!(viz.detach(&el));
    assert_eq!(queue.pending(), 0);
    queue.advance(5000 * MS);
    assert_eq!(el.style(), InlineStyle::default());
}

#[test]
fn teardown_detaches_everything() {
    let (queue, mut viz) = visualizer(VisualizerConfig::default());
    let mut doc = Document::new();
    for score in ["10", "60", "99"] {
        doc.add_scored(score, true);
    }
    viz.initialize_all(&doc);
    assert_eq!(viz.teardown(), 3);
    assert!(viz.is_empty());
    assert_eq!(queue.pending(), 0);
    for el in doc.iter() {
        assert_eq!(el.style(), InlineStyle::default());
    }
}

#[test]
fn two_registries_share_one_queue() {
    let queue = TimerQueue::new();
    let mut a = RiskScoreVisualizer::new(queue.clone(), VisualizerConfig::default());
    let mut b = RiskScoreVisualizer::new(queue.clone(), settle_config());
    let mut doc = Document::new();
    let x = doc.add_scored("70", true);
    let y = doc.add_scored("80", true);

    a.initialize_element(Some(&x));
    b.initialize_element(Some(&y));
    assert_eq!(queue.pending(), 2);

    a.stop_all_animations();
    assert_eq!(queue.pending(), 1);
    assert!(b.state(&y).unwrap().is_animating());
}
