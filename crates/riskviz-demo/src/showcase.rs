#![forbid(unsafe_code)]

//! The demo model: a handful of wallets whose scores drift over time.

use std::time::Duration;

use riskviz::{Document, ElementHandle, RiskScoreVisualizer, TimerQueue, VisualizerConfig};

/// Sample wallets and their starting scores, one or two per band.
pub const WALLETS: &[(&str, f64)] = &[
    ("0x9f3a..c21e", 8.0),
    ("0x41bd..07aa", 22.5),
    ("0x7c02..e913", 37.5),
    ("0xd5e8..4b60", 50.0),
    ("0x2a6f..9d1c", 68.0),
    ("0xe01c..a7f2", 81.0),
    ("0x5b93..3e08", 100.0),
    ("0xc7aa..10d4", 118.0),
];

/// Peak score change applied by a drift.
pub const DRIFT_AMPLITUDE: f64 = 18.0;

/// One wallet badge.
#[derive(Debug, Clone)]
pub struct Badge {
    pub label: &'static str,
    pub base: f64,
    pub element: ElementHandle,
}

/// Registry, scheduler and badges for the demo.
pub struct Showcase {
    queue: TimerQueue,
    visualizer: RiskScoreVisualizer,
    document: Document,
    badges: Vec<Badge>,
    drift_every: Duration,
    next_drift: Duration,
    drifts: u32,
}

impl Showcase {
    /// Build the badges and initialize them all.
    #[must_use]
    pub fn new(config: VisualizerConfig, animate: bool, drift_every: Duration) -> Self {
        let queue = TimerQueue::new();
        let mut visualizer = RiskScoreVisualizer::new(queue.clone(), config);
        let mut document = Document::new();
        let badges: Vec<Badge> = WALLETS
            .iter()
            .map(|&(label, base)| Badge {
                label,
                base,
                element: document.add_scored(base.to_string(), animate),
            })
            .collect();
        let initialized = visualizer.initialize_all(&document);
        tracing::info!(badges = badges.len(), initialized, animate, "showcase ready");
        Self {
            queue,
            visualizer,
            document,
            badges,
            drift_every,
            next_drift: drift_every,
            drifts: 0,
        }
    }

    #[must_use]
    pub fn queue(&self) -> &TimerQueue {
        &self.queue
    }

    #[must_use]
    pub fn visualizer(&self) -> &RiskScoreVisualizer {
        &self.visualizer
    }

    #[must_use]
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    #[must_use]
    pub fn drifts(&self) -> u32 {
        self.drifts
    }

    /// Drift scores if the queue's clock has reached the next drift time.
    pub fn tick(&mut self) -> bool {
        let now = self.queue.now();
        if now < self.next_drift {
            return false;
        }
        self.next_drift = now + self.drift_every;
        self.drift();
        true
    }

    /// Move every score along a deterministic wave around its base.
    pub fn drift(&mut self) {
        self.drifts += 1;
        let phase = f64::from(self.drifts) * 0.9;
        for (i, badge) in self.badges.iter().enumerate() {
            let offset = DRIFT_AMPLITUDE * (phase + i as f64 * 1.3).sin();
            let score = ((badge.base + offset) * 10.0).round() / 10.0;
            self.visualizer
                .update_risk_score(Some(&badge.element), score);
        }
        tracing::debug!(drift = self.drifts, "scores drifted");
    }

    /// Stop every pulse.
    pub fn stop_all(&mut self) -> usize {
        self.visualizer.stop_all_animations()
    }

    /// Re-read every badge's score attribute.
    pub fn reinitialize(&mut self) -> usize {
        self.visualizer.initialize_all(&self.document)
    }
}
