//! Property-based invariant tests for color math and the threshold ramp.
//!
//! 1. Hex encoding round-trips every channel triplet.
//! 2. Lighten by 0 normalizes; lighten by 1 is white; lighten never darkens.
//! 3. Within each band, every channel moves monotonically between the
//!    band's endpoint colors.
//! 4. The foreground is dark exactly when luma exceeds the threshold.
//! 5. Scores at or below `low` always map to the low color.

use proptest::prelude::*;
use riskviz_style::{
    Color, ContrastPolicy, DARK_TEXT, LIGHT_TEXT, Rgb, RiskPalette, RiskRamp, RiskScore,
    Thresholds, hex_to_rgb, lighten, rgb_to_hex,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn rgb_strategy() -> impl Strategy<Value = Rgb> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

fn palette_strategy() -> impl Strategy<Value = RiskPalette> {
    (rgb_strategy(), rgb_strategy(), rgb_strategy(), rgb_strategy()).prop_map(
        |(low, medium, high, critical)| RiskPalette {
            low,
            medium,
            high,
            critical,
        },
    )
}

fn thresholds_strategy() -> impl Strategy<Value = Thresholds> {
    (-100.0f64..100.0, 0.5f64..50.0, 0.5f64..50.0, 0.5f64..50.0).prop_map(|(low, a, b, c)| {
        Thresholds::new(low, low + a, low + a + b, low + a + b + c).unwrap()
    })
}

fn channels(c: Rgb) -> [u8; 3] {
    [c.r, c.g, c.b]
}

fn between(value: u8, a: u8, b: u8) -> bool {
    a.min(b) <= value && value <= a.max(b)
}

/// Band `index` (0..3) as (start score, end score, start color, end color).
fn band(t: &Thresholds, p: &RiskPalette, index: usize) -> (f64, f64, Rgb, Rgb) {
    match index {
        0 => (t.low(), t.medium(), p.low, p.medium),
        1 => (t.medium(), t.high(), p.medium, p.high),
        _ => (t.high(), t.critical(), p.high, p.critical),
    }
}

/// Score at `frac` of the way through a band, kept inside the band despite
/// float rounding.
fn at(start: f64, end: f64, frac: f64) -> f64 {
    (start + frac * (end - start)).clamp(start, end)
}

fn score(v: f64) -> RiskScore {
    RiskScore::new(v).unwrap()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Hex round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn hex_round_trip(c in rgb_strategy()) {
        prop_assert_eq!(hex_to_rgb(&rgb_to_hex(c.r, c.g, c.b)), c);
    }

    #[test]
    fn uppercase_hex_decodes_identically(c in rgb_strategy()) {
        let upper = rgb_to_hex(c.r, c.g, c.b).to_uppercase();
        prop_assert_eq!(hex_to_rgb(&upper), c);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Lighten
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn lighten_zero_is_normalization(c in rgb_strategy()) {
        let css = format!("rgb({}, {}, {})", c.r, c.g, c.b);
        prop_assert_eq!(lighten(&Color::parse(&css), 0.0), c.to_hex());
        prop_assert_eq!(lighten(&Color::hex(c.to_hex().to_uppercase()), 0.0), c.to_hex());
    }

    #[test]
    fn lighten_one_is_white(c in rgb_strategy()) {
        prop_assert_eq!(lighten(&Color::from(c), 1.0), "#ffffff");
    }

    #[test]
    fn lighten_never_darkens(c in rgb_strategy(), factor in 0.0f64..=1.0) {
        let out = c.lighten(factor);
        for (after, before) in channels(out).into_iter().zip(channels(c)) {
            prop_assert!(after >= before);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Band monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn band_channels_stay_between_endpoints(
        t in thresholds_strategy(),
        p in palette_strategy(),
        index in 0usize..3,
        frac in 0.0f64..=1.0,
    ) {
        let (start, end, c1, c2) = band(&t, &p, index);
        let s = at(start, end, frac);
        let color = RiskRamp::new(t, p).color_for(score(s));
        for ((v, a), b) in channels(color).into_iter().zip(channels(c1)).zip(channels(c2)) {
            prop_assert!(between(v, a, b), "score {s}: {v} not within [{a}, {b}]");
        }
    }

    #[test]
    fn band_channels_are_monotonic(
        t in thresholds_strategy(),
        p in palette_strategy(),
        index in 0usize..3,
        f1 in 0.0f64..=1.0,
        f2 in 0.0f64..=1.0,
    ) {
        let (start, end, c1, c2) = band(&t, &p, index);
        let (lo, hi) = (f1.min(f2), f1.max(f2));
        let ramp = RiskRamp::new(t, p);
        let a = ramp.color_for(score(at(start, end, lo)));
        let b = ramp.color_for(score(at(start, end, hi)));
        for (((va, vb), from), to) in channels(a)
            .into_iter()
            .zip(channels(b))
            .zip(channels(c1))
            .zip(channels(c2))
        {
            if from <= to {
                prop_assert!(va <= vb);
            } else {
                prop_assert!(va >= vb);
            }
        }
    }

    #[test]
    fn breakpoints_hit_band_colors_exactly(t in thresholds_strategy(), p in palette_strategy()) {
        let ramp = RiskRamp::new(t, p);
        prop_assert_eq!(ramp.color_for(score(t.low())), p.low);
        prop_assert_eq!(ramp.color_for(score(t.medium())), p.medium);
        prop_assert_eq!(ramp.color_for(score(t.high())), p.high);
        prop_assert_eq!(ramp.color_for(score(t.critical())), p.critical);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Contrast
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn foreground_follows_luma(c in rgb_strategy()) {
        let expected = if c.luma() > 125.0 { DARK_TEXT } else { LIGHT_TEXT };
        prop_assert_eq!(ContrastPolicy::default().foreground_for(c), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Low clamp
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn at_or_below_low_is_low_color(
        t in thresholds_strategy(),
        p in palette_strategy(),
        below in 0.0f64..1e6,
    ) {
        let ramp = RiskRamp::new(t, p);
        prop_assert_eq!(ramp.color_for(score(t.low() - below)), p.low);
    }
}
