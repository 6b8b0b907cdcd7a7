#![forbid(unsafe_code)]

//! Terminal rendering of badges with crossterm.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use crossterm::terminal::{Clear, ClearType};
use riskviz::{RISK_SCORE_ATTR, Rgb, RiskScore, hex_to_rgb};

use crate::showcase::{Badge, Showcase};

/// What a badge looks like right now, read back from its inline style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeView {
    pub label: &'static str,
    pub score: String,
    pub band: &'static str,
    pub background: Rgb,
    pub foreground: Rgb,
    pub glowing: bool,
    pub pulsing: bool,
}

/// Read a badge's current style and score.
#[must_use]
pub fn view(badge: &Badge, showcase: &Showcase) -> BadgeView {
    let style = badge.element.style();
    let viz = showcase.visualizer();
    let score = badge
        .element
        .attribute(RISK_SCORE_ATTR)
        .unwrap_or_default();
    let band = RiskScore::parse(&score)
        .map(|s| viz.config().thresholds.band(s).label())
        .unwrap_or("?");
    BadgeView {
        label: badge.label,
        score,
        band,
        background: hex_to_rgb(style.background_color.as_deref().unwrap_or_default()),
        foreground: style
            .color
            .as_deref()
            .map_or(Rgb::WHITE, hex_to_rgb),
        glowing: style.box_shadow.as_deref().is_some_and(|s| s != "none"),
        pulsing: viz
            .state(&badge.element)
            .is_some_and(|state| state.is_animating()),
    }
}

#[must_use]
pub fn term_color(c: Rgb) -> TermColor {
    TermColor::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Draw the whole screen.
pub fn draw<W: Write>(out: &mut W, showcase: &Showcase) -> io::Result<()> {
    let viz = showcase.visualizer();
    queue!(
        out,
        MoveTo(0, 0),
        Clear(ClearType::All),
        SetAttribute(Attribute::Bold),
        Print("Wallet risk scores"),
        SetAttribute(Attribute::Reset),
        MoveTo(0, 1),
        Print(format!(
            "t={:>7.1}s  drifts={}  pulsing={}/{}",
            showcase.queue().now().as_secs_f64(),
            showcase.drifts(),
            viz.active_animations(),
            viz.len()
        )),
    )?;

    for (row, badge) in showcase.badges().iter().enumerate() {
        let v = view(badge, showcase);
        let y = u16::try_from(row + 3).unwrap_or(u16::MAX);
        queue!(
            out,
            MoveTo(2, y),
            SetBackgroundColor(term_color(v.background)),
            SetForegroundColor(term_color(v.foreground)),
            Print(format!(" {:<14} {:>6} {:<8} ", v.label, v.score, v.band)),
            ResetColor,
        )?;
        if v.glowing {
            queue!(
                out,
                SetForegroundColor(term_color(v.background)),
                Print(" *"),
                ResetColor
            )?;
        }
        if v.pulsing {
            queue!(out, Print(" ~"))?;
        }
    }

    let footer = u16::try_from(showcase.badges().len() + 4).unwrap_or(u16::MAX);
    queue!(
        out,
        MoveTo(0, footer),
        Print("s: stop animations   r: re-initialize   q: quit"),
    )?;
    out.flush()
}
