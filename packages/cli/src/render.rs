//! Plain-text rendering of the explanation panel for the terminal.

use std::fmt::Write as _;

use console::style;
use subsidence_map_dashboard::{
    Attribution, ExplanationPanel, RiskInfo,
    attribution::{ChartBar, TopItem},
};

/// Width of the longest bar in characters.
const BAR_WIDTH: usize = 24;

/// Renders the whole panel.
#[must_use]
pub fn render_panel(panel: &ExplanationPanel) -> String {
    let mut out = String::new();

    match panel {
        ExplanationPanel::NoSelection { message } => {
            let _ = writeln!(out, "{}", style(message).cyan());
        }
        ExplanationPanel::Region(region) => {
            let _ = writeln!(out, "{}", style(&region.title).bold());
            out.push_str(&render_risk(&region.risk));
            out.push('\n');
            out.push_str(&render_attribution(&region.attribution));
        }
    }

    out
}

fn render_risk(risk: &RiskInfo) -> String {
    match risk {
        RiskInfo::Known {
            percent,
            grade_label,
            ..
        } => format!("위험률: {percent}    위험 등급: {grade_label}\n"),
        RiskInfo::Unavailable { message } => format!("{message}\n"),
    }
}

fn render_attribution(attribution: &Attribution) -> String {
    match attribution {
        Attribution::Unavailable { message } => format!("{}\n", style(message).yellow()),
        Attribution::Available { bars, top_items } => {
            let mut out = render_bars(bars);
            if !top_items.is_empty() {
                out.push('\n');
                out.push_str(&render_top_items(top_items));
            }
            out
        }
    }
}

/// Horizontal bar chart, scaled to the largest absolute value.
fn render_bars(bars: &[ChartBar]) -> String {
    let max = bars
        .iter()
        .map(|b| b.value.abs())
        .fold(0.0_f64, f64::max);
    let label_width = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for bar in bars {
        let bar_len = bar_length(bar.value, max);
        let glyphs = "█".repeat(bar_len);
        let glyphs = if bar.value > 0.0 {
            style(glyphs).red()
        } else {
            style(glyphs).blue()
        };
        let padding = label_width - bar.label.chars().count();
        let _ = writeln!(
            out,
            "{}{} {:>6} {glyphs}",
            bar.label,
            " ".repeat(padding),
            bar.formatted_value,
        );
    }
    out
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar_length(value: f64, max: f64) -> usize {
    if max <= 0.0 {
        return 0;
    }
    ((value.abs() / max) * BAR_WIDTH as f64).round() as usize
}

/// Top detailed items as a three-column table.
fn render_top_items(items: &[TopItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("요인 분류 | 세부 항목 | 기여도").underlined());
    for item in items {
        let _ = writeln!(
            out,
            "{} | {} | {}",
            item.factor_group, item.item, item.formatted_value
        );
    }
    out
}
