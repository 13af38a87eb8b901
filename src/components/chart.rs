//! Horizontal text bar charts.

#[cfg(test)]
#[path = "chart_test.rs"]
mod chart_test;

pub const BAR_WIDTH: usize = 30;
const BAR_CHAR: char = '#';

/// A bar proportional to `value / max`. Non-positive values draw nothing.
#[must_use]
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if !(value > 0.0 && max > 0.0) {
        return String::new();
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let len = ((value / max).min(1.0) * width as f64).round() as usize;
    BAR_CHAR.to_string().repeat(len.max(1))
}

/// One line per `(label, value)`: label, bar scaled to the largest value, value.
#[must_use]
pub fn bar_chart(rows: &[(String, f64)], width: usize, format_value: impl Fn(f64) -> String) -> Vec<String> {
    let max = rows.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| {
            let pad = label_width.saturating_sub(label.chars().count());
            let bar = bar(*value, max, width);
            let bar_pad = width.saturating_sub(bar.chars().count());
            format!(
                "{label}{} | {bar}{} {}",
                " ".repeat(pad),
                " ".repeat(bar_pad),
                format_value(*value)
            )
        })
        .collect()
}
