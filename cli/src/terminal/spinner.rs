use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

pub fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

pub fn report_networks(span: &Span, count: usize) {
    span.pb_set_message(&progress_message(count, "networks"));
}

pub fn report_devices(span: &Span, count: usize) {
    span.pb_set_message(&progress_message(count, "devices"));
}

pub fn waiting(span: &Span, what: &str) {
    let tip = format!("Waiting for {what}, press Ctrl-C to finish early");
    span.pb_set_message(&tip.italic().white().to_string());
}

fn progress_message(count: usize, noun: &str) -> String {
    format!(
        "Identified {} so far...",
        format!("{count} {noun}").green().bold()
    )
    .color(colors::TEXT_DEFAULT)
    .to_string()
}
