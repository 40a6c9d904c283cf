use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// Creates the span that carries the probing progress bar.
pub fn probe_span(total: usize) -> anyhow::Result<Span> {
    let style = ProgressStyle::with_template("{spinner:.blue} {msg} {bar:32.green/bright_black} {pos}/{len}")?
        .tick_strings(TICK_STRINGS)
        .progress_chars("█▓░");

    let span = info_span!("probing", indicatif.pb_show = true);
    span.pb_set_style(&style);
    span.pb_set_length(total as u64);
    span.pb_set_message("Probing hosts");
    Ok(span)
}

pub fn advance(span: &Span) {
    span.pb_inc(1);
}
