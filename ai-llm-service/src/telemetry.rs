use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Targets (crate names) of the service's own crates.
pub const TARGET_PREFIXES: [&str; 5] = [
    "tds_solver_backend",
    "api",
    "answer_engine",
    "file_extract",
    "ai_llm_service",
];

/// RFC3339 UTC timer implemented via `chrono` (no extra features).
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

fn is_own_target(target: &str) -> bool {
    TARGET_PREFIXES
        .iter()
        .any(|p| target == *p || target.starts_with(&format!("{p}::")))
}

/// Formatting layer that renders ONLY events emitted by the service crates.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with `file:line` and target
/// - Span close events (duration of `#[instrument]`ed functions)
/// - ANSI colors only when stdout is a terminal
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();
    let only_own = filter::filter_fn(|meta| is_own_target(meta.target()));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_own)
}

/// Level directives for every service crate, e.g. `api=debug`.
pub fn level_directives(level: Level) -> Vec<Directive> {
    TARGET_PREFIXES
        .iter()
        .filter_map(|p| Directive::from_str(&format!("{p}={}", level.as_str().to_lowercase())).ok())
        .collect()
}

/// `EnvFilter` from `RUST_LOG`; when unset, `default` with `level` applied
/// to the service crates.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        level_directives(level)
            .into_iter()
            .fold(EnvFilter::new(default), |f, d| f.add_directive(d))
    })
}
