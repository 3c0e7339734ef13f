//! Optional file telemetry.
//!
//! The crate logs through `tracing` under `vocalis::*` targets. Hosts that
//! want a persistent record enable this JSON subscriber, which appends to
//! the file named by `VOCALIS_TRACE_LOG` (a temp-dir default otherwise) at
//! the level named by `VOCALIS_TRACE_LEVEL`. Installation happens at most
//! once per process, and a subscriber the host registered first wins.

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<bool> = OnceLock::new();

/// Where trace events are appended.
pub fn trace_log_path() -> PathBuf {
    env::var("VOCALIS_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("vocalis_trace.jsonl"))
}

fn level_from(value: Option<&str>) -> Level {
    match value.map(str::to_ascii_lowercase).as_deref() {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("warn") => Level::WARN,
        Some("error") => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the JSON file subscriber once per process. Returns whether a
/// subscriber from this crate is active: `false` when disabled, when the
/// log file cannot be opened, or when the host already registered one.
pub fn init_tracing(enabled: bool) -> bool {
    if !enabled {
        return false;
    }

    *TRACING_INIT.get_or_init(|| {
        let file = match OpenOptions::new()
            .create(true)
            .append(true)
            .open(trace_log_path())
        {
            Ok(file) => file,
            Err(_) => return false,
        };
        let level = level_from(env::var("VOCALIS_TRACE_LEVEL").ok().as_deref());
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_max_level(level)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    })
}
