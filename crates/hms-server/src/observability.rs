//! Tracing setup: one fmt layer behind a reloadable `EnvFilter`.

use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

static FILTER: OnceLock<FilterHandle> = OnceLock::new();

/// Crates whose events follow the configured level.
const HMS_TARGETS: [&str; 3] = ["hms_auth", "hms_auth_postgres", "hms_server"];

/// Builds the filter for a configured level.
///
/// Workspace crates and HTTP access logs use `level`, everything else stays
/// at `warn` or quieter. sqlx statement logging is capped at `warn` below `trace`.
pub fn filter_for(level: &str) -> EnvFilter {
    let level = level.trim().to_ascii_lowercase();
    let base = if matches!(level.as_str(), "off" | "error") {
        level.as_str()
    } else {
        "warn"
    };
    let mut directives = vec![format!("{base},tower_http={level}")];
    directives.extend(HMS_TARGETS.iter().map(|target| format!("{target}={level}")));
    if matches!(level.as_str(), "debug" | "info") {
        directives.push("sqlx=warn".to_string());
    }
    EnvFilter::new(directives.join(","))
}

/// Installs the global subscriber at `info`. `RUST_LOG`, when set and valid,
/// replaces the workspace filter entirely.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for("info"));
    let (filter, handle) = reload::Layer::new(filter);
    if FILTER.set(handle).is_err() {
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Switches to the configured `logging.level`. Ignored while `RUST_LOG` is set.
pub fn apply_logging_level(level: &str) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    let Some(handle) = FILTER.get() else {
        return;
    };
    if let Err(e) = handle.reload(filter_for(level)) {
        eprintln!("Warning: failed to apply logging level {level}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_covers_workspace_crates() {
        let rendered = filter_for("DEBUG").to_string().to_ascii_lowercase();
        for target in HMS_TARGETS {
            assert!(rendered.contains(&format!("{target}=debug")), "{rendered}");
        }
        assert!(rendered.contains("tower_http=debug"));
        assert!(rendered.contains("sqlx=warn"));
    }

    #[test]
    fn test_trace_keeps_sqlx_statements() {
        let rendered = filter_for("trace").to_string().to_ascii_lowercase();
        assert!(!rendered.contains("sqlx=warn"));
    }
}
