use std::fs::File;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a log file path.
pub const LOG_PATH_ENV: &str = "TENANT_STATE_LOG";

/// Install the process-wide tracing subscriber.
///
/// The level filter comes from `RUST_LOG`, else `default_filter`. Output
/// goes to a per-process file when `TENANT_STATE_LOG` names a path, and to
/// stderr otherwise. The library never calls this itself; binaries and
/// tests do. Only the first call in a process takes effect.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let log_file = std::env::var(LOG_PATH_ENV).ok().and_then(|base| open_log_file(&base));

    let (file_layer, stderr_layer) = match log_file {
        Some(file) => (
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true),
            ),
            None,
        ),
        None => (
            None,
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339()),
            ),
        ),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
}

/// `{base}.{unix seconds}.{pid}`, so two processes never share a file.
fn open_log_file(base: &str) -> Option<File> {
    let path = unique_log_path(base);
    match File::create(&path) {
        Ok(file) => Some(file),
        Err(error) => {
            eprintln!("tenant-state: cannot create log file {}: {}", path, error);
            None
        }
    }
}

fn unique_log_path(base: &str) -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}.{}.{}", base, secs, std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_carries_pid() {
        let path = unique_log_path("/tmp/state.log");
        assert!(path.starts_with("/tmp/state.log."));
        assert!(path.ends_with(&format!(".{}", std::process::id())));
    }

    #[test]
    fn unwritable_log_path_falls_back() {
        assert!(open_log_file("/nonexistent-dir/for/sure/state.log").is_none());
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_tracing("warn");
        init_tracing("debug");
        tracing::debug!("still alive");
    }
}
