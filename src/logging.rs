use std::path::Path;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "CHRONONOTES_LOG";

/// Send tracing output to a daily rolling file under `<data_dir>/logs`.
///
/// The terminal belongs to the TUI, so nothing is written to stdout or
/// stderr. Calling this twice is harmless; the second call is ignored.
pub fn init(data_dir: &Path) -> std::io::Result<()> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "chrononotes.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(non_blocking)
        .try_init()
        .is_ok();
    if installed {
        let _ = LOG_GUARD.set(guard);
    }
    Ok(())
}
