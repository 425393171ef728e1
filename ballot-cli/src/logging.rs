use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber: human-readable output on stderr filtered
/// by `RUST_LOG`, plus an append-only audit log at `<log_dir>/ballot.log`
/// when `log_dir` is given.
///
/// The returned guard flushes the file writer and must outlive the program.
pub fn init_tracing(log_dir: Option<&Path>) -> std::io::Result<Option<WorkerGuard>> {
    let (audit_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::never(dir, "ballot.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(EnvFilter::new("info"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,ballot_cli=info".into()),
        );

    tracing_subscriber::registry()
        .with(audit_layer)
        .with(stderr_layer)
        .init();

    Ok(guard)
}
