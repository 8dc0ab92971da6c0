use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use marquee_core::config::{AppConfig, LoggingConfig};

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
///
/// The returned guard flushes the log file and must live until exit.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("marquee=info"));

    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file, guard) = if config.file {
        let dir = AppConfig::data_dir().join("logs");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(&dir, "marquee.log");
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer().with_writer(writer).with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!("log directory {} unavailable: {e}", dir.display());
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .init();

    guard
}
