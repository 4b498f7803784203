//! Library desk - headless entry point.
//!
//! Loads configuration, sets up logging, opens the data directory and prints
//! the dashboard overview as JSON. The desktop shell embeds the library crate
//! the same way.

use serde_json::json;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use library_desk::{config::LoggingConfig, AppConfig, Library};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let _guard = init_tracing(&config.logging);

    tracing::info!("Starting Library Desk v{}", env!("CARGO_PKG_VERSION"));

    let library = Library::open(config)?;
    let services = &library.services;

    let report = json!({
        "overview": services.stats.overview(),
        "users": services.stats.user_stats(),
        "books": services.stats.book_stats(),
        "most_borrowed": services.stats.most_borrowed(10),
        "terms": services.loans.terms(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Console logging, plus a daily log file when `logging.file` is set.
/// The returned guard flushes the file writer on drop.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("library_desk={}", logging.level).into());

    let console = if logging.format == "json" {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).json().boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let (file, guard) = match &logging.file {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "library-desk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    guard
}
