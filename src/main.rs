//! Decision wizard binary entry point.
//!
//! Runs the console on stdin/stdout. All logs go to stderr so they never
//! interleave with the wizard's output.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::sync::Arc;

use deecide::config::{build_interpreter, Config};
use deecide::console::Console;
use deecide::decision::DecisionSession;
use deecide::driver::SessionDriver;
use deecide::metrics::InterpreterMetrics;

/// Install the stderr subscriber. `LOG_FORMAT=json` switches to one JSON
/// object per event.
#[cfg_attr(coverage_nightly, coverage(off))]
fn init_logging() {
    let filter = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .parse()
        .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        provider = %config.provider,
        model = %config.model,
        timeout_ms = config.request_timeout_ms,
        "Configuration loaded"
    );

    let interpreter = match build_interpreter(&config) {
        Ok(interpreter) => interpreter,
        Err(e) => {
            tracing::error!("Backend error: {e}");
            std::process::exit(1);
        }
    };

    let session = DecisionSession::new().with_timings(config.timings());
    let driver = SessionDriver::new(session, interpreter, Arc::new(InterpreterMetrics::new()));
    let mut console = Console::new(driver);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    tokio::select! {
        result = console.run(stdin, &mut stdout) => {
            if let Err(e) = result {
                tracing::error!("Console error: {e}");
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
        }
    }

    tracing::info!(
        calls = console.driver().metrics().total_calls(),
        "deecide shutdown complete"
    );
}
