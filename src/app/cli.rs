use std::future::Future;

use super::error::AppError;

/// Reusable CLI application runner that handles:
/// - Signal handling (SIGINT, SIGTERM, SIGHUP)
/// - Stdout buffering
/// - Exit codes (0 = success, 1 = error, 130 = SIGINT, 143 = SIGTERM)
pub struct CliApp {
    name: String,
}

impl CliApp {
    /// Create a new CLI application runner
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Run the application with signal handling.
    ///
    /// Creates a buffered stdout writer and passes it to the main function.
    /// This function never returns; it calls std::process::exit with the
    /// appropriate code.
    pub async fn run<F, Fut>(self, main_fn: F) -> !
    where
        F: FnOnce(tokio::io::BufWriter<tokio::io::Stdout>) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let writer = tokio::io::BufWriter::new(tokio::io::stdout());

        let signal_fut = self.wait_for_signal();

        tokio::select! {
            result = main_fn(writer) => {
                match result {
                    Ok(()) => std::process::exit(0),
                    Err(e) => {
                        eprintln!("{}: {}", self.name, e);
                        std::process::exit(1);
                    }
                }
            }
            signal_code = signal_fut => {
                std::process::exit(signal_code);
            }
        }
    }

    /// Wait for a Unix signal (SIGINT, SIGTERM, SIGHUP) or Ctrl+C.
    /// Returns the exit code to use (128 + signal number).
    async fn wait_for_signal(&self) -> i32 {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
            let mut sighup = signal(SignalKind::hangup()).expect("Failed to setup SIGHUP handler");

            tokio::select! {
                _ = sigterm.recv() => 143,
                _ = sigint.recv() => 130,
                _ = sighup.recv() => 129,
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to setup Ctrl+C handler");
            130
        }
    }
}
