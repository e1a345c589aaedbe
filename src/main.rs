use std::sync::Arc;

use teller::prelude::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let input_file = match parse_args(std::env::args().collect()) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    CliApp::new("teller")
        .run(|stdout| run_replay(stdout, input_file))
        .await
}

/// Parse and validate command-line arguments
fn parse_args(args: Vec<String>) -> Result<String, AppError> {
    if args.len() != 2 {
        return Err(AppError::InvalidArguments(
            "Usage: teller <commands.csv>".to_string(),
        ));
    }
    Ok(args[1].clone())
}

/// Replay the command file through the engine, then write the account
/// snapshot to stdout
async fn run_replay(
    mut stdout: tokio::io::BufWriter<tokio::io::Stdout>,
    input_file: String,
) -> Result<(), AppError> {
    let commands = CsvCommandStream::<FixedPoint>::from_file(&input_file).await?;

    // Shared storage: the session mutates through the engine, the snapshot
    // reads the same store afterwards.
    let accounts = Arc::new(ConcurrentAccountStore::<FixedPoint>::new());
    let ledger = Arc::new(ConcurrentLedger::<FixedPoint>::new());
    let engine = TransactionEngine::new(
        Arc::clone(&accounts),
        Arc::clone(&ledger),
        LogSink,
        FeatureGate::new(true),
    );

    let mut session = ReplaySession::new(engine, SkipErrors);
    session.process_stream(commands).await;

    write_snapshot(&accounts, &mut stdout).await?;

    Ok(())
}
