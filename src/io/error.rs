use std::io;
use thiserror::Error;

use crate::storage::StorageError;

/// IO-level errors for CSV parsing and stream processing
#[derive(Error, Debug)]
pub enum IoError {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv_async::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
