use std::path::PathBuf;

use raidboard_core::RosterError;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Generic I/O error (reading, writing, or renaming a record file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record file row could not be parsed. Fatal on startup load.
    #[error("Malformed record in {} at line {line}: {reason}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// No event with the given name in the collection.
    #[error("No event named '{0}'")]
    EventNotFound(String),

    /// A domain rule rejected the mutation inside a read-modify-write cycle.
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
