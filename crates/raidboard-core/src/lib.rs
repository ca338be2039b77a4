//! # raidboard-core
//!
//! Domain model for the raid sign-up board: activity and difficulty
//! enumerations, the [`Event`] roster state machine (primary slots plus a
//! backup waitlist), time-derived Active/Concluded classification, and the
//! password digest used by account records.
//!
//! This crate performs no I/O. Persistence lives in `raidboard-store` and
//! the HTTP surface in `raidboard-server`.

pub mod password;
pub mod roster;
pub mod types;

mod error;

pub use error::{AccountError, RosterError};
pub use roster::Slot;
pub use types::{ActivityKind, Difficulty, Event, Phase, MAX_BACKUPS, MAX_PRIMARY};
