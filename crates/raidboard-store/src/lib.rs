//! # raidboard-store
//!
//! Flat-file persistence for the sign-up board.
//!
//! Two record files back the whole system: an accounts file
//! (`name,passwordHash`) and an events file. Both are UTF-8 CSV with a
//! header row; every save is an atomic full-file rewrite. The
//! [`RecordStore`] is the raw load/save layer; the repository types own the
//! read-modify-write cycle so no caller can overwrite the files with a
//! partial collection.

pub mod codec;
pub mod repository;
pub mod store;

mod error;

pub use error::{Result, StoreError};
pub use repository::{AccountRepository, EventRepository};
pub use store::RecordStore;
