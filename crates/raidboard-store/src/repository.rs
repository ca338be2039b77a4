//! Read-modify-write repositories over the record store.
//!
//! Every mutation reloads the full collection, applies the change, and
//! persists the full result. That keeps the "overwrite the file with exactly
//! the given sequence" contract of [`RecordStore`] out of reach of callers,
//! so a partial collection can never truncate the file.
//!
//! The internal mutex only serializes cycles within one process. Concurrent
//! processes still race at the file-write level and the last writer wins; a
//! known limitation of the flat-file design, left as-is on purpose.

use std::sync::Arc;

use tokio::sync::Mutex;

use raidboard_core::{Event, RosterError};

use crate::error::{Result, StoreError};
use crate::store::RecordStore;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Repository for the event collection.
#[derive(Clone)]
pub struct EventRepository {
    store: Arc<RecordStore>,
    write_lock: Arc<Mutex<()>>,
}

impl EventRepository {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Load the full collection, in file order.
    pub async fn list(&self) -> Result<Vec<Event>> {
        self.store.load_events()
    }

    /// Find one event by name (case-insensitive).
    pub async fn find(&self, name: &str) -> Result<Event> {
        let wanted = name.to_lowercase();
        self.store
            .load_events()?
            .into_iter()
            .find(|e| e.name.to_lowercase() == wanted)
            .ok_or_else(|| StoreError::EventNotFound(name.to_string()))
    }

    /// Append a new event and persist the full collection.
    ///
    /// Rejects a duplicate name (case-insensitive) against the full known
    /// collection, active and concluded alike.
    pub async fn create(&self, event: Event) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut events = self.store.load_events()?;
        let wanted = event.name.to_lowercase();
        if events.iter().any(|e| e.name.to_lowercase() == wanted) {
            return Err(RosterError::DuplicateEventName.into());
        }

        events.push(event);
        self.store.save_events(&events)
    }

    /// Mutate one event in place and persist the full collection.
    ///
    /// The closure's error aborts the cycle without writing anything.
    pub async fn update<T>(
        &self,
        name: &str,
        mutate: impl FnOnce(&mut Event) -> std::result::Result<T, RosterError>,
    ) -> Result<T> {
        let _guard = self.write_lock.lock().await;

        let mut events = self.store.load_events()?;
        let wanted = name.to_lowercase();
        let event = events
            .iter_mut()
            .find(|e| e.name.to_lowercase() == wanted)
            .ok_or_else(|| StoreError::EventNotFound(name.to_string()))?;

        let out = mutate(event)?;
        self.store.save_events(&events)?;
        Ok(out)
    }

    /// Remove one event by name and persist the remainder.
    ///
    /// Returns `false` (without writing) if no event matched.
    pub async fn remove(&self, name: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut events = self.store.load_events()?;
        let wanted = name.to_lowercase();
        let before = events.len();
        events.retain(|e| e.name.to_lowercase() != wanted);

        if events.len() == before {
            return Ok(false);
        }
        self.store.save_events(&events)?;
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Repository for the account map.
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<RecordStore>,
    write_lock: Arc<Mutex<()>>,
}

impl AccountRepository {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Look up a stored password digest by account name (case-sensitive).
    pub async fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.store.load_accounts()?.get(name).cloned())
    }

    /// Insert a new account and persist the full map.
    ///
    /// Returns `false` (without writing) if the name is already taken.
    pub async fn insert(&self, name: &str, password_hash: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut accounts = self.store.load_accounts()?;
        if accounts.contains_key(name) {
            return Ok(false);
        }

        accounts.insert(name.to_string(), password_hash.to_string());
        self.store.save_accounts(&accounts)?;
        Ok(true)
    }
}
