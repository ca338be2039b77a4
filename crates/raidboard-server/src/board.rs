//! The roster engine service: event creation, join/leave, the two-step
//! cancellation workflow, and the Active/Concluded overview.
//!
//! Every mutation goes through the event repository, which persists the full
//! collection immediately. Pending cancellations are keyed per event name,
//! not held in a single global slot, so two creators can be mid-cancellation
//! on different events at the same time.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use raidboard_core::{ActivityKind, Difficulty, Event, RosterError, Slot};
use raidboard_store::EventRepository;

use crate::error::ServerError;

/// A cancellation awaiting the creator's confirmation.
#[derive(Debug, Clone)]
struct PendingCancel {
    requested_by: String,
    requested_at: DateTime<Utc>,
}

/// Drives all event-roster operations.
#[derive(Clone)]
pub struct BoardService {
    events: EventRepository,
    /// Pending cancellations, keyed by lower-cased event name.
    pending_cancels: Arc<RwLock<HashMap<String, PendingCancel>>>,
}

impl BoardService {
    pub fn new(events: EventRepository) -> Self {
        Self {
            events,
            pending_cancels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new event with empty rosters and persist the collection.
    pub async fn create_event(
        &self,
        kind: ActivityKind,
        name: &str,
        scheduled_at: NaiveDateTime,
        difficulty: Difficulty,
        notes: &str,
        creator: &str,
    ) -> Result<Event, ServerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::InvalidName.into());
        }
        if creator.trim().is_empty() {
            return Err(RosterError::NotAuthenticated.into());
        }

        let event = Event::new(kind, name, scheduled_at, difficulty, notes.trim(), creator);
        self.events.create(event.clone()).await?;

        info!(name = %event.name, kind = %event.kind, creator = %event.creator, "Event created");
        Ok(event)
    }

    /// Sign an account up for an event, primary slots first.
    pub async fn join(&self, event_name: &str, account: &str) -> Result<Slot, ServerError> {
        let account = account.to_string();
        let slot = self
            .events
            .update(event_name, move |e| e.join(&account))
            .await?;

        debug!(event = %event_name, ?slot, "Participant joined");
        Ok(slot)
    }

    /// Remove an account from whichever roster holds it.
    pub async fn leave(&self, event_name: &str, account: &str) -> Result<Slot, ServerError> {
        let account = account.to_string();
        let slot = self
            .events
            .update(event_name, move |e| e.leave(&account))
            .await?;

        debug!(event = %event_name, ?slot, "Participant left");
        Ok(slot)
    }

    /// Step one of cancellation: record that the creator wants the event
    /// gone. Nothing is removed until [`confirm_cancel`](Self::confirm_cancel).
    pub async fn request_cancel(
        &self,
        event_name: &str,
        requester: &str,
    ) -> Result<(), ServerError> {
        let event = self.events.find(event_name).await?;
        if event.creator != requester {
            return Err(RosterError::NotCreator.into());
        }

        let mut pending = self.pending_cancels.write().await;
        pending.insert(
            event.name.to_lowercase(),
            PendingCancel {
                requested_by: requester.to_string(),
                requested_at: Utc::now(),
            },
        );

        info!(event = %event.name, requester = %requester, "Cancellation requested");
        Ok(())
    }

    /// Step two: remove the event and persist the remaining collection.
    pub async fn confirm_cancel(
        &self,
        event_name: &str,
        requester: &str,
    ) -> Result<(), ServerError> {
        let key = event_name.to_lowercase();

        {
            let pending = self.pending_cancels.read().await;
            match pending.get(&key) {
                None => return Err(ServerError::NoPendingCancellation(event_name.to_string())),
                Some(p) if p.requested_by != requester => {
                    return Err(RosterError::NotCreator.into());
                }
                Some(_) => {}
            }
        }

        // Re-check against the current collection; the event may have been
        // removed or renamed since the request.
        let event = self.events.find(event_name).await?;
        if event.creator != requester {
            return Err(RosterError::NotCreator.into());
        }

        let removed = self.events.remove(&event.name).await?;
        self.pending_cancels.write().await.remove(&key);

        if !removed {
            return Err(ServerError::EventNotFound(event_name.to_string()));
        }

        info!(event = %event.name, requester = %requester, "Event cancelled");
        Ok(())
    }

    /// Abort a pending cancellation; the event stays.
    pub async fn decline_cancel(
        &self,
        event_name: &str,
        requester: &str,
    ) -> Result<(), ServerError> {
        let key = event_name.to_lowercase();
        let mut pending = self.pending_cancels.write().await;

        match pending.get(&key) {
            None => Err(ServerError::NoPendingCancellation(event_name.to_string())),
            Some(p) if p.requested_by != requester => Err(RosterError::NotCreator.into()),
            Some(_) => {
                pending.remove(&key);
                debug!(event = %event_name, "Cancellation declined");
                Ok(())
            }
        }
    }

    /// Whether a cancellation is pending for the given event.
    pub async fn cancel_pending(&self, event_name: &str) -> bool {
        let pending = self.pending_cancels.read().await;
        pending.contains_key(&event_name.to_lowercase())
    }

    /// Load all events, split into (active, concluded) with display order.
    pub async fn overview(&self, now: NaiveDateTime) -> Result<(Vec<Event>, Vec<Event>), ServerError> {
        let events = self.events.list().await?;
        Ok(raidboard_core::roster::partition_by_phase(events, now))
    }

    /// Drop pending cancellations older than `max_age`; confirmation dialogs
    /// abandoned in a browser should not pin state forever.
    pub async fn purge_stale_cancellations(&self, max_age: Duration) {
        let cutoff = Utc::now() - max_age;
        let mut pending = self.pending_cancels.write().await;
        let before = pending.len();
        pending.retain(|_, p| p.requested_at > cutoff);
        let removed = before - pending.len();
        if removed > 0 {
            debug!(removed, "Purged stale pending cancellations");
        }
    }
}
