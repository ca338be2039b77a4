//! The roster/capacity state machine.
//!
//! Placement rule: a joining account takes the next primary slot if any of
//! the six are free, otherwise the next of three backup slots, otherwise the
//! event is full. Leaving removes the account from whichever roster holds it
//! and does **not** promote a backup into the vacated primary slot, matching
//! the board's historical behavior.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::types::{Event, Phase, MAX_BACKUPS, MAX_PRIMARY};

/// How long after the scheduled start an event still counts as active.
pub fn grace_period() -> Duration {
    Duration::hours(1)
}

/// Which roster a join or leave touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Primary,
    Backup,
}

impl Event {
    /// Whether `name` holds a primary or backup slot.
    pub fn is_participant(&self, name: &str) -> bool {
        self.primary.iter().any(|n| n == name) || self.backups.iter().any(|n| n == name)
    }

    /// Sign `name` up, primary slots first.
    pub fn join(&mut self, name: &str) -> Result<Slot, RosterError> {
        if name.trim().is_empty() {
            return Err(RosterError::NotAuthenticated);
        }
        if self.is_participant(name) {
            return Err(RosterError::AlreadyJoined);
        }

        if self.primary.len() < MAX_PRIMARY {
            self.primary.push(name.to_string());
            Ok(Slot::Primary)
        } else if self.backups.len() < MAX_BACKUPS {
            self.backups.push(name.to_string());
            Ok(Slot::Backup)
        } else {
            Err(RosterError::EventFull)
        }
    }

    /// Remove `name` from whichever roster holds it.
    ///
    /// Vacated primary slots stay vacant; backups are not promoted.
    pub fn leave(&mut self, name: &str) -> Result<Slot, RosterError> {
        if let Some(pos) = self.primary.iter().position(|n| n == name) {
            self.primary.remove(pos);
            Ok(Slot::Primary)
        } else if let Some(pos) = self.backups.iter().position(|n| n == name) {
            self.backups.remove(pos);
            Ok(Slot::Backup)
        } else {
            Err(RosterError::NotAParticipant)
        }
    }

    /// Classify this event relative to `now`.
    ///
    /// Active iff `scheduled_at + 1h >= now`; the boundary instant itself is
    /// still active.
    pub fn phase(&self, now: NaiveDateTime) -> Phase {
        if self.scheduled_at + grace_period() >= now {
            Phase::Active
        } else {
            Phase::Concluded
        }
    }
}

/// Partition events into (active, concluded) for display.
///
/// Active events sort ascending by start (soonest first), concluded ones
/// descending (most recent first). Pure; does not touch the rosters.
pub fn partition_by_phase(events: Vec<Event>, now: NaiveDateTime) -> (Vec<Event>, Vec<Event>) {
    let (mut active, mut concluded): (Vec<Event>, Vec<Event>) = events
        .into_iter()
        .partition(|e| e.phase(now) == Phase::Active);

    active.sort_by_key(|e| e.scheduled_at);
    concluded.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));

    (active, concluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityKind, Difficulty};
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 14)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn event() -> Event {
        Event::new(
            ActivityKind::VowOfTheDisciple,
            "Vow",
            at(20),
            Difficulty::Normal,
            "",
            "alice",
        )
    }

    #[test]
    fn join_fills_primary_then_backups() {
        let mut e = event();
        for i in 0..6 {
            assert_eq!(e.join(&format!("p{i}")), Ok(Slot::Primary));
        }
        for i in 0..3 {
            assert_eq!(e.join(&format!("b{i}")), Ok(Slot::Backup));
        }
        assert_eq!(e.primary.len(), 6);
        assert_eq!(e.backups.len(), 3);
        assert_eq!(e.join("late"), Err(RosterError::EventFull));
    }

    #[test]
    fn seventh_joiner_lands_in_backups() {
        let mut e = event();
        for i in 0..7 {
            e.join(&format!("u{i}")).unwrap();
        }
        assert_eq!(e.backups, vec!["u6"]);
    }

    #[test]
    fn double_join_rejected_and_roster_unchanged() {
        let mut e = event();
        e.join("bob").unwrap();
        let before = e.clone();

        assert_eq!(e.join("bob"), Err(RosterError::AlreadyJoined));
        assert_eq!(e, before);
    }

    #[test]
    fn empty_name_cannot_join() {
        let mut e = event();
        assert_eq!(e.join(""), Err(RosterError::NotAuthenticated));
        assert_eq!(e.join("   "), Err(RosterError::NotAuthenticated));
    }

    #[test]
    fn leave_removes_exactly_the_caller() {
        let mut e = event();
        for name in ["ana", "bob", "carol"] {
            e.join(name).unwrap();
        }

        assert_eq!(e.leave("bob"), Ok(Slot::Primary));
        assert_eq!(e.primary, vec!["ana", "carol"]);
        assert_eq!(e.leave("bob"), Err(RosterError::NotAParticipant));
    }

    #[test]
    fn leave_does_not_promote_backups() {
        let mut e = event();
        for i in 0..7 {
            e.join(&format!("u{i}")).unwrap();
        }

        e.leave("u0").unwrap();
        assert_eq!(e.primary.len(), 5);
        assert_eq!(e.backups, vec!["u6"]);
    }

    #[test]
    fn leave_from_backup_slot() {
        let mut e = event();
        for i in 0..7 {
            e.join(&format!("u{i}")).unwrap();
        }
        assert_eq!(e.leave("u6"), Ok(Slot::Backup));
        assert!(e.backups.is_empty());
    }

    #[test]
    fn phase_boundary_is_one_hour_after_start() {
        let e = event(); // starts at 20:00

        // 30 minutes past start: active.
        assert_eq!(e.phase(at(20) + Duration::minutes(30)), Phase::Active);
        // Exactly one hour past start: still active.
        assert_eq!(e.phase(at(21)), Phase::Active);
        // 90 minutes past start: concluded.
        assert_eq!(e.phase(at(20) + Duration::minutes(90)), Phase::Concluded);
    }

    #[test]
    fn partition_sorts_active_ascending_concluded_descending() {
        let mut early = event();
        early.name = "early".into();
        early.scheduled_at = at(9);

        let mut late = event();
        late.name = "late".into();
        late.scheduled_at = at(22);

        let mut old = event();
        old.name = "old".into();
        old.scheduled_at = at(1);

        let mut older = event();
        older.name = "older".into();
        older.scheduled_at = at(0);

        let now = at(12);
        let (active, concluded) = partition_by_phase(vec![late, old, older, early], now);

        let names = |v: &[Event]| v.iter().map(|e| e.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&active), vec!["late"]);
        // "early" at 09:00 is more than an hour past noon.
        assert_eq!(names(&concluded), vec!["early", "old", "older"]);
    }
}
