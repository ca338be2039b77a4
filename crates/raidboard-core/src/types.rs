//! Domain model structs for the sign-up board.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the HTTP layer. The enum types serialize as their canonical
//! display labels, which are also the forms written to the record files.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Maximum number of confirmed (primary) roster slots per event.
pub const MAX_PRIMARY: usize = 6;

/// Maximum number of backup (waitlist) slots per event.
pub const MAX_BACKUPS: usize = 3;

// ---------------------------------------------------------------------------
// ActivityKind
// ---------------------------------------------------------------------------

/// The fixed set of supported raid activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActivityKind {
    SalvationsEdge,
    DeepStoneCrypt,
    VaultOfGlass,
    GardenOfSalvation,
    KingsFall,
    RootOfNightmares,
    VowOfTheDisciple,
    CrotasEnd,
    LastWish,
}

impl ActivityKind {
    /// All kinds, in the order they are offered on the creation form.
    pub const ALL: [ActivityKind; 9] = [
        ActivityKind::SalvationsEdge,
        ActivityKind::DeepStoneCrypt,
        ActivityKind::VaultOfGlass,
        ActivityKind::GardenOfSalvation,
        ActivityKind::KingsFall,
        ActivityKind::RootOfNightmares,
        ActivityKind::VowOfTheDisciple,
        ActivityKind::CrotasEnd,
        ActivityKind::LastWish,
    ];

    /// Canonical display label, also used in the events record file.
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::SalvationsEdge => "Salvation's Edge",
            ActivityKind::DeepStoneCrypt => "Deep Stone Crypt",
            ActivityKind::VaultOfGlass => "Vault of Glass",
            ActivityKind::GardenOfSalvation => "Garden of Salvation",
            ActivityKind::KingsFall => "King's Fall",
            ActivityKind::RootOfNightmares => "Root of Nightmares",
            ActivityKind::VowOfTheDisciple => "Vow of the Disciple",
            ActivityKind::CrotasEnd => "Crota's End",
            ActivityKind::LastWish => "Last Wish",
        }
    }

    /// Parse a canonical label back into a kind.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.label() == label)
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for ActivityKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value).ok_or_else(|| format!("unknown activity kind: {value:?}"))
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        kind.label().to_string()
    }
}

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Event difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Difficulty {
    Normal,
    Master,
}

impl Difficulty {
    /// Canonical display label, also used in the events record file.
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Normal => "Normal",
            Difficulty::Master => "Master",
        }
    }

    /// Parse a canonical label back into a difficulty.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Normal" => Some(Difficulty::Normal),
            "Master" => Some(Difficulty::Master),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value).ok_or_else(|| format!("unknown difficulty: {value:?}"))
    }
}

impl From<Difficulty> for String {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.label().to_string()
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A scheduled group activity with a capacity-limited roster.
///
/// `name` is unique among all known events (case-insensitive at creation
/// time). The rosters hold account names; an account appears in at most one
/// of the two, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Which raid this event runs.
    pub kind: ActivityKind,
    /// Unique event name chosen by the creator.
    pub name: String,
    /// Scheduled start, stored as a local date + time.
    pub scheduled_at: NaiveDateTime,
    /// Difficulty the group will attempt.
    pub difficulty: Difficulty,
    /// Free-form objectives / challenges, one per line.
    pub notes: String,
    /// Confirmed roster slots, in join order. At most [`MAX_PRIMARY`].
    pub primary: Vec<String>,
    /// Waitlist slots, in join order. At most [`MAX_BACKUPS`].
    pub backups: Vec<String>,
    /// Account name of the event's originator.
    pub creator: String,
}

impl Event {
    /// Build a fresh event with empty rosters.
    pub fn new(
        kind: ActivityKind,
        name: impl Into<String>,
        scheduled_at: NaiveDateTime,
        difficulty: Difficulty,
        notes: impl Into<String>,
        creator: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            scheduled_at,
            difficulty,
            notes: notes.into(),
            primary: Vec::new(),
            backups: Vec::new(),
            creator: creator.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Derived classification of an event relative to the current time.
///
/// Never stored; recomputed from `scheduled_at` on every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Scheduled start is in the future or less than one hour past.
    Active,
    /// More than one hour has elapsed since the scheduled start.
    Concluded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_round_trip() {
        for kind in ActivityKind::ALL {
            assert_eq!(ActivityKind::from_label(kind.label()), Some(kind));
        }
    }

    #[test]
    fn unknown_kind_label_rejected() {
        assert_eq!(ActivityKind::from_label("Leviathan"), None);
    }

    #[test]
    fn difficulty_labels_round_trip() {
        for d in [Difficulty::Normal, Difficulty::Master] {
            assert_eq!(Difficulty::from_label(d.label()), Some(d));
        }
        assert_eq!(Difficulty::from_label("Legend"), None);
    }

    #[test]
    fn kind_serializes_as_label() {
        let json = serde_json::to_string(&ActivityKind::KingsFall).unwrap();
        assert_eq!(json, "\"King's Fall\"");

        let back: ActivityKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ActivityKind::KingsFall);
    }
}
