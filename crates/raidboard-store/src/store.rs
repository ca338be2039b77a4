//! The record store: raw load/save of the two record collections.
//!
//! Both files are rewritten in full on every save, atomically (write to a
//! sibling temp file, then rename). A missing file loads as an empty
//! collection; a malformed row is a hard error so callers never operate on a
//! partially parsed collection.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use raidboard_core::{ActivityKind, Difficulty, Event};

use crate::codec::{decode_records, encode_record, Record};
use crate::error::{Result, StoreError};

/// Accounts file columns.
const ACCOUNTS_HEADER: [&str; 2] = ["name", "passwordHash"];

/// Events file columns.
const EVENTS_HEADER: [&str; 8] = [
    "kind",
    "name",
    "scheduledAt",
    "difficulty",
    "notes",
    "primaryParticipants",
    "backupParticipants",
    "creator",
];

/// Timestamp form written to the events file.
const SCHEDULED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Durable mapping between the record collections and two CSV files.
#[derive(Debug, Clone)]
pub struct RecordStore {
    accounts_path: PathBuf,
    events_path: PathBuf,
}

impl RecordStore {
    /// Create a store over explicit file paths. Parent directories are
    /// created lazily on first save.
    pub fn new(accounts_path: PathBuf, events_path: PathBuf) -> Self {
        Self {
            accounts_path,
            events_path,
        }
    }

    pub fn accounts_path(&self) -> &Path {
        &self.accounts_path
    }

    pub fn events_path(&self) -> &Path {
        &self.events_path
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Load the account map (`name -> passwordHash`).
    ///
    /// A missing file yields an empty map; malformed rows are fatal.
    pub fn load_accounts(&self) -> Result<BTreeMap<String, String>> {
        let Some(rows) = self.read_rows(&self.accounts_path, &ACCOUNTS_HEADER)? else {
            return Ok(BTreeMap::new());
        };

        let mut accounts = BTreeMap::new();
        for row in rows {
            let [name, hash] = self.expect_fields::<2>(&self.accounts_path, row)?;
            accounts.insert(name, hash);
        }
        Ok(accounts)
    }

    /// Overwrite the accounts file with the full given map.
    pub fn save_accounts(&self, accounts: &BTreeMap<String, String>) -> Result<()> {
        let mut lines = vec![encode_record(&ACCOUNTS_HEADER)];
        for (name, hash) in accounts {
            lines.push(encode_record(&[name, hash]));
        }
        self.write_atomic(&self.accounts_path, &lines)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Load the full event collection, preserving file order.
    pub fn load_events(&self) -> Result<Vec<Event>> {
        let Some(rows) = self.read_rows(&self.events_path, &EVENTS_HEADER)? else {
            return Ok(Vec::new());
        };

        let mut events = Vec::new();
        for row in rows {
            let line = row.line;
            let [kind, name, scheduled_at, difficulty, notes, primary, backups, creator] =
                self.expect_fields::<8>(&self.events_path, row)?;

            let kind = ActivityKind::from_label(&kind).ok_or_else(|| {
                self.malformed(&self.events_path, line, format!("unknown kind '{kind}'"))
            })?;
            let difficulty = Difficulty::from_label(&difficulty).ok_or_else(|| {
                self.malformed(
                    &self.events_path,
                    line,
                    format!("unknown difficulty '{difficulty}'"),
                )
            })?;
            let scheduled_at = parse_scheduled_at(&scheduled_at).map_err(|reason| {
                self.malformed(&self.events_path, line, reason)
            })?;

            events.push(Event {
                kind,
                name,
                scheduled_at,
                difficulty,
                notes,
                primary: decode_roster(&primary),
                backups: decode_roster(&backups),
                creator,
            });
        }
        Ok(events)
    }

    /// Overwrite the events file with **exactly** the given sequence.
    ///
    /// Callers are responsible for passing the full desired collection; the
    /// repository layer is the only mutation path in the server and always
    /// does. Saving a subset here truncates the file to that subset.
    pub fn save_events(&self, events: &[Event]) -> Result<()> {
        let mut lines = vec![encode_record(&EVENTS_HEADER)];
        for event in events {
            let scheduled_at = event.scheduled_at.format(SCHEDULED_AT_FORMAT).to_string();
            let primary = event.primary.join(";");
            let backups = event.backups.join(";");
            lines.push(encode_record(&[
                event.kind.label(),
                &event.name,
                &scheduled_at,
                event.difficulty.label(),
                &event.notes,
                &primary,
                &backups,
                &event.creator,
            ]));
        }
        self.write_atomic(&self.events_path, &lines)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Read and decode a record file, verifying the header row.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    fn read_rows(&self, path: &Path, header: &[&str]) -> Result<Option<Vec<Record>>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut records = decode_records(&content)
            .map_err(|e| self.malformed(path, e.line, e.reason))?
            .into_iter();

        match records.next() {
            Some(first) if first.fields == header => {}
            Some(first) => {
                return Err(self.malformed(
                    path,
                    first.line,
                    format!("unexpected header {:?}", first.fields),
                ));
            }
            // An empty file is treated like a missing one.
            None => return Ok(None),
        }

        Ok(Some(records.collect()))
    }

    /// Require an exact field count, consuming the record.
    fn expect_fields<const N: usize>(&self, path: &Path, row: Record) -> Result<[String; N]> {
        let line = row.line;
        let count = row.fields.len();
        row.fields.try_into().map_err(|_| {
            self.malformed(path, line, format!("expected {N} fields, found {count}"))
        })
    }

    fn malformed(&self, path: &Path, line: usize, reason: impl Into<String>) -> StoreError {
        StoreError::MalformedRecord {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }

    /// Write all lines to a sibling temp file, then rename over the target.
    fn write_atomic(&self, path: &Path, lines: &[String]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut content = String::new();
        for line in lines {
            content.push_str(line);
            content.push_str("\r\n");
        }

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, content.as_bytes())?;
        std::fs::rename(&tmp, path)?;

        tracing::debug!(path = %path.display(), records = lines.len() - 1, "rewrote record file");
        Ok(())
    }
}

/// Parse the stored ISO-8601 timestamp, with or without fractional seconds.
fn parse_scheduled_at(text: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| format!("bad scheduledAt '{text}': {e}"))
}

/// Decode a `;`-joined roster; the empty string is an empty roster.
fn decode_roster(text: &str) -> Vec<String> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split(';').map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use raidboard_core::{ActivityKind, Difficulty};

    fn store_in(dir: &Path) -> RecordStore {
        RecordStore::new(dir.join("users.csv"), dir.join("raids.csv"))
    }

    fn sample_event(name: &str) -> Event {
        let mut event = Event::new(
            ActivityKind::DeepStoneCrypt,
            name,
            NaiveDate::from_ymd_opt(2025, 7, 1)
                .unwrap()
                .and_hms_opt(21, 30, 0)
                .unwrap(),
            Difficulty::Master,
            "red rover\nno heavy ammo",
            "alice",
        );
        event.primary = vec!["alice".into(), "bob".into()];
        event.backups = vec!["carol".into()];
        event
    }

    #[test]
    fn missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        assert!(store.load_accounts().unwrap().is_empty());
        assert!(store.load_events().unwrap().is_empty());
    }

    #[test]
    fn accounts_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let mut accounts = BTreeMap::new();
        accounts.insert("alice".to_string(), "digest-a".to_string());
        accounts.insert("bob".to_string(), "digest-b".to_string());

        store.save_accounts(&accounts).unwrap();
        assert_eq!(store.load_accounts().unwrap(), accounts);
    }

    #[test]
    fn events_round_trip_preserves_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let event = sample_event("dsc friday");

        store.save_events(&[event.clone()]).unwrap();
        let loaded = store.load_events().unwrap();
        assert_eq!(loaded, vec![event]);
    }

    #[test]
    fn save_load_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store
            .save_events(&[sample_event("one"), sample_event("two, with comma")])
            .unwrap();

        let first = std::fs::read(store.events_path()).unwrap();
        let reloaded = store.load_events().unwrap();
        store.save_events(&reloaded).unwrap();
        let second = std::fs::read(store.events_path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_rosters_encode_as_empty_strings() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let mut event = sample_event("fresh");
        event.primary.clear();
        event.backups.clear();

        store.save_events(&[event]).unwrap();
        let loaded = store.load_events().unwrap();
        assert!(loaded[0].primary.is_empty());
        assert!(loaded[0].backups.is_empty());
    }

    #[test]
    fn malformed_event_row_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let content = "kind,name,scheduledAt,difficulty,notes,primaryParticipants,backupParticipants,creator\r\n\
                       Deep Stone Crypt,ok,2025-07-01T21:30:00,Master,,,,alice\r\n\
                       Not A Raid,bad,2025-07-01T21:30:00,Master,,,,alice\r\n";
        std::fs::write(store.events_path(), content).unwrap();

        match store.load_events() {
            Err(StoreError::MalformedRecord { line, reason, .. }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("unknown kind"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn bad_timestamp_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let content = "kind,name,scheduledAt,difficulty,notes,primaryParticipants,backupParticipants,creator\r\n\
                       Last Wish,w,yesterday,Normal,,,,alice\r\n";
        std::fs::write(store.events_path(), content).unwrap();

        assert!(matches!(
            store.load_events(),
            Err(StoreError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn wrong_header_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(store.accounts_path(), "user,pass\r\n").unwrap();

        assert!(matches!(
            store.load_accounts(),
            Err(StoreError::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn fractional_seconds_accepted_then_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let content = "kind,name,scheduledAt,difficulty,notes,primaryParticipants,backupParticipants,creator\r\n\
                       Last Wish,w,2025-07-01T21:30:00.123456,Normal,,,,alice\r\n";
        std::fs::write(store.events_path(), content).unwrap();

        let events = store.load_events().unwrap();
        store.save_events(&events).unwrap();
        let rewritten = std::fs::read_to_string(store.events_path()).unwrap();
        assert!(rewritten.contains("2025-07-01T21:30:00,"));
    }
}
