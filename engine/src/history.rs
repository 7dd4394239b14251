//! Append-only roll log persisted as a pretty-printed JSON array.
//!
//! Every mutation rewrites the whole file. Reads never fail: a missing,
//! empty or undecodable file is an empty log, and write failures are logged
//! and dropped so a roll is always reported.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notation::RollSpec;
use crate::roller::RollOutcome;

/// Environment variable that overrides the history file location.
pub const HISTORY_ENV_VAR: &str = "DICE_ROLLER_HISTORY";
/// File name used under the home directory when nothing else is configured.
pub const DEFAULT_HISTORY_FILE: &str = ".dice_roller_history.json";
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("history file {path} is not a valid roll log: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("history entry could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One persisted roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Local time the roll was recorded.
    pub timestamp: NaiveDateTime,
    pub command: String,
    pub count: u32,
    pub sides: u32,
    pub modifier: i64,
    pub individual_rolls: Vec<u32>,
    pub total: i64,
}

impl HistoryEntry {
    pub fn from_outcome(outcome: &RollOutcome, timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            command: outcome.command.clone(),
            count: outcome.spec.count(),
            sides: outcome.spec.sides(),
            modifier: outcome.spec.modifier(),
            individual_rolls: outcome.rolls.clone(),
            total: outcome.total,
        }
    }

    /// Rebuild the outcome this entry was recorded from.
    ///
    /// Returns `None` if the stored dice no longer form a valid spec
    /// (e.g. a hand-edited file with zero sides).
    pub fn outcome(&self) -> Option<RollOutcome> {
        let spec = RollSpec::new(self.count, self.sides, self.modifier).ok()?;
        Some(RollOutcome {
            spec,
            rolls: self.individual_rolls.clone(),
            total: self.total,
            command: self.command.clone(),
        })
    }
}

/// How much of the log `recent` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLimit {
    /// The last `n` entries, oldest first. `Last(0)` is an empty window,
    /// not the whole log.
    Last(usize),
    All,
}

impl Default for HistoryLimit {
    fn default() -> Self {
        HistoryLimit::Last(DEFAULT_HISTORY_LIMIT)
    }
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Use exactly `path` for storage.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the storage location: explicit override, then
    /// `DICE_ROLLER_HISTORY`, then `~/.dice_roller_history.json`.
    pub fn resolve(override_path: Option<PathBuf>) -> Self {
        let env_path = env::var_os(HISTORY_ENV_VAR).map(PathBuf::from);
        Self::at(resolve_path(override_path, env_path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `outcome` stamped with the current local time.
    pub fn append(&self, outcome: &RollOutcome) {
        let entry = HistoryEntry::from_outcome(outcome, Local::now().naive_local());
        self.append_entry(entry);
    }

    pub fn append_entry(&self, entry: HistoryEntry) {
        let mut entries = self.load();
        entries.push(entry);
        self.store(&entries);
    }

    /// The tail of the log in chronological order.
    pub fn recent(&self, limit: HistoryLimit) -> Vec<HistoryEntry> {
        let mut entries = self.load();
        if let HistoryLimit::Last(n) = limit {
            let skip = entries.len().saturating_sub(n);
            entries = entries.split_off(skip);
        }
        entries
    }

    pub fn clear(&self) {
        self.store(&[]);
    }

    /// Read the whole log; any failure yields an empty log.
    pub fn load(&self) -> Vec<HistoryEntry> {
        match self.try_load() {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(%err, "discarding unreadable roll history");
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no history file yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(HistoryError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let text = decode_text(&bytes);
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<HistoryEntry> =
            serde_json::from_str(&text).map_err(|source| HistoryError::Decode {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), entries = entries.len(), "loaded history");
        Ok(entries)
    }

    fn store(&self, entries: &[HistoryEntry]) {
        if let Err(err) = self.try_store(entries) {
            tracing::warn!(%err, "roll history not saved");
        }
    }

    fn try_store(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json).map_err(|source| HistoryError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), entries = entries.len(), "saved history");
        Ok(())
    }
}

fn resolve_path(override_path: Option<PathBuf>, env_path: Option<PathBuf>) -> PathBuf {
    override_path
        .or(env_path.filter(|p| !p.as_os_str().is_empty()))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_default()
                .join(DEFAULT_HISTORY_FILE)
        })
}

/// Decode file bytes, honouring a UTF-8/UTF-16 byte-order mark.
fn decode_text(bytes: &[u8]) -> String {
    if let Some((enc, bom_len)) = Encoding::for_bom(bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        cow.into_owned()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
