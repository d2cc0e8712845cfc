// Pattern bank on disk, plus the autosaved last session.
//
// <project_dir>/.beatgrid/patterns/<slot>.json   one file per saved pattern
// <project_dir>/.beatgrid/session.json           written on quit, restored on start
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::state_dir;
use crate::error::{Error, Result};
use crate::pipeline::pattern::Pattern;

const PATTERNS_DIR: &str = "patterns";
const SESSION_FILE: &str = "session.json";

/// Key-value storage of named patterns. Synchronous; errors go to the user.
pub trait PatternStore {
    fn save(&mut self, slot: &str, pattern: &Pattern) -> Result<()>;
    fn load(&self, slot: &str) -> Result<Pattern>;
    /// Saved slot names, sorted.
    fn list(&self) -> Result<Vec<String>>;
    fn delete(&mut self, slot: &str) -> Result<()>;
}

/// Slot names become file names, so keep them boring.
pub fn validate_slot_name(slot: &str) -> Result<&str> {
    let trimmed = slot.trim();
    let ok = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '));
    if ok {
        Ok(trimmed)
    } else {
        Err(Error::InvalidPatternName(slot.to_string()))
    }
}

fn parse(slot: &str, data: &str) -> Result<Pattern> {
    serde_json::from_str(data).map_err(|e| Error::CorruptPattern {
        slot: slot.to_string(),
        reason: e.to_string(),
    })
}

fn serialize(slot: &str, pattern: &Pattern) -> Result<String> {
    serde_json::to_string_pretty(pattern).map_err(|e| Error::CorruptPattern {
        slot: slot.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Clone, Debug)]
pub struct JsonPatternStore {
    dir: PathBuf,
}

impl JsonPatternStore {
    pub fn new(project_dir: &Path) -> Self {
        Self {
            dir: state_dir(project_dir).join(PATTERNS_DIR),
        }
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf> {
        let slot = validate_slot_name(slot)?;
        Ok(self.dir.join(format!("{}.json", slot)))
    }
}

impl PatternStore for JsonPatternStore {
    fn save(&mut self, slot: &str, pattern: &Pattern) -> Result<()> {
        let path = self.slot_path(slot)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, serialize(slot, pattern)?)?;
        log::info!("saved pattern '{}' to {}", slot.trim(), path.display());
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Pattern> {
        let path = self.slot_path(slot)?;
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(slot.trim().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let pattern = parse(slot, &data)?;
        log::info!("loaded pattern '{}'", slot.trim());
        Ok(pattern)
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut slots = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    slots.push(stem.to_string());
                }
            }
        }
        slots.sort();
        Ok(slots)
    }

    fn delete(&mut self, slot: &str) -> Result<()> {
        let path = self.slot_path(slot)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(slot.trim().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store holding serialized snapshots, same semantics as the JSON one.
#[derive(Clone, Debug, Default)]
pub struct MemoryPatternStore {
    slots: HashMap<String, String>,
}

impl MemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatternStore for MemoryPatternStore {
    fn save(&mut self, slot: &str, pattern: &Pattern) -> Result<()> {
        let slot = validate_slot_name(slot)?;
        let data = serialize(slot, pattern)?;
        self.slots.insert(slot.to_string(), data);
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Pattern> {
        let slot = validate_slot_name(slot)?;
        let data = self
            .slots
            .get(slot)
            .ok_or_else(|| Error::NotFound(slot.to_string()))?;
        parse(slot, data)
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut slots: Vec<String> = self.slots.keys().cloned().collect();
        slots.sort();
        Ok(slots)
    }

    fn delete(&mut self, slot: &str) -> Result<()> {
        let slot = validate_slot_name(slot)?;
        self.slots
            .remove(slot)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(slot.to_string()))
    }
}

// ── last session ─────────────────────────────────────────────────

fn session_file_path(project_dir: &Path) -> PathBuf {
    state_dir(project_dir).join(SESSION_FILE)
}

/// None when there is no previous session or it can't be read.
pub fn load_session(project_dir: &Path) -> Option<Pattern> {
    let path = session_file_path(project_dir);
    let data = std::fs::read_to_string(&path).ok()?;
    match parse(SESSION_FILE, &data) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            log::warn!("ignoring {}: {}", path.display(), e);
            None
        }
    }
}

// Save the session to disk, making the directory if it doesn't exist already
pub fn save_session(project_dir: &Path, pattern: &Pattern) -> Result<()> {
    let path = session_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serialize(SESSION_FILE, pattern)?)?;
    Ok(())
}
