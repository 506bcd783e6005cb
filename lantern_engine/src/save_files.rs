//! Save-game serialization.
//!
//! A save file is the full [`GameState`] in self-describing JSON, wrapped
//! in a versioned envelope. State maps are ordered, so serializing the
//! same state twice produces identical bytes.

use crate::LANTERN_VERSION;
use crate::state::GameState;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

pub const SAVE_DIR: &str = "saved_games";

static ACTIVE_SAVE_DIR: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| RwLock::new(PathBuf::from(SAVE_DIR)));

/// The directory save slots are read from and written to.
pub fn active_save_dir() -> PathBuf {
    ACTIVE_SAVE_DIR
        .read()
        .map(|guard| guard.clone())
        .unwrap_or_else(|_| PathBuf::from(SAVE_DIR))
}

/// Point save operations at a different directory (tests, CLI flags).
pub fn set_active_save_dir(path: PathBuf) {
    if let Ok(mut guard) = ACTIVE_SAVE_DIR.write() {
        *guard = path;
    }
}

/// The per-user save directory, when a platform data dir exists.
pub fn default_save_dir() -> PathBuf {
    dirs::data_dir()
        .map_or_else(|| PathBuf::from(SAVE_DIR), |data| data.join("lantern").join(SAVE_DIR))
}

/// Versioned wrapper so old saves are diagnosable instead of mysterious.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: String,
    pub state: GameState,
}

/// Normalize a user-provided slot name into a filesystem-safe slug.
pub fn sanitize_slug(raw: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else if (ch == '-' || ch == '_') && !slug.is_empty() {
            slug.push(ch);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    let trimmed = slug.trim_matches(&['-', '_'][..]);
    if trimmed.is_empty() { "save".to_string() } else { trimmed.to_string() }
}

fn slot_path(slot: &str) -> PathBuf {
    active_save_dir().join(format!("{}.json", sanitize_slug(slot)))
}

/// Write the state to the named slot.
pub fn save_state(state: &GameState, slot: &str) -> Result<PathBuf> {
    let dir = active_save_dir();
    fs::create_dir_all(&dir).with_context(|| format!("creating save directory {}", dir.display()))?;
    let envelope = SaveEnvelope {
        version: LANTERN_VERSION.to_string(),
        state: state.clone(),
    };
    let path = slot_path(slot);
    let json = serde_json::to_string_pretty(&envelope).context("serializing game state")?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    info!("game saved to {}", path.display());
    Ok(path)
}

/// Load a state back from the named slot.
pub fn load_state(slot: &str) -> Result<GameState> {
    let path = slot_path(slot);
    load_state_from(&path)
}

/// Load a state from an explicit file path.
pub fn load_state_from(path: &Path) -> Result<GameState> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let envelope: SaveEnvelope =
        serde_json::from_str(&json).with_context(|| format!("parsing save file {}", path.display()))?;
    if envelope.version != LANTERN_VERSION {
        warn!(
            "save file {} was written by version {} (current {LANTERN_VERSION})",
            path.display(),
            envelope.version
        );
    }
    Ok(envelope.state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_slug_flattens_odd_input() {
        assert_eq!(sanitize_slug("My Save!"), "my-save");
        assert_eq!(sanitize_slug("  trail  "), "trail");
        assert_eq!(sanitize_slug("___"), "save");
        assert_eq!(sanitize_slug(""), "save");
        assert_eq!(sanitize_slug("slot_2"), "slot_2");
    }

    #[test]
    fn envelope_round_trips() {
        let envelope = SaveEnvelope {
            version: LANTERN_VERSION.to_string(),
            state: GameState::new_empty(),
        };
        let json = serde_json::to_string(&envelope).unwrap();
        let back: SaveEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version, LANTERN_VERSION);
        assert!(back.state.items.is_empty());
    }
}
