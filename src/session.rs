// Explicit session objects for the networked clients. They replace any
// process-wide "current user" and are handed to the shells by reference.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

/// File in the home directory that remembers the fleet player id.
pub const FLEET_PLAYER_FILE: &str = ".fleetc_player";

/// A logged-in `colonyc` user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColonySession {
    pub user_id: String,
    pub username: String,
}

/// The registered `fleetc` player, optionally remembered on disk so a
/// later run can skip registration.
#[derive(Debug, Default)]
pub struct FleetSession {
    player_id: Option<String>,
    store: Option<PathBuf>,
}

impl FleetSession {
    /// A session that lives only as long as the process.
    pub fn in_memory() -> Self {
        FleetSession::default()
    }

    /// A session backed by a file, reusing any player id already stored
    /// there.
    pub fn with_store(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let player_id = std::fs::read_to_string(&path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        debug!(path = %path.display(), restored = player_id.is_some(), "opened fleet session");
        FleetSession {
            player_id,
            store: Some(path),
        }
    }

    /// Session stored in the user's home directory.
    pub fn from_home() -> Self {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_store(dir.join(FLEET_PLAYER_FILE))
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    /// Remember a new player id, writing it through to the store if any.
    pub fn set_player(&mut self, player_id: &str) -> Result<()> {
        self.player_id = Some(player_id.to_string());
        if let Some(path) = &self.store {
            std::fs::write(path, player_id)
                .with_context(|| format!("Failed to persist player id to {}", path.display()))?;
        }
        Ok(())
    }
}
