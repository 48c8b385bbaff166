#[cfg(test)]
#[path = "snapshots_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::Result;
use chrono::Local;
use chrono::SecondsFormat;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::PersistedState;
use crate::domain::models::Snapshot;

/// Keeps the persisted part of the assistant between runs.
pub struct Snapshots {
    pub state_dir: path::PathBuf,
}

impl Default for Snapshots {
    fn default() -> Snapshots {
        let configured = Config::get(ConfigKey::StateDir);
        if !configured.is_empty() {
            return Snapshots::new(path::PathBuf::from(configured));
        }

        let state_dir = dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("deckhand");

        return Snapshots::new(state_dir);
    }
}

impl Snapshots {
    pub fn new(state_dir: path::PathBuf) -> Snapshots {
        return Snapshots { state_dir };
    }

    pub fn path(&self) -> path::PathBuf {
        return self.state_dir.join("state.yaml");
    }

    pub async fn load(&self) -> Result<Option<PersistedState>> {
        let file_path = self.path();
        if !file_path.exists() {
            return Ok(None);
        }

        let payload = fs::read_to_string(file_path).await?;
        let snapshot: Snapshot = serde_yaml::from_str(&payload)?;

        return Ok(Some(snapshot.state));
    }

    pub async fn save(&self, state: &PersistedState) -> Result<()> {
        let snapshot = Snapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            state: state.clone(),
        };

        let payload = serde_yaml::to_string(&snapshot)?;

        if !self.state_dir.exists() {
            fs::create_dir_all(&self.state_dir).await?;
        }

        let mut file = fs::File::create(self.path()).await?;
        file.write_all(payload.as_bytes()).await?;
        file.flush().await?;

        return Ok(());
    }

    pub async fn clear(&self) -> Result<()> {
        let file_path = self.path();
        if !file_path.exists() {
            return Ok(());
        }

        fs::remove_file(file_path).await?;
        return Ok(());
    }
}
