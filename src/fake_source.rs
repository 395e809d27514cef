//! Offline record source replaying canned outcomes per player, for dry runs
//! and tests.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::features::{FEATURE_COUNT, ScrapedRecord};
use crate::players::PlayerEntry;
use crate::source::RecordSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReplayOutcome {
    /// `[kdr, dpr, kpr, apr, headshot_fraction, rating]`
    Record { values: [f64; FEATURE_COUNT + 1] },
    Unavailable,
    Error { message: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayFile {
    #[serde(default)]
    pub players: HashMap<String, ReplayOutcome>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeRecordSource {
    outcomes: HashMap<String, ReplayOutcome>,
    requests: Vec<String>,
}

impl FakeRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("read replay {}", path.display()))?;
        let file = serde_json::from_str::<ReplayFile>(&raw)
            .with_context(|| format!("parse replay {}", path.display()))?;
        Ok(Self {
            outcomes: file.players,
            requests: Vec::new(),
        })
    }

    pub fn with_record(mut self, player: &str, values: [f64; FEATURE_COUNT + 1]) -> Self {
        self.outcomes
            .insert(player.to_string(), ReplayOutcome::Record { values });
        self
    }

    pub fn with_unavailable(mut self, player: &str) -> Self {
        self.outcomes
            .insert(player.to_string(), ReplayOutcome::Unavailable);
        self
    }

    pub fn with_error(mut self, player: &str, message: &str) -> Self {
        self.outcomes.insert(
            player.to_string(),
            ReplayOutcome::Error {
                message: message.to_string(),
            },
        );
        self
    }

    /// Player names in the order they were requested.
    pub fn requests(&self) -> &[String] {
        &self.requests
    }
}

impl RecordSource for FakeRecordSource {
    fn fetch(&mut self, player: &PlayerEntry) -> Result<Option<ScrapedRecord>> {
        self.requests.push(player.name.clone());
        match self.outcomes.get(&player.name) {
            Some(ReplayOutcome::Record { values }) => Ok(Some(ScrapedRecord::from_row(*values))),
            Some(ReplayOutcome::Error { message }) => Err(anyhow!("{message}")),
            Some(ReplayOutcome::Unavailable) | None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_file_parses_tagged_outcomes() {
        let raw = r#"{
            "players": {
                "a": { "status": "record", "values": [1.1, 80.0, 0.7, 0.1, 0.45, 1.05] },
                "b": { "status": "unavailable" },
                "c": { "status": "error", "message": "boom" }
            }
        }"#;
        let file = serde_json::from_str::<ReplayFile>(raw).unwrap();
        assert_eq!(file.players.len(), 3);
        assert_eq!(file.players["b"], ReplayOutcome::Unavailable);
        assert!(matches!(
            file.players["a"],
            ReplayOutcome::Record { values } if values[5] == 1.05
        ));
    }
}
