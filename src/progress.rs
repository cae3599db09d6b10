//! Level progress: per-level best records and aggregate stats
//!
//! Persisted through a [`SaveStore`]; the in-memory book stays the source of
//! truth for the session even when a write fails.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::persistence::{self, SaveStore};

/// Best result for one level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecord {
    pub best_score: f32,
    pub best_targets: u32,
    pub best_obstacles: u32,
    pub best_shots: u32,
    pub completed: bool,
    /// Times the level was started
    pub attempts: u32,
}

/// Aggregate for leaderboard submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalStats {
    /// Sum of per-level best scores
    pub total_score: f32,
    /// Levels with a stored best score
    pub levels_completed: u32,
}

/// All saved progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBook {
    levels: BTreeMap<u32, LevelRecord>,
    total_levels_completed: u32,
    device_id: String,
}

impl Default for ProgressBook {
    fn default() -> Self {
        Self::new(random_device_id(&mut rand::rng()))
    }
}

/// Opaque identifier the leaderboard uses to keep one entry per device
pub fn random_device_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("dev-{:016x}", rng.random::<u64>())
}

impl ProgressBook {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            levels: BTreeMap::new(),
            total_levels_completed: 0,
            device_id: device_id.into(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Counter bumped the first time each level is completed
    pub fn total_levels_completed(&self) -> u32 {
        self.total_levels_completed
    }

    pub fn level_data(&self, level: u32) -> Option<&LevelRecord> {
        self.levels.get(&level)
    }

    /// Highest level the player may start (one past the furthest completed)
    pub fn highest_unlocked(&self) -> u32 {
        self.levels
            .iter()
            .filter(|(_, r)| r.completed)
            .map(|(&level, _)| level + 1)
            .max()
            .unwrap_or(1)
    }

    pub fn record_attempt(&mut self, level: u32) {
        self.levels.entry(level).or_default().attempts += 1;
    }

    /// Record a completed level. Best fields change only when `score` beats
    /// the stored best. Returns true if the best improved.
    pub fn update_level(
        &mut self,
        level: u32,
        score: f32,
        targets: u32,
        obstacles: u32,
        shots: u32,
    ) -> bool {
        let record = self.levels.entry(level).or_default();
        let first_completion = !record.completed;
        if first_completion {
            record.completed = true;
            self.total_levels_completed += 1;
        } else if score <= record.best_score {
            return false;
        }
        record.best_score = score;
        record.best_targets = targets;
        record.best_obstacles = obstacles;
        record.best_shots = shots;
        log::info!("level {level}: new best {score:.1}");
        true
    }

    pub fn total_stats(&self) -> TotalStats {
        let completed = self.levels.values().filter(|r| r.completed);
        TotalStats {
            total_score: completed.clone().map(|r| r.best_score).sum(),
            levels_completed: completed.count() as u32,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        persistence::encode(self)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        persistence::decode(json)
    }

    /// Load from a store; a missing save yields a fresh book
    pub fn load(store: &dyn SaveStore) -> Result<Self, PersistenceError> {
        match store.load()? {
            Some(json) => {
                let book = Self::from_json(&json)?;
                log::info!("loaded progress: {} levels", book.levels.len());
                Ok(book)
            }
            None => {
                log::info!("no saved progress, starting fresh");
                Ok(Self::default())
            }
        }
    }

    /// Load, falling back to a fresh book when the save is unreadable
    pub fn load_or_default(store: &dyn SaveStore) -> Self {
        Self::load(store).unwrap_or_else(|e| {
            log::warn!("discarding unreadable progress: {e}");
            Self::default()
        })
    }

    pub fn save(&self, store: &mut dyn SaveStore) -> Result<(), PersistenceError> {
        store.save(&self.to_json()?)
    }
}
