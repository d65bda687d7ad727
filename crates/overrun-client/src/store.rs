//! The remote game-record store seam.
//!
//! The store keeps who-plays-whom and the outcome; the board itself
//! never goes through it. Sessions treat every call as fire-and-forget:
//! a failure is logged and play continues locally.

use std::collections::HashMap;

use overrun_protocol::{GameId, GameRecord, RecordStatus};
use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("no record for game {0}")]
    NotFound(GameId),
}

pub trait GameRecordStore {
    /// Persists a new record and returns its id.
    fn create_record(&mut self, record: &GameRecord) -> Result<GameId, StoreError>;
    /// Marks a record as playing once the board has been dealt.
    fn mark_playing(&mut self, game: &GameId) -> Result<(), StoreError>;
    /// Reports the winner's display name (or `"computer"`).
    fn report_result(&mut self, game: &GameId, winner: &str) -> Result<(), StoreError>;
    /// Fetches a record, e.g. when rejoining a pending game.
    fn fetch_record(&mut self, game: &GameId) -> Result<GameRecord, StoreError>;
}

/// In-memory store for tests and offline use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, GameRecord>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, game: &GameId) -> Option<&GameRecord> {
        self.records.get(&game.0)
    }
}

impl GameRecordStore for MemoryStore {
    fn create_record(&mut self, record: &GameRecord) -> Result<GameId, StoreError> {
        self.next_id += 1;
        let id = format!("game-{}", self.next_id);
        self.records.insert(id.clone(), record.clone());
        Ok(GameId(id))
    }

    fn mark_playing(&mut self, game: &GameId) -> Result<(), StoreError> {
        let record = self
            .records
            .get_mut(&game.0)
            .ok_or_else(|| StoreError::NotFound(game.clone()))?;
        record.status = RecordStatus::Playing;
        Ok(())
    }

    fn report_result(&mut self, game: &GameId, winner: &str) -> Result<(), StoreError> {
        let record = self
            .records
            .get_mut(&game.0)
            .ok_or_else(|| StoreError::NotFound(game.clone()))?;
        record.status = RecordStatus::Finished;
        record.winner = Some(winner.to_owned());
        Ok(())
    }

    fn fetch_record(&mut self, game: &GameId) -> Result<GameRecord, StoreError> {
        self.records
            .get(&game.0)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(game.clone()))
    }
}
