use serde::{Deserialize, Serialize};

use crate::GameConfig;

/// A human participant as known to the remote store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: String,
    pub name: String,
}

/// Lifecycle of a stored game record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Created and invitations sent; waiting for every player to accept.
    Created,
    /// All players accepted and the board was dealt.
    Playing,
    /// A winner was reported.
    Finished,
}

/// The remote store's view of one game: configuration, participants and
/// outcome. This is what `create_record` persists and `fetch_record`
/// returns; the board itself never goes through the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub config: GameConfig,
    /// Human participants, creator included.
    pub players: Vec<PlayerRef>,
    pub creator: PlayerRef,
    pub status: RecordStatus,
    /// Winner's display name, or the literal `"computer"` when a
    /// computer-controlled player won.
    pub winner: Option<String>,
}

impl GameRecord {
    pub fn new(config: GameConfig, players: Vec<PlayerRef>, creator: PlayerRef) -> Self {
        Self {
            config,
            players,
            creator,
            status: RecordStatus::Created,
            winner: None,
        }
    }
}
