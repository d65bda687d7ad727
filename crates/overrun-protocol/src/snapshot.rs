use serde::{Deserialize, Serialize};

use crate::{FieldId, PlayerColor};

/// One cell's owner and value as carried on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub id: FieldId,
    #[serde(default)]
    pub owner: Option<PlayerColor>,
    pub value: u32,
}

/// Full board state broadcast by the game's creator when play begins,
/// and the unit of comparison for desync checks: two participants agree
/// on a game exactly when their snapshots hash identically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Board edge length; `fields` holds `size * size` entries, row-major.
    pub size: u32,
    /// Seating order after the creator's shuffle. Peers must adopt this
    /// order verbatim or turn rotation diverges.
    pub seating: Vec<PlayerColor>,
    pub fields: Vec<FieldState>,
}

/// A single resolved move: which cell was played and its position in the
/// game's total move order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub field: FieldId,
    /// 1-based sequence number assigned by the participant that
    /// originated the move.
    pub num: u32,
}
