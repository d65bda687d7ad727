use overrun_protocol::{FieldId, PlayerColor};

/// Who controls a seat. Exactly one of these per player; a remote seat
/// is driven entirely by moves arriving over the channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerKind {
    Human,
    Computer,
    Remote,
}

/// One seat at the table. Created at setup, never destroyed: an
/// eliminated player leaves the turn rotation but stays here for
/// end-of-game reporting.
#[derive(Clone, Debug)]
pub struct Player {
    pub color: PlayerColor,
    pub name: String,
    pub kind: PlayerKind,
    /// True while it is this player's turn to act; consumed by the move.
    pub is_on: bool,
    /// The authoritative owned-cell set, in acquisition order.
    pub fields: Vec<FieldId>,
    /// Sum of owned cells' values. Recomputed after any territory
    /// change, never maintained incrementally.
    pub total_value: u32,
}

impl Player {
    pub(crate) fn new(color: PlayerColor, name: String, kind: PlayerKind) -> Self {
        Self {
            color,
            name,
            kind,
            is_on: false,
            fields: Vec::new(),
            total_value: 0,
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn is_eliminated(&self) -> bool {
        self.fields.is_empty()
    }
}

/// How one seat should be filled when a game is created. Seats are
/// paired with palette colors in order; unfilled seats default to
/// computer players named after their color.
#[derive(Clone, Debug)]
pub struct SeatConfig {
    pub name: Option<String>,
    pub kind: PlayerKind,
}

impl SeatConfig {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: PlayerKind::Human,
        }
    }

    pub fn computer() -> Self {
        Self {
            name: None,
            kind: PlayerKind::Computer,
        }
    }

    pub fn remote(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: PlayerKind::Remote,
        }
    }
}
