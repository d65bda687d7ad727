use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Initial board density: how much territory each player starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Density {
    Sparse,
    Medium,
    Dense,
}

/// Parameters of a single game, fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of players (2-6).
    pub num_players: u8,
    /// The board is `size` x `size` cells.
    pub size: u32,
    /// Initial territory density.
    pub density: Density,
}

pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 6;
pub const MIN_SIZE: u32 = 4;

impl GameConfig {
    pub fn new(num_players: u8, size: u32, density: Density) -> Self {
        Self {
            num_players,
            size,
            density,
        }
    }

    /// Rejects configurations that are out of range or that cannot seed
    /// every player without overlap. The infeasible combinations are the
    /// small-board/high-density corners where the seeding values in
    /// `overrun-core` outnumber the placeable cells.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_players < MIN_PLAYERS || self.num_players > MAX_PLAYERS {
            return Err(ConfigError::PlayerCount {
                num_players: self.num_players,
            });
        }
        if self.size < MIN_SIZE {
            return Err(ConfigError::BoardSize { size: self.size });
        }

        let crowded = match self.density {
            Density::Sparse => false,
            Density::Medium | Density::Dense => {
                (self.size == 5 && self.num_players >= 5)
                    || (self.size == 4 && self.num_players >= 3)
            }
        };
        if crowded || (self.size == 4 && self.num_players == 6) {
            return Err(ConfigError::Infeasible {
                num_players: self.num_players,
                size: self.size,
                density: self.density,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("player count {num_players} is outside {MIN_PLAYERS}-{MAX_PLAYERS}")]
    PlayerCount { num_players: u8 },
    #[error("board size {size} is below the minimum of {MIN_SIZE}")]
    BoardSize { size: u32 },
    #[error("a {size}x{size} board cannot seed {num_players} players at {density:?} density")]
    Infeasible {
        num_players: u8,
        size: u32,
        density: Density,
    },
}
