//! Headless self-play harness.
//!
//! Runs computer-vs-computer games and collects metrics for balance
//! smoke-testing; doubles as a deterministic end-to-end exercise of the
//! cascade engine.

use overrun_protocol::{Density, GameConfig, PlayerColor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{boardgen::SetupError, game::Game, player::SeatConfig};

#[derive(Clone, Debug, Error)]
pub enum SelfPlayError {
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// Cannot happen for a finite board; kept so the harness never
    /// panics if the engine regresses.
    #[error("game on seed {seed} did not reach a winner")]
    Unfinished { seed: u64 },
}

/// Configuration for a self-play batch.
#[derive(Clone, Debug)]
pub struct SelfPlayConfig {
    /// Games to play.
    pub games: u32,
    /// Players per game (all computer-controlled).
    pub num_players: u8,
    /// Board edge length.
    pub size: u32,
    /// Initial territory density.
    pub density: Density,
    /// Seed of the first game; game `i` runs on `seed + i`.
    pub seed: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            games: 20,
            num_players: 4,
            size: 6,
            density: Density::Sparse,
            seed: 42,
        }
    }
}

/// Metrics collected from a single game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Seed this game ran on.
    pub seed: u64,
    pub winner: PlayerColor,
    /// Moves resolved from start to victory.
    pub moves_played: u32,
    /// Winner's final territory size and total value.
    pub winner_fields: u32,
    pub winner_value: u32,
}

/// Aggregates across a batch.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub games_played: u32,
    pub avg_game_length: f64,
    /// Wins per palette color, indexed like `PlayerColor::PALETTE`.
    pub wins_by_color: Vec<u32>,
    pub results: Vec<GameMetrics>,
}

/// Plays one all-computer game to completion.
pub fn run_selfplay(config: &SelfPlayConfig, seed: u64) -> Result<GameMetrics, SelfPlayError> {
    let game_config = GameConfig::new(config.num_players, config.size, config.density);
    let seats: Vec<SeatConfig> = (0..config.num_players)
        .map(|_| SeatConfig::computer())
        .collect();

    let mut game = Game::new_local(game_config, &seats, seed)?;
    // Every seat is a computer on the authoritative instance, so this
    // single call plays the game to its end.
    let applied = game.start();

    let winner = game.winner().ok_or(SelfPlayError::Unfinished { seed })?;

    Ok(GameMetrics {
        seed,
        winner: winner.color,
        moves_played: applied.len() as u32,
        winner_fields: winner.field_count() as u32,
        winner_value: winner.total_value,
    })
}

/// Plays `config.games` games on consecutive seeds.
pub fn run_batch_selfplay(config: &SelfPlayConfig) -> Result<BatchMetrics, SelfPlayError> {
    let mut results = Vec::with_capacity(config.games as usize);
    for i in 0..config.games {
        results.push(run_selfplay(config, config.seed + u64::from(i))?);
    }

    let mut wins_by_color = vec![0u32; PlayerColor::PALETTE.len()];
    let mut total_moves = 0u64;
    for metrics in &results {
        let index = PlayerColor::PALETTE
            .iter()
            .position(|c| *c == metrics.winner)
            .unwrap_or(0);
        wins_by_color[index] += 1;
        total_moves += u64::from(metrics.moves_played);
    }

    Ok(BatchMetrics {
        games_played: config.games,
        avg_game_length: if results.is_empty() {
            0.0
        } else {
            total_moves as f64 / results.len() as f64
        },
        wins_by_color,
        results,
    })
}
