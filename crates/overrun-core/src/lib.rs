mod board;
mod boardgen;
mod game;
mod player;
mod rng;
pub mod selfplay;

pub use crate::board::*;
pub use crate::boardgen::{seeding_values, SetupError, MAX_PLACEMENT_ATTEMPTS};
pub use crate::game::*;
pub use crate::player::*;
pub use crate::rng::*;
pub use crate::selfplay::{
    run_batch_selfplay, run_selfplay, BatchMetrics, GameMetrics, SelfPlayConfig, SelfPlayError,
};
