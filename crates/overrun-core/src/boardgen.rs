use overrun_protocol::{ConfigError, Density, FieldId};
use thiserror::Error;

use crate::{board::Board, rng::GameRng};

/// Cap on random placement retries per seeded value. An infeasible
/// configuration fails deterministically instead of retrying forever.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

#[derive(Clone, Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not place a starting value of {value} after {attempts} attempts")]
    Infeasible { value: u32, attempts: usize },
    #[error("board snapshot does not describe a {size}x{size} game: {reason}")]
    SnapshotMismatch { size: u32, reason: String },
}

/// Starting values placed for each player, by board size and density.
/// Bigger boards shift every density one step up so that the opening
/// territory stays proportionate.
pub fn seeding_values(size: u32, density: Density) -> &'static [u32] {
    match (size > 7, density) {
        (false, Density::Sparse) => &[2, 1, 1],
        (false, Density::Medium) => &[3, 2, 1, 1],
        (false, Density::Dense) => &[3, 2, 2, 1, 1],
        (true, Density::Sparse) => &[3, 2, 1, 1],
        (true, Density::Medium) => &[3, 2, 2, 1, 1],
        (true, Density::Dense) => &[3, 3, 2, 2, 2, 1, 1, 1],
    }
}

/// Picks a uniformly random cell that is unowned and can hold `value`
/// without sitting on the overflow edge (`value < neighbor count`).
pub(crate) fn place_value(
    board: &Board,
    rng: &mut GameRng,
    value: u32,
) -> Result<FieldId, SetupError> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let index = rng.gen_range_usize(board.len());
        let id = FieldId::new(index as u32);
        let Some(field) = board.get(id) else { continue };
        if field.owner.is_none() && field.neighbor_count() > value {
            return Ok(id);
        }
    }
    Err(SetupError::Infeasible {
        value,
        attempts: MAX_PLACEMENT_ATTEMPTS,
    })
}
