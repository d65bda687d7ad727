//! The cascade engine and turn lifecycle.
//!
//! A move enters through [`Game::play`] (local input) or [`Game::replay`]
//! (a move decided elsewhere), resolves synchronously to a fixed point,
//! then the turn advances. Computer seats belonging to the authoritative
//! instance act immediately in the same call.

use overrun_protocol::{BoardSnapshot, FieldId, FieldState, GameConfig, PlayerColor};

use crate::{
    board::Board,
    boardgen::{self, SetupError},
    player::{Player, PlayerKind, SeatConfig},
    rng::GameRng,
};

/// Lifecycle phase. `Ended` is terminal: every mutating entry point is
/// inert once the winner is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Running,
    Ended,
}

/// One resolved move, as produced by this instance. `num` is the
/// position in the game's total move order (0 for non-networked games,
/// which never stamp moves).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    pub actor: PlayerColor,
    pub field: FieldId,
    pub num: u32,
}

/// One participant's copy of a running game: the cell arena, the seats,
/// the turn rotation and the move counter.
#[derive(Clone, Debug)]
pub struct Game {
    config: GameConfig,
    board: Board,
    /// Seating order, fixed after the setup shuffle.
    seating: Vec<Player>,
    /// Players still in the rotation, in seating order.
    remaining: Vec<PlayerColor>,
    player_on: Option<PlayerColor>,
    move_num: u32,
    phase: Phase,
    /// Moves are stamped and meant for broadcast only in networked games.
    networked: bool,
    /// True on exactly one participant per networked game: the instance
    /// that decides computer moves and serves as ordering source of
    /// truth. Inferred from "am I the creator", not verified.
    authoritative: bool,
    rng: GameRng,
}

impl Game {
    /// A game played entirely on this machine.
    pub fn new_local(
        config: GameConfig,
        seats: &[SeatConfig],
        seed: u64,
    ) -> Result<Self, SetupError> {
        Self::build(config, seats, seed, false)
    }

    /// The creator's copy of a networked game: it deals the board,
    /// decides computer moves and stamps the move order.
    pub fn new_hosted(
        config: GameConfig,
        seats: &[SeatConfig],
        seed: u64,
    ) -> Result<Self, SetupError> {
        Self::build(config, seats, seed, true)
    }

    fn build(
        config: GameConfig,
        seats: &[SeatConfig],
        seed: u64,
        networked: bool,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        let mut rng = GameRng::seed_from_u64(seed);
        let mut seating = Self::build_players(&config, seats);
        rng.shuffle(&mut seating);

        let mut game = Self {
            board: Board::new(config.size),
            seating,
            remaining: Vec::new(),
            player_on: None,
            move_num: 0,
            phase: Phase::Setup,
            networked,
            authoritative: true,
            rng,
            config,
        };
        game.seed_board()?;
        game.recompute_totals();
        Ok(game)
    }

    /// A non-creator's copy, reconstructed from the board the creator
    /// broadcast. Moves will only ever arrive over the channel, so this
    /// instance is never authoritative.
    pub fn from_snapshot(
        config: GameConfig,
        seats: &[SeatConfig],
        snapshot: &BoardSnapshot,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        let mismatch = |reason: &str| SetupError::SnapshotMismatch {
            size: config.size,
            reason: reason.to_owned(),
        };

        if snapshot.size != config.size {
            return Err(mismatch("board size differs"));
        }
        if snapshot.fields.len() != (config.size * config.size) as usize {
            return Err(mismatch("wrong number of cells"));
        }
        if snapshot.seating.len() != config.num_players as usize {
            return Err(mismatch("wrong number of seats"));
        }

        // Same color/seat pairing the creator used, reordered to the
        // broadcast seating so turn rotation matches everywhere.
        let mut unseated = Self::build_players(&config, seats);
        let mut seating = Vec::with_capacity(unseated.len());
        for color in &snapshot.seating {
            let index = unseated
                .iter()
                .position(|p| p.color == *color)
                .ok_or_else(|| mismatch("seating repeats or omits a color"))?;
            seating.push(unseated.remove(index));
        }

        let mut game = Self {
            board: Board::new(config.size),
            seating,
            remaining: Vec::new(),
            player_on: None,
            move_num: 0,
            phase: Phase::Setup,
            networked: true,
            authoritative: false,
            rng: GameRng::seed_from_u64(0),
            config,
        };
        for state in &snapshot.fields {
            if state.id.index() >= game.board.len() {
                return Err(mismatch("cell id out of range"));
            }
            if let Some(owner) = state.owner {
                if game.seat_index(owner).is_none() {
                    return Err(mismatch("cell owned by an unseated color"));
                }
                game.claim(state.id, owner, state.value);
            }
        }
        game.recompute_totals();
        Ok(game)
    }

    fn build_players(config: &GameConfig, seats: &[SeatConfig]) -> Vec<Player> {
        (0..config.num_players as usize)
            .map(|i| {
                let color = PlayerColor::PALETTE[i];
                match seats.get(i) {
                    Some(seat) => Player::new(
                        color,
                        seat.name.clone().unwrap_or_else(|| color.name().to_owned()),
                        seat.kind,
                    ),
                    None => Player::new(color, color.name().to_owned(), PlayerKind::Computer),
                }
            })
            .collect()
    }

    fn seed_board(&mut self) -> Result<(), SetupError> {
        let values = boardgen::seeding_values(self.config.size, self.config.density);
        let colors: Vec<PlayerColor> = self.seating.iter().map(|p| p.color).collect();
        for color in colors {
            for &value in values {
                let id = boardgen::place_value(&self.board, &mut self.rng, value)?;
                self.claim(id, color, value);
            }
        }
        Ok(())
    }

    /// Begins play: the first seated player is on. On the authoritative
    /// instance an opening computer seat (and any computer seats after
    /// it) moves immediately; the resolved moves are returned for
    /// broadcast.
    pub fn start(&mut self) -> Vec<AppliedMove> {
        if self.phase != Phase::Setup {
            return Vec::new();
        }
        self.phase = Phase::Running;
        self.remaining = self.seating.iter().map(|p| p.color).collect();
        let Some(&first) = self.remaining.first() else {
            return Vec::new();
        };
        self.player_on = Some(first);
        if let Some(player) = self.seat_mut(first) {
            player.is_on = true;
        }
        self.play_computer_turns()
    }

    /// A locally originated move (a click on an owned cell). No-op
    /// unless the cell's owner is the player whose turn it is. Returns
    /// every move this call resolved: the click itself plus any computer
    /// turns it triggered, in order.
    pub fn play(&mut self, field: FieldId) -> Vec<AppliedMove> {
        let Some(mv) = self.apply(field) else {
            return Vec::new();
        };
        let mut applied = vec![mv];
        self.next_player();
        applied.extend(self.play_computer_turns());
        applied
    }

    /// A move decided by another participant, delivered in order by the
    /// sync layer. Returns the applied move and any locally originated
    /// computer turns that followed it (which the caller must
    /// broadcast), or `None` if the move did not pass the turn
    /// precondition.
    pub fn replay(&mut self, field: FieldId) -> Option<(AppliedMove, Vec<AppliedMove>)> {
        let mv = self.apply(field)?;
        self.next_player();
        let follow_on = self.play_computer_turns();
        Some((mv, follow_on))
    }

    /// Steps 1-5 of move resolution: precondition, consume the turn,
    /// cascade to a fixed point, refresh totals, stamp the counter.
    fn apply(&mut self, field: FieldId) -> Option<AppliedMove> {
        if self.phase != Phase::Running {
            return None;
        }
        let actor = self.board.get(field).and_then(|f| f.owner)?;
        let on = self.seat(actor).map(|p| p.is_on).unwrap_or(false);
        if !on {
            // Stale or duplicate trigger; defended against, not an error.
            return None;
        }

        if let Some(player) = self.seat_mut(actor) {
            player.is_on = false;
        }
        self.increment_and_resolve(field);
        self.recompute_totals();
        if self.networked {
            self.move_num += 1;
        }
        Some(AppliedMove {
            actor,
            field,
            num: self.move_num,
        })
    }

    fn increment_and_resolve(&mut self, id: FieldId) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(field) = self.board.get_mut(id) else {
            return;
        };
        field.value += 1;
        if field.value > field.neighbor_count() {
            self.overflow(id);
        }
    }

    /// The capture step: the overflowing cell resets to 1 and its owner
    /// takes every neighbor, each at its existing value, then each
    /// neighbor is incremented in turn. Depth-first in the fixed
    /// neighbor order; the visiting order decides who ends up owning
    /// contested cells, so it must not change.
    fn overflow(&mut self, id: FieldId) {
        let (mover, neighbors) = {
            let Some(field) = self.board.get_mut(id) else {
                return;
            };
            field.value = 1;
            let Some(mover) = field.owner else {
                return;
            };
            (mover, field.neighbors().to_vec())
        };

        for neighbor in neighbors {
            if self.phase != Phase::Running {
                // Victory was reached mid-cascade; the board is final.
                return;
            }
            let Some(cell) = self.board.get(neighbor) else {
                continue;
            };
            if cell.owner != Some(mover) {
                let value = cell.value;
                if let Some(previous) = self.claim(neighbor, mover, value) {
                    self.check_elimination(previous);
                }
            }
            self.increment_and_resolve(neighbor);
        }
    }

    /// Unconditionally reassigns a cell: detaches it from the previous
    /// owner's field set, attaches it to the new owner's, sets the
    /// value. Returns the previous owner. The single write path for the
    /// cell's `owner` cache; callers are responsible for invariants.
    pub fn claim(&mut self, id: FieldId, owner: PlayerColor, value: u32) -> Option<PlayerColor> {
        let previous = {
            let Some(field) = self.board.get_mut(id) else {
                return None;
            };
            let previous = field.owner;
            field.owner = Some(owner);
            field.value = value;
            previous
        };

        if previous != Some(owner) {
            if let Some(color) = previous {
                if let Some(player) = self.seat_mut(color) {
                    player.fields.retain(|f| *f != id);
                }
            }
            if let Some(player) = self.seat_mut(owner) {
                player.fields.push(id);
            }
        }
        previous
    }

    /// A player whose territory empties leaves the rotation the moment
    /// it happens; the last player standing ends the game.
    fn check_elimination(&mut self, color: PlayerColor) {
        let empty = self.seat(color).map(|p| p.fields.is_empty()).unwrap_or(false);
        if !empty {
            return;
        }
        self.remaining.retain(|c| *c != color);
        if self.remaining.len() == 1 && self.phase == Phase::Running {
            self.phase = Phase::Ended;
        }
    }

    /// Circular advance through the players still in the rotation. The
    /// modulo is taken against the rotation's current length, which
    /// shrinks with eliminations.
    fn next_player(&mut self) {
        if self.phase != Phase::Running || self.remaining.is_empty() {
            return;
        }
        let index = self
            .player_on
            .and_then(|c| self.remaining.iter().position(|r| *r == c));
        let next = match index {
            Some(i) => self.remaining[(i + 1) % self.remaining.len()],
            None => self.remaining[0],
        };
        self.player_on = Some(next);
        if let Some(player) = self.seat_mut(next) {
            player.is_on = true;
        }
    }

    /// Computer seats act as soon as they come on, synchronously, but
    /// only on the authoritative instance; everyone else waits for the
    /// moves to arrive over the channel. A loop rather than recursion so
    /// an all-computer endgame cannot grow the stack.
    fn play_computer_turns(&mut self) -> Vec<AppliedMove> {
        let mut applied = Vec::new();
        while self.phase == Phase::Running && self.authoritative {
            let Some(color) = self.player_on else {
                break;
            };
            let computer = self
                .seat(color)
                .map(|p| p.kind == PlayerKind::Computer)
                .unwrap_or(false);
            if !computer {
                break;
            }
            let Some(field) = self.random_move() else {
                break;
            };
            let Some(mv) = self.apply(field) else {
                break;
            };
            applied.push(mv);
            self.next_player();
        }
        applied
    }

    /// A uniformly random cell of the player on turn.
    pub fn random_move(&mut self) -> Option<FieldId> {
        let color = self.player_on?;
        let count = self.seat(color)?.fields.len();
        if count == 0 {
            return None;
        }
        let index = self.rng.gen_range_usize(count);
        self.seat(color).and_then(|p| p.fields.get(index)).copied()
    }

    fn recompute_totals(&mut self) {
        let totals: Vec<u32> = self
            .seating
            .iter()
            .map(|player| {
                player
                    .fields
                    .iter()
                    .filter_map(|id| self.board.get(*id))
                    .map(|f| f.value)
                    .sum()
            })
            .collect();
        for (player, total) in self.seating.iter_mut().zip(totals) {
            player.total_value = total;
        }
    }

    /// The wire form of the whole board, used for the initial broadcast
    /// and for desync checks.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            size: self.config.size,
            seating: self.seating.iter().map(|p| p.color).collect(),
            fields: self
                .board
                .iter()
                .map(|f| FieldState {
                    id: f.id,
                    owner: f.owner,
                    value: f.value,
                })
                .collect(),
        }
    }

    fn seat_index(&self, color: PlayerColor) -> Option<usize> {
        self.seating.iter().position(|p| p.color == color)
    }

    fn seat_mut(&mut self, color: PlayerColor) -> Option<&mut Player> {
        let index = self.seat_index(color)?;
        self.seating.get_mut(index)
    }

    fn seat(&self, color: PlayerColor) -> Option<&Player> {
        self.seating.iter().find(|p| p.color == color)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.seating
    }

    pub fn player(&self, color: PlayerColor) -> Option<&Player> {
        self.seat(color)
    }

    pub fn remaining(&self) -> &[PlayerColor] {
        &self.remaining
    }

    pub fn player_on(&self) -> Option<PlayerColor> {
        self.player_on
    }

    pub fn move_num(&self) -> u32 {
        self.move_num
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    /// The sole remaining player once the game has ended.
    pub fn winner(&self) -> Option<&Player> {
        if self.phase != Phase::Ended {
            return None;
        }
        self.remaining.first().and_then(|c| self.seat(*c))
    }
}
