use serde::{Deserialize, Serialize};

use crate::{BoardSnapshot, GameId, GameRecord, Move};

/// Events a participant receives from the real-time channel. Delivery is
/// at-least-once and unordered; only `Move` ordering is recovered (by
/// sequence number), everything else is idempotent to reapply.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundEvent {
    /// Invitation to a freshly created game.
    Invitation { game: GameId, record: GameRecord },
    /// An invited player declined; the game will not start.
    GameDeclined { game: GameId, player: String },
    /// The creator withdrew the invitation.
    InvitationRevoked { game: GameId },
    /// Every invited player accepted; the creator may deal the board.
    Ready { game: GameId },
    /// The creator's initial board, received by everyone else.
    SetGame { game: GameId, board: BoardSnapshot },
    /// A move another participant resolved locally.
    Move { game: GameId, mv: Move },
    /// A peer detected a sequence gap and asks for moves it never saw.
    RequestMissingMoves { game: GameId, from: u32 },
    /// Answer to a gap-fill request. The batch may arrive in any order.
    SendMissingMoves { game: GameId, moves: Vec<Move> },
}

/// Events a participant emits into the real-time channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundEvent {
    /// Subscribe to a game's room (first join and every reconnect).
    JoinRoom { game: GameId },
    /// Initial board broadcast by the creator; peers receive it as
    /// `SetGame`.
    Start { game: GameId, board: BoardSnapshot },
    /// A locally resolved move.
    Move { game: GameId, mv: Move },
    /// Ask upstream for the first missing move and everything after it.
    RequestMissingMoves { game: GameId, from: u32 },
    /// Serve a gap-fill request from the local applied-move log.
    SendMissingMoves { game: GameId, moves: Vec<Move> },
}

impl InboundEvent {
    /// Wire-level event name used by named-event transports.
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::Invitation { .. } => "invitation",
            InboundEvent::GameDeclined { .. } => "game declined",
            InboundEvent::InvitationRevoked { .. } => "invitation revoked",
            InboundEvent::Ready { .. } => "ready",
            InboundEvent::SetGame { .. } => "set game",
            InboundEvent::Move { .. } => "move",
            InboundEvent::RequestMissingMoves { .. } => "request missing move",
            InboundEvent::SendMissingMoves { .. } => "send missing moves",
        }
    }

    pub fn game(&self) -> &GameId {
        match self {
            InboundEvent::Invitation { game, .. }
            | InboundEvent::GameDeclined { game, .. }
            | InboundEvent::InvitationRevoked { game }
            | InboundEvent::Ready { game }
            | InboundEvent::SetGame { game, .. }
            | InboundEvent::Move { game, .. }
            | InboundEvent::RequestMissingMoves { game, .. }
            | InboundEvent::SendMissingMoves { game, .. } => game,
        }
    }
}

impl OutboundEvent {
    /// Wire-level event name used by named-event transports.
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::JoinRoom { .. } => "join room",
            OutboundEvent::Start { .. } => "start",
            OutboundEvent::Move { .. } => "move",
            OutboundEvent::RequestMissingMoves { .. } => "request missing move",
            OutboundEvent::SendMissingMoves { .. } => "send missing moves",
        }
    }

    pub fn game(&self) -> &GameId {
        match self {
            OutboundEvent::JoinRoom { game }
            | OutboundEvent::Start { game, .. }
            | OutboundEvent::Move { game, .. }
            | OutboundEvent::RequestMissingMoves { game, .. }
            | OutboundEvent::SendMissingMoves { game, .. } => game,
        }
    }

    /// How a peer sees this event once the channel relays it, or `None`
    /// for events consumed by the channel itself (room management).
    pub fn relayed(&self) -> Option<InboundEvent> {
        match self {
            OutboundEvent::JoinRoom { .. } => None,
            OutboundEvent::Start { game, board } => Some(InboundEvent::SetGame {
                game: game.clone(),
                board: board.clone(),
            }),
            OutboundEvent::Move { game, mv } => Some(InboundEvent::Move {
                game: game.clone(),
                mv: *mv,
            }),
            OutboundEvent::RequestMissingMoves { game, from } => {
                Some(InboundEvent::RequestMissingMoves {
                    game: game.clone(),
                    from: *from,
                })
            }
            OutboundEvent::SendMissingMoves { game, moves } => {
                Some(InboundEvent::SendMissingMoves {
                    game: game.clone(),
                    moves: moves.clone(),
                })
            }
        }
    }
}
