//! One participant's networked game session.
//!
//! Wires the engine to the channel: inbound events come through
//! [`GameSession::handle_event`], local clicks through
//! [`GameSession::click`], and everything to be sent is queued on an
//! outbox. The creator's session is the authoritative one: it deals the
//! board, decides computer moves, serves gap-fill requests and reports
//! the result to the record store.

use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, info, warn};

use overrun_core::{AppliedMove, Game, Phase, PlayerKind, SeatConfig, SetupError};
use overrun_protocol::{
    BoardSnapshot, FieldId, GameId, GameRecord, InboundEvent, Move, OutboundEvent, PlayerRef,
};

use crate::{
    sequencer::MoveSequencer,
    store::{GameRecordStore, StoreError},
};

/// Winner name reported when a computer-controlled player wins.
pub const COMPUTER_WINNER: &str = "computer";

/// Lifecycle notifications surfaced to the embedding layer; the session
/// itself has no UI.
#[derive(Clone, Debug)]
pub enum SessionNotice {
    /// Another invitation arrived for this game (informational).
    Invited { record: GameRecord },
    /// An invited player declined; the game will not start.
    Declined { player: String },
    /// The creator withdrew the invitation.
    Revoked,
    /// The board was dealt and play began.
    Started,
    /// The game ended; `winner` is the reported display name.
    Ended { winner: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Setup(#[from] SetupError),
}

pub struct GameSession<S> {
    id: GameId,
    record: GameRecord,
    username: String,
    /// True on the creator's instance only. Inferred from "am I the
    /// creator" rather than verified against a trusted source; a
    /// misbehaving peer claiming the role is not detected here.
    authoritative: bool,
    seed: u64,
    game: Option<Game>,
    sequencer: MoveSequencer,
    /// Every move of the game in sequence order; the authoritative copy
    /// answers gap-fill requests from it.
    log: Vec<Move>,
    outbox: VecDeque<OutboundEvent>,
    notices: VecDeque<SessionNotice>,
    store: S,
    reported: bool,
}

impl<S: GameRecordStore> GameSession<S> {
    /// Creates a game: persists its record, takes the authoritative
    /// role and joins the room. Fails only if the store cannot create
    /// the record, since without an id there is no game to play.
    pub fn create(
        record: GameRecord,
        username: impl Into<String>,
        mut store: S,
        seed: u64,
    ) -> Result<Self, SessionError> {
        record.config.validate().map_err(SetupError::from)?;
        let id = store.create_record(&record)?;
        info!(game = %id, "created game record");

        let mut session = Self::with_role(id, record, username.into(), true, store, seed);
        session.join_room();
        Ok(session)
    }

    /// Joins a game this participant was invited to.
    pub fn join(
        id: GameId,
        record: GameRecord,
        username: impl Into<String>,
        store: S,
    ) -> Self {
        let username = username.into();
        // The creator role is inferred, not verified.
        let authoritative = record.creator.name == username;
        let mut session = Self::with_role(id, record, username, authoritative, store, 0);
        session.join_room();
        session
    }

    /// Rejoins a pending game by fetching its record from the store.
    pub fn rejoin(
        id: GameId,
        username: impl Into<String>,
        mut store: S,
    ) -> Result<Self, SessionError> {
        let record = store.fetch_record(&id)?;
        Ok(Self::join(id, record, username, store))
    }

    fn with_role(
        id: GameId,
        record: GameRecord,
        username: String,
        authoritative: bool,
        store: S,
        seed: u64,
    ) -> Self {
        Self {
            id,
            record,
            username,
            authoritative,
            seed,
            game: None,
            sequencer: MoveSequencer::new(),
            log: Vec::new(),
            outbox: VecDeque::new(),
            notices: VecDeque::new(),
            store,
            reported: false,
        }
    }

    /// Feeds one channel event into the session.
    pub fn handle_event(&mut self, event: InboundEvent) {
        if event.game() != &self.id {
            debug!(event = event.name(), "event for another game, ignoring");
            return;
        }
        match event {
            InboundEvent::Invitation { record, .. } => {
                self.notices.push_back(SessionNotice::Invited { record });
            }
            InboundEvent::GameDeclined { player, .. } => {
                self.notices.push_back(SessionNotice::Declined { player });
            }
            InboundEvent::InvitationRevoked { .. } => {
                self.notices.push_back(SessionNotice::Revoked);
            }
            InboundEvent::Ready { .. } => self.on_ready(),
            InboundEvent::SetGame { board, .. } => self.on_set_game(&board),
            InboundEvent::Move { mv, .. } => {
                self.sequencer.offer(mv);
                self.drain();
            }
            InboundEvent::RequestMissingMoves { from, .. } => self.on_missing_requested(from),
            InboundEvent::SendMissingMoves { moves, .. } => {
                self.sequencer.offer_all(moves);
                self.drain();
            }
        }
    }

    /// A local click on an owned cell. Returns false when the move was
    /// refused (not this player's turn) or no board exists yet.
    pub fn click(&mut self, field: FieldId) -> bool {
        let applied = match self.game.as_mut() {
            Some(game) => game.play(field),
            None => Vec::new(),
        };
        if applied.is_empty() {
            return false;
        }
        self.broadcast(applied);
        self.check_end();
        true
    }

    /// Re-announces presence after a transport reconnect and asks for
    /// anything missed while away.
    pub fn reconnect(&mut self) {
        self.join_room();
        let from = self.sequencer.next_expected();
        self.outbox.push_back(OutboundEvent::RequestMissingMoves {
            game: self.id.clone(),
            from,
        });
    }

    /// Every invited player accepted: the creator deals the board,
    /// broadcasts it and begins play.
    fn on_ready(&mut self) {
        if !self.authoritative || self.game.is_some() {
            return;
        }
        let seats = self.seats();
        let mut game = match Game::new_hosted(self.record.config, &seats, self.seed) {
            Ok(game) => game,
            Err(err) => {
                warn!(game = %self.id, error = %err, "could not deal the board");
                return;
            }
        };

        self.outbox.push_back(OutboundEvent::Start {
            game: self.id.clone(),
            board: game.snapshot(),
        });
        if let Err(err) = self.store.mark_playing(&self.id) {
            warn!(game = %self.id, error = %err, "could not mark record as playing");
        }

        let applied = game.start();
        self.game = Some(game);
        info!(game = %self.id, "board dealt, game started");
        self.notices.push_back(SessionNotice::Started);
        self.broadcast(applied);
        self.check_end();
    }

    /// The creator's dealt board arrived; adopt it verbatim.
    fn on_set_game(&mut self, board: &BoardSnapshot) {
        if self.authoritative || self.game.is_some() {
            return;
        }
        let seats = self.seats();
        match Game::from_snapshot(self.record.config, &seats, board) {
            Ok(mut game) => {
                game.start();
                self.game = Some(game);
                info!(game = %self.id, "adopted dealt board");
                self.notices.push_back(SessionNotice::Started);
                // Anything buffered before the board arrived can apply now.
                self.drain();
            }
            Err(err) => {
                warn!(game = %self.id, error = %err, "rejected dealt board");
            }
        }
    }

    /// The authoritative copy serves gap-fills from its move log.
    fn on_missing_requested(&mut self, from: u32) {
        if !self.authoritative {
            return;
        }
        let moves: Vec<Move> = self.log.iter().filter(|m| m.num >= from).copied().collect();
        debug!(game = %self.id, from, count = moves.len(), "serving missing moves");
        self.outbox.push_back(OutboundEvent::SendMissingMoves {
            game: self.id.clone(),
            moves,
        });
    }

    /// Applies every released in-sequence move, then reports the first
    /// missing number upstream if newer moves are stranded.
    fn drain(&mut self) {
        if self.game.is_none() {
            return;
        }
        while let Some(mv) = self.sequencer.pop_ready() {
            let outcome = self.game.as_mut().and_then(|game| game.replay(mv.field));
            match outcome {
                Some((applied, follow_on)) => {
                    if applied.num != mv.num {
                        warn!(
                            game = %self.id,
                            received = mv.num,
                            stamped = applied.num,
                            "move counter drift"
                        );
                    }
                    self.log.push(mv);
                    self.broadcast(follow_on);
                }
                None => {
                    // The board will silently diverge from the peer's;
                    // nothing fatal, but worth being loud about.
                    warn!(game = %self.id, num = mv.num, "replayed move was refused");
                    self.log.push(mv);
                }
            }
        }
        if let Some(from) = self.sequencer.gap() {
            debug!(game = %self.id, from, "sequence gap detected");
            self.outbox.push_back(OutboundEvent::RequestMissingMoves {
                game: self.id.clone(),
                from,
            });
        }
        self.check_end();
    }

    /// Records and emits locally originated moves (clicks and
    /// authoritative computer turns).
    fn broadcast(&mut self, applied: Vec<AppliedMove>) {
        for am in applied {
            let mv = Move {
                field: am.field,
                num: am.num,
            };
            self.sequencer.note_local(am.num);
            self.log.push(mv);
            self.outbox.push_back(OutboundEvent::Move {
                game: self.id.clone(),
                mv,
            });
        }
    }

    /// On the authoritative instance the result is reported to the
    /// store, once; a failure is logged and the session carries on.
    fn check_end(&mut self) {
        if self.reported {
            return;
        }
        let winner = match self.game.as_ref() {
            Some(game) if game.phase() == Phase::Ended => match game.winner() {
                Some(player) => {
                    if player.kind == PlayerKind::Computer {
                        COMPUTER_WINNER.to_owned()
                    } else {
                        player.name.clone()
                    }
                }
                None => return,
            },
            _ => return,
        };

        self.reported = true;
        if self.authoritative {
            if let Err(err) = self.store.report_result(&self.id, &winner) {
                warn!(game = %self.id, error = %err, "could not report result");
            }
        }
        info!(game = %self.id, winner = %winner, "game over");
        self.notices.push_back(SessionNotice::Ended { winner });
    }

    fn join_room(&mut self) {
        self.outbox.push_back(OutboundEvent::JoinRoom {
            game: self.id.clone(),
        });
    }

    /// Seats in palette order: the record's human players first (remote
    /// unless they are this participant), computer seats for the rest.
    /// Both sides of a game derive the identical pairing.
    fn seats(&self) -> Vec<SeatConfig> {
        self.record
            .players
            .iter()
            .map(|player: &PlayerRef| {
                if player.name == self.username {
                    SeatConfig::human(player.name.as_str())
                } else {
                    SeatConfig::remote(player.name.as_str())
                }
            })
            .collect()
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn move_log(&self) -> &[Move] {
        &self.log
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Next queued event to send, if any.
    pub fn poll_outbound(&mut self) -> Option<OutboundEvent> {
        self.outbox.pop_front()
    }

    /// Next lifecycle notification for the embedding layer, if any.
    pub fn poll_notice(&mut self) -> Option<SessionNotice> {
        self.notices.pop_front()
    }
}
