//! One networked participant's side of a game.
//!
//! The transport is external: inbound channel events are fed to
//! [`GameSession::handle_event`], and everything the session wants sent
//! is queued on an outbox the embedder drains. The session keeps the
//! local board in lockstep with every peer by total-ordering moves
//! (`MoveSequencer`) and recovering dropped notifications via gap-fill.

pub mod sequencer;
pub mod session;
pub mod store;

pub use sequencer::MoveSequencer;
pub use session::{GameSession, SessionError, SessionNotice, COMPUTER_WINNER};
pub use store::{GameRecordStore, MemoryStore, StoreError};
