mod color;
mod config;
mod event;
mod ids;
mod record;
mod snapshot;
pub mod wire;

pub use crate::color::*;
pub use crate::config::*;
pub use crate::event::*;
pub use crate::ids::*;
pub use crate::record::*;
pub use crate::snapshot::*;
pub use crate::wire::{snapshot_hash, WireError};
