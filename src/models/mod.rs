//! Data models for the goalkeeper manager.
//!
//! Field names follow the database columns, which is also the JSON shape the
//! dashboard consumes.

mod goleiro;
mod partida;

pub use goleiro::*;
pub use partida::*;
