//! Turns a player's League of Legends match history into a per-match stats
//! table: one row per match the player took part in, with every column the
//! same length.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod payload;
pub mod pipeline;
pub mod reference;
pub mod riot_api;
pub mod sources;
pub mod table;

pub use aggregate::{MatchStatRow, Outcome, PlayerIdentity};
pub use pipeline::{Diagnostic, MatchTableReport, build_match_table};
pub use table::MatchStatTable;
