//! Turn-based bug tower-defense simulation.
//!
//! The engine is a pure frame stepper: scheduled actions resolve through a
//! fixed phase order (build, move, spawn, shoot, death, damage, life
//! check, rewards, completion, cleanup) and identical inputs always
//! replay to identical outcomes. Drivers feed it parsed input files and
//! render or dump what they like.

pub mod actions;
pub mod board;
pub mod config;
pub mod events;
pub mod game;
pub mod map;
pub mod observe;
pub mod parse;
pub mod systems;
pub mod world;

pub use actions::{Action, ActionKind};
pub use config::Settings;
pub use events::TdEvent;
pub use game::{GameError, GameStatus, TdGame};
pub use map::{BugMap, Cell, MapError, Position};
pub use observe::{build_observation, TdObservation};
pub use parse::ParseError;
pub use world::{Bug, Tower};
