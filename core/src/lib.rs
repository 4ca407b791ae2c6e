//! Single-unit grid trading simulation.
//!
//! One unit moves on a small grid, buying and selling at markets whose
//! prices oscillate with simulated time. External drivers call
//! `SimEngine::initialize` and `SimEngine::advance_tick` and read back
//! owned `SimSnapshot`s.

pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod grid;
pub mod market;
pub mod position;
pub mod rng;
pub mod snapshot;
pub mod types;
pub mod unit;

pub use command::Command;
pub use config::{ProductConfig, SimConfig};
pub use engine::SimEngine;
pub use error::{SimError, SimResult};
pub use position::{Direction, Position};
pub use snapshot::SimSnapshot;
