//! Frame loop systems

pub mod simulation;

pub use simulation::{SimulationResult, SimulationSystem};
