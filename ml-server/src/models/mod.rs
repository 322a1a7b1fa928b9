//! Request and response bodies

pub mod scoring;
pub mod simulation;

pub use scoring::*;
pub use simulation::*;
