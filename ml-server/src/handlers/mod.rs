//! HTTP handlers

pub mod health;
pub mod scoring;
pub mod simulation;
