//! Autofire stage for a game controller input pipeline
//!
//! ```text
//! Input Source ──► AutoFirer ──► Consumer
//!  (raw events)    (autofire)    (next stage)
//! ```

pub mod autofire;
pub mod config;
pub mod controller;
