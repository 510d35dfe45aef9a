//! Controller input types shared by every pipeline stage
//!
//! ```text
//! Input Source ──► [Stage] ──► Consumer
//!          (Event)        (Event)
//! ```
//!
//! 1. [`action`] - Controls of the controller and the events they produce
//! 2. [`consumer`] - The downstream seam a stage forwards events into

pub mod action;
pub mod consumer;

pub use action::{Action, Event, ParseEventError, NUM_ACTION_BUTTONS};
pub use consumer::Consumer;
