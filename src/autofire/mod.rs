//! Autofire stage of the input pipeline
//!
//! Sits between an input source and the next [`Consumer`](crate::controller::Consumer):
//!
//! 1. [`synchronized`] - Exclusive executor guarding all mutable stage state
//! 2. [`button_state`] - Per-button press / autofire state machine
//! 3. [`autofirer`] - The stage itself: event path, ticker loop and lifecycle
//!
//! # Architecture
//!
//! ```text
//! Input ──► AutoFirer::consume ──┬──► interval == 0 ──► Consumer (direct)
//!                                └──► interval  > 0 ──► armed
//!                                                        │
//!            ticker loop ──► every tick ──► due toggles ─┴──► Consumer (synthetic)
//! ```

pub mod autofirer;
pub mod button_state;
pub mod error;
pub mod synchronized;

pub use autofirer::{AutoFirer, AutoFirerSettings};
pub use button_state::ButtonState;
pub use error::AutoFireError;
pub use synchronized::Synchronized;
