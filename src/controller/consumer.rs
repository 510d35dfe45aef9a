//! Downstream seam of a pipeline stage
//!
//! A [`Consumer`] is called while the stage holds its state lock, so implementations
//! must return quickly and must never block. Both implementations provided here are
//! non-blocking: closures run inline and unbounded channels never wait for capacity.

use crate::controller::action::Event;
use tokio::sync::mpsc;
use tracing::warn;

/// Receives the events a stage forwards to the next stage
pub trait Consumer: Send + Sync + 'static {
    fn consume(&self, event: &Event);
}

impl<F> Consumer for F
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    fn consume(&self, event: &Event) {
        self(event)
    }
}

impl Consumer for mpsc::UnboundedSender<Event> {
    fn consume(&self, event: &Event) {
        if let Err(e) = self.send(*event) {
            warn!("Downstream receiver dropped, discarding event {}", e.0);
        }
    }
}
