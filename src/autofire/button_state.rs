use crate::controller::{Action, Consumer, Event};
use std::time::Duration;
use tracing::debug;

/// Autofire bookkeeping for one button
///
/// All timestamps are logical clock values: the time elapsed since the owning
/// `AutoFirer` was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    /// Autofire interval, zero disables autofire for the button
    pub interval: Duration,

    /// Timestamp of the last synthetic on or off event
    pub auto_last_timestamp: Duration,

    /// Timestamp at which the next synthetic on or off event is due
    pub auto_next_timestamp: Duration,

    /// Whether the physical button is held
    pub real_button_pressed: bool,

    /// Whether synthetic toggles are being generated. Only ever true while the
    /// button is held and the interval is nonzero.
    pub autofire_enabled: bool,

    /// Last event sent to the next consumer
    pub last_event: Event,
}

impl ButtonState {
    pub fn new(action: Action) -> Self {
        Self {
            interval: Duration::ZERO,
            auto_last_timestamp: Duration::ZERO,
            auto_next_timestamp: Duration::ZERO,
            real_button_pressed: false,
            autofire_enabled: false,
            last_event: Event::released(action),
        }
    }

    pub fn action(&self) -> Action {
        self.last_event.action
    }

    /// Applies a physical button event observed at `now`
    pub fn update(&mut self, event: &Event, now: Duration, next: &dyn Consumer) {
        let pressed = event.is_pressed();

        if self.real_button_pressed == pressed {
            debug!("{} state unchanged, ignoring {}", self.action(), event);
            return;
        }
        self.real_button_pressed = pressed;

        if self.interval.is_zero() {
            self.autofire_enabled = false;
            self.forward(*event, next);
            return;
        }

        // The raw event is absorbed, the tick handler takes over from here
        self.autofire_enabled = pressed;
        if pressed {
            self.auto_last_timestamp = now;
            self.auto_next_timestamp = now.saturating_add(self.interval);
            debug!(
                "{} autofire armed, first toggle at {:?}",
                self.action(),
                self.auto_next_timestamp
            );
        } else {
            debug!("{} autofire disarmed", self.action());
            if self.last_event.is_pressed() {
                self.forward(Event::released(self.action()), next);
            }
        }
    }

    /// Emits the next synthetic toggle if one is due at `now`
    pub fn tick(&mut self, now: Duration, next: &dyn Consumer) {
        if !self.autofire_enabled || now < self.auto_next_timestamp {
            return;
        }

        let event = if self.last_event.is_pressed() {
            Event::released(self.action())
        } else {
            Event::pressed(self.action())
        };
        self.forward(event, next);

        self.auto_last_timestamp = now;
        self.auto_next_timestamp = self.auto_next_timestamp.saturating_add(self.interval);
        if self.auto_next_timestamp <= now {
            // Fell more than one interval behind, resume the cadence from now
            self.auto_next_timestamp = now.saturating_add(self.interval);
        }
    }

    /// Changes the autofire interval. A running cycle keeps its already scheduled
    /// toggle; zero disarms without emitting anything.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
        if interval.is_zero() && self.autofire_enabled {
            debug!("{} autofire disabled while armed", self.action());
            self.autofire_enabled = false;
        }
    }

    fn forward(&mut self, event: Event, next: &dyn Consumer) {
        debug!("Forwarding {}", event);
        next.consume(&event);
        self.last_event = event;
    }
}
