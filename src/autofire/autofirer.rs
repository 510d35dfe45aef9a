//! The autofire pipeline stage
//!
//! ```text
//! consume() ──► [Synchronized<State>] ──► Consumer
//!                        ▲
//!                 ticker loop (every tick_interval_ms)
//! ```
//!
//! Every access to the button table and to the ticker handle goes through one
//! [`Synchronized`] executor, from the event path, the ticker loop and the
//! configuration path alike.

use crate::autofire::button_state::ButtonState;
use crate::autofire::error::AutoFireError;
use crate::autofire::synchronized::Synchronized;
use crate::controller::{Action, Consumer, Event, NUM_ACTION_BUTTONS};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

/// Runtime settings of an [`AutoFirer`]
#[derive(Clone, Debug)]
pub struct AutoFirerSettings {
    /// Sampling period of the ticker loop in milliseconds. Zero is treated as 1ms,
    /// the shortest period the ticker supports.
    pub tick_interval_ms: u64,
}

impl Default for AutoFirerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
        }
    }
}

impl AutoFirerSettings {
    /// The ticker period, never shorter than 1ms
    pub fn tick_interval(&self) -> Duration {
        // tokio intervals reject a zero period
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

// Handle of a running ticker loop, created fresh on every `run`
#[derive(Debug)]
struct TickerHandle {
    stop: CancellationToken,
    tracker: TaskTracker,
}

#[derive(Debug)]
struct State {
    buttons: [ButtonState; NUM_ACTION_BUTTONS],
    ticker: Option<TickerHandle>,
}

impl State {
    fn new() -> Self {
        Self {
            buttons: std::array::from_fn(|i| ButtonState::new(Action::ALL[i])),
            ticker: None,
        }
    }

    fn consume(&mut self, event: &Event, now: Duration, next: &dyn Consumer) {
        if event.action.is_button() {
            self.buttons[event.action.index()].update(event, now, next);
        } else {
            // Just forward any axis events
            next.consume(event);
        }
    }

    fn tick(&mut self, now: Duration, next: &dyn Consumer) {
        for button in self.buttons.iter_mut().filter(|b| b.autofire_enabled) {
            button.tick(now, next);
        }
    }
}

struct Shared {
    syncer: Synchronized<State>,
    next: Box<dyn Consumer>,
    settings: AutoFirerSettings,
    epoch: Instant,
}

impl Shared {
    fn elapsed(&self, instant: Instant) -> Duration {
        instant.saturating_duration_since(self.epoch)
    }
}

/// Turns sustained button presses into periodic press/release sequences
///
/// Buttons with a zero interval pass through unchanged (minus duplicate reports),
/// axis events always pass through. The downstream [`Consumer`] is called while the
/// state lock is held and must not block.
pub struct AutoFirer {
    shared: Arc<Shared>,
}

impl AutoFirer {
    pub fn new(next: impl Consumer, settings: Option<AutoFirerSettings>) -> Self {
        let settings = settings.unwrap_or_default();
        debug!("Creating AutoFirer with settings: {:?}", settings);

        Self {
            shared: Arc::new(Shared {
                syncer: Synchronized::new(State::new()),
                next: Box::new(next),
                settings,
                epoch: Instant::now(),
            }),
        }
    }

    /// Starts the ticker loop on the current tokio runtime
    ///
    /// # Errors
    ///
    /// * [`AutoFireError::AlreadyRunning`] - the loop was started before and not closed
    /// * [`AutoFireError::NoRuntime`] - called outside of a tokio runtime
    pub fn run(&self) -> Result<(), AutoFireError> {
        if tokio::runtime::Handle::try_current().is_err() {
            error!("AutoFirer started outside of a tokio runtime");
            return Err(AutoFireError::NoRuntime);
        }

        let (stop, tracker) = self.shared.syncer.run(|state| {
            if state.ticker.is_some() {
                error!("AutoFirer already running");
                return Err(AutoFireError::AlreadyRunning);
            }

            let stop = CancellationToken::new();
            let tracker = TaskTracker::new();
            state.ticker = Some(TickerHandle {
                stop: stop.clone(),
                tracker: tracker.clone(),
            });
            Ok((stop, tracker))
        })?;

        // Outside the lock: dropping the loop future takes the lock to clear the handle.
        // The tracker closes only after the spawn, so `close` never sees it empty early.
        let teardown = TickerTeardown {
            shared: self.shared.clone(),
        };
        tracker.spawn(run_ticker_loop(teardown, stop));
        tracker.close();

        info!(
            "AutoFirer started with {}ms tick",
            self.shared.settings.tick_interval().as_millis()
        );
        Ok(())
    }

    /// Stops the ticker loop and waits until it has fully torn down
    ///
    /// Calling this while stopped is a no-op. Once it returns, [`AutoFirer::run`] can
    /// be called again.
    pub async fn close(&self) -> Result<(), AutoFireError> {
        let tracker = self.shared.syncer.run(|state| match &state.ticker {
            Some(ticker) => {
                debug!("AutoFirer stopping");
                ticker.stop.cancel();
                Some(ticker.tracker.clone())
            }
            None => {
                debug!("AutoFirer not running");
                None
            }
        });

        if let Some(tracker) = tracker {
            tracker.wait().await;
            info!("AutoFirer stopped");
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.shared.syncer.run(|state| state.ticker.is_some())
    }

    /// Feeds one event from the input source into the stage
    pub fn consume(&self, event: &Event) {
        let now = self.shared.elapsed(Instant::now());
        let next = &*self.shared.next;
        self.shared
            .syncer
            .run(|state| state.consume(event, now, next));
    }

    /// Sets the autofire interval of a button, zero turns autofire off
    pub fn set_fire_interval(&self, action: Action, interval: Duration) -> Result<(), AutoFireError> {
        if !action.is_button() {
            error!("Cannot set fire interval of {}", action);
            return Err(AutoFireError::NotAButton(action));
        }

        debug!("Setting fire interval of {} to {:?}", action, interval);
        self.shared
            .syncer
            .run(|state| state.buttons[action.index()].set_interval(interval));
        Ok(())
    }

    /// Same as [`AutoFirer::set_fire_interval`] for intervals coming from signed
    /// millisecond inputs such as the command line or a config file
    pub fn set_fire_interval_ms(&self, action: Action, interval_ms: i64) -> Result<(), AutoFireError> {
        let Ok(millis) = u64::try_from(interval_ms) else {
            error!("interval must be >= 0 but was: {}", interval_ms);
            return Err(AutoFireError::NegativeInterval(interval_ms));
        };
        self.set_fire_interval(action, Duration::from_millis(millis))
    }

    pub fn fire_interval(&self, action: Action) -> Option<Duration> {
        self.button_snapshot(action).map(|button| button.interval)
    }

    /// Copy of the current state of a button, `None` for axes
    pub fn button_snapshot(&self, action: Action) -> Option<ButtonState> {
        if !action.is_button() {
            return None;
        }
        Some(self.shared.syncer.run(|state| state.buttons[action.index()]))
    }
}

impl Drop for AutoFirer {
    fn drop(&mut self) {
        self.shared.syncer.run(|state| {
            if let Some(ticker) = &state.ticker {
                debug!("AutoFirer dropped while running, stopping ticker loop");
                ticker.stop.cancel();
            }
        });
    }
}

// Marks the stage stopped once the ticker loop future goes away, whether it ran to
// completion or was dropped by a shutting down runtime (even before its first poll).
struct TickerTeardown {
    shared: Arc<Shared>,
}

impl Drop for TickerTeardown {
    fn drop(&mut self) {
        // Separate critical section, never nested in the loop body
        self.shared.syncer.run(|state| state.ticker = None);
        debug!("AutoFirer ticker loop finished");
    }
}

async fn run_ticker_loop(teardown: TickerTeardown, stop: CancellationToken) {
    let shared = &teardown.shared;
    let mut ticker = time::interval(shared.settings.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            tick = ticker.tick() => {
                let now = shared.elapsed(tick);
                let next = &*shared.next;
                shared.syncer.run(|state| state.tick(now, next));
            }
        }
    }
}
