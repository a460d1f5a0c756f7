//! Pause/resume/step gate between the command thread and the tick worker.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Verdict handed to the worker by [`Controller::await_permission`] and
/// [`Controller::rest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    /// Run the next tick.
    Proceed,
    /// Leave the loop.
    Stop,
}

#[derive(Debug, Default)]
struct Gate {
    paused: bool,
    step_armed: bool,
    stopped: bool,
    steps_requested: u64,
    steps_taken: u64,
}

/// State machine over {running, paused} plus the terminal stopped state.
///
/// Every transition happens under one mutex and wakes waiters through one
/// condition variable, so none of the command-side calls ever blocks on a
/// running tick.
#[derive(Debug, Default)]
pub struct Controller {
    gate: Mutex<Gate>,
    signal: Condvar,
}

impl Controller {
    /// Creates a controller, optionally starting paused.
    #[must_use]
    pub fn new(start_paused: bool) -> Self {
        Self {
            gate: Mutex::new(Gate {
                paused: start_paused,
                ..Gate::default()
            }),
            signal: Condvar::new(),
        }
    }

    /// Holds the worker before its next tick. Returns `false` if already paused
    /// or stopped.
    pub fn pause(&self) -> bool {
        let mut gate = self.lock();
        if gate.paused || gate.stopped {
            return false;
        }
        gate.paused = true;
        self.signal.notify_all();
        true
    }

    /// Lets the worker run freely again and wakes it.
    pub fn resume(&self) -> bool {
        let mut gate = self.lock();
        if !gate.paused || gate.stopped {
            return false;
        }
        gate.paused = false;
        gate.step_armed = false;
        self.signal.notify_all();
        true
    }

    /// Arms a one-shot permission for a single tick and returns its ticket.
    ///
    /// Only valid while paused. Arming twice before the worker consumes the
    /// permission still yields a single tick, and both calls get the same
    /// ticket. The ticket is redeemed once [`Controller::steps_taken`] reaches
    /// it.
    pub fn request_one_step(&self) -> Option<u64> {
        let mut gate = self.lock();
        if !gate.paused || gate.stopped {
            return None;
        }
        if !gate.step_armed {
            gate.steps_requested += 1;
            gate.step_armed = true;
            self.signal.notify_all();
        }
        Some(gate.steps_requested)
    }

    /// Terminal transition that releases every waiter.
    pub fn stop(&self) {
        let mut gate = self.lock();
        gate.stopped = true;
        gate.step_armed = false;
        self.signal.notify_all();
    }

    /// Reports whether the controller is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    /// Highest step ticket redeemed by a tick the worker has started.
    #[must_use]
    pub fn steps_taken(&self) -> u64 {
        self.lock().steps_taken
    }

    /// Blocks until the worker may run a tick or must stop.
    ///
    /// While paused, each armed step is consumed exactly once. Any tick that
    /// starts redeems every ticket handed out before it, including one left
    /// over from a resume.
    pub fn await_permission(&self) -> Permission {
        let mut gate = self.lock();
        loop {
            if gate.stopped {
                return Permission::Stop;
            }
            if !gate.paused || gate.step_armed {
                gate.step_armed = false;
                gate.steps_taken = gate.steps_requested;
                return Permission::Proceed;
            }
            gate = self
                .signal
                .wait(gate)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Sleeps between ticks.
    ///
    /// Returns early with [`Permission::Stop`] when stopped, or with
    /// [`Permission::Proceed`] as soon as the controller is paused, since the
    /// next [`Controller::await_permission`] blocks anyway.
    pub fn rest(&self, delay: Duration) -> Permission {
        let deadline = Instant::now() + delay;
        let mut gate = self.lock();
        loop {
            if gate.stopped {
                return Permission::Stop;
            }
            let now = Instant::now();
            if gate.paused || now >= deadline {
                return Permission::Proceed;
            }
            gate = self
                .signal
                .wait_timeout(gate, deadline - now)
                .map(|(gate, _)| gate)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
