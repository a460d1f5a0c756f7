//! Read-only views published after every tick.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use savanna_core::{Entity, Location};
use savanna_system_analytics::StatsReport;

/// Everything an observer may look at after a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Number of ticks applied so far.
    pub tick: u64,
    /// Highest step ticket redeemed when this tick started.
    pub step: u64,
    /// Copy of every occupied cell in ascending location order.
    pub occupants: Vec<(Location, Entity)>,
    /// Statistics after the tick.
    pub stats: StatsReport,
}

/// Receives a frame after each applied tick, on the worker thread.
pub trait Observer: Send {
    /// Called once per tick with the freshly published frame.
    fn on_tick(&mut self, frame: &Frame);
}

impl<F> Observer for F
where
    F: FnMut(&Frame) + Send,
{
    fn on_tick(&mut self, frame: &Frame) {
        self(frame);
    }
}

#[derive(Debug, Default)]
struct Board {
    latest: Option<Arc<Frame>>,
    closed: bool,
}

/// Latest frame shared between the worker and command thread.
#[derive(Debug, Default)]
pub struct FrameBoard {
    board: Mutex<Board>,
    changed: Condvar,
}

impl FrameBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the latest frame, wakes waiters and returns the shared frame.
    pub fn publish(&self, frame: Frame) -> Arc<Frame> {
        let frame = Arc::new(frame);
        let mut board = self.lock();
        board.latest = Some(Arc::clone(&frame));
        self.changed.notify_all();
        frame
    }

    /// Marks the board as finished; waiters stop waiting for new ticks.
    pub fn close(&self) {
        let mut board = self.lock();
        board.closed = true;
        self.changed.notify_all();
    }

    /// Tick of the most recent frame, zero before the first.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.lock().latest.as_ref().map_or(0, |frame| frame.tick)
    }

    /// Waits until a frame produced under step ticket `ticket` or later is
    /// published.
    ///
    /// Returns `None` when the timeout elapses or the board closes first. The
    /// worker keeps running either way.
    pub fn await_step(&self, ticket: u64, timeout: Duration) -> Option<Arc<Frame>> {
        let deadline = Instant::now() + timeout;
        let mut board = self.lock();
        loop {
            if let Some(frame) = board.latest.as_ref().filter(|frame| frame.step >= ticket) {
                return Some(Arc::clone(frame));
            }
            let now = Instant::now();
            if board.closed || now >= deadline {
                return None;
            }
            board = self
                .changed
                .wait_timeout(board, deadline - now)
                .map(|(board, _)| board)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tick: u64, step: u64) -> Frame {
        Frame {
            tick,
            step,
            occupants: Vec::new(),
            stats: StatsReport::default(),
        }
    }

    #[test]
    fn waits_time_out_without_progress() {
        let board = FrameBoard::new();
        let _ = board.publish(frame(3, 2));
        assert!(board.await_step(3, Duration::from_millis(10)).is_none());
        assert_eq!(
            board
                .await_step(2, Duration::from_millis(10))
                .map(|frame| frame.tick),
            Some(3)
        );
    }

    #[test]
    fn newer_tick_from_an_older_step_keeps_the_waiter_waiting() {
        let board = Arc::new(FrameBoard::new());
        let _ = board.publish(frame(4, 1));

        let waiter = {
            let board = Arc::clone(&board);
            std::thread::spawn(move || board.await_step(2, Duration::from_secs(5)))
        };
        let _ = board.publish(frame(5, 1));
        std::thread::sleep(Duration::from_millis(20));
        let _ = board.publish(frame(6, 2));

        let seen = waiter.join().expect("waiter").map(|frame| frame.tick);
        assert_eq!(seen, Some(6));
    }

    #[test]
    fn closing_releases_waiters() {
        let board = FrameBoard::new();
        board.close();
        let started = Instant::now();
        assert!(board.await_step(1, Duration::from_secs(30)).is_none());
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(board.tick(), 0);
    }
}
