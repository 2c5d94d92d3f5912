//! Tick sources for the capture session.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, TrySendError, sync_channel};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Monotonic time source shared by the repaint loop and capture.
pub trait Clock: Send + Sync {
    /// Time since the clock's epoch.
    fn now(&self) -> Duration;
}

/// Wall clock measured from construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Clock whose epoch is now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Fixed-tick simulation clock; only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ns: AtomicU64,
}

impl ManualClock {
    /// Clock starting at `start`.
    pub fn starting_at(start: Duration) -> Self {
        Self {
            now_ns: AtomicU64::new(start.as_nanos() as u64),
        }
    }

    /// Jump to `t`.
    pub fn set(&self, t: Duration) {
        self.now_ns.store(t.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Move forward by `dt`.
    pub fn advance(&self, dt: Duration) {
        self.now_ns.fetch_add(dt.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now_ns.load(Ordering::SeqCst))
    }
}

/// Timer thread that signals one repaint per interval.
///
/// Ticks that are not consumed in time coalesce. Cancelling (or dropping) stops and joins the
/// thread, so no tick is delivered afterwards.
pub struct RepaintLoop {
    cancelled: Arc<AtomicBool>,
    ticks: Receiver<u64>,
    handle: Option<JoinHandle<()>>,
}

impl RepaintLoop {
    /// Start ticking every `interval`.
    pub fn start(interval: Duration) -> Self {
        const POLL: Duration = Duration::from_millis(5);

        let interval = interval.max(Duration::from_micros(100));
        let cancelled = Arc::new(AtomicBool::new(false));
        let (tx, ticks) = sync_channel(1);
        let flag = Arc::clone(&cancelled);
        let handle = std::thread::spawn(move || {
            let start = Instant::now();
            let mut n: u64 = 0;
            while !flag.load(Ordering::Acquire) {
                n += 1;
                let due = start + interval.saturating_mul(n as u32);
                loop {
                    let now = Instant::now();
                    if now >= due || flag.load(Ordering::Acquire) {
                        break;
                    }
                    std::thread::sleep((due - now).min(POLL));
                }
                match tx.try_send(n) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => break,
                }
            }
        });
        Self {
            cancelled,
            ticks,
            handle: Some(handle),
        }
    }

    /// Block until the next tick. `None` once the loop is cancelled.
    pub fn wait_tick(&self) -> Option<u64> {
        if self.cancelled.load(Ordering::Acquire) {
            return None;
        }
        self.ticks.recv().ok()
    }

    /// The tick pending right now, without blocking.
    pub fn try_tick(&self) -> Option<u64> {
        if self.cancelled.load(Ordering::Acquire) {
            return None;
        }
        self.ticks.try_recv().ok()
    }

    /// Stop the timer thread and wait for it to exit.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("repaint loop thread panicked");
        }
    }

    /// Whether `cancel` has run.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for RepaintLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/clock.rs"]
mod tests;
