//! Frame pacing
//!
//! Capture frames are pushed at a fixed wall-clock cadence. The pacer keeps
//! a deadline schedule rather than sleeping a flat interval, so capture and
//! read time don't accumulate drift. If the loop stalls by more than one
//! interval (slow source, blocked pipe) the schedule resets instead of
//! bursting frames to catch up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Deadline-based pacer for one frame cadence.
pub struct FramePacer {
    interval: Duration,
    next: Instant,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now() + interval,
        }
    }

    /// Sleep until the next frame deadline and advance the schedule.
    pub async fn tick(&mut self) {
        tokio::time::sleep_until(self.next).await;
        self.next += self.interval;

        // Fallen behind by more than a full interval: resync to now.
        let now = Instant::now();
        if now > self.next + self.interval {
            self.next = now + self.interval;
        }
    }

    /// The current deadline (next frame send time).
    pub fn deadline(&self) -> Instant {
        self.next
    }
}

/// Counters shared between a pump loop and its observers.
#[derive(Default)]
pub struct StreamStats {
    frames_sent: AtomicU64,
    bytes_sent: AtomicU64,
    short_reads: AtomicU64,
}

impl StreamStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_frame(&self, bytes: usize) -> u64 {
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
        self.frames_sent.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_short_read(&self) {
        self.short_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            short_reads: self.short_reads.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`StreamStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames_sent: u64,
    pub bytes_sent: u64,
    pub short_reads: u64,
}
