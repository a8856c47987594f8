use std::time::{Duration, Instant};

use tracing::{debug, info};

/// Rate-limited progress logging for one transfer.
pub(crate) struct ProgressLog<'a> {
    path: &'a str,
    total: u64,
    start_offset: u64,
    interval: Duration,
    started: Instant,
    last_logged: Instant,
}

impl<'a> ProgressLog<'a> {
    pub(crate) fn new(path: &'a str, start_offset: u64, total: u64, interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            path,
            total,
            start_offset,
            interval,
            started: now,
            last_logged: now,
        }
    }

    /// Records that `done` bytes of the file are on disk.
    pub(crate) fn update(&mut self, done: u64) {
        if self.last_logged.elapsed() < self.interval {
            return;
        }
        self.last_logged = Instant::now();
        info!(
            path = self.path,
            done = %format_bytes(done),
            total = %format_bytes(self.total),
            rate = %format!("{}/s", format_bytes(self.rate(done))),
            "transfer progress"
        );
    }

    pub(crate) fn finish(&self, done: u64) {
        debug!(
            path = self.path,
            bytes = done,
            elapsed = ?self.started.elapsed(),
            rate = %format!("{}/s", format_bytes(self.rate(done))),
            "transfer finished"
        );
    }

    fn rate(&self, done: u64) -> u64 {
        let secs = self.started.elapsed().as_secs_f64();
        if secs <= 0.0 {
            return 0;
        }
        (done.saturating_sub(self.start_offset) as f64 / secs) as u64
    }
}

/// Formats a byte count with binary units.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;
    const TIB: f64 = GIB * 1024.0;

    let value = bytes as f64;
    if value >= TIB {
        format!("{:.2} TiB", value / TIB)
    } else if value >= GIB {
        format!("{:.2} GiB", value / GIB)
    } else if value >= MIB {
        format!("{:.2} MiB", value / MIB)
    } else if value >= KIB {
        format!("{:.2} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}
