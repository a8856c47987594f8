use std::time::Duration;

use crate::constants::{MAX_PACKET_SIZE, PROGRESS_LOG_INTERVAL, RESUME_BACKOFF_BYTES};

/// Settings for a [`MirrorEngine`](super::MirrorEngine) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorOptions {
    /// Continue partial local files and recover from transport faults.
    /// When off, a partial file is downloaded again and any fault is fatal.
    pub resume: bool,
    /// Apply the remote permission bits to each local file.
    pub keep_modes: bool,
    /// Apply the remote access and modification times to each local file.
    pub keep_times: bool,
    /// Abort the run when a subdirectory cannot be listed.
    pub strict_listing: bool,
    /// Bytes requested per ranged read.
    pub window_size: u32,
    /// Bytes re-fetched before the end of the local file after a fault.
    pub backoff_bytes: u64,
    /// Minimum time between progress log lines.
    pub progress_interval: Duration,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            resume: false,
            keep_modes: true,
            keep_times: true,
            strict_listing: false,
            window_size: MAX_PACKET_SIZE,
            backoff_bytes: RESUME_BACKOFF_BYTES,
            progress_interval: PROGRESS_LOG_INTERVAL,
        }
    }
}

impl MirrorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn with_keep_modes(mut self, keep: bool) -> Self {
        self.keep_modes = keep;
        self
    }

    pub fn with_keep_times(mut self, keep: bool) -> Self {
        self.keep_times = keep;
        self
    }

    pub fn with_strict_listing(mut self, strict: bool) -> Self {
        self.strict_listing = strict;
        self
    }

    /// Sets the read window, clamped to `1..=MAX_PACKET_SIZE`.
    pub fn with_window_size(mut self, size: u32) -> Self {
        self.window_size = size.clamp(1, MAX_PACKET_SIZE);
        self
    }

    pub fn with_backoff_bytes(mut self, bytes: u64) -> Self {
        self.backoff_bytes = bytes;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}
