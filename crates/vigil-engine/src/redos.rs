use std::time::{Duration, Instant};

/// Default per-pattern regex timeout (spec.md §4.3 "Per-rule loop").
pub const DEFAULT_REGEX_TIMEOUT_MS: u64 = 1000;

/// How often (in match iterations) the guard samples wall-clock time.
/// Checking every iteration would dominate runtime on cheap patterns;
/// sampling keeps the guard itself allocation-free and branch-cheap.
const CHECK_INTERVAL: u32 = 64;

/// Bounds per-pattern regex execution without a watchdog thread. Every
/// [`CHECK_INTERVAL`] match iterations it samples two things for the pattern
/// currently running: the time spent since the *previous* sample (a single
/// runaway batch trips the per-pattern timeout immediately) and the time
/// spent since the pattern started (a looser 5x cumulative cap that catches
/// a pattern making merely-slow-not-catastrophic progress across many
/// samples). Both are scoped to one pattern and reset in `start_pattern`, so
/// neither carries over to the next pattern in the same rule (spec.md §4.3
/// "a per-pattern cumulative cap of 5x that").
pub struct RedosGuard {
    per_pattern_timeout: Duration,
    cumulative_cap: Duration,
    cumulative_started: Instant,
    last_sample: Instant,
    iterations: u32,
    pub aborted_patterns: u32,
    pub rule_aborted: bool,
}

impl RedosGuard {
    pub fn new(timeout_ms: u64) -> Self {
        let per_pattern_timeout = Duration::from_millis(timeout_ms);
        let now = Instant::now();
        Self {
            per_pattern_timeout,
            cumulative_cap: per_pattern_timeout.saturating_mul(5),
            cumulative_started: now,
            last_sample: now,
            iterations: 0,
            aborted_patterns: 0,
            rule_aborted: false,
        }
    }

    pub fn start_pattern(&mut self) {
        let now = Instant::now();
        self.last_sample = now;
        self.cumulative_started = now;
        self.iterations = 0;
    }

    /// Call once per match iteration within a pattern. Returns `true` when
    /// this pattern must stop, either because the latest sampling window ran
    /// long or because the pattern's cumulative cap was exceeded.
    pub fn tick(&mut self) -> bool {
        if self.rule_aborted {
            return true;
        }
        self.iterations += 1;
        if self.iterations % CHECK_INTERVAL != 0 {
            return false;
        }
        let now = Instant::now();
        let since_last_sample = now.duration_since(self.last_sample);
        self.last_sample = now;
        if since_last_sample >= self.per_pattern_timeout {
            self.aborted_patterns += 1;
            return true;
        }
        if now.duration_since(self.cumulative_started) >= self.cumulative_cap {
            self.rule_aborted = true;
            self.aborted_patterns += 1;
            return true;
        }
        false
    }
}
