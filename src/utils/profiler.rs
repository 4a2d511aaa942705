//! Wall-clock timing for the engine's hot paths (compose, fill, select).

use std::time::{Duration, Instant};

/// One frame at 60 Hz. Scopes that take longer are reported as warnings.
pub const FRAME_BUDGET: Duration = Duration::from_micros(16_667);

/// Reports how long the enclosing scope took when it is dropped.
#[must_use = "the timer reports when dropped; bind it to a named variable"]
pub struct ScopeTimer {
    label: &'static str,
    started: Instant,
}

impl ScopeTimer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for ScopeTimer {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        if elapsed > FRAME_BUDGET {
            log::warn!("{} took {elapsed:?}, over the frame budget", self.label);
        } else {
            log::debug!("{} took {elapsed:?}", self.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_grows_while_the_scope_runs() {
        let timer = ScopeTimer::new("test_scope");
        let first = timer.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.elapsed() >= first + Duration::from_millis(2));
    }
}
