//! Elapsed-time ticker shown while a submission is in flight.

use std::time::Instant;

/// Start/stop lifecycle with one-second display resolution. The consumer's
/// draw tick handles the periodic redisplay.
#[derive(Debug, Default)]
pub struct Progress {
    started: Option<Instant>,
}

impl Progress {
    /// Reset the counter to zero and start it. Restarting while running is an
    /// idempotent reset.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn stop(&mut self) {
        self.started = None;
    }

    pub fn running(&self) -> bool {
        self.started.is_some()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.started.map(|s| s.elapsed().as_secs()).unwrap_or(0)
    }

    /// Display text, or `None` when hidden.
    pub fn display(&self) -> Option<String> {
        self.started
            .map(|s| format!("elapsed {} s", s.elapsed().as_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_and_hides_when_stopped() {
        let mut progress = Progress::default();
        assert!(!progress.running());
        assert!(progress.display().is_none());

        progress.start();
        assert!(progress.running());
        assert_eq!(progress.elapsed_secs(), 0);
        assert_eq!(progress.display().as_deref(), Some("elapsed 0 s"));

        progress.stop();
        assert!(!progress.running());
        assert!(progress.display().is_none());
    }

    #[test]
    fn restart_resets_the_counter() {
        let mut progress = Progress::default();
        progress.start();
        progress.start();
        assert_eq!(progress.elapsed_secs(), 0);

        progress.stop();
        progress.stop();
        assert!(!progress.running());
    }
}
