use log::{info, warn};

/// Tagged log sink for controller events.
pub struct LogManager {
    target: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self::with_target("console")
    }

    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.target, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.target, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
