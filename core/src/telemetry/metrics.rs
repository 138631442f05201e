use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

/// Submission counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub stale: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut Metrics)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }

    pub fn record_submitted(&self) {
        self.update(|m| m.submitted += 1);
    }

    pub fn record_success(&self) {
        self.update(|m| m.succeeded += 1);
    }

    pub fn record_error(&self) {
        self.update(|m| m.failed += 1);
    }

    pub fn record_stale(&self) {
        self.update(|m| m.stale += 1);
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let recorder = MetricsRecorder::new();
        recorder.record_submitted();
        recorder.record_submitted();
        recorder.record_success();
        recorder.record_stale();
        assert_eq!(
            recorder.snapshot(),
            Metrics {
                submitted: 2,
                succeeded: 1,
                failed: 0,
                stale: 1,
            }
        );
    }
}
