//! Span helpers for SDK operations.

use tracing::{info_span, Span};

/// Span covering a localization fetch.
pub fn fetch_span(languages: &str) -> Span {
    info_span!("quickverse.fetch", languages = %languages)
}

/// Span covering a usage report submission.
pub fn report_span(missing: usize, utilised: usize) -> Span {
    info_span!("quickverse.report", missing, utilised)
}

/// Elapsed-time logger for a single operation.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_build_without_subscriber() {
        let _fetch = fetch_span("en,fr-FR").entered();
        let _report = report_span(1, 3);
        Timer::start("lookup").finish();
    }
}
