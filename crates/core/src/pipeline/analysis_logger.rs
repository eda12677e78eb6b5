use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting observer for analysis-loop events.
///
/// Decouples the pipeline from specific output mechanisms (stdout, a
/// GUI status line, the log crate) so failures and progress surface as
/// best-effort status text without changing orchestration code.
pub trait AnalysisLogger: Send {
    /// One detection call completed with `faces` observations.
    fn detection(&mut self, faces: usize);

    /// Record a point-in-time metric (e.g. active sessions, evicted count).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger for tests and embedders with their own reporting.
pub struct NullAnalysisLogger;

impl AnalysisLogger for NullAnalysisLogger {
    fn detection(&mut self, _faces: usize) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger: counts detection calls and faces, tracks
/// metrics, and reports a summary when the run ends.
pub struct StdoutAnalysisLogger {
    calls: usize,
    faces: usize,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
}

impl StdoutAnalysisLogger {
    pub fn new() -> Self {
        Self {
            calls: 0,
            faces: 0,
            metrics: HashMap::new(),
            start_time: Instant::now(),
        }
    }

    /// Returns the formatted summary, or `None` if nothing ran.
    pub fn summary_string(&self) -> Option<String> {
        if self.calls == 0 && self.metrics.is_empty() {
            return None;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Analysis summary ({} detection calls, {} faces, {elapsed:.1}s):",
            self.calls, self.faces
        )];

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let values = &self.metrics[name];
            let avg = values.iter().sum::<f64>() / values.len() as f64;
            let max = values.iter().cloned().fold(f64::MIN, f64::max);
            lines.push(format!("  {name}: avg {avg:.1}  max {max:.0}"));
        }
        Some(lines.join("\n"))
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

impl Default for StdoutAnalysisLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisLogger for StdoutAnalysisLogger {
    fn detection(&mut self, faces: usize) {
        self.calls += 1;
        self.faces += faces;
        if faces > 0 {
            log::info!("detected {faces} face(s) (call #{})", self.calls);
        }
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
