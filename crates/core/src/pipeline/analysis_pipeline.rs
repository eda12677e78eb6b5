use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::analysis_logger::AnalysisLogger;
use crate::tracking::domain::registry::TrackingRegistry;
use crate::upload::domain::event_sink::EventSink;
use crate::upload::infrastructure::http_event_sink::now_ms;
use crate::video::domain::frame_source::FrameSource;

const CANCEL_POLL: Duration = Duration::from_millis(50);

/// The per-source frame loop: pull a frame, gate on the detection
/// cooldown, call the detector, feed observations to the registry,
/// and hand the batch (with its session snapshot) to the sink.
///
/// Detection runs on a single lane (at most one outstanding call per
/// source) and a minimum inter-call cooldown is enforced before every
/// call, independent of how fast frames arrive. Errors from the source
/// are logged and the loop continues; detection and upload failures
/// are already absorbed inside their components.
pub struct AnalysisPipeline {
    source: Box<dyn FrameSource>,
    detector: Box<dyn FaceDetector>,
    registry: Arc<TrackingRegistry>,
    sink: Arc<dyn EventSink>,
    logger: Box<dyn AnalysisLogger>,
    cooldown: Duration,
    cancelled: Arc<AtomicBool>,
}

impl AnalysisPipeline {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn FaceDetector>,
        registry: Arc<TrackingRegistry>,
        sink: Arc<dyn EventSink>,
        logger: Box<dyn AnalysisLogger>,
        cooldown: Duration,
    ) -> Self {
        Self {
            source,
            detector,
            registry,
            sink,
            logger,
            cooldown,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the loop from another thread. The in-flight
    /// iteration completes; the source is closed on exit.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Runs until the source is exhausted or the pipeline is
    /// cancelled.
    pub fn run(&mut self) {
        let mut last_call: Option<Instant> = None;

        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                self.logger.info("analysis cancelled");
                break;
            }

            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    log::error!("frame acquisition failed: {e}");
                    continue;
                }
            };

            if !self.wait_for_cooldown(last_call) {
                break;
            }
            last_call = Some(Instant::now());

            self.analyze_frame(&frame);
        }

        self.source.close();
        self.logger.summary();
    }

    fn analyze_frame(&mut self, frame: &[u8]) {
        let observations = self.detector.detect(frame, now_ms());
        self.logger.detection(observations.len());
        if observations.is_empty() {
            return;
        }

        for observation in &observations {
            self.registry.update(observation);
        }

        let snapshot = self.registry.snapshot();
        self.logger.metric("active_sessions", snapshot.len() as f64);
        self.sink.send_batch(&observations, &snapshot);
    }

    /// Sleeps out the remainder of the cooldown, polling the
    /// cancellation flag. Returns false when cancelled mid-wait.
    fn wait_for_cooldown(&self, last_call: Option<Instant>) -> bool {
        let Some(last) = last_call else {
            return true;
        };
        while last.elapsed() < self.cooldown {
            if self.cancelled.load(Ordering::Relaxed) {
                return false;
            }
            let remaining = self.cooldown.saturating_sub(last.elapsed());
            std::thread::sleep(remaining.min(CANCEL_POLL));
        }
        true
    }

    /// Force-finalizes every remaining session through the sink. Used
    /// when a finite source ends so no session-closed event is lost.
    pub fn drain(&mut self) {
        let remaining = self.registry.drain();
        if remaining.is_empty() {
            return;
        }
        self.logger
            .info(&format!("draining {} open session(s)", remaining.len()));
        for session in &remaining {
            self.sink.send_session_closed(session);
        }
    }
}
