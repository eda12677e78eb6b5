use crate::shared::observation::Observation;

/// Domain interface for face detection over encoded image bytes.
///
/// Implementations own their failure handling: a detector that cannot
/// produce results (missing configuration, provider outage, malformed
/// response) returns an empty list rather than an error, so the frame
/// loop keeps running with reduced functionality.
pub trait FaceDetector: Send {
    /// Detects faces in one encoded frame captured at `timestamp`
    /// (milliseconds on the device clock).
    fn detect(&mut self, image: &[u8], timestamp: u64) -> Vec<Observation>;
}
