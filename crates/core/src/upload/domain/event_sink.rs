use crate::shared::observation::Observation;
use crate::tracking::domain::track_session::TrackSession;

/// Outbound analytics delivery, decoupled from the tracking and
/// eviction paths.
///
/// Both operations are fire-and-forget: they must return without
/// blocking on network I/O, delivery is never acknowledged back to the
/// caller, and a failed send is logged and dropped.
pub trait EventSink: Send + Sync {
    /// One provider call's worth of raw observations plus the current
    /// per-face session snapshot.
    fn send_batch(&self, observations: &[Observation], sessions: &[TrackSession]);

    /// One finalized (evicted) session.
    fn send_session_closed(&self, session: &TrackSession);
}

/// Sink that discards every event. Stands in when no collector is
/// wired up and in tests that only exercise tracking.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send_batch(&self, _observations: &[Observation], _sessions: &[TrackSession]) {}
    fn send_session_closed(&self, _session: &TrackSession) {}
}
