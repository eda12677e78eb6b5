use serde_json::{json, Value};

use crate::shared::observation::Observation;
use crate::tracking::domain::track_session::TrackSession;

/// Store/device identity stamped onto every outbound record.
#[derive(Clone, Debug)]
pub struct DeviceIdentity {
    pub store_id: String,
    pub device_id: String,
}

/// Builds the batch-detection payload: one record per raw observation
/// from a single provider call, carrying the current dwell/gaze
/// snapshot for that face in milliseconds. Faces with no session yet
/// (snapshot taken before the first sweep lands) report zeros.
pub fn batch_payload(
    identity: &DeviceIdentity,
    sent_at: u64,
    observations: &[Observation],
    sessions: &[TrackSession],
) -> Value {
    let records: Vec<Value> = observations
        .iter()
        .map(|o| {
            let session = sessions.iter().find(|s| s.face_id == o.face_id);
            json!({
                "store_id": identity.store_id,
                "device_id": identity.device_id,
                "timestamp": sent_at,
                "face_id": o.face_id,
                "gender": o.gender.as_str(),
                "age": o.age,
                "smile_score": o.smile_score,
                "head_yaw": o.head_yaw,
                "dwell_time": session.map_or(0, |s| s.dwell_time),
                "gaze_time": session.map_or(0, |s| s.total_gaze_time),
            })
        })
        .collect();
    Value::Array(records)
}

/// Builds the session-closed payload for one evicted session. Dwell
/// and gaze are reported in whole seconds; first/last-seen keep their
/// millisecond timestamps.
pub fn session_closed_payload(
    identity: &DeviceIdentity,
    sent_at: u64,
    session: &TrackSession,
) -> Value {
    json!({
        "store_id": identity.store_id,
        "device_id": identity.device_id,
        "timestamp": sent_at,
        "face_id": session.face_id,
        "gender": session.gender.map_or("unknown", |g| g.as_str()),
        "age": session.age.unwrap_or(0),
        "dwell_time_seconds": session.dwell_time / 1000,
        "gaze_time_seconds": session.total_gaze_time / 1000,
        "first_seen": session.first_seen,
        "last_seen": session.last_seen,
    })
}
