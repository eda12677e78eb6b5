use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

use crate::shared::constants::UPLOAD_TIMEOUT;
use crate::shared::observation::Observation;
use crate::tracking::domain::track_session::TrackSession;
use crate::upload::domain::event::{batch_payload, session_closed_payload, DeviceIdentity};
use crate::upload::domain::event_sink::EventSink;

/// Delivers analytics events to the remote collector.
///
/// Each send spawns its own worker thread that performs one full POST
/// round trip; callers never wait. The pool is unbounded: a slow
/// collector accumulates outstanding workers rather than applying
/// backpressure to the frame loop. With no collector URL
/// configured every send is a logged no-op.
pub struct HttpEventSink {
    client: reqwest::blocking::Client,
    collector_url: String,
    identity: DeviceIdentity,
}

impl HttpEventSink {
    pub fn new(collector_url: String, identity: DeviceIdentity) -> Self {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(UPLOAD_TIMEOUT)
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            collector_url,
            identity,
        }
    }

    fn dispatch(&self, payload: Value, what: String) {
        if self.collector_url.is_empty() {
            log::warn!("collector URL not configured, dropping {what}");
            return;
        }
        let client = self.client.clone();
        let url = self.collector_url.clone();
        std::thread::spawn(move || match client.post(&url).json(&payload).send() {
            Ok(response) if response.status().is_success() => {
                log::debug!("uploaded {what}");
            }
            Ok(response) => {
                log::warn!("upload of {what} rejected: status {}", response.status());
            }
            Err(e) => {
                log::warn!("upload of {what} failed: {e}");
            }
        });
    }
}

impl EventSink for HttpEventSink {
    fn send_batch(&self, observations: &[Observation], sessions: &[TrackSession]) {
        if observations.is_empty() {
            return;
        }
        let payload = batch_payload(&self.identity, now_ms(), observations, sessions);
        self.dispatch(payload, format!("batch of {} faces", observations.len()));
    }

    fn send_session_closed(&self, session: &TrackSession) {
        let payload = session_closed_payload(&self.identity, now_ms(), session);
        self.dispatch(payload, format!("closed session {}", session.face_id));
    }
}

/// Wall-clock milliseconds for outbound record timestamps. Tracking
/// itself runs on observation timestamps, not on this clock.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
