use serde_json::Value;
use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::{DETECT_ATTRIBUTES, DETECT_PATH, PROVIDER_KEY_HEADER};
use crate::shared::observation::{BoundingBox, Gender, Observation};

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("provider key or endpoint not configured")]
    NotConfigured,
    #[error("detect request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("provider response is not a face array")]
    MalformedBody,
}

/// Detection gateway against the remote face provider.
///
/// One POST of raw image bytes per call; the response face array is
/// mapped field-by-field into [`Observation`] values. Every failure
/// mode (missing configuration, transport error, non-success status,
/// unparseable body) degrades to an empty list with a log line;
/// nothing propagates past this boundary.
pub struct HttpFaceDetector {
    client: reqwest::blocking::Client,
    provider_key: String,
    provider_endpoint: String,
}

impl HttpFaceDetector {
    pub fn new(provider_key: String, provider_endpoint: String) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            provider_key,
            provider_endpoint,
        }
    }

    fn detect_inner(&self, image: &[u8], timestamp: u64) -> Result<Vec<Observation>, DetectError> {
        if self.provider_key.is_empty() || self.provider_endpoint.is_empty() {
            return Err(DetectError::NotConfigured);
        }

        let url = format!(
            "{}{DETECT_PATH}?returnFaceAttributes={DETECT_ATTRIBUTES}",
            self.provider_endpoint
        );
        let response = self
            .client
            .post(&url)
            .header(PROVIDER_KEY_HEADER, &self.provider_key)
            .header("Content-Type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .map_err(|e| DetectError::Request {
                url: url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(DetectError::Status(response.status()));
        }

        let body: Value = response.json().map_err(|e| DetectError::Request {
            url: url.clone(),
            source: e,
        })?;
        let faces = body.as_array().ok_or(DetectError::MalformedBody)?;
        Ok(faces
            .iter()
            .map(|face| parse_face(face, timestamp))
            .collect())
    }
}

impl FaceDetector for HttpFaceDetector {
    fn detect(&mut self, image: &[u8], timestamp: u64) -> Vec<Observation> {
        match self.detect_inner(image, timestamp) {
            Ok(observations) => observations,
            Err(DetectError::NotConfigured) => {
                log::warn!("face detection skipped: {}", DetectError::NotConfigured);
                Vec::new()
            }
            Err(e) => {
                log::error!("face detection failed: {e}");
                Vec::new()
            }
        }
    }
}

/// Maps one provider face object into an observation. Absent or
/// mistyped fields default to zero/"unknown"; a malformed entry never
/// aborts the rest of the response.
pub fn parse_face(face: &Value, timestamp: u64) -> Observation {
    let attrs = face.get("faceAttributes");
    let rect = face.get("faceRectangle");

    Observation {
        face_id: str_field(face, "faceId"),
        timestamp,
        gender: Gender::parse(&opt_str(attrs, "gender")),
        age: opt_f64(attrs, "age") as u32,
        smile_score: opt_f64(attrs, "smile"),
        head_yaw: attrs
            .and_then(|a| a.get("headPose"))
            .and_then(|p| p.get("yaw"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        bounding_box: BoundingBox {
            left: opt_i64(rect, "left") as i32,
            top: opt_i64(rect, "top") as i32,
            width: opt_i64(rect, "width") as i32,
            height: opt_i64(rect, "height") as i32,
        },
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_str(value: Option<&Value>, key: &str) -> String {
    value
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

fn opt_f64(value: Option<&Value>, key: &str) -> f64 {
    value
        .and_then(|v| v.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn opt_i64(value: Option<&Value>, key: &str) -> i64 {
    value
        .and_then(|v| v.get(key))
        .and_then(Value::as_i64)
        .unwrap_or(0)
}
