use serde::Serialize;

/// Reported gender attribute for a detected face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    /// Parses a provider attribute string; anything unrecognized maps
    /// to `Unknown` rather than failing the observation.
    pub fn parse(value: &str) -> Self {
        match value {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pixel rectangle of a detected face within its source frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// One face-detection result for one frame.
///
/// Immutable once constructed. `face_id` is stable across frames from
/// the same provider call and opaque otherwise; `timestamp` is
/// milliseconds on the device's monotonic capture clock.
#[derive(Clone, Debug)]
pub struct Observation {
    pub face_id: String,
    pub timestamp: u64,
    pub gender: Gender,
    pub age: u32,
    pub smile_score: f64,
    pub head_yaw: f64,
    pub bounding_box: BoundingBox,
}
