use std::time::Duration;

/// Head-yaw half-width (degrees) of the "facing the camera" band.
/// Bounds are inclusive and symmetric around zero.
pub const GAZE_BAND_DEGREES: f64 = 15.0;

/// A session with no observation for longer than this is evicted.
pub const IDLE_TIMEOUT_MS: u64 = 10_000;

/// Fixed period of the eviction sweep. Independent of the idle
/// timeout; the two are separate knobs.
pub const SWEEP_PERIOD: Duration = Duration::from_secs(2);

/// Minimum gap between detection calls for one source, enforced by the
/// frame loop regardless of whether the prior call has finished.
pub const DETECT_COOLDOWN: Duration = Duration::from_secs(2);

/// Attribute selection sent to the detection provider.
pub const DETECT_ATTRIBUTES: &str = "age,gender,headPose,smile";

/// Provider detect path, appended to the configured base endpoint.
pub const DETECT_PATH: &str = "face/v1.0/detect";

pub const PROVIDER_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

pub const DEFAULT_STORE_ID: &str = "store_001";
pub const DEFAULT_DEVICE_ID: &str = "unknown-device";

/// Connect/read timeout for upload round trips.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
