use crate::shared::constants::GAZE_BAND_DEGREES;

/// Gaze-band policy: decides, for one observation, whether the subject
/// is engaged (facing the camera) and how that changes the open gaze
/// window and accumulated gaze time.
///
/// The policy deliberately overwrites `total_gaze` with the span of the
/// latest open window instead of summing disjoint windows; closing the
/// window (yaw leaving the band) leaves the total untouched.
#[derive(Clone, Copy, Debug)]
pub struct GazeBand {
    half_width_degrees: f64,
}

impl GazeBand {
    pub fn new(half_width_degrees: f64) -> Self {
        Self { half_width_degrees }
    }

    /// Band bounds are inclusive: yaw exactly at ±half-width counts as
    /// engaged.
    pub fn contains(&self, yaw: f64) -> bool {
        yaw >= -self.half_width_degrees && yaw <= self.half_width_degrees
    }

    /// Applies one observation to the gaze state.
    ///
    /// Returns `(window_start, total_gaze)` after the observation.
    /// Inside the band: open the window if closed, otherwise overwrite
    /// the total with the open window's span. Outside: close the
    /// window without touching the total. Spans saturate at zero so
    /// out-of-order timestamps never produce negative durations.
    pub fn apply(
        &self,
        yaw: f64,
        window_start: Option<u64>,
        total_gaze: u64,
        timestamp: u64,
    ) -> (Option<u64>, u64) {
        if self.contains(yaw) {
            match window_start {
                None => (Some(timestamp), total_gaze),
                Some(start) => (Some(start), timestamp.saturating_sub(start)),
            }
        } else {
            (None, total_gaze)
        }
    }
}

impl Default for GazeBand {
    fn default() -> Self {
        Self::new(GAZE_BAND_DEGREES)
    }
}
