use crate::shared::observation::{Gender, Observation};
use crate::tracking::domain::gaze::GazeBand;

/// Aggregate state of one continuously-tracked face identity between
/// its first and last sighting.
///
/// Demographics are first-write-wins: the first observation carrying a
/// non-sentinel value (gender other than `unknown`, age above zero)
/// seeds the field and later observations never overwrite it.
#[derive(Clone, Debug)]
pub struct TrackSession {
    pub face_id: String,
    pub first_seen: u64,
    pub last_seen: u64,
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub dwell_time: u64,
    pub gaze_window_start: Option<u64>,
    pub total_gaze_time: u64,
}

impl TrackSession {
    /// Creates a session from its first observation. Dwell and gaze
    /// total start at zero; an in-band first sighting already opens
    /// the gaze window so engagement from the very first frame counts.
    pub fn from_observation(observation: &Observation, band: &GazeBand) -> Self {
        let mut session = Self {
            face_id: observation.face_id.clone(),
            first_seen: observation.timestamp,
            last_seen: observation.timestamp,
            gender: None,
            age: None,
            dwell_time: 0,
            gaze_window_start: None,
            total_gaze_time: 0,
        };
        session.seed_demographics(observation);
        let (start, _) = band.apply(observation.head_yaw, None, 0, observation.timestamp);
        session.gaze_window_start = start;
        session
    }

    /// Applies a repeat sighting: refresh `last_seen`, recompute dwell,
    /// seed still-unset demographics, and run the gaze-band policy.
    pub fn update(&mut self, observation: &Observation, band: &GazeBand) {
        self.last_seen = observation.timestamp;
        self.dwell_time = self.last_seen.saturating_sub(self.first_seen);
        self.seed_demographics(observation);

        let (start, total) = band.apply(
            observation.head_yaw,
            self.gaze_window_start,
            self.total_gaze_time,
            observation.timestamp,
        );
        self.gaze_window_start = start;
        // Out-of-order timestamps can shrink dwell below an already
        // accumulated gaze span; clamp so gaze never exceeds dwell.
        self.total_gaze_time = total.min(self.dwell_time);
    }

    fn seed_demographics(&mut self, observation: &Observation) {
        if self.gender.is_none() && observation.gender != Gender::Unknown {
            self.gender = Some(observation.gender);
        }
        if self.age.is_none() && observation.age > 0 {
            self.age = Some(observation.age);
        }
    }

    /// Whether the session has gone unobserved for longer than
    /// `idle_timeout_ms` as of `now`. Strictly greater: a session idle
    /// for exactly the timeout survives one more sweep.
    pub fn is_stale(&self, now: u64, idle_timeout_ms: u64) -> bool {
        now.saturating_sub(self.last_seen) > idle_timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::observation::BoundingBox;

    fn obs(face_id: &str, timestamp: u64, gender: Gender, age: u32, yaw: f64) -> Observation {
        Observation {
            face_id: face_id.to_string(),
            timestamp,
            gender,
            age,
            smile_score: 0.0,
            head_yaw: yaw,
            bounding_box: BoundingBox {
                left: 0,
                top: 0,
                width: 10,
                height: 10,
            },
        }
    }

    fn band() -> GazeBand {
        GazeBand::default()
    }

    #[test]
    fn test_from_observation_initial_state() {
        let s = TrackSession::from_observation(&obs("f1", 500, Gender::Female, 31, 0.0), &band());
        assert_eq!(s.face_id, "f1");
        assert_eq!(s.first_seen, 500);
        assert_eq!(s.last_seen, 500);
        assert_eq!(s.dwell_time, 0);
        assert_eq!(s.total_gaze_time, 0);
        assert_eq!(s.gender, Some(Gender::Female));
        assert_eq!(s.age, Some(31));
    }

    #[test]
    fn test_first_in_band_observation_opens_window() {
        let s = TrackSession::from_observation(&obs("f1", 500, Gender::Unknown, 0, 0.0), &band());
        assert_eq!(s.gaze_window_start, Some(500));
        assert_eq!(s.total_gaze_time, 0);
    }

    #[test]
    fn test_first_out_of_band_observation_leaves_window_closed() {
        let s = TrackSession::from_observation(&obs("f1", 500, Gender::Unknown, 0, 30.0), &band());
        assert_eq!(s.gaze_window_start, None);
    }

    #[test]
    fn test_sentinel_values_leave_demographics_unset() {
        let s = TrackSession::from_observation(&obs("f1", 0, Gender::Unknown, 0, 0.0), &band());
        assert_eq!(s.gender, None);
        assert_eq!(s.age, None);
    }

    #[test]
    fn test_demographics_seeded_on_later_observation() {
        let mut s = TrackSession::from_observation(&obs("f1", 0, Gender::Unknown, 0, 0.0), &band());
        s.update(&obs("f1", 1000, Gender::Male, 42, 0.0), &band());
        assert_eq!(s.gender, Some(Gender::Male));
        assert_eq!(s.age, Some(42));
    }

    #[test]
    fn test_demographics_first_write_wins() {
        let mut s = TrackSession::from_observation(&obs("f1", 0, Gender::Male, 30, 0.0), &band());
        s.update(&obs("f1", 1000, Gender::Female, 55, 0.0), &band());
        assert_eq!(s.gender, Some(Gender::Male));
        assert_eq!(s.age, Some(30));
    }

    #[test]
    fn test_dwell_tracks_first_to_last() {
        let mut s =
            TrackSession::from_observation(&obs("f1", 100, Gender::Unknown, 0, 30.0), &band());
        s.update(&obs("f1", 4100, Gender::Unknown, 0, 30.0), &band());
        assert_eq!(s.dwell_time, 4000);
        assert_eq!(s.last_seen, 4100);
    }

    #[test]
    fn test_out_of_order_observation_clamps_dwell() {
        let mut s =
            TrackSession::from_observation(&obs("f1", 5000, Gender::Unknown, 0, 30.0), &band());
        s.update(&obs("f1", 3000, Gender::Unknown, 0, 30.0), &band());
        assert_eq!(s.last_seen, 3000);
        assert_eq!(s.dwell_time, 0);
    }

    #[test]
    fn test_gaze_never_exceeds_dwell() {
        // First sighting out of band, then an older in-band pair whose
        // window span would exceed the collapsed dwell.
        let mut s =
            TrackSession::from_observation(&obs("f1", 100, Gender::Unknown, 0, 40.0), &band());
        s.update(&obs("f1", 10, Gender::Unknown, 0, 0.0), &band());
        s.update(&obs("f1", 90, Gender::Unknown, 0, 0.0), &band());
        assert!(s.total_gaze_time <= s.dwell_time);
    }

    #[test]
    fn test_dwell_and_gaze_over_interrupted_engagement() {
        // t=0 yaw 0°, t=1000 yaw 0°, t=9000 yaw 40°
        let mut s = TrackSession::from_observation(&obs("f1", 0, Gender::Unknown, 0, 0.0), &band());
        s.update(&obs("f1", 1000, Gender::Unknown, 0, 0.0), &band());
        s.update(&obs("f1", 9000, Gender::Unknown, 0, 40.0), &band());
        assert_eq!(s.dwell_time, 9000);
        assert_eq!(s.total_gaze_time, 1000);
        assert_eq!(s.gaze_window_start, None);
    }

    #[test]
    fn test_staleness_strictly_greater_than_timeout() {
        let s = TrackSession::from_observation(&obs("f1", 0, Gender::Unknown, 0, 0.0), &band());
        assert!(!s.is_stale(10_000, 10_000));
        assert!(s.is_stale(10_001, 10_000));
    }

    #[test]
    fn test_eviction_arithmetic_after_idle_gap() {
        let mut s = TrackSession::from_observation(&obs("f1", 0, Gender::Unknown, 0, 0.0), &band());
        s.update(&obs("f1", 9000, Gender::Unknown, 0, 0.0), &band());
        assert!(s.is_stale(20_000, 10_000)); // 11000 > 10000
        assert_eq!(s.dwell_time, 9000);
    }
}
