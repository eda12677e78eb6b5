use std::collections::HashMap;
use std::sync::Mutex;

use crate::shared::observation::Observation;
use crate::tracking::domain::gaze::GazeBand;
use crate::tracking::domain::track_session::TrackSession;

/// Owns the face-identity → session map and applies the
/// create/update/evict transitions.
///
/// All operations serialize on one internal lock: updates arrive from
/// per-source frame loops while the eviction sweep runs on its own
/// timer thread, and both mutate the same map.
pub struct TrackingRegistry {
    sessions: Mutex<HashMap<String, TrackSession>>,
    band: GazeBand,
}

impl TrackingRegistry {
    pub fn new(band: GazeBand) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            band,
        }
    }

    /// Applies one observation: refreshes the matching session or
    /// creates a new one for an unseen `face_id`.
    pub fn update(&self, observation: &Observation) {
        let mut sessions = self.lock();
        match sessions.get_mut(&observation.face_id) {
            Some(session) => session.update(observation, &self.band),
            None => {
                let session = TrackSession::from_observation(observation, &self.band);
                sessions.insert(observation.face_id.clone(), session);
            }
        }
    }

    /// Removes and returns every session idle past `idle_timeout_ms`
    /// as of `now`. Evicted sessions never re-enter the registry; a
    /// reappearing `face_id` starts a fresh session.
    pub fn evict_stale(&self, now: u64, idle_timeout_ms: u64) -> Vec<TrackSession> {
        let mut sessions = self.lock();
        let stale_ids: Vec<String> = sessions
            .values()
            .filter(|s| s.is_stale(now, idle_timeout_ms))
            .map(|s| s.face_id.clone())
            .collect();
        stale_ids
            .iter()
            .filter_map(|id| sessions.remove(id))
            .collect()
    }

    /// Removes and returns every session regardless of idleness. Used
    /// when a finite source is exhausted so no session-closed event is
    /// lost at shutdown.
    pub fn drain(&self) -> Vec<TrackSession> {
        self.lock().drain().map(|(_, s)| s).collect()
    }

    /// Read-only copy of the current sessions, for diagnostics and
    /// batch-event snapshots.
    pub fn snapshot(&self) -> Vec<TrackSession> {
        self.lock().values().cloned().collect()
    }

    /// Current session for one face, if tracked.
    pub fn session(&self, face_id: &str) -> Option<TrackSession> {
        self.lock().get(face_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, TrackSession>> {
        // A panic while holding the lock leaves consistent-enough state
        // (sessions are updated atomically per call); keep running.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TrackingRegistry {
    fn default() -> Self {
        Self::new(GazeBand::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::observation::{BoundingBox, Gender};

    fn obs(face_id: &str, timestamp: u64, yaw: f64) -> Observation {
        Observation {
            face_id: face_id.to_string(),
            timestamp,
            gender: Gender::Unknown,
            age: 0,
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

    #[test]
    fn test_first_observation_creates_session() {
        let registry = TrackingRegistry::default();
        registry.update(&obs("f1", 100, 0.0));
        let s = registry.session("f1").unwrap();
        assert_eq!(s.first_seen, 100);
        assert_eq!(s.last_seen, 100);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_repeat_observation_refreshes_session() {
        let registry = TrackingRegistry::default();
        registry.update(&obs("f1", 100, 0.0));
        registry.update(&obs("f1", 2100, 0.0));
        let s = registry.session("f1").unwrap();
        assert_eq!(s.dwell_time, 2000);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_faces_get_distinct_sessions() {
        let registry = TrackingRegistry::default();
        registry.update(&obs("f1", 100, 0.0));
        registry.update(&obs("f2", 100, 0.0));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_evict_stale_removes_only_idle_sessions() {
        let registry = TrackingRegistry::default();
        registry.update(&obs("old", 0, 0.0));
        registry.update(&obs("fresh", 15_000, 0.0));

        let evicted = registry.evict_stale(20_000, 10_000);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].face_id, "old");
        assert_eq!(registry.len(), 1);
        assert!(registry.session("fresh").is_some());
    }

    #[test]
    fn test_evicted_session_absent_from_snapshot() {
        let registry = TrackingRegistry::default();
        registry.update(&obs("f1", 0, 0.0));
        registry.evict_stale(20_000, 10_000);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_session_idle_exactly_timeout_survives() {
        let registry = TrackingRegistry::default();
        registry.update(&obs("f1", 0, 0.0));
        let evicted = registry.evict_stale(10_000, 10_000);
        assert!(evicted.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reappearance_after_eviction_starts_new_session() {
        let registry = TrackingRegistry::default();
        registry.update(&obs("f1", 0, 0.0));
        registry.update(&obs("f1", 9000, 0.0));
        let evicted = registry.evict_stale(20_000, 10_000);
        assert_eq!(evicted[0].dwell_time, 9000);

        registry.update(&obs("f1", 30_000, 0.0));
        let s = registry.session("f1").unwrap();
        assert_eq!(s.first_seen, 30_000);
        assert_eq!(s.dwell_time, 0);
    }

    #[test]
    fn test_dwell_equals_last_minus_first_for_increasing_timestamps() {
        let registry = TrackingRegistry::default();
        let stamps = [0u64, 300, 800, 2500, 7000];
        for t in stamps {
            registry.update(&obs("f1", t, 20.0));
        }
        let s = registry.session("f1").unwrap();
        assert_eq!(s.dwell_time, 7000);
    }

    #[test]
    fn test_gaze_bounded_by_dwell_after_every_update() {
        let registry = TrackingRegistry::default();
        let sequence = [
            (0u64, 0.0),
            (1000, 10.0),
            (500, -10.0), // out of order
            (3000, 16.0),
            (4000, -15.0),
            (2000, 0.0), // out of order again
        ];
        for (t, yaw) in sequence {
            registry.update(&obs("f1", t, yaw));
            let s = registry.session("f1").unwrap();
            assert!(
                s.total_gaze_time <= s.dwell_time,
                "gaze {} > dwell {} at t={}",
                s.total_gaze_time,
                s.dwell_time,
                t
            );
        }
    }

    #[test]
    fn test_drain_empties_registry() {
        let registry = TrackingRegistry::default();
        registry.update(&obs("f1", 0, 0.0));
        registry.update(&obs("f2", 0, 0.0));
        let drained = registry.drain();
        assert_eq!(drained.len(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_updates_and_sweeps() {
        use std::sync::Arc;

        let registry = Arc::new(TrackingRegistry::default());
        let mut handles = Vec::new();

        for worker in 0..4 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                for i in 0..250u64 {
                    registry.update(&obs(&format!("w{worker}-{}", i % 10), i * 10, 0.0));
                }
            }));
        }
        let sweeper = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    registry.evict_stale(100_000, 10_000);
                    registry.snapshot();
                }
            })
        };

        for h in handles {
            h.join().unwrap();
        }
        sweeper.join().unwrap();

        // Every surviving session still satisfies the invariants.
        for s in registry.snapshot() {
            assert!(s.first_seen <= s.last_seen);
            assert!(s.total_gaze_time <= s.dwell_time);
        }
    }
}
