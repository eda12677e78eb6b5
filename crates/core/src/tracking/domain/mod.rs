pub mod gaze;
pub mod registry;
pub mod track_session;
