pub mod ring_camera;
pub mod ring_session;
pub mod ring_types;
