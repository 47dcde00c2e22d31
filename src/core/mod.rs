pub mod app_context;
pub mod camera_manager;
pub mod camera_source;
pub mod event_dispatcher;
pub mod snapshot_fetcher;
