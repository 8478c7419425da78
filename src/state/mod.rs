pub mod app_settings;
pub mod app_state;
pub mod debounce;
pub mod messages;
pub mod network;
pub mod shutdown;
pub mod ticker;
