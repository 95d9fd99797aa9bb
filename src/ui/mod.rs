pub mod gamepad;
pub mod input;
pub mod status_log;
pub mod view;
