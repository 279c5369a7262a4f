pub mod config;
pub mod console_display;
pub mod data_logger;
pub mod gate;
pub mod intune;
pub mod note;
pub mod pipeline;
pub mod simulator;
pub mod smoothing;
pub mod stability;
pub mod sustain;
pub mod tracker;
pub mod types;
