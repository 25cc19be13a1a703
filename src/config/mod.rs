//! Configuration loading for the lesson engine.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so a session can still start.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config};
pub use models::{AppConfig, LogLevel, clamp_config};
pub(crate) use models::MIN_AUTO_SCROLL_SPEED;
