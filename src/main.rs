//! Entry point for the lesson session driver.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load the lesson document via `content`.
//! - Load user configuration from `conf/config.toml`.
//! - Boot the engine and hand control to the interactive driver.

mod config;
mod content;
mod driver;
mod engine;
mod text_utils;

use crate::config::load_config;
use crate::content::load_lesson;
use crate::driver::SessionDriver;
use crate::engine::LessonEngine;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

static SIGINT_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Consume a pending interrupt request, if any.
pub(crate) fn take_sigint_requested() -> bool {
    SIGINT_REQUESTED.swap(false, Ordering::AcqRel)
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args()?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %args.lesson_path.display(),
        level = %config.log_level,
        "Starting lesson session"
    );

    if let Err(err) = ctrlc::set_handler(|| SIGINT_REQUESTED.store(true, Ordering::Release)) {
        warn!("Failed to install interrupt handler: {err}");
    }

    let document = load_lesson(&args.lesson_path)?;
    let node_id = args
        .lesson_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("lesson")
        .to_string();
    let title = args
        .title
        .unwrap_or_else(|| node_id.replace(['-', '_'], " "));

    let engine = LessonEngine::bootstrap(document, node_id, title, config);
    SessionDriver::new(engine)
        .run()
        .context("Session driver failed")?;
    Ok(())
}

struct Args {
    lesson_path: PathBuf,
    title: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow!("Usage: lessonforge <lesson.json> [title]"))?;

    let lesson_path = PathBuf::from(path);
    if !lesson_path.exists() {
        return Err(anyhow!("File not found: {}", lesson_path.display()));
    }
    let title = args.next();
    Ok(Args { lesson_path, title })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
