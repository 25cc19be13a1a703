use super::defaults;
use super::models::{AppConfig, LogLevel};
use serde::Deserialize;

/// Grouped view of `conf/config.toml`. The engine works with the flat
/// `AppConfig`; these tables only exist to keep the file readable.
#[derive(Debug, Clone, Deserialize, Default)]
pub(super) struct ConfigTables {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    gating: GatingConfig,
    #[serde(default)]
    read_aloud: ReadAloudConfig,
    #[serde(default)]
    auto_scroll: AutoScrollConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            log_level: tables.logging.log_level,
            quiz_feedback_delay_ms: tables.gating.quiz_feedback_delay_ms,
            enforce_assignment_gates: tables.gating.enforce_assignment_gates,
            max_submission_bytes: tables.gating.max_submission_bytes,
            speech_rate: tables.read_aloud.speech_rate,
            auto_scroll_base_rate: tables.auto_scroll.base_rate,
            auto_scroll_speed: tables.auto_scroll.default_speed,
            bottom_epsilon_px: tables.auto_scroll.bottom_epsilon_px,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GatingConfig {
    #[serde(default = "defaults::default_quiz_feedback_delay_ms")]
    quiz_feedback_delay_ms: u64,
    #[serde(default = "defaults::default_enforce_assignment_gates")]
    enforce_assignment_gates: bool,
    #[serde(default = "defaults::default_max_submission_bytes")]
    max_submission_bytes: u64,
}

impl Default for GatingConfig {
    fn default() -> Self {
        GatingConfig {
            quiz_feedback_delay_ms: defaults::default_quiz_feedback_delay_ms(),
            enforce_assignment_gates: defaults::default_enforce_assignment_gates(),
            max_submission_bytes: defaults::default_max_submission_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ReadAloudConfig {
    #[serde(default = "defaults::default_speech_rate")]
    speech_rate: f32,
}

impl Default for ReadAloudConfig {
    fn default() -> Self {
        ReadAloudConfig {
            speech_rate: defaults::default_speech_rate(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AutoScrollConfig {
    #[serde(default = "defaults::default_auto_scroll_base_rate")]
    base_rate: f32,
    #[serde(default = "defaults::default_auto_scroll_speed")]
    default_speed: f32,
    #[serde(default = "defaults::default_bottom_epsilon_px")]
    bottom_epsilon_px: f32,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        AutoScrollConfig {
            base_rate: defaults::default_auto_scroll_base_rate(),
            default_speed: defaults::default_auto_scroll_speed(),
            bottom_epsilon_px: defaults::default_bottom_epsilon_px(),
        }
    }
}
