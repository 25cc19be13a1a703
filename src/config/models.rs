use serde::Deserialize;

/// High-level engine configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_quiz_feedback_delay_ms")]
    pub quiz_feedback_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_enforce_assignment_gates")]
    pub enforce_assignment_gates: bool,
    #[serde(default = "crate::config::defaults::default_max_submission_bytes")]
    pub max_submission_bytes: u64,
    #[serde(default = "crate::config::defaults::default_speech_rate")]
    pub speech_rate: f32,
    #[serde(default = "crate::config::defaults::default_auto_scroll_base_rate")]
    pub auto_scroll_base_rate: f32,
    #[serde(default = "crate::config::defaults::default_auto_scroll_speed")]
    pub auto_scroll_speed: f32,
    #[serde(default = "crate::config::defaults::default_bottom_epsilon_px")]
    pub bottom_epsilon_px: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: crate::config::defaults::default_log_level(),
            quiz_feedback_delay_ms: crate::config::defaults::default_quiz_feedback_delay_ms(),
            enforce_assignment_gates: crate::config::defaults::default_enforce_assignment_gates(),
            max_submission_bytes: crate::config::defaults::default_max_submission_bytes(),
            speech_rate: crate::config::defaults::default_speech_rate(),
            auto_scroll_base_rate: crate::config::defaults::default_auto_scroll_base_rate(),
            auto_scroll_speed: crate::config::defaults::default_auto_scroll_speed(),
            bottom_epsilon_px: crate::config::defaults::default_bottom_epsilon_px(),
        }
    }
}

/// Bound every numeric setting so a hand-edited config cannot wedge the
/// engine. The auto-scroll speed multiplier only gets a lower bound; capping
/// it is a host UI decision.
pub fn clamp_config(config: &mut AppConfig) {
    config.quiz_feedback_delay_ms = config.quiz_feedback_delay_ms.min(10_000);
    config.max_submission_bytes = config.max_submission_bytes.max(1);
    config.speech_rate = if config.speech_rate.is_finite() {
        config.speech_rate.clamp(MIN_SPEECH_RATE, MAX_SPEECH_RATE)
    } else {
        crate::config::defaults::default_speech_rate()
    };
    config.auto_scroll_base_rate = if config.auto_scroll_base_rate.is_finite() {
        config.auto_scroll_base_rate.clamp(0.05, 50.0)
    } else {
        crate::config::defaults::default_auto_scroll_base_rate()
    };
    config.auto_scroll_speed = if config.auto_scroll_speed.is_finite() {
        config.auto_scroll_speed.max(MIN_AUTO_SCROLL_SPEED)
    } else {
        crate::config::defaults::default_auto_scroll_speed()
    };
    config.bottom_epsilon_px = if config.bottom_epsilon_px.is_finite() {
        config.bottom_epsilon_px.clamp(0.0, 100.0)
    } else {
        crate::config::defaults::default_bottom_epsilon_px()
    };
}

pub(crate) const MIN_SPEECH_RATE: f32 = 0.1;
pub(crate) const MAX_SPEECH_RATE: f32 = 3.0;
pub(crate) const MIN_AUTO_SCROLL_SPEED: f32 = 0.05;

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, clamp_config};

    #[test]
    fn clamp_keeps_speed_unbounded_above() {
        let mut config = AppConfig::default();
        config.auto_scroll_speed = 40.0;
        clamp_config(&mut config);
        assert_eq!(config.auto_scroll_speed, 40.0);
    }

    #[test]
    fn clamp_repairs_non_finite_values() {
        let mut config = AppConfig::default();
        config.speech_rate = f32::NAN;
        config.auto_scroll_speed = f32::INFINITY;
        clamp_config(&mut config);
        assert_eq!(config.speech_rate, 1.0);
        assert_eq!(config.auto_scroll_speed, 1.0);
    }
}
