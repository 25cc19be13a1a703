pub(crate) fn default_quiz_feedback_delay_ms() -> u64 {
    600
}

pub(crate) fn default_enforce_assignment_gates() -> bool {
    true
}

pub(crate) fn default_max_submission_bytes() -> u64 {
    10 * 1024 * 1024
}

pub(crate) fn default_speech_rate() -> f32 {
    1.0
}

pub(crate) fn default_auto_scroll_base_rate() -> f32 {
    0.6
}

pub(crate) fn default_auto_scroll_speed() -> f32 {
    1.0
}

pub(crate) fn default_bottom_epsilon_px() -> f32 {
    10.0
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}
