use crate::content::SubmissionKind;

/// Messages delivered to the engine by the hosting view and its
/// collaborators: learner interactions, speech-engine callbacks, timers,
/// per-frame ticks, and viewport geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    QuizOptionSelected {
        block_idx: usize,
        option_idx: usize,
    },
    /// The perceptual feedback delay after a correct answer has elapsed.
    QuizFeedbackElapsed {
        block_idx: usize,
    },
    AssignmentModalityChosen {
        block_idx: usize,
        kind: SubmissionKind,
    },
    AssignmentSubmitted {
        block_idx: usize,
        payload: SubmissionPayload,
    },
    SubmissionResolved {
        block_idx: usize,
        request_id: u64,
        error: Option<String>,
    },
    AssignmentSkipped {
        block_idx: usize,
    },
    /// A text block became the learner's current reading focus.
    BlockFocused {
        block_idx: usize,
    },
    CompleteLesson,
    CompletionResolved {
        success: bool,
        next_node_id: Option<String>,
    },
    ToggleReadAloud,
    StopReadAloud,
    /// Word-boundary progress, with `char_index` relative to the spoken
    /// block's own text.
    SpeechBoundary {
        generation: u64,
        char_index: usize,
    },
    SpeechFinished {
        generation: u64,
    },
    SpeechFailed {
        generation: u64,
        error: String,
    },
    ToggleAutoScroll,
    SetAutoScrollSpeed(f32),
    /// Per-frame callback from the host rendering surface.
    FrameTick,
    Scrolled {
        scroll_top: f32,
        viewport_height: f32,
        content_height: f32,
    },
    ScrollGestureStarted,
    ScrollGestureEnded,
}

/// One submission attempt for an assignment block.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPayload {
    Text { body: String },
    File { name: String, size_bytes: u64 },
    Link { url: String },
}

impl SubmissionPayload {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            SubmissionPayload::Text { .. } => SubmissionKind::Text,
            SubmissionPayload::File { .. } => SubmissionKind::File,
            SubmissionPayload::Link { .. } => SubmissionKind::Link,
        }
    }
}
