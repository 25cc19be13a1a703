use crate::content::BlockId;
use crate::engine::messages::SubmissionPayload;
use std::time::Duration;

mod interaction;
mod read_aloud;
mod reducer;
mod scroll;

/// Describes work that must be performed outside the pure reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start one speech-synthesis operation for a single block's text.
    Speak {
        generation: u64,
        block_id: BlockId,
        text: String,
        rate: f32,
    },
    /// Cooperatively cancel the in-flight speech operation, if any.
    CancelSpeech,
    /// Fire `QuizFeedbackElapsed` for this block after `delay`.
    ScheduleQuizUnlock { block_idx: usize, delay: Duration },
    SubmitAssignment {
        block_idx: usize,
        request_id: u64,
        payload: SubmissionPayload,
    },
    ScrollTo { offset_px: f32 },
    /// Bring the highlighted block into view. Placement is nearest-edge, so
    /// the follow scroll never fights the other scroll drivers.
    RevealHighlight { block_id: BlockId },
    /// Hand the focused text to the AI-context collaborator.
    UpdateAiContext { text: String },
    /// Hand the finished lesson to the progress collaborator.
    MarkNodeComplete { node_id: String },
}
