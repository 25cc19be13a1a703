//! The lesson engine: a host-agnostic reducer over one lesson view's state.
//!
//! The hosting view delivers `Message`s (learner interactions, speech-engine
//! callbacks, per-frame ticks, viewport geometry) and executes the returned
//! `Effect`s; `view()` projects the current state into renderable nodes.
//! Everything runs single-threaded and cooperatively: each message is
//! processed to completion before the next is considered.

mod messages;
mod state;
mod update;
mod view;

pub use messages::{Message, SubmissionPayload};
pub use state::{
    AssignmentProgress, CompletionState, LessonEngine, QuizProgress, SubmissionStatus,
};
pub use update::Effect;
pub use view::{BlockNode, HighlightTarget, LessonView, RenderNode};
