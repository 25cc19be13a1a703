use crate::content::SubmissionKind;
use std::collections::HashMap;

/// Learner progress on a quiz block. Incorrect answers keep the block
/// retriable; a correct answer is terminal and applies its unlock once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizProgress {
    Unanswered,
    Incorrect { last_choice: usize },
    Correct { choice: usize, unlock_applied: bool },
}

/// Learner progress on an assignment block.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentProgress {
    pub chosen: Option<SubmissionKind>,
    pub status: SubmissionStatus,
}

impl Default for AssignmentProgress {
    fn default() -> Self {
        AssignmentProgress {
            chosen: None,
            status: SubmissionStatus::NotSubmitted,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionStatus {
    NotSubmitted,
    /// Rejected locally before any request went out (e.g. an oversize file).
    Rejected { reason: String },
    InFlight { request_id: u64 },
    /// The submission collaborator failed; the learner may retry.
    Failed { error: String },
    Accepted,
}

/// Outcome of handing the lesson off to the progress collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionState {
    NotRequested,
    Requested,
    Completed { next_node_id: Option<String> },
    Failed,
}

/// Per-block runtime progress, kept alongside the immutable block list and
/// keyed by block index. Blocks themselves are never mutated.
#[derive(Debug, Clone)]
pub(in crate::engine) struct InteractionState {
    pub(in crate::engine) quizzes: HashMap<usize, QuizProgress>,
    pub(in crate::engine) assignments: HashMap<usize, AssignmentProgress>,
    next_request_id: u64,
    pub(in crate::engine) completion: CompletionState,
}

impl InteractionState {
    pub(in crate::engine) fn new() -> Self {
        InteractionState {
            quizzes: HashMap::new(),
            assignments: HashMap::new(),
            next_request_id: 0,
            completion: CompletionState::NotRequested,
        }
    }

    pub(in crate::engine) fn quiz(&self, block_index: usize) -> QuizProgress {
        self.quizzes
            .get(&block_index)
            .copied()
            .unwrap_or(QuizProgress::Unanswered)
    }

    pub(in crate::engine) fn set_quiz(&mut self, block_index: usize, progress: QuizProgress) {
        self.quizzes.insert(block_index, progress);
    }

    pub(in crate::engine) fn assignment(&self, block_index: usize) -> AssignmentProgress {
        self.assignments
            .get(&block_index)
            .cloned()
            .unwrap_or_default()
    }

    pub(in crate::engine) fn assignment_mut(
        &mut self,
        block_index: usize,
    ) -> &mut AssignmentProgress {
        self.assignments.entry(block_index).or_default()
    }

    /// Request ids are monotonic so a stale submission resolution can never
    /// impersonate the current one.
    pub(in crate::engine) fn allocate_request_id(&mut self) -> u64 {
        self.next_request_id = self.next_request_id.wrapping_add(1);
        self.next_request_id
    }
}
