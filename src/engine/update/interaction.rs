use super::Effect;
use crate::content::{BlockKind, SubmissionKind};
use crate::engine::messages::SubmissionPayload;
use crate::engine::state::{CompletionState, LessonEngine, QuizProgress, SubmissionStatus};
use std::time::Duration;
use tracing::{debug, info, warn};

impl LessonEngine {
    pub(in crate::engine) fn handle_quiz_option_selected(
        &mut self,
        block_idx: usize,
        option_idx: usize,
        effects: &mut Vec<Effect>,
    ) {
        let Some(block) = self.lesson.document.blocks.get(block_idx) else {
            warn!(block = block_idx, "Quiz answer for an unknown block index");
            return;
        };
        let BlockKind::Quiz {
            options,
            correct_index,
            unlocks,
            ..
        } = &block.kind
        else {
            warn!(block = block_idx, "Quiz answer for a non-quiz block");
            return;
        };
        if option_idx >= options.len() {
            warn!(
                block = block_idx,
                option = option_idx,
                "Quiz answer out of range"
            );
            return;
        }
        if let QuizProgress::Correct { .. } = self.interaction.quiz(block_idx) {
            debug!(block = block_idx, "Quiz already answered correctly");
            return;
        }

        if option_idx == *correct_index {
            let unlocks = *unlocks;
            self.interaction.set_quiz(
                block_idx,
                QuizProgress::Correct {
                    choice: option_idx,
                    unlock_applied: false,
                },
            );
            info!(block = block_idx, "Quiz answered correctly");
            if unlocks {
                // The delay lets the feedback UI be seen before new content
                // appears; it is not part of gating correctness.
                effects.push(Effect::ScheduleQuizUnlock {
                    block_idx,
                    delay: Duration::from_millis(self.config.quiz_feedback_delay_ms),
                });
            }
        } else {
            self.interaction.set_quiz(
                block_idx,
                QuizProgress::Incorrect {
                    last_choice: option_idx,
                },
            );
            debug!(
                block = block_idx,
                choice = option_idx,
                "Quiz answered incorrectly; retries remain open"
            );
        }
    }

    pub(in crate::engine) fn handle_quiz_feedback_elapsed(&mut self, block_idx: usize) {
        let QuizProgress::Correct {
            choice,
            unlock_applied,
        } = self.interaction.quiz(block_idx)
        else {
            debug!(
                block = block_idx,
                "Feedback timer fired for a quiz that is not answered correctly"
            );
            return;
        };
        if unlock_applied {
            debug!(block = block_idx, "Unlock already applied for this quiz");
            return;
        }
        self.interaction.set_quiz(
            block_idx,
            QuizProgress::Correct {
                choice,
                unlock_applied: true,
            },
        );
        self.apply_unlock(block_idx);
    }

    pub(in crate::engine) fn handle_assignment_modality_chosen(
        &mut self,
        block_idx: usize,
        kind: SubmissionKind,
    ) {
        let Some(accepted) = self.assignment_submission_types(block_idx) else {
            warn!(block = block_idx, "Modality choice for a non-assignment block");
            return;
        };
        if !accepted.contains(&kind) {
            warn!(block = block_idx, %kind, "Assignment does not accept this modality");
            return;
        }
        let entry = self.interaction.assignment_mut(block_idx);
        match entry.status {
            SubmissionStatus::InFlight { .. } | SubmissionStatus::Accepted => {
                debug!(block = block_idx, "Modality locked while submission settles");
            }
            _ => {
                entry.chosen = Some(kind);
                debug!(block = block_idx, %kind, "Assignment modality chosen");
            }
        }
    }

    pub(in crate::engine) fn handle_assignment_submitted(
        &mut self,
        block_idx: usize,
        payload: SubmissionPayload,
        effects: &mut Vec<Effect>,
    ) {
        let Some(block) = self.lesson.document.blocks.get(block_idx) else {
            warn!(block = block_idx, "Submission for an unknown block index");
            return;
        };
        let BlockKind::Assignment {
            submission_types,
            max_file_size,
            ..
        } = &block.kind
        else {
            warn!(block = block_idx, "Submission for a non-assignment block");
            return;
        };

        if !submission_types.contains(&payload.kind()) {
            let reason = format!("{} submissions are not accepted here", payload.kind());
            warn!(block = block_idx, %reason, "Rejecting submission");
            self.interaction.assignment_mut(block_idx).status =
                SubmissionStatus::Rejected { reason };
            return;
        }

        // File uploads are validated before any request goes out.
        if let SubmissionPayload::File { name, size_bytes } = &payload {
            let cap = max_file_size.unwrap_or(self.config.max_submission_bytes);
            if *size_bytes > cap {
                let reason = format!("{name} is larger than the {cap} byte limit");
                warn!(block = block_idx, %reason, "Rejecting oversize file");
                self.interaction.assignment_mut(block_idx).status =
                    SubmissionStatus::Rejected { reason };
                return;
            }
        }

        match self.interaction.assignment(block_idx).status {
            SubmissionStatus::InFlight { .. } => {
                debug!(block = block_idx, "Submission already in flight");
                return;
            }
            SubmissionStatus::Accepted => {
                debug!(block = block_idx, "Assignment already accepted");
                return;
            }
            _ => {}
        }

        let request_id = self.interaction.allocate_request_id();
        let entry = self.interaction.assignment_mut(block_idx);
        entry.chosen = Some(payload.kind());
        entry.status = SubmissionStatus::InFlight { request_id };
        info!(block = block_idx, request_id, "Submitting assignment");
        effects.push(Effect::SubmitAssignment {
            block_idx,
            request_id,
            payload,
        });
    }

    pub(in crate::engine) fn handle_submission_resolved(
        &mut self,
        block_idx: usize,
        request_id: u64,
        error: Option<String>,
    ) {
        let current = self.interaction.assignment(block_idx);
        let SubmissionStatus::InFlight {
            request_id: in_flight,
        } = current.status
        else {
            debug!(
                block = block_idx,
                request_id, "Submission result with nothing in flight"
            );
            return;
        };
        if in_flight != request_id {
            debug!(
                block = block_idx,
                request_id,
                current = in_flight,
                "Ignoring stale submission result"
            );
            return;
        }

        match error {
            Some(error) => {
                warn!(block = block_idx, %error, "Assignment submission failed; retry available");
                self.interaction.assignment_mut(block_idx).status =
                    SubmissionStatus::Failed { error };
            }
            None => {
                info!(block = block_idx, "Assignment submission accepted");
                self.interaction.assignment_mut(block_idx).status = SubmissionStatus::Accepted;
                self.apply_unlock(block_idx);
            }
        }
    }

    /// Skipping is governed by the runtime enforcement flag, not by the
    /// block's own authoring-time `is_blocking` attribute alone.
    pub(in crate::engine) fn handle_assignment_skipped(&mut self, block_idx: usize) {
        let Some(block) = self.lesson.document.blocks.get(block_idx) else {
            warn!(block = block_idx, "Skip request for an unknown block index");
            return;
        };
        let BlockKind::Assignment { is_blocking, .. } = &block.kind else {
            warn!(block = block_idx, "Skip request for a non-assignment block");
            return;
        };

        if *is_blocking && self.config.enforce_assignment_gates {
            warn!(block = block_idx, "Skip refused; assignment gate is enforced");
            return;
        }
        info!(block = block_idx, "Assignment skipped without a submission");
        self.apply_unlock(block_idx);
    }

    pub(in crate::engine) fn handle_block_focused(
        &mut self,
        block_idx: usize,
        effects: &mut Vec<Effect>,
    ) {
        if block_idx > self.unlock.unlocked_index {
            debug!(block = block_idx, "Focus beyond the unlock boundary");
            return;
        }
        let Some(block) = self.lesson.document.blocks.get(block_idx) else {
            return;
        };
        if let BlockKind::Text { content, .. } = &block.kind {
            debug!(block = block_idx, "Reading focus moved; updating AI context");
            effects.push(Effect::UpdateAiContext {
                text: content.clone(),
            });
        }
    }

    pub(in crate::engine) fn handle_complete_lesson(&mut self, effects: &mut Vec<Effect>) {
        match self.interaction.completion {
            CompletionState::Requested => {
                debug!("Lesson completion already in flight");
                return;
            }
            CompletionState::Completed { .. } => {
                debug!("Lesson already completed");
                return;
            }
            _ => {}
        }
        self.interaction.completion = CompletionState::Requested;
        info!(node = %self.lesson.node_id, "Marking lesson node complete");
        effects.push(Effect::MarkNodeComplete {
            node_id: self.lesson.node_id.clone(),
        });
    }

    pub(in crate::engine) fn handle_completion_resolved(
        &mut self,
        success: bool,
        next_node_id: Option<String>,
    ) {
        if !matches!(self.interaction.completion, CompletionState::Requested) {
            debug!("Ignoring a completion result with no request outstanding");
            return;
        }
        if success {
            info!(next = ?next_node_id, "Lesson node marked complete");
            self.interaction.completion = CompletionState::Completed { next_node_id };
        } else {
            warn!("Progress collaborator rejected the completion");
            self.interaction.completion = CompletionState::Failed;
        }
    }

    fn apply_unlock(&mut self, completed_idx: usize) {
        let advanced = self
            .unlock
            .on_unlock(&self.lesson.document.blocks, completed_idx);
        if advanced {
            info!(
                completed = completed_idx,
                unlocked_index = self.unlock.unlocked_index,
                "Advanced the unlock boundary"
            );
        } else {
            debug!(completed = completed_idx, "Unlock boundary unchanged");
        }
    }

    fn assignment_submission_types(&self, block_idx: usize) -> Option<&[SubmissionKind]> {
        match &self.lesson.document.blocks.get(block_idx)?.kind {
            BlockKind::Assignment {
                submission_types, ..
            } => Some(submission_types),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::content::{
        BlockId, BlockKind, ContentBlock, LessonDocument, SubmissionKind, TextStyle,
    };
    use crate::engine::messages::{Message, SubmissionPayload};
    use crate::engine::state::{CompletionState, LessonEngine, QuizProgress, SubmissionStatus};
    use crate::engine::update::Effect;
    use crate::engine::view::RenderNode;

    fn quiz_progress(engine: &LessonEngine, block_idx: usize) -> QuizProgress {
        let view = engine.view();
        let node = view
            .nodes
            .iter()
            .find(|node| node.index == block_idx)
            .expect("block should be visible");
        match &node.node {
            RenderNode::QuizCard { progress, .. } => *progress,
            other => panic!("expected a quiz card, got {other:?}"),
        }
    }

    fn submission_status(engine: &LessonEngine, block_idx: usize) -> SubmissionStatus {
        let view = engine.view();
        let node = view
            .nodes
            .iter()
            .find(|node| node.index == block_idx)
            .expect("block should be visible");
        match &node.node {
            RenderNode::AssignmentCard { progress, .. } => progress.status.clone(),
            other => panic!("expected an assignment card, got {other:?}"),
        }
    }

    fn text(idx: usize) -> ContentBlock {
        ContentBlock {
            id: BlockId::new(format!("text-{idx}")),
            kind: BlockKind::Text {
                content: format!("Paragraph {idx}."),
                style: TextStyle::Paragraph,
                citations: Vec::new(),
            },
        }
    }

    fn quiz(idx: usize, unlocks: bool) -> ContentBlock {
        ContentBlock {
            id: BlockId::new(format!("quiz-{idx}")),
            kind: BlockKind::Quiz {
                question: "Pick the second option.".to_string(),
                options: vec!["first".to_string(), "second".to_string()],
                correct_index: 1,
                explanation: None,
                unlocks,
            },
        }
    }

    fn assignment(idx: usize, is_blocking: bool, max_file_size: Option<u64>) -> ContentBlock {
        ContentBlock {
            id: BlockId::new(format!("assignment-{idx}")),
            kind: BlockKind::Assignment {
                title: "Reflection".to_string(),
                description: None,
                instructions: None,
                submission_types: vec![SubmissionKind::Text, SubmissionKind::File],
                is_blocking,
                max_file_size,
            },
        }
    }

    fn engine_with(blocks: Vec<ContentBlock>, config: AppConfig) -> LessonEngine {
        LessonEngine::bootstrap(
            LessonDocument {
                version: "1".to_string(),
                metadata: None,
                blocks,
            },
            "node-7",
            "Checkpointed Lesson",
            config,
        )
    }

    #[test]
    fn correct_quiz_answer_unlocks_after_the_feedback_delay() {
        let mut engine = engine_with(
            vec![text(0), text(1), quiz(2, true), text(3), text(4)],
            AppConfig::default(),
        );
        assert_eq!(engine.unlocked_index(), 2);

        let effects = engine.handle(Message::QuizOptionSelected {
            block_idx: 2,
            option_idx: 1,
        });
        assert!(
            effects
                .iter()
                .any(|effect| matches!(effect, Effect::ScheduleQuizUnlock { block_idx: 2, .. })),
            "correct answer schedules the delayed unlock"
        );
        assert_eq!(engine.unlocked_index(), 2, "not unlocked until the delay");

        engine.handle(Message::QuizFeedbackElapsed { block_idx: 2 });
        assert_eq!(engine.unlocked_index(), 4);

        // A duplicate timer firing must not re-apply anything.
        engine.handle(Message::QuizFeedbackElapsed { block_idx: 2 });
        assert_eq!(engine.unlocked_index(), 4);
    }

    #[test]
    fn incorrect_answers_never_unlock_and_stay_retriable() {
        let mut engine = engine_with(vec![quiz(0, true), text(1)], AppConfig::default());

        let effects = engine.handle(Message::QuizOptionSelected {
            block_idx: 0,
            option_idx: 0,
        });
        assert!(effects.is_empty());
        assert_eq!(engine.unlocked_index(), 0);
        assert_eq!(
            quiz_progress(&engine, 0),
            QuizProgress::Incorrect { last_choice: 0 }
        );

        // Retry with the right answer still works.
        let effects = engine.handle(Message::QuizOptionSelected {
            block_idx: 0,
            option_idx: 1,
        });
        assert_eq!(effects.len(), 1);
        engine.handle(Message::QuizFeedbackElapsed { block_idx: 0 });
        assert_eq!(engine.unlocked_index(), 1);
    }

    #[test]
    fn reselecting_a_correctly_answered_quiz_is_a_no_op() {
        let mut engine = engine_with(vec![quiz(0, true), text(1)], AppConfig::default());
        engine.handle(Message::QuizOptionSelected {
            block_idx: 0,
            option_idx: 1,
        });
        let effects = engine.handle(Message::QuizOptionSelected {
            block_idx: 0,
            option_idx: 1,
        });
        assert!(effects.is_empty(), "exactly one scheduled unlock overall");
    }

    #[test]
    fn skipping_with_enforcement_disabled_still_unlocks() {
        let mut config = AppConfig::default();
        config.enforce_assignment_gates = false;
        let mut engine = engine_with(vec![text(0), assignment(1, true, None), text(2)], config);
        assert_eq!(engine.unlocked_index(), 1);

        engine.handle(Message::AssignmentSkipped { block_idx: 1 });
        assert_eq!(engine.unlocked_index(), 2);
        assert_eq!(
            submission_status(&engine, 1),
            SubmissionStatus::NotSubmitted,
            "skip leaves no submission record"
        );
    }

    #[test]
    fn skipping_a_blocking_assignment_is_refused_under_enforcement() {
        let mut engine = engine_with(
            vec![text(0), assignment(1, true, None), text(2)],
            AppConfig::default(),
        );
        engine.handle(Message::AssignmentSkipped { block_idx: 1 });
        assert_eq!(engine.unlocked_index(), 1);
    }

    #[test]
    fn non_blocking_assignments_can_always_be_skipped() {
        let mut engine = engine_with(
            vec![text(0), assignment(1, false, None), quiz(2, true), text(3)],
            AppConfig::default(),
        );
        assert_eq!(engine.unlocked_index(), 2);
        engine.handle(Message::AssignmentSkipped { block_idx: 1 });
        // The next gate is the quiz, which is already visible.
        assert_eq!(engine.unlocked_index(), 2);
    }

    #[test]
    fn oversize_files_are_rejected_before_any_request() {
        let mut engine = engine_with(
            vec![assignment(0, true, Some(1_024)), text(1)],
            AppConfig::default(),
        );
        let effects = engine.handle(Message::AssignmentSubmitted {
            block_idx: 0,
            payload: SubmissionPayload::File {
                name: "essay.pdf".to_string(),
                size_bytes: 2_048,
            },
        });
        assert!(effects.is_empty(), "no submission request goes out");
        assert!(matches!(
            submission_status(&engine, 0),
            SubmissionStatus::Rejected { .. }
        ));

        // A smaller file goes through.
        let effects = engine.handle(Message::AssignmentSubmitted {
            block_idx: 0,
            payload: SubmissionPayload::File {
                name: "essay.pdf".to_string(),
                size_bytes: 512,
            },
        });
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn failed_submissions_are_retriable_and_stale_results_are_ignored() {
        let mut engine = engine_with(vec![assignment(0, true, None), text(1)], AppConfig::default());

        let effects = engine.handle(Message::AssignmentSubmitted {
            block_idx: 0,
            payload: SubmissionPayload::Text {
                body: "First attempt.".to_string(),
            },
        });
        let Some(Effect::SubmitAssignment {
            request_id: first_request,
            ..
        }) = effects.first()
        else {
            panic!("expected a submission effect");
        };
        let first_request = *first_request;

        engine.handle(Message::SubmissionResolved {
            block_idx: 0,
            request_id: first_request,
            error: Some("storage unavailable".to_string()),
        });
        assert!(matches!(
            submission_status(&engine, 0),
            SubmissionStatus::Failed { .. }
        ));
        assert_eq!(engine.unlocked_index(), 0);

        // Retry allocates a fresh request id.
        let effects = engine.handle(Message::AssignmentSubmitted {
            block_idx: 0,
            payload: SubmissionPayload::Text {
                body: "Second attempt.".to_string(),
            },
        });
        let Some(Effect::SubmitAssignment {
            request_id: second_request,
            ..
        }) = effects.first()
        else {
            panic!("expected a retry submission effect");
        };
        let second_request = *second_request;
        assert_ne!(first_request, second_request);

        // A late result from the first attempt must not settle the retry.
        engine.handle(Message::SubmissionResolved {
            block_idx: 0,
            request_id: first_request,
            error: None,
        });
        assert!(matches!(
            submission_status(&engine, 0),
            SubmissionStatus::InFlight { .. }
        ));
        assert_eq!(engine.unlocked_index(), 0);

        engine.handle(Message::SubmissionResolved {
            block_idx: 0,
            request_id: second_request,
            error: None,
        });
        assert_eq!(submission_status(&engine, 0), SubmissionStatus::Accepted);
        assert_eq!(engine.unlocked_index(), 1);
    }

    #[test]
    fn unsupported_modalities_are_rejected_inline() {
        let mut engine = engine_with(vec![assignment(0, true, None), text(1)], AppConfig::default());
        let effects = engine.handle(Message::AssignmentSubmitted {
            block_idx: 0,
            payload: SubmissionPayload::Link {
                url: "https://example.org/essay".to_string(),
            },
        });
        assert!(effects.is_empty());
        assert!(matches!(
            submission_status(&engine, 0),
            SubmissionStatus::Rejected { .. }
        ));
    }

    #[test]
    fn focused_text_updates_the_ai_context() {
        let mut engine = engine_with(vec![text(0), quiz(1, true), text(2)], AppConfig::default());
        let effects = engine.handle(Message::BlockFocused { block_idx: 0 });
        assert_eq!(
            effects,
            vec![Effect::UpdateAiContext {
                text: "Paragraph 0.".to_string()
            }]
        );

        // Hidden blocks and non-text blocks produce nothing.
        assert!(engine.handle(Message::BlockFocused { block_idx: 2 }).is_empty());
        assert!(engine.handle(Message::BlockFocused { block_idx: 1 }).is_empty());
    }

    #[test]
    fn lesson_completion_hands_off_to_the_progress_collaborator() {
        let mut engine = engine_with(vec![text(0)], AppConfig::default());
        let effects = engine.handle(Message::CompleteLesson);
        assert_eq!(
            effects,
            vec![Effect::MarkNodeComplete {
                node_id: "node-7".to_string()
            }]
        );

        // Duplicate requests while one is in flight are dropped.
        assert!(engine.handle(Message::CompleteLesson).is_empty());

        engine.handle(Message::CompletionResolved {
            success: true,
            next_node_id: Some("node-8".to_string()),
        });
        assert_eq!(
            engine.completion(),
            &CompletionState::Completed {
                next_node_id: Some("node-8".to_string())
            }
        );
    }
}
