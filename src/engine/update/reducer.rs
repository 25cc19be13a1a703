use super::Effect;
use crate::engine::messages::Message;
use crate::engine::state::LessonEngine;

impl LessonEngine {
    /// Process one message to completion and return the work the host must
    /// perform. Messages are strictly ordered: each call finishes before the
    /// next is considered.
    pub fn handle(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::QuizOptionSelected {
                block_idx,
                option_idx,
            } => self.handle_quiz_option_selected(block_idx, option_idx, &mut effects),
            Message::QuizFeedbackElapsed { block_idx } => {
                self.handle_quiz_feedback_elapsed(block_idx)
            }
            Message::AssignmentModalityChosen { block_idx, kind } => {
                self.handle_assignment_modality_chosen(block_idx, kind)
            }
            Message::AssignmentSubmitted { block_idx, payload } => {
                self.handle_assignment_submitted(block_idx, payload, &mut effects)
            }
            Message::SubmissionResolved {
                block_idx,
                request_id,
                error,
            } => self.handle_submission_resolved(block_idx, request_id, error),
            Message::AssignmentSkipped { block_idx } => self.handle_assignment_skipped(block_idx),
            Message::BlockFocused { block_idx } => {
                self.handle_block_focused(block_idx, &mut effects)
            }
            Message::CompleteLesson => self.handle_complete_lesson(&mut effects),
            Message::CompletionResolved {
                success,
                next_node_id,
            } => self.handle_completion_resolved(success, next_node_id),
            Message::ToggleReadAloud => self.handle_toggle_read_aloud(&mut effects),
            Message::StopReadAloud => self.stop_read_aloud(&mut effects),
            Message::SpeechBoundary {
                generation,
                char_index,
            } => self.handle_speech_boundary(generation, char_index, &mut effects),
            Message::SpeechFinished { generation } => {
                self.handle_speech_finished(generation, &mut effects)
            }
            Message::SpeechFailed { generation, error } => {
                self.handle_speech_failed(generation, error, &mut effects)
            }
            Message::ToggleAutoScroll => self.handle_toggle_auto_scroll(&mut effects),
            Message::SetAutoScrollSpeed(speed) => self.handle_set_auto_scroll_speed(speed),
            Message::FrameTick => self.handle_frame_tick(&mut effects),
            Message::Scrolled {
                scroll_top,
                viewport_height,
                content_height,
            } => self.handle_scrolled(scroll_top, viewport_height, content_height),
            Message::ScrollGestureStarted => self.handle_scroll_gesture(true),
            Message::ScrollGestureEnded => self.handle_scroll_gesture(false),
        }

        effects
    }
}
