use super::Effect;
use crate::content::BlockKind;
use crate::engine::state::LessonEngine;
use crate::text_utils::speakable_text;
use tracing::{debug, info, warn};

impl LessonEngine {
    pub(in crate::engine) fn handle_toggle_read_aloud(&mut self, effects: &mut Vec<Effect>) {
        if self.read_aloud.is_reading {
            self.stop_read_aloud(effects);
        } else {
            self.start_read_aloud(effects);
        }
    }

    /// Every start begins at block 0; there is no pause/resume.
    fn start_read_aloud(&mut self, effects: &mut Vec<Effect>) {
        if self.auto_scroll.is_scrolling {
            info!("Disabling auto-scroll before read-aloud starts");
            self.auto_scroll.is_scrolling = false;
        }
        self.read_aloud.generation = self.read_aloud.generation.wrapping_add(1);
        self.read_aloud.is_reading = true;
        self.read_aloud.current_block = Some(0);
        info!(
            generation = self.read_aloud.generation,
            "Starting read-aloud from the first block"
        );
        self.advance_to_speakable(effects);
    }

    /// Cancel any in-flight utterance and return to idle, regardless of where
    /// in the scan/speak cycle playback currently is.
    pub(in crate::engine) fn stop_read_aloud(&mut self, effects: &mut Vec<Effect>) {
        if !self.read_aloud.is_reading {
            return;
        }
        self.read_aloud.generation = self.read_aloud.generation.wrapping_add(1);
        effects.push(Effect::CancelSpeech);
        self.read_aloud.reset_active();
        info!(
            generation = self.read_aloud.generation,
            "Stopped read-aloud"
        );
    }

    /// Walk forward from `current_block` to the next non-empty text block and
    /// begin a speech operation for it. Nothing is spoken during the scan.
    fn advance_to_speakable(&mut self, effects: &mut Vec<Effect>) {
        let Some(start) = self.read_aloud.current_block else {
            return;
        };

        let mut index = start;
        let next = loop {
            match self.lesson.document.blocks.get(index) {
                None => break None,
                Some(block) => {
                    if let BlockKind::Text { content, .. } = &block.kind {
                        let text = speakable_text(content);
                        if !text.is_empty() {
                            break Some((index, block.id.clone(), text));
                        }
                    }
                    index += 1;
                }
            }
        };

        match next {
            Some((index, block_id, text)) => {
                if index != start {
                    debug!(from = start, to = index, "Skipped non-speakable blocks");
                }
                self.read_aloud.current_block = Some(index);
                self.read_aloud.active_block_id = Some(block_id.clone());
                self.read_aloud.active_char_index = Some(0);
                debug!(block = index, id = %block_id, "Speaking text block");
                effects.push(Effect::Speak {
                    generation: self.read_aloud.generation,
                    block_id,
                    text,
                    rate: self.config.speech_rate,
                });
            }
            None => {
                info!("Read-aloud finished; no speakable blocks remain");
                self.read_aloud.reset_active();
            }
        }
    }

    pub(in crate::engine) fn handle_speech_boundary(
        &mut self,
        generation: u64,
        char_index: usize,
        effects: &mut Vec<Effect>,
    ) {
        if generation != self.read_aloud.generation {
            debug!(
                generation,
                current = self.read_aloud.generation,
                "Ignoring stale speech boundary"
            );
            return;
        }
        if !self.read_aloud.is_reading {
            return;
        }
        self.read_aloud.active_char_index = Some(char_index);
        if !self.viewport.gesture_active {
            if let Some(block_id) = self.read_aloud.active_block_id.clone() {
                effects.push(Effect::RevealHighlight { block_id });
            }
        }
    }

    pub(in crate::engine) fn handle_speech_finished(
        &mut self,
        generation: u64,
        effects: &mut Vec<Effect>,
    ) {
        if generation != self.read_aloud.generation {
            debug!(
                generation,
                current = self.read_aloud.generation,
                "Ignoring stale speech completion"
            );
            return;
        }
        let Some(current) = self.read_aloud.current_block else {
            return;
        };
        self.read_aloud.active_char_index = None;
        self.read_aloud.active_block_id = None;
        self.read_aloud.current_block = Some(current + 1);
        self.advance_to_speakable(effects);
    }

    /// A mid-sequence engine fault aborts the whole session; later blocks are
    /// not retried automatically.
    pub(in crate::engine) fn handle_speech_failed(
        &mut self,
        generation: u64,
        error: String,
        effects: &mut Vec<Effect>,
    ) {
        if generation != self.read_aloud.generation {
            debug!(
                generation,
                current = self.read_aloud.generation,
                "Ignoring stale speech error"
            );
            return;
        }
        if !self.read_aloud.is_reading {
            return;
        }
        warn!(%error, "Speech engine reported an error; aborting read-aloud");
        self.read_aloud.generation = self.read_aloud.generation.wrapping_add(1);
        effects.push(Effect::CancelSpeech);
        self.read_aloud.reset_active();
    }

    /// Host-view destruction path: cancellation must be issued before the
    /// view disappears so audio does not outlive it.
    pub fn teardown(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.read_aloud.is_reading {
            info!("Tearing down with read-aloud active");
            self.stop_read_aloud(&mut effects);
        }
        self.auto_scroll.is_scrolling = false;
        effects
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::content::{BlockId, BlockKind, ContentBlock, ImageSize, LessonDocument, TextStyle};
    use crate::engine::messages::Message;
    use crate::engine::state::LessonEngine;
    use crate::engine::update::Effect;

    fn text_block(id: &str, content: &str) -> ContentBlock {
        ContentBlock {
            id: BlockId::new(id),
            kind: BlockKind::Text {
                content: content.to_string(),
                style: TextStyle::Paragraph,
                citations: Vec::new(),
            },
        }
    }

    fn image_block(id: &str) -> ContentBlock {
        ContentBlock {
            id: BlockId::new(id),
            kind: BlockKind::Image {
                url: "https://cdn.example/figure.png".to_string(),
                alt: None,
                caption: None,
                size: ImageSize::Medium,
            },
        }
    }

    fn quiz_block(id: &str, unlocks: bool) -> ContentBlock {
        ContentBlock {
            id: BlockId::new(id),
            kind: BlockKind::Quiz {
                question: "?".to_string(),
                options: vec!["a".to_string(), "b".to_string()],
                correct_index: 0,
                explanation: None,
                unlocks,
            },
        }
    }

    fn engine_with(blocks: Vec<ContentBlock>) -> LessonEngine {
        LessonEngine::bootstrap(
            LessonDocument {
                version: "1".to_string(),
                metadata: None,
                blocks,
            },
            "node-1",
            "Quiet Lesson",
            AppConfig::default(),
        )
    }

    fn spoken(effects: &[Effect]) -> Option<(u64, String, String)> {
        effects.iter().find_map(|effect| match effect {
            Effect::Speak {
                generation,
                block_id,
                text,
                ..
            } => Some((*generation, block_id.as_str().to_string(), text.clone())),
            _ => None,
        })
    }

    #[test]
    fn smart_skip_speaks_only_text_blocks() {
        let mut engine = engine_with(vec![
            image_block("img-0"),
            text_block("txt-1", "Hello world"),
            quiz_block("quiz-2", false),
        ]);

        let effects = engine.handle(Message::ToggleReadAloud);
        let (generation, block_id, text) = spoken(&effects).expect("a speak effect");
        assert_eq!(block_id, "txt-1");
        assert_eq!(text, "Hello world");
        assert!(engine.is_reading());

        engine.handle(Message::SpeechBoundary {
            generation,
            char_index: 0,
        });
        engine.handle(Message::SpeechBoundary {
            generation,
            char_index: 6,
        });
        let highlight = engine.view().highlight.expect("an active highlight");
        assert_eq!(highlight.block_id.as_str(), "txt-1");
        assert_eq!(highlight.char_index, Some(6));

        // The trailing quiz is not speakable, so completion ends the session.
        let effects = engine.handle(Message::SpeechFinished { generation });
        assert!(spoken(&effects).is_none());
        assert!(!engine.is_reading());
        assert!(engine.view().highlight.is_none());
    }

    #[test]
    fn lesson_without_text_finishes_without_speaking() {
        let mut engine = engine_with(vec![image_block("img-0"), quiz_block("quiz-1", false)]);
        let effects = engine.handle(Message::ToggleReadAloud);
        assert!(spoken(&effects).is_none());
        assert!(!engine.is_reading());
        assert!(engine.view().highlight.is_none());
    }

    #[test]
    fn empty_text_blocks_are_skipped() {
        let mut engine = engine_with(vec![
            text_block("txt-0", "   "),
            text_block("txt-1", "Readable."),
        ]);
        let effects = engine.handle(Message::ToggleReadAloud);
        let (_, block_id, _) = spoken(&effects).expect("a speak effect");
        assert_eq!(block_id, "txt-1");
    }

    #[test]
    fn sequential_playback_advances_block_by_block() {
        let mut engine = engine_with(vec![
            text_block("txt-0", "First."),
            text_block("txt-1", "Second."),
        ]);
        let effects = engine.handle(Message::ToggleReadAloud);
        let (generation, first, _) = spoken(&effects).expect("first speak");
        assert_eq!(first, "txt-0");

        let effects = engine.handle(Message::SpeechFinished { generation });
        let (next_generation, second, _) = spoken(&effects).expect("second speak");
        assert_eq!(second, "txt-1");
        assert_eq!(next_generation, generation);

        let effects = engine.handle(Message::SpeechFinished { generation });
        assert!(spoken(&effects).is_none());
        assert!(!engine.is_reading());
    }

    #[test]
    fn stop_mid_utterance_resets_and_invalidates_callbacks() {
        let mut engine = engine_with(vec![
            text_block("txt-0", "Hello world out there"),
            text_block("txt-1", "Never reached in this test."),
        ]);
        let effects = engine.handle(Message::ToggleReadAloud);
        let (stale_generation, _, _) = spoken(&effects).expect("a speak effect");

        let effects = engine.handle(Message::StopReadAloud);
        assert!(effects.contains(&Effect::CancelSpeech));
        assert!(!engine.is_reading());
        assert!(engine.view().highlight.is_none());

        // Restart, then deliver events from the canceled utterance.
        let effects = engine.handle(Message::ToggleReadAloud);
        let (fresh_generation, _, _) = spoken(&effects).expect("a speak effect");
        assert_ne!(fresh_generation, stale_generation);

        let effects = engine.handle(Message::SpeechBoundary {
            generation: stale_generation,
            char_index: 9,
        });
        assert!(effects.is_empty());
        assert_eq!(
            engine.view().highlight.expect("fresh highlight").char_index,
            Some(0)
        );

        let effects = engine.handle(Message::SpeechFinished {
            generation: stale_generation,
        });
        assert!(effects.is_empty());
        assert!(engine.is_reading());
    }

    #[test]
    fn speech_error_aborts_the_session() {
        let mut engine = engine_with(vec![
            text_block("txt-0", "First."),
            text_block("txt-1", "Second."),
        ]);
        let effects = engine.handle(Message::ToggleReadAloud);
        let (generation, _, _) = spoken(&effects).expect("a speak effect");

        let effects = engine.handle(Message::SpeechFailed {
            generation,
            error: "synthesizer unavailable".to_string(),
        });
        assert!(effects.contains(&Effect::CancelSpeech));
        assert!(spoken(&effects).is_none(), "no retry of later blocks");
        assert!(!engine.is_reading());
        assert!(engine.view().highlight.is_none());
    }

    #[test]
    fn starting_read_aloud_disables_auto_scroll() {
        let mut engine = engine_with(vec![text_block("txt-0", "Hello.")]);
        engine.handle(Message::Scrolled {
            scroll_top: 0.0,
            viewport_height: 600.0,
            content_height: 4_000.0,
        });
        engine.handle(Message::ToggleAutoScroll);
        assert!(engine.is_auto_scrolling());

        engine.handle(Message::ToggleReadAloud);
        assert!(engine.is_reading());
        assert!(!engine.is_auto_scrolling());
    }

    #[test]
    fn boundary_does_not_scroll_during_a_user_gesture() {
        let mut engine = engine_with(vec![text_block("txt-0", "Hello world")]);
        let effects = engine.handle(Message::ToggleReadAloud);
        let (generation, _, _) = spoken(&effects).expect("a speak effect");

        engine.handle(Message::ScrollGestureStarted);
        let effects = engine.handle(Message::SpeechBoundary {
            generation,
            char_index: 6,
        });
        assert!(effects.is_empty());

        engine.handle(Message::ScrollGestureEnded);
        let effects = engine.handle(Message::SpeechBoundary {
            generation,
            char_index: 6,
        });
        assert!(
            effects
                .iter()
                .any(|effect| matches!(effect, Effect::RevealHighlight { .. }))
        );
    }

    #[test]
    fn teardown_cancels_in_flight_speech() {
        let mut engine = engine_with(vec![text_block("txt-0", "Hello.")]);
        engine.handle(Message::ToggleReadAloud);
        assert!(engine.is_reading());

        let effects = engine.teardown();
        assert!(effects.contains(&Effect::CancelSpeech));
        assert!(!engine.is_reading());

        // Tearing down an idle engine issues nothing.
        assert!(engine.teardown().is_empty());
    }
}
