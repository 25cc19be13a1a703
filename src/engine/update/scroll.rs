use super::Effect;
use crate::config::MIN_AUTO_SCROLL_SPEED;
use crate::engine::state::LessonEngine;
use tracing::{debug, info};

impl LessonEngine {
    pub(in crate::engine) fn handle_toggle_auto_scroll(&mut self, effects: &mut Vec<Effect>) {
        if self.auto_scroll.is_scrolling {
            self.auto_scroll.is_scrolling = false;
            info!("Auto-scroll disabled");
            return;
        }
        if self.read_aloud.is_reading {
            info!("Stopping read-aloud before auto-scroll starts");
            self.stop_read_aloud(effects);
        }
        self.auto_scroll.is_scrolling = true;
        info!(speed = self.auto_scroll.speed, "Auto-scroll enabled");
    }

    /// The multiplier has no upper bound at this layer; capping it is a host
    /// UI decision.
    pub(in crate::engine) fn handle_set_auto_scroll_speed(&mut self, speed: f32) {
        if !speed.is_finite() {
            debug!("Ignoring non-finite auto-scroll speed");
            return;
        }
        self.auto_scroll.speed = speed.max(MIN_AUTO_SCROLL_SPEED);
        info!(speed = self.auto_scroll.speed, "Adjusted auto-scroll speed");
    }

    pub(in crate::engine) fn handle_frame_tick(&mut self, effects: &mut Vec<Effect>) {
        if !self.auto_scroll.is_scrolling {
            return;
        }
        if self.viewport.gesture_active {
            return;
        }

        let step = self.auto_scroll.speed * self.config.auto_scroll_base_rate;
        let next = (self.viewport.scroll_top + step).min(self.viewport.max_scroll_top());
        self.viewport.scroll_top = next;
        effects.push(Effect::ScrollTo { offset_px: next });

        if self.viewport.at_bottom(self.config.bottom_epsilon_px) {
            self.auto_scroll.is_scrolling = false;
            info!("Auto-scroll reached the end of the content");
        }
    }

    pub(in crate::engine) fn handle_scrolled(
        &mut self,
        scroll_top: f32,
        viewport_height: f32,
        content_height: f32,
    ) {
        self.viewport
            .apply(scroll_top, viewport_height, content_height);
    }

    pub(in crate::engine) fn handle_scroll_gesture(&mut self, active: bool) {
        self.viewport.gesture_active = active;
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::content::{BlockId, BlockKind, ContentBlock, LessonDocument, TextStyle};
    use crate::engine::messages::Message;
    use crate::engine::state::LessonEngine;
    use crate::engine::update::Effect;

    fn engine_with_viewport(scroll_top: f32, content_height: f32) -> LessonEngine {
        let blocks = vec![ContentBlock {
            id: BlockId::new("txt-0"),
            kind: BlockKind::Text {
                content: "Scrollable prose.".to_string(),
                style: TextStyle::Paragraph,
                citations: Vec::new(),
            },
        }];
        let mut engine = LessonEngine::bootstrap(
            LessonDocument {
                version: "1".to_string(),
                metadata: None,
                blocks,
            },
            "node-1",
            "Long Lesson",
            AppConfig::default(),
        );
        engine.handle(Message::Scrolled {
            scroll_top,
            viewport_height: 600.0,
            content_height,
        });
        engine
    }

    fn scroll_target(effects: &[Effect]) -> Option<f32> {
        effects.iter().find_map(|effect| match effect {
            Effect::ScrollTo { offset_px } => Some(*offset_px),
            _ => None,
        })
    }

    #[test]
    fn frame_ticks_advance_by_speed_times_base_rate() {
        let mut engine = engine_with_viewport(100.0, 4_000.0);
        engine.handle(Message::ToggleAutoScroll);
        engine.handle(Message::SetAutoScrollSpeed(2.0));

        let effects = engine.handle(Message::FrameTick);
        let target = scroll_target(&effects).expect("a scroll effect");
        // default base rate is 0.6 px per frame
        assert!((target - 101.2).abs() < 1e-4);
        assert!(engine.is_auto_scrolling());
    }

    #[test]
    fn auto_scroll_self_terminates_near_the_bottom() {
        let mut engine = engine_with_viewport(395.0, 1_000.0);
        engine.handle(Message::ToggleAutoScroll);

        let effects = engine.handle(Message::FrameTick);
        assert!(scroll_target(&effects).is_some());
        assert!(!engine.is_auto_scrolling(), "within epsilon of the bottom");

        // Once stopped, further frames do nothing.
        let effects = engine.handle(Message::FrameTick);
        assert!(effects.is_empty());
    }

    #[test]
    fn frame_ticks_never_scroll_past_the_content() {
        let mut engine = engine_with_viewport(399.9, 1_000.0);
        engine.handle(Message::ToggleAutoScroll);
        engine.handle(Message::SetAutoScrollSpeed(500.0));

        let effects = engine.handle(Message::FrameTick);
        let target = scroll_target(&effects).expect("a scroll effect");
        assert_eq!(target, 400.0);
    }

    #[test]
    fn ticks_are_suppressed_during_a_user_gesture() {
        let mut engine = engine_with_viewport(0.0, 4_000.0);
        engine.handle(Message::ToggleAutoScroll);

        engine.handle(Message::ScrollGestureStarted);
        let effects = engine.handle(Message::FrameTick);
        assert!(effects.is_empty());
        assert!(engine.is_auto_scrolling(), "gesture pauses, not stops");

        engine.handle(Message::ScrollGestureEnded);
        let effects = engine.handle(Message::FrameTick);
        assert!(scroll_target(&effects).is_some());
    }

    #[test]
    fn speed_changes_are_clamped_only_from_below() {
        let mut engine = engine_with_viewport(0.0, 4_000.0);
        engine.handle(Message::SetAutoScrollSpeed(0.0));
        let effects = {
            engine.handle(Message::ToggleAutoScroll);
            engine.handle(Message::FrameTick)
        };
        let slow = scroll_target(&effects).expect("a scroll effect");
        assert!(slow > 0.0, "speed floor keeps motion alive");

        engine.handle(Message::SetAutoScrollSpeed(250.0));
        let effects = engine.handle(Message::FrameTick);
        let fast = scroll_target(&effects).expect("a scroll effect");
        assert!(fast > slow);
    }

    #[test]
    fn enabling_auto_scroll_stops_read_aloud() {
        let mut engine = engine_with_viewport(0.0, 4_000.0);
        engine.handle(Message::ToggleReadAloud);
        assert!(engine.is_reading());

        let effects = engine.handle(Message::ToggleAutoScroll);
        assert!(effects.contains(&Effect::CancelSpeech));
        assert!(!engine.is_reading());
        assert!(engine.is_auto_scrolling());
    }
}
