/// Mirror of the host's scroll surface, fed by `Scrolled` messages. The host
/// owns the real scroll position; the engine keeps this copy so the
/// auto-scroll driver can step it and detect the bottom of the content.
#[derive(Debug, Clone, Copy)]
pub(in crate::engine) struct ViewportState {
    pub(in crate::engine) scroll_top: f32,
    pub(in crate::engine) viewport_height: f32,
    pub(in crate::engine) content_height: f32,
    /// True while the user is mid-gesture; automated scroll drivers must not
    /// fight a gesture in progress.
    pub(in crate::engine) gesture_active: bool,
}

impl ViewportState {
    pub(in crate::engine) fn new() -> Self {
        ViewportState {
            scroll_top: 0.0,
            viewport_height: 0.0,
            content_height: 0.0,
            gesture_active: false,
        }
    }

    pub(in crate::engine) fn apply(
        &mut self,
        scroll_top: f32,
        viewport_height: f32,
        content_height: f32,
    ) {
        self.viewport_height = sanitize(viewport_height);
        self.content_height = sanitize(content_height);
        self.scroll_top = sanitize(scroll_top).min(self.max_scroll_top());
    }

    pub(in crate::engine) fn max_scroll_top(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    pub(in crate::engine) fn at_bottom(&self, epsilon_px: f32) -> bool {
        self.scroll_top + self.viewport_height >= self.content_height - epsilon_px
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
