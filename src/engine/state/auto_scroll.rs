/// Continuous passive scrolling state. Mutually exclusive with read-aloud:
/// enabling either driver forces the other off.
#[derive(Debug, Clone, Copy)]
pub(in crate::engine) struct AutoScrollState {
    pub(in crate::engine) is_scrolling: bool,
    /// User-configurable positive multiplier over the configured base rate.
    pub(in crate::engine) speed: f32,
}

impl AutoScrollState {
    pub(in crate::engine) fn new(speed: f32) -> Self {
        AutoScrollState {
            is_scrolling: false,
            speed,
        }
    }
}
