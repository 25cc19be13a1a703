use crate::content::BlockId;

/// Sequential read-aloud playback state.
///
/// `generation` stamps every speech operation the engine issues; callbacks
/// carrying a different generation belong to a canceled or superseded
/// utterance and must be discarded. It is bumped on every start and stop.
#[derive(Debug, Clone)]
pub(in crate::engine) struct ReadAloudState {
    pub(in crate::engine) is_reading: bool,
    /// Position in the block sequence; `None` while idle.
    pub(in crate::engine) current_block: Option<usize>,
    pub(in crate::engine) active_block_id: Option<BlockId>,
    /// Character offset relative to the active block's own text, stored
    /// verbatim from the last boundary callback.
    pub(in crate::engine) active_char_index: Option<usize>,
    pub(in crate::engine) generation: u64,
}

impl ReadAloudState {
    pub(in crate::engine) fn new() -> Self {
        ReadAloudState {
            is_reading: false,
            current_block: None,
            active_block_id: None,
            active_char_index: None,
            generation: 0,
        }
    }

    /// Return every active-tracking field to its idle value.
    pub(in crate::engine) fn reset_active(&mut self) {
        self.is_reading = false;
        self.current_block = None;
        self.active_block_id = None;
        self.active_char_index = None;
    }
}
