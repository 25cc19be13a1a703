use crate::content::ContentBlock;

/// Index of the first blocking block at or after `from`, or the last index
/// when no blocking block remains. A pure reachability scan over the ordered
/// block list; it captures no state.
pub(crate) fn find_next_blocking(blocks: &[ContentBlock], from: usize) -> usize {
    blocks
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, block)| block.is_blocking())
        .map(|(index, _)| index)
        .unwrap_or_else(|| blocks.len().saturating_sub(1))
}

/// The visibility boundary over the block list. Blocks at or below
/// `unlocked_index` are visible. Session-scoped; never persisted, and
/// monotonically non-decreasing for the life of the session.
#[derive(Debug, Clone, Copy)]
pub(in crate::engine) struct UnlockState {
    pub(in crate::engine) unlocked_index: usize,
}

impl UnlockState {
    pub(in crate::engine) fn initial(blocks: &[ContentBlock]) -> Self {
        UnlockState {
            unlocked_index: find_next_blocking(blocks, 0),
        }
    }

    /// Advance the boundary past the gate that follows `completed_index`.
    /// Replaying an already-passed index is a no-op.
    pub(in crate::engine) fn on_unlock(
        &mut self,
        blocks: &[ContentBlock],
        completed_index: usize,
    ) -> bool {
        let candidate = find_next_blocking(blocks, completed_index + 1);
        if candidate > self.unlocked_index {
            self.unlocked_index = candidate;
            true
        } else {
            false
        }
    }
}
