mod auto_scroll;
mod interaction;
mod read_aloud;
mod unlock;
mod viewport;

use crate::config::{AppConfig, clamp_config};
use crate::content::{ContentBlock, LessonDocument, LessonMetadata, enrich_blocks};
use tracing::info;

pub use interaction::{AssignmentProgress, CompletionState, QuizProgress, SubmissionStatus};

pub(in crate::engine) use auto_scroll::AutoScrollState;
pub(in crate::engine) use interaction::InteractionState;
pub(in crate::engine) use read_aloud::ReadAloudState;
pub(in crate::engine) use unlock::UnlockState;
pub(in crate::engine) use viewport::ViewportState;

/// The lesson being viewed, together with its identity in the course graph.
pub(in crate::engine) struct LessonContext {
    pub(in crate::engine) node_id: String,
    pub(in crate::engine) title: String,
    pub(in crate::engine) document: LessonDocument,
}

/// Core engine state composed of sub-models. The hosting view feeds it
/// messages and executes the effects it returns; `view()` projects the
/// current state into renderable nodes.
pub struct LessonEngine {
    pub(in crate::engine) lesson: LessonContext,
    pub(in crate::engine) config: AppConfig,
    pub(in crate::engine) unlock: UnlockState,
    pub(in crate::engine) read_aloud: ReadAloudState,
    pub(in crate::engine) auto_scroll: AutoScrollState,
    pub(in crate::engine) viewport: ViewportState,
    pub(in crate::engine) interaction: InteractionState,
}

impl LessonEngine {
    /// Build a session for one lesson view. Enrichment runs here because it
    /// needs the lesson title; the resulting block order is fixed for the
    /// lifetime of the session.
    pub fn bootstrap(
        document: LessonDocument,
        node_id: impl Into<String>,
        title: impl Into<String>,
        mut config: AppConfig,
    ) -> Self {
        clamp_config(&mut config);
        let node_id = node_id.into();
        let title = title.into();

        let LessonDocument {
            version,
            metadata,
            blocks,
        } = document;
        let blocks = enrich_blocks(blocks, &title);
        let document = LessonDocument {
            version,
            metadata,
            blocks,
        };

        let unlock = UnlockState::initial(&document.blocks);
        info!(
            node = %node_id,
            blocks = document.blocks.len(),
            unlocked_index = unlock.unlocked_index,
            "Bootstrapped lesson session"
        );

        LessonEngine {
            auto_scroll: AutoScrollState::new(config.auto_scroll_speed),
            lesson: LessonContext {
                node_id,
                title,
                document,
            },
            config,
            unlock,
            read_aloud: ReadAloudState::new(),
            viewport: ViewportState::new(),
            interaction: InteractionState::new(),
        }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.lesson.document.blocks
    }

    pub fn metadata(&self) -> Option<&LessonMetadata> {
        self.lesson.document.metadata.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.lesson.title
    }

    pub fn node_id(&self) -> &str {
        &self.lesson.node_id
    }

    pub fn unlocked_index(&self) -> usize {
        self.unlock.unlocked_index
    }

    pub fn is_reading(&self) -> bool {
        self.read_aloud.is_reading
    }

    pub fn is_auto_scrolling(&self) -> bool {
        self.auto_scroll.is_scrolling
    }

    pub fn completion(&self) -> &CompletionState {
        &self.interaction.completion
    }
}
