//! Projection of engine state into renderable nodes.
//!
//! Dispatch is an exhaustive match over the closed block variant set, so a
//! new block type cannot be added without deciding how it renders. Blocks
//! beyond the unlock boundary produce nothing at all; a single locked
//! indicator at the end of the visible run stands in for everything hidden.

use crate::content::{
    AnimationFormat, BlockId, BlockKind, Citation, ContentBlock, DividerStyle, ImageSize,
    SubmissionKind, TextStyle, is_known_simulation,
};
use crate::engine::state::{AssignmentProgress, LessonEngine, QuizProgress};
use tracing::debug;

/// Everything the hosting view needs to draw the lesson: the visible
/// `(index, node)` pairs, the unlock boundary, and the current read-aloud
/// highlight target.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonView {
    pub nodes: Vec<BlockNode>,
    pub unlocked_index: usize,
    pub highlight: Option<HighlightTarget>,
    /// Show one "locked" indicator after the visible run.
    pub locked_notice: bool,
    /// The whole lesson is revealed; the host may offer the terminal
    /// complete-lesson action.
    pub can_complete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    /// Index into the block sequence; hosts echo it back in interaction
    /// messages for this block.
    pub index: usize,
    pub node: RenderNode,
}

/// The word currently being spoken, for visual emphasis. `char_index` is
/// relative to the highlighted block's own text; mapping it onto rendered
/// word spans (past any markup the renderer introduced) is the host's job.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightTarget {
    pub block_id: BlockId,
    pub char_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Paragraph {
        content: String,
        style: TextStyle,
        citations: Vec<Citation>,
    },
    Figure {
        url: String,
        alt: Option<String>,
        caption: Option<String>,
        size: ImageSize,
    },
    QuizCard {
        question: String,
        options: Vec<String>,
        explanation: Option<String>,
        progress: QuizProgress,
    },
    SimulationFrame {
        simulation_id: String,
        config: Option<serde_json::Value>,
        instructions: Option<String>,
    },
    /// Placeholder for a simulation id with no renderer. Not an error.
    ComingSoon { simulation_id: String },
    AssignmentCard {
        title: String,
        description: Option<String>,
        instructions: Option<String>,
        submission_types: Vec<SubmissionKind>,
        max_file_size: Option<u64>,
        progress: AssignmentProgress,
        skippable: bool,
    },
    Divider { style: DividerStyle },
    InsightPanel {
        prompt: Option<String>,
        context: Option<String>,
        summary: Option<String>,
        show_simulation: bool,
    },
    AnimationFrame {
        format: AnimationFormat,
        url: String,
        autoplay: bool,
        loop_animation: bool,
        caption: Option<String>,
    },
}

impl LessonEngine {
    pub fn view(&self) -> LessonView {
        let blocks = self.blocks();
        let nodes = blocks
            .iter()
            .enumerate()
            .filter_map(|(index, block)| {
                self.render_block(index, block)
                    .map(|node| BlockNode { index, node })
            })
            .collect();
        let locked_notice = !blocks.is_empty() && self.unlock.unlocked_index < blocks.len() - 1;
        let highlight = self
            .read_aloud
            .active_block_id
            .clone()
            .map(|block_id| HighlightTarget {
                block_id,
                char_index: self.read_aloud.active_char_index,
            });
        LessonView {
            nodes,
            unlocked_index: self.unlock.unlocked_index,
            highlight,
            locked_notice,
            can_complete: !blocks.is_empty() && !locked_notice,
        }
    }

    /// Blocks past the unlock boundary render nothing, not a placeholder.
    fn render_block(&self, index: usize, block: &ContentBlock) -> Option<RenderNode> {
        if index > self.unlock.unlocked_index {
            return None;
        }

        let node = match &block.kind {
            BlockKind::Text {
                content,
                style,
                citations,
            } => RenderNode::Paragraph {
                content: content.clone(),
                style: *style,
                citations: citations.clone(),
            },
            BlockKind::Image {
                url,
                alt,
                caption,
                size,
            } => RenderNode::Figure {
                url: url.clone(),
                alt: alt.clone(),
                caption: caption.clone(),
                size: *size,
            },
            BlockKind::Quiz {
                question,
                options,
                explanation,
                ..
            } => RenderNode::QuizCard {
                question: question.clone(),
                options: options.clone(),
                explanation: explanation.clone(),
                progress: self.interaction.quiz(index),
            },
            BlockKind::Simulation {
                simulation_id,
                config,
                instructions,
            } => {
                if is_known_simulation(simulation_id) {
                    RenderNode::SimulationFrame {
                        simulation_id: simulation_id.clone(),
                        config: config.clone(),
                        instructions: instructions.clone(),
                    }
                } else {
                    debug!(block = %block.id, %simulation_id, "No renderer for simulation id");
                    RenderNode::ComingSoon {
                        simulation_id: simulation_id.clone(),
                    }
                }
            }
            BlockKind::Assignment {
                title,
                description,
                instructions,
                submission_types,
                is_blocking,
                max_file_size,
            } => RenderNode::AssignmentCard {
                title: title.clone(),
                description: description.clone(),
                instructions: instructions.clone(),
                submission_types: submission_types.clone(),
                max_file_size: *max_file_size,
                progress: self.interaction.assignment(index),
                skippable: !(*is_blocking && self.config.enforce_assignment_gates),
            },
            BlockKind::Divider { style } => RenderNode::Divider { style: *style },
            BlockKind::AiInsight {
                prompt,
                show_summary,
                show_simulation,
                context,
            } => RenderNode::InsightPanel {
                prompt: prompt.clone(),
                context: context.clone(),
                summary: if *show_summary {
                    self.lesson
                        .document
                        .metadata
                        .as_ref()
                        .and_then(|metadata| metadata.ai_summary.clone())
                } else {
                    None
                },
                show_simulation: *show_simulation,
            },
            BlockKind::Animation {
                format,
                url,
                autoplay,
                loop_animation,
                caption,
            } => RenderNode::AnimationFrame {
                format: *format,
                url: url.clone(),
                autoplay: autoplay.unwrap_or(false),
                loop_animation: loop_animation.unwrap_or(false),
                caption: caption.clone(),
            },
        };
        Some(node)
    }
}
