use serde::{Deserialize, Serialize};

/// Stable identifier for a content block. Assigned by the author or derived
/// deterministically at parse time when the source omits one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        BlockId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parsed per-lesson content payload. Immutable for the lifetime of a
/// lesson view; gating and playback state live alongside it, never inside.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LessonDocument {
    pub version: String,
    pub metadata: Option<LessonMetadata>,
    pub blocks: Vec<ContentBlock>,
}

/// Optional lesson-level metadata. Absent fields stay `None`; they are never
/// normalized into empty collections.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonMetadata {
    #[serde(default)]
    pub objectives: Option<Vec<String>>,
    #[serde(default)]
    pub references: Option<Vec<String>>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub teacher_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContentBlock {
    pub id: BlockId,
    #[serde(flatten)]
    pub kind: BlockKind,
}

impl ContentBlock {
    /// Whether completing this block gates the reveal of later blocks.
    pub fn is_blocking(&self) -> bool {
        match &self.kind {
            BlockKind::Quiz { unlocks, .. } => *unlocks,
            BlockKind::Assignment { is_blocking, .. } => *is_blocking,
            _ => false,
        }
    }
}

/// The closed set of renderable block variants.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum BlockKind {
    Text {
        content: String,
        #[serde(default)]
        style: TextStyle,
        #[serde(default)]
        citations: Vec<Citation>,
    },
    Image {
        url: String,
        #[serde(default)]
        alt: Option<String>,
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        size: ImageSize,
    },
    Quiz {
        question: String,
        options: Vec<String>,
        correct_index: usize,
        #[serde(default)]
        explanation: Option<String>,
        #[serde(default)]
        unlocks: bool,
    },
    Simulation {
        simulation_id: String,
        #[serde(default)]
        config: Option<serde_json::Value>,
        #[serde(default)]
        instructions: Option<String>,
    },
    Assignment {
        title: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        instructions: Option<String>,
        submission_types: Vec<SubmissionKind>,
        #[serde(default)]
        is_blocking: bool,
        #[serde(default)]
        max_file_size: Option<u64>,
    },
    Divider {
        #[serde(default)]
        style: DividerStyle,
    },
    AiInsight {
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        show_summary: bool,
        #[serde(default)]
        show_simulation: bool,
        #[serde(default)]
        context: Option<String>,
    },
    Animation {
        format: AnimationFormat,
        url: String,
        #[serde(default)]
        autoplay: Option<bool>,
        #[serde(default, rename = "loop")]
        loop_animation: Option<bool>,
        #[serde(default)]
        caption: Option<String>,
    },
}

/// An inline citation attached to a text block.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Citation {
    pub text: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextStyle {
    Paragraph,
    Heading,
    Subheading,
    Callout,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle::Paragraph
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageSize {
    Small,
    Medium,
    Large,
    Full,
}

impl Default for ImageSize {
    fn default() -> Self {
        ImageSize::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DividerStyle {
    Line,
    Dots,
    Space,
}

impl Default for DividerStyle {
    fn default() -> Self {
        DividerStyle::Line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationFormat {
    Lottie,
    Gif,
    Webm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionKind {
    Text,
    File,
    Link,
}

impl std::fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SubmissionKind::Text => "text",
            SubmissionKind::File => "file",
            SubmissionKind::Link => "link",
        };
        write!(f, "{}", label)
    }
}
