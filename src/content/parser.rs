//! Lesson document parsing.
//!
//! The raw payload is a loosely-structured JSON document. Each block is
//! decoded independently so one malformed or unrecognized block never takes
//! the rest of the lesson down with it: defective blocks are dropped with a
//! diagnostic and parsing continues.

use crate::content::blocks::{BlockId, BlockKind, ContentBlock, LessonDocument, LessonMetadata};
use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read and parse a lesson document from disk.
pub fn load_lesson(path: &Path) -> Result<LessonDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read lesson document at {}", path.display()))?;
    parse_document(&raw)
}

/// Parse a raw lesson payload into a typed, validated document.
pub fn parse_document(raw: &str) -> Result<LessonDocument> {
    let value: Value = serde_json::from_str(raw).context("Lesson document is not valid JSON")?;
    let Value::Object(mut root) = value else {
        bail!("Lesson document root must be a JSON object");
    };

    let version = root
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or("1")
        .to_string();

    let metadata = match root.remove("metadata") {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value::<LessonMetadata>(value) {
            Ok(metadata) => Some(metadata),
            Err(err) => {
                warn!("Ignoring malformed lesson metadata: {err}");
                None
            }
        },
    };

    let raw_blocks = match root.remove("blocks") {
        Some(Value::Array(items)) => items,
        Some(_) => bail!("Lesson field `blocks` must be an array"),
        None => bail!("Lesson document is missing `blocks`"),
    };

    let mut blocks = Vec::with_capacity(raw_blocks.len());
    let mut dropped = 0usize;
    for (index, item) in raw_blocks.into_iter().enumerate() {
        match parse_block(index, item) {
            Ok(block) => blocks.push(block),
            Err(err) => {
                dropped += 1;
                warn!(index, "Dropping malformed content block: {err}");
            }
        }
    }

    if dropped > 0 {
        info!(
            kept = blocks.len(),
            dropped, "Parsed lesson with recoverable block defects"
        );
    } else {
        debug!(blocks = blocks.len(), version = %version, "Parsed lesson document");
    }

    Ok(LessonDocument {
        version,
        metadata,
        blocks,
    })
}

fn parse_block(index: usize, value: Value) -> Result<ContentBlock> {
    let derived_id = derive_block_id(index, &value);
    let Value::Object(mut fields) = value else {
        bail!("block must be a JSON object");
    };

    let id = match fields.remove("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => BlockId::new(id),
        _ => derived_id,
    };

    let kind: BlockKind = serde_json::from_value(Value::Object(fields))
        .map_err(|err| anyhow!("unrecognized or invalid block: {err}"))?;
    validate_block(&kind)?;

    Ok(ContentBlock { id, kind })
}

/// Blocks without an authored id get one derived from their position and raw
/// content, so re-parsing the same document always yields the same ids.
fn derive_block_id(index: usize, value: &Value) -> BlockId {
    let digest = Sha256::digest(value.to_string().as_bytes());
    let prefix: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    BlockId::new(format!("block-{index}-{prefix}"))
}

fn validate_block(kind: &BlockKind) -> Result<()> {
    match kind {
        BlockKind::Quiz {
            options,
            correct_index,
            ..
        } => {
            if options.is_empty() {
                bail!("quiz block has no options");
            }
            if *correct_index >= options.len() {
                bail!(
                    "quiz correctIndex {} is out of range for {} options",
                    correct_index,
                    options.len()
                );
            }
        }
        BlockKind::Assignment {
            submission_types, ..
        } => {
            if submission_types.is_empty() {
                bail!("assignment block accepts no submission types");
            }
        }
        BlockKind::Image { url, .. } | BlockKind::Animation { url, .. } => {
            if url.trim().is_empty() {
                bail!("media block has an empty url");
            }
        }
        _ => {}
    }
    Ok(())
}
