//! Title-driven enrichment of parsed blocks.
//!
//! Authoring tools emit simulation blocks with a generic placeholder id when
//! the author has not picked a concrete simulator. This pass specializes
//! those blocks by matching the lesson title against a keyword table. It is a
//! pure function: identical `(blocks, title)` input always yields identical
//! output, so it is safe to re-run.

use crate::content::blocks::{BlockKind, ContentBlock};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Simulators the platform can actually render. Anything else shows as a
/// "coming soon" placeholder.
pub const KNOWN_SIMULATIONS: [&str; 4] = [
    "sampling-statistics-lab",
    "web-request-inspector",
    "algorithm-visualizer",
    "circuit-sandbox",
];

const GENERIC_SIMULATION_IDS: [&str; 3] = ["generic-lab", "generic", "placeholder"];

static TITLE_KEYWORDS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(statistic|probabilit|distribution|sampling|variance|regression)")
                .expect("statistics keyword pattern"),
            "sampling-statistics-lab",
        ),
        (
            Regex::new(r"\b(web|http|html|css|browser|frontend)")
                .expect("web keyword pattern"),
            "web-request-inspector",
        ),
        (
            Regex::new(r"\b(algorithm|sorting|recursion|complexity|programming)")
                .expect("algorithms keyword pattern"),
            "algorithm-visualizer",
        ),
        (
            Regex::new(r"\b(circuit|electricit|voltage|resistance|ohm)")
                .expect("circuits keyword pattern"),
            "circuit-sandbox",
        ),
    ]
});

pub fn is_known_simulation(simulation_id: &str) -> bool {
    KNOWN_SIMULATIONS.contains(&simulation_id)
}

fn is_generic_simulation_id(simulation_id: &str) -> bool {
    GENERIC_SIMULATION_IDS.contains(&simulation_id)
}

fn simulation_for_title(title: &str) -> Option<&'static str> {
    let lowered = title.to_lowercase();
    TITLE_KEYWORDS
        .iter()
        .find(|(pattern, _)| pattern.is_match(&lowered))
        .map(|(_, simulation_id)| *simulation_id)
}

/// Specialize generic simulation blocks using the lesson title. All other
/// blocks pass through untouched, in their original order.
pub fn enrich_blocks(blocks: Vec<ContentBlock>, title: &str) -> Vec<ContentBlock> {
    let specialized = simulation_for_title(title);
    blocks
        .into_iter()
        .map(|ContentBlock { id, kind }| {
            let kind = match kind {
                BlockKind::Simulation {
                    simulation_id,
                    config,
                    instructions,
                } if is_generic_simulation_id(&simulation_id) => {
                    let simulation_id = match specialized {
                        Some(target) => {
                            debug!(block = %id, from = %simulation_id, to = target,
                                "Specialized generic simulation from title keywords");
                            target.to_string()
                        }
                        None => simulation_id,
                    };
                    BlockKind::Simulation {
                        simulation_id,
                        config,
                        instructions,
                    }
                }
                other => other,
            };
            ContentBlock { id, kind }
        })
        .collect()
}
