//! Stage catalog: which stages each pipeline type moves through.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::util::slugify;

/// Display order for the product's built-in pipeline types. Server-added
/// types follow in the map's alphabetical order.
const CANONICAL_ORDER: [&str; 4] = ["prospect", "client", "collaborator", "institution"];

/// Ordered stage lists per pipeline type, plus the qualification option
/// lists the contact form offers as dropdowns.
///
/// Type names and stage ids are stored slugified, so lookups and bucket
/// membership tolerate the formatting drift seen in stored records
/// ("Contract Signed" vs "contract-signed"). Stage order is progression
/// order: "next" is positional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineCatalog {
    pipelines: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub buyer_decision: Vec<String>,
    #[serde(default)]
    pub how_met: Vec<String>,
}

impl PipelineCatalog {
    /// Build a catalog from server-provided lists, normalizing type names
    /// and stage ids. Empty entries are dropped.
    pub fn new(
        pipelines: BTreeMap<String, Vec<String>>,
        buyer_decision: Vec<String>,
        how_met: Vec<String>,
    ) -> Self {
        let pipelines = pipelines
            .into_iter()
            .filter_map(|(pipeline_type, stages)| {
                let key = slugify(&pipeline_type);
                if key.is_empty() {
                    return None;
                }
                let stages: Vec<String> = stages
                    .iter()
                    .map(|stage| slugify(stage))
                    .filter(|stage| !stage.is_empty())
                    .collect();
                Some((key, stages))
            })
            .collect();

        Self {
            pipelines,
            buyer_decision,
            how_met,
        }
    }

    /// The built-in configuration used when the server's catalog is
    /// unavailable.
    pub fn fallback() -> Self {
        let mut pipelines = BTreeMap::new();
        pipelines.insert(
            "prospect".to_string(),
            stage_list(&["interest", "meeting", "proposal", "contract", "contract-signed"]),
        );
        pipelines.insert(
            "client".to_string(),
            stage_list(&[
                "kickoff",
                "work-started",
                "work-delivered",
                "sustainment",
                "renewal",
                "terminated-contract",
            ]),
        );
        pipelines.insert(
            "collaborator".to_string(),
            stage_list(&["interest", "meeting", "moa", "agreement"]),
        );
        pipelines.insert(
            "institution".to_string(),
            stage_list(&["interest", "meeting", "moa", "agreement"]),
        );

        Self {
            pipelines,
            buyer_decision: Vec::new(),
            how_met: Vec::new(),
        }
    }

    /// The ordered stage list for a pipeline type; empty when the type is
    /// not configured.
    pub fn stages_for(&self, pipeline_type: &str) -> &[String] {
        self.pipelines
            .get(&slugify(pipeline_type))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Configured pipeline types in display order: the built-in four first,
    /// then any server-added types alphabetically.
    pub fn pipeline_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = CANONICAL_ORDER
            .iter()
            .copied()
            .filter(|known| self.pipelines.contains_key(*known))
            .collect();
        types.extend(
            self.pipelines
                .keys()
                .map(String::as_str)
                .filter(|key| !CANONICAL_ORDER.contains(key)),
        );
        types
    }

    pub fn contains(&self, pipeline_type: &str) -> bool {
        self.pipelines.contains_key(&slugify(pipeline_type))
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

fn stage_list(stages: &[&str]) -> Vec<String> {
    stages.iter().map(|stage| stage.to_string()).collect()
}
