//! Pipeline configuration endpoint.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::Deserialize;

use super::ApiClient;
use crate::error::ApiError;
use crate::pipeline::PipelineCatalog;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PipelineConfigBody {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    pipelines: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    buyer_decision: Vec<String>,
    #[serde(default)]
    how_met: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiClient {
    /// `GET /api/pipelines/config`: the tenant's pipeline types with their
    /// ordered stage lists, plus the qualification option lists.
    pub async fn fetch_pipeline_catalog(&self) -> Result<PipelineCatalog, ApiError> {
        let url = self.endpoint("/api/pipelines/config")?;
        let body: PipelineConfigBody = self.request::<_, ()>(Method::GET, url, None).await?;
        if body.success == Some(false) {
            return Err(ApiError::Rejected(
                body.error.unwrap_or_else(|| "request rejected".to_string()),
            ));
        }
        Ok(PipelineCatalog::new(
            body.pipelines,
            body.buyer_decision,
            body.how_met,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_body_parses_maps_and_options() {
        let json = serde_json::json!({
            "success": true,
            "pipelines": {
                "prospect": ["Interest", "Meeting"],
                "client": ["Kickoff"]
            },
            "buyerDecision": ["Decision Maker"],
            "howMet": ["Referral"]
        });
        let body: PipelineConfigBody = serde_json::from_value(json).unwrap();
        assert_eq!(body.pipelines.len(), 2);
        assert_eq!(body.buyer_decision, vec!["Decision Maker"]);
        assert_eq!(body.how_met, vec!["Referral"]);
    }

    #[test]
    fn test_config_body_defaults_when_sparse() {
        let json = serde_json::json!({ "pipelines": { "prospect": ["Interest"] } });
        let body: PipelineConfigBody = serde_json::from_value(json).unwrap();
        assert!(body.success.is_none());
        assert!(body.buyer_decision.is_empty());
        assert!(body.how_met.is_empty());
    }
}
