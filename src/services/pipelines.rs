//! Pipeline board flows: catalog fetch with fallback, board assembly, and
//! persisted stage moves.

use serde::Serialize;

use crate::pipeline::{build_board, contacts_in_pipeline, transition_stage, Board, PipelineCatalog};
use crate::state::AppState;
use crate::types::{Contact, PipelinePayload};
use crate::util::format_label;

/// The tenant's stage configuration. Any fetch failure (or an empty
/// server-side configuration) degrades silently to the built-in stages so
/// the board always renders.
pub async fn pipeline_catalog(state: &AppState) -> PipelineCatalog {
    match state.client.fetch_pipeline_catalog().await {
        Ok(catalog) if !catalog.is_empty() => catalog,
        Ok(_) => {
            log::warn!("pipeline config empty, using built-in stages");
            PipelineCatalog::fallback()
        }
        Err(err) => {
            log::warn!("pipeline config fetch failed, using built-in stages: {err}");
            PipelineCatalog::fallback()
        }
    }
}

/// Assemble the kanban board for one pipeline type from the cached
/// contact list.
pub async fn board(state: &AppState, pipeline_type: &str) -> Board {
    let catalog = pipeline_catalog(state).await;
    let contacts = state.store.read_contacts();
    build_board(&contacts, pipeline_type, catalog.stages_for(pipeline_type))
}

/// One entry in the pipeline picker row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    pub id: String,
    pub label: String,
    pub contacts: usize,
}

/// Contact counts per pipeline type, in display order.
pub async fn pipeline_summaries(state: &AppState) -> Vec<PipelineSummary> {
    let catalog = pipeline_catalog(state).await;
    let contacts = state.store.read_contacts();
    catalog
        .pipeline_types()
        .into_iter()
        .map(|id| PipelineSummary {
            label: format_label(id),
            contacts: contacts_in_pipeline(&contacts, id).len(),
            id: id.to_string(),
        })
        .collect()
}

/// Move a contact to a new stage: optimistic cache write, then persist via
/// the contact PATCH endpoint. On a persistence failure the cache is rolled
/// back to its pre-move snapshot, so a later refresh can never silently
/// revert a move this function reported as successful.
pub async fn move_stage(
    state: &AppState,
    contact_id: &str,
    pipeline_type: &str,
    new_stage: &str,
) -> Result<Vec<Contact>, String> {
    let snapshot = state.store.read_contacts();
    let moved = transition_stage(&snapshot, contact_id, pipeline_type, new_stage);

    let optimistic = moved.clone();
    state
        .store
        .update_contacts(move |_| optimistic)
        .map_err(|e| e.to_string())?;

    let payload = PipelinePayload {
        pipeline: pipeline_type.to_string(),
        stage: Some(new_stage.to_string()),
    };
    match state
        .client
        .update_contact_pipeline(contact_id, &payload)
        .await
    {
        // The server returned its copy of the record; trust it over ours.
        Ok(Some(server_copy)) => {
            let id = contact_id.to_string();
            state
                .store
                .update_contacts(move |contacts| {
                    contacts
                        .into_iter()
                        .map(|c| if c.id == id { server_copy.clone() } else { c })
                        .collect()
                })
                .map_err(|e| e.to_string())
        }
        Ok(None) => Ok(moved),
        Err(err) => {
            log::warn!("stage move for {contact_id} failed, rolling back: {err}");
            state
                .store
                .update_contacts(move |_| snapshot)
                .map_err(|rollback| format!("{err}; rollback failed: {rollback}"))?;
            Err(err.to_string())
        }
    }
}
