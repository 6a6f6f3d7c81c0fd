//! Kanban grouping over a contact snapshot.
//!
//! Pure functions: the caller supplies the contacts and the ordered stage
//! list for one pipeline type; nothing here touches the store or the
//! network. Membership comparisons go through slugify on both sides, so
//! records written as "Prospect" and "prospect " group together.

use serde::Serialize;

use crate::types::Contact;
use crate::util::{format_label, slugify};

/// Sentinel stage id for contacts whose stage is empty or not in the
/// configured list (including stages carried over from a prior pipeline
/// type). Reserved: a configured stage named "unassigned" is shadowed.
pub const UNASSIGNED_STAGE: &str = "unassigned";

fn pipeline_slug(contact: &Contact) -> String {
    slugify(
        contact
            .pipeline
            .as_ref()
            .and_then(|membership| membership.pipeline.as_deref())
            .unwrap_or(""),
    )
}

fn stage_slug(contact: &Contact) -> String {
    slugify(
        contact
            .pipeline
            .as_ref()
            .and_then(|membership| membership.stage.as_deref())
            .unwrap_or(""),
    )
}

/// Contacts whose membership names this pipeline type.
pub fn contacts_in_pipeline<'a>(contacts: &'a [Contact], pipeline_type: &str) -> Vec<&'a Contact> {
    let wanted = slugify(pipeline_type);
    contacts
        .iter()
        .filter(|contact| pipeline_slug(contact) == wanted)
        .collect()
}

/// Of contacts already scoped to one pipeline, those sitting in `stage_id`.
pub fn contacts_in_stage<'a>(
    pipeline_contacts: &[&'a Contact],
    stage_id: &str,
) -> Vec<&'a Contact> {
    let wanted = slugify(stage_id);
    pipeline_contacts
        .iter()
        .filter(|contact| stage_slug(contact) == wanted)
        .copied()
        .collect()
}

/// Of contacts already scoped to one pipeline, those whose stage is not in
/// the configured list. Catches both the never-assigned and stages left
/// over from a different pipeline type.
pub fn unassigned<'a>(pipeline_contacts: &[&'a Contact], stages: &[String]) -> Vec<&'a Contact> {
    pipeline_contacts
        .iter()
        .filter(|contact| {
            let stage = stage_slug(contact);
            !stages.iter().any(|configured| slugify(configured) == stage)
        })
        .copied()
        .collect()
}

/// Forward moves available from `current`.
///
/// Empty stage list yields nothing; the unassigned sentinel offers only
/// the first stage; the last stage (or an unknown one) is terminal;
/// anything else offers every stage after the current index, so the UI can
/// present the whole forward menu rather than a single step.
pub fn next_stages(current: &str, stages: &[String]) -> Vec<String> {
    if stages.is_empty() {
        return Vec::new();
    }
    let current = slugify(current);
    if current == UNASSIGNED_STAGE {
        return vec![stages[0].clone()];
    }
    match stages.iter().position(|stage| slugify(stage) == current) {
        Some(index) if index + 1 < stages.len() => stages[index + 1..].to_vec(),
        _ => Vec::new(),
    }
}

/// Re-stage one contact, leaving everything else untouched.
///
/// The matching contact's membership gets `pipeline_type`/`new_stage`,
/// preserving its other fields (notably the deal value); a contact with no
/// membership yet gains one. Applying the same move twice changes nothing
/// further.
pub fn transition_stage(
    contacts: &[Contact],
    contact_id: &str,
    pipeline_type: &str,
    new_stage: &str,
) -> Vec<Contact> {
    contacts
        .iter()
        .map(|contact| {
            if contact.id != contact_id {
                return contact.clone();
            }
            let mut updated = contact.clone();
            let mut membership = updated.pipeline.take().unwrap_or_default();
            membership.pipeline = Some(pipeline_type.to_string());
            membership.stage = Some(new_stage.to_string());
            updated.pipeline = Some(membership);
            updated
        })
        .collect()
}

/// Summed deal value of a bucket: membership value, else the contact's
/// `dealValue`, else zero.
pub fn stage_value(contacts: &[&Contact]) -> f64 {
    contacts.iter().map(|contact| contact.deal_amount()).sum()
}

/// One kanban column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageColumn {
    pub id: String,
    pub label: String,
    pub contacts: Vec<Contact>,
    pub count: usize,
    pub total_value: f64,
}

/// The assembled kanban view for one pipeline type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub pipeline: String,
    pub label: String,
    pub columns: Vec<StageColumn>,
    /// Summed value across the configured stages only; the unassigned
    /// column is excluded, matching the board header.
    pub total_value: f64,
    pub contact_count: usize,
}

/// Assemble the board: one column per configured stage in order, plus a
/// trailing unassigned column when any contact needs it.
pub fn build_board(contacts: &[Contact], pipeline_type: &str, stages: &[String]) -> Board {
    let scoped = contacts_in_pipeline(contacts, pipeline_type);

    let mut columns = Vec::with_capacity(stages.len() + 1);
    let mut total_value = 0.0;
    for stage in stages {
        let members = contacts_in_stage(&scoped, stage);
        let value = stage_value(&members);
        total_value += value;
        columns.push(StageColumn {
            id: slugify(stage),
            label: format_label(&slugify(stage)),
            count: members.len(),
            total_value: value,
            contacts: members.into_iter().cloned().collect(),
        });
    }

    let leftover = unassigned(&scoped, stages);
    if !leftover.is_empty() {
        columns.push(StageColumn {
            id: UNASSIGNED_STAGE.to_string(),
            label: format_label(UNASSIGNED_STAGE),
            count: leftover.len(),
            total_value: stage_value(&leftover),
            contacts: leftover.into_iter().cloned().collect(),
        });
    }

    let pipeline = slugify(pipeline_type);
    Board {
        label: format_label(&pipeline),
        pipeline,
        contact_count: scoped.len(),
        columns,
        total_value,
    }
}
