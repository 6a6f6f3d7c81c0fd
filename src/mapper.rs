//! Form-to-payload mapping for contact and tenant creation.
//!
//! Pure and total: every function accepts any flat form record and never
//! errors. Validation is a separate order-stable pass whose messages the
//! host renders directly. A versioned [`FormSchema`] lets payloads from
//! older form revisions flow through the one mapper instead of keeping
//! parallel form variants alive.

use serde::{Deserialize, Serialize};

use crate::types::{CompanyHqPayload, CompanyPayload, ContactPayload, PipelinePayload};

/// The flat contact form record, matching the camelCase field names the
/// form posts. Every field is a plain string; absent means empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub goes_by: String,
    pub email: String,
    pub phone: String,
    pub title: String,
    pub notes: String,
    pub buyer_decision: String,
    pub how_met: String,
    pub company_name: String,
    pub industry: String,
    pub pipeline: String,
    pub stage: String,
}

/// A field the contact form can collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    GoesBy,
    Email,
    Phone,
    Title,
    Notes,
    BuyerDecision,
    HowMet,
    CompanyName,
    Industry,
    Pipeline,
    Stage,
}

/// Fields the original manual-entry form collected.
const REVISION_1: &[FormField] = &[
    FormField::FirstName,
    FormField::LastName,
    FormField::Email,
    FormField::Phone,
    FormField::Title,
    FormField::Notes,
    FormField::CompanyName,
];

/// Fields the current full form collects (the complete set).
const REVISION_2: &[FormField] = &[
    FormField::FirstName,
    FormField::LastName,
    FormField::GoesBy,
    FormField::Email,
    FormField::Phone,
    FormField::Title,
    FormField::Notes,
    FormField::BuyerDecision,
    FormField::HowMet,
    FormField::CompanyName,
    FormField::Industry,
    FormField::Pipeline,
    FormField::Stage,
];

pub const LATEST_REVISION: u32 = 2;

fn field_mut(form: &mut ContactForm, field: FormField) -> &mut String {
    match field {
        FormField::FirstName => &mut form.first_name,
        FormField::LastName => &mut form.last_name,
        FormField::GoesBy => &mut form.goes_by,
        FormField::Email => &mut form.email,
        FormField::Phone => &mut form.phone,
        FormField::Title => &mut form.title,
        FormField::Notes => &mut form.notes,
        FormField::BuyerDecision => &mut form.buyer_decision,
        FormField::HowMet => &mut form.how_met,
        FormField::CompanyName => &mut form.company_name,
        FormField::Industry => &mut form.industry,
        FormField::Pipeline => &mut form.pipeline,
        FormField::Stage => &mut form.stage,
    }
}

/// Which fields a published revision of the contact form collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSchema {
    revision: u32,
    fields: &'static [FormField],
}

impl FormSchema {
    /// The current full form.
    pub fn latest() -> Self {
        Self {
            revision: LATEST_REVISION,
            fields: REVISION_2,
        }
    }

    /// Look up a published revision; None for revisions never shipped.
    pub fn revision(revision: u32) -> Option<Self> {
        match revision {
            1 => Some(Self {
                revision: 1,
                fields: REVISION_1,
            }),
            2 => Some(Self::latest()),
            _ => None,
        }
    }

    pub fn revision_number(&self) -> u32 {
        self.revision
    }

    pub fn collects(&self, field: FormField) -> bool {
        self.fields.contains(&field)
    }

    /// Blank every field this revision does not collect, so the mapper
    /// sees exactly what this revision's form could have posted.
    pub fn filter(&self, form: &ContactForm) -> ContactForm {
        let mut filtered = form.clone();
        for field in REVISION_2 {
            if !self.collects(*field) {
                field_mut(&mut filtered, *field).clear();
            }
        }
        filtered
    }
}

/// Empty-after-trim becomes None; anything else passes through unchanged.
/// The upsert endpoints treat null as "clear this field", so blanks must
/// never reach the wire as empty strings.
fn optional(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Contact half of the universal-create body. `contactCompanyId` stays
/// null; the server links it after the company upsert.
pub fn map_contact(form: &ContactForm, tenant_id: &str) -> ContactPayload {
    ContactPayload {
        company_id: tenant_id.to_string(),
        first_name: optional(&form.first_name),
        last_name: optional(&form.last_name),
        goes_by: optional(&form.goes_by),
        email: optional(&form.email),
        phone: optional(&form.phone),
        title: optional(&form.title),
        notes: optional(&form.notes),
        buyer_decision: optional(&form.buyer_decision),
        how_met: optional(&form.how_met),
        contact_company_id: None,
    }
}

/// Company half of the universal-create body. None when `companyName`
/// trims to empty; that sentinel is how the caller decides whether a
/// company upsert happens at all.
pub fn map_company(form: &ContactForm, tenant_id: &str) -> Option<CompanyPayload> {
    let name = form.company_name.trim();
    if name.is_empty() {
        return None;
    }
    Some(CompanyPayload {
        company_hq_id: tenant_id.to_string(),
        company_name: name.to_string(),
        industry: optional(&form.industry),
    })
}

/// Pipeline half of the universal-create body. None when no pipeline type
/// was selected; a selected pipeline with no stage starts unassigned.
pub fn map_pipeline(form: &ContactForm) -> Option<PipelinePayload> {
    if form.pipeline.trim().is_empty() {
        return None;
    }
    Some(PipelinePayload {
        pipeline: form.pipeline.clone(),
        stage: optional(&form.stage),
    })
}

/// Outcome of [`validate`]; `errors` render in form order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Only the two name fields are required; everything else is optional.
pub fn validate(form: &ContactForm) -> Validation {
    let mut errors = Vec::new();
    if form.first_name.trim().is_empty() {
        errors.push("First name is required".to_string());
    }
    if form.last_name.trim().is_empty() {
        errors.push("Last name is required".to_string());
    }
    Validation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// The onboarding company-profile form. Numeric fields arrive as raw
/// input strings and are parsed during mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyHqForm {
    pub company_name: String,
    pub what_you_do: String,
    pub company_street: String,
    pub company_city: String,
    pub company_state: String,
    pub company_website: String,
    pub company_industry: String,
    pub company_annual_rev: String,
    pub years_in_business: String,
    pub team_size: String,
}

/// Tenant-creation payload; unparseable numbers map to null rather than
/// failing the submission.
pub fn map_company_hq(form: &CompanyHqForm, owner_id: &str) -> CompanyHqPayload {
    CompanyHqPayload {
        company_name: optional(&form.company_name),
        what_you_do: optional(&form.what_you_do),
        company_street: optional(&form.company_street),
        company_city: optional(&form.company_city),
        company_state: optional(&form.company_state),
        company_website: optional(&form.company_website),
        company_industry: optional(&form.company_industry),
        company_annual_rev: form.company_annual_rev.trim().parse().ok(),
        years_in_business: form.years_in_business.trim().parse().ok(),
        team_size: optional(&form.team_size),
        owner_id: owner_id.to_string(),
    }
}
