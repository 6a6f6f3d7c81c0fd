use serde::{Deserialize, Serialize};

// =============================================================================
// Domain records
// =============================================================================

/// A person known to the tenant.
///
/// Mirrors the backend's camelCase JSON. Legacy records carry a Mongo-style
/// `_id`, accepted as an alias on read. Reads are tolerant: every field
/// except `id` is optional so a cached record from an older server build
/// still deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(alias = "_id")]
    pub id: String,
    /// Owning tenant (CompanyHQ) scope.
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Preferred display name; wins over first/last when present.
    #[serde(default)]
    pub goes_by: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub buyer_decision: Option<String>,
    #[serde(default)]
    pub how_met: Option<String>,
    /// The contact's employer, distinct from the owning tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_company: Option<Company>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineMembership>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_value: Option<f64>,
}

impl Contact {
    /// Resolve the name shown in lists and on board cards.
    ///
    /// Precedence: `goesBy` → "firstName lastName" (skipping absent parts)
    /// → "Unnamed Contact". Never empty.
    pub fn display_name(&self) -> String {
        if let Some(goes_by) = self.goes_by.as_deref() {
            let trimmed = goes_by.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }

        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if full.is_empty() {
            "Unnamed Contact".to_string()
        } else {
            full
        }
    }

    /// Deal value for aggregates: membership value wins over the contact's
    /// own `dealValue`; absent counts as zero.
    pub fn deal_amount(&self) -> f64 {
        self.pipeline
            .as_ref()
            .and_then(|membership| membership.value)
            .or(self.deal_value)
            .unwrap_or(0.0)
    }
}

/// Pipeline membership embedded on a contact.
///
/// `stage` must be null or a member of the pipeline type's configured stage
/// list; anything else (including a stage left over from a prior pipeline
/// type) groups as unassigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMembership {
    #[serde(default)]
    pub pipeline: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    /// Per-deal value; wins over the contact's `dealValue` in stage totals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// A prospect/client organization — the contact's employer, not the tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// The tenant container created during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyHq {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub what_you_do: Option<String>,
    #[serde(default)]
    pub company_street: Option<String>,
    #[serde(default)]
    pub company_city: Option<String>,
    #[serde(default)]
    pub company_state: Option<String>,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub company_industry: Option<String>,
    #[serde(default)]
    pub company_annual_rev: Option<f64>,
    #[serde(default)]
    pub years_in_business: Option<i64>,
    #[serde(default)]
    pub team_size: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// The authenticated account, as returned by owner hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "companyHQId")]
    pub company_hq_id: Option<String>,
    #[serde(default, rename = "companyHQ", skip_serializing_if = "Option::is_none")]
    pub company_hq: Option<CompanyHq>,
    /// Only emptiness matters: an owner with no owned companies is routed
    /// to company setup.
    #[serde(default)]
    pub owned_companies: Vec<serde_json::Value>,
}

impl Owner {
    /// True when the profile step is complete (a non-blank name exists).
    pub fn has_name(&self) -> bool {
        self.name
            .as_deref()
            .map(|name| !name.trim().is_empty())
            .unwrap_or(false)
    }

    /// Tenant id, treating a blank `companyHQId` as absent. Accounts that
    /// have not finished company setup come back with `""` as often as with
    /// a missing field.
    pub fn tenant_id(&self) -> Option<&str> {
        self.company_hq_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// True when the owner is attached to a tenant with at least one
    /// owned company.
    pub fn has_company_hq(&self) -> bool {
        self.tenant_id().is_some() && !self.owned_companies.is_empty()
    }
}

/// Owner identity survey answers (ownerType / growthSpeed / managementStyle).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSurvey {
    #[serde(default)]
    pub owner_type: Option<String>,
    #[serde(default)]
    pub growth_speed: Option<String>,
    #[serde(default)]
    pub management_style: Option<String>,
}

// =============================================================================
// Request payloads
// =============================================================================
//
// Payloads serialize absent optionals as explicit nulls (no field skipping):
// the upsert endpoints distinguish "clear this field" from "field missing",
// and the client always means the former.

/// Contact half of the universal-create body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub company_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub goes_by: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub buyer_decision: Option<String>,
    pub how_met: Option<String>,
    /// Always null from the client; the server fills it in after the
    /// company upsert.
    pub contact_company_id: Option<String>,
}

/// Company half of the universal-create body. Absent entirely (None at the
/// call site) when no company name was supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPayload {
    #[serde(rename = "companyHQId")]
    pub company_hq_id: String,
    pub company_name: String,
    pub industry: Option<String>,
}

/// Pipeline half of the universal-create body, and the PATCH body for
/// stage moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePayload {
    pub pipeline: String,
    pub stage: Option<String>,
}

/// Body of `POST /api/contacts/universal-create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversalCreateRequest {
    pub contact: ContactPayload,
    pub company: Option<CompanyPayload>,
    pub pipeline: Option<PipelinePayload>,
}

/// Body of `POST /api/companyhq/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyHqPayload {
    pub company_name: Option<String>,
    pub what_you_do: Option<String>,
    pub company_street: Option<String>,
    pub company_city: Option<String>,
    pub company_state: Option<String>,
    pub company_website: Option<String>,
    pub company_industry: Option<String>,
    pub company_annual_rev: Option<f64>,
    pub years_in_business: Option<i64>,
    pub team_size: Option<String>,
    pub owner_id: String,
}

// =============================================================================
// Configuration
// =============================================================================

/// Production backend origin.
pub const PRODUCTION_API_URL: &str = "https://ignitebd-backend.onrender.com";
/// Local development backend origin.
pub const DEVELOPMENT_API_URL: &str = "http://localhost:4000";
/// Environment variable overriding the API origin entirely.
pub const API_URL_ENV: &str = "IGNITEBD_API_URL";

/// Which backend origin to target by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

/// Engine configuration stored in ~/.ignitebd/config.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
    /// Explicit API origin; wins over the environment default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// State-root override (primarily for tests); defaults to ~/.ignitebd
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

impl AppConfig {
    /// Resolve the API origin: `IGNITEBD_API_URL` env var → `apiUrl` →
    /// environment default.
    pub fn api_origin(&self) -> String {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                return url;
            }
        }
        self.configured_origin()
    }

    fn configured_origin(&self) -> String {
        if let Some(url) = self.api_url.as_deref() {
            if !url.trim().is_empty() {
                return url.to_string();
            }
        }
        match self.environment {
            Environment::Production => PRODUCTION_API_URL.to_string(),
            Environment::Development => DEVELOPMENT_API_URL.to_string(),
        }
    }
}
