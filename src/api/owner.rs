//! Owner and tenant endpoints.

use reqwest::Method;
use serde::Deserialize;

use super::ApiClient;
use crate::error::ApiError;
use crate::types::{CompanyHq, CompanyHqPayload, Owner, OwnerSurvey};

// Bare first: owner records carry an `id`, envelopes do not.
#[derive(Deserialize)]
#[serde(untagged)]
enum OwnerBody {
    Bare(Box<Owner>),
    Envelope {
        #[serde(default)]
        success: Option<bool>,
        #[serde(default)]
        owner: Option<Box<Owner>>,
        #[serde(default)]
        error: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CompanyHqBody {
    Bare(Box<CompanyHq>),
    Envelope {
        #[serde(default)]
        success: Option<bool>,
        #[serde(default, rename = "companyHQ")]
        company_hq: Option<Box<CompanyHq>>,
        #[serde(default)]
        error: Option<String>,
    },
}

impl ApiClient {
    /// `GET /api/owner/hydrate`: the signed-in account with its tenant
    /// attachment, used to route after launch and sign-in.
    pub async fn hydrate(&self) -> Result<Owner, ApiError> {
        let url = self.endpoint("/api/owner/hydrate")?;
        let body: OwnerBody = self.request::<_, ()>(Method::GET, url, None).await?;
        match body {
            OwnerBody::Bare(owner) => Ok(*owner),
            OwnerBody::Envelope {
                success: Some(false),
                error,
                ..
            } => Err(ApiError::Rejected(
                error.unwrap_or_else(|| "request rejected".to_string()),
            )),
            OwnerBody::Envelope {
                owner: Some(owner), ..
            } => Ok(*owner),
            OwnerBody::Envelope { error, .. } => Err(ApiError::Rejected(
                error.unwrap_or_else(|| "owner missing from response".to_string()),
            )),
        }
    }

    /// `POST /api/companyhq/create`: create the tenant container during
    /// onboarding.
    pub async fn create_company_hq(
        &self,
        payload: &CompanyHqPayload,
    ) -> Result<CompanyHq, ApiError> {
        let url = self.endpoint("/api/companyhq/create")?;
        let body: CompanyHqBody = self.request(Method::POST, url, Some(payload)).await?;
        match body {
            CompanyHqBody::Bare(hq) => Ok(*hq),
            CompanyHqBody::Envelope {
                success: Some(false),
                error,
                ..
            } => Err(ApiError::Rejected(
                error.unwrap_or_else(|| "request rejected".to_string()),
            )),
            CompanyHqBody::Envelope {
                company_hq: Some(hq),
                ..
            } => Ok(*hq),
            CompanyHqBody::Envelope { error, .. } => Err(ApiError::Rejected(
                error.unwrap_or_else(|| "companyHQ missing from response".to_string()),
            )),
        }
    }

    /// `PUT /api/owner/:id/survey`: store the identity survey answers.
    /// Only the status matters.
    pub async fn submit_survey(
        &self,
        owner_id: &str,
        survey: &OwnerSurvey,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/api/owner/{owner_id}/survey"))?;
        self.request_ack(Method::PUT, url, Some(survey)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_body_envelope_and_bare() {
        let envelope = serde_json::json!({
            "success": true,
            "owner": { "id": "o-1", "name": "Jess", "companyHQId": "hq-1" }
        });
        let body: OwnerBody = serde_json::from_value(envelope).unwrap();
        let OwnerBody::Envelope { owner: Some(owner), .. } = body else {
            panic!("expected envelope with owner");
        };
        assert_eq!(owner.company_hq_id.as_deref(), Some("hq-1"));

        let bare = serde_json::json!({ "id": "o-2", "ownedCompanies": [] });
        let body: OwnerBody = serde_json::from_value(bare).unwrap();
        assert!(matches!(body, OwnerBody::Bare(owner) if owner.id == "o-2"));
    }

    #[test]
    fn test_company_hq_body_uses_upper_hq_key() {
        let envelope = serde_json::json!({
            "success": true,
            "companyHQ": { "id": "hq-1", "companyName": "Ignite" }
        });
        let body: CompanyHqBody = serde_json::from_value(envelope).unwrap();
        let CompanyHqBody::Envelope { company_hq: Some(hq), .. } = body else {
            panic!("expected envelope with companyHQ");
        };
        assert_eq!(hq.company_name.as_deref(), Some("Ignite"));
    }

    #[test]
    fn test_company_hq_payload_serializes_owner_and_nulls() {
        let payload = CompanyHqPayload {
            company_name: Some("Ignite".to_string()),
            what_you_do: None,
            company_street: None,
            company_city: None,
            company_state: None,
            company_website: None,
            company_industry: None,
            company_annual_rev: None,
            years_in_business: Some(4),
            team_size: None,
            owner_id: "o-1".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json.get("ownerId").unwrap(), "o-1");
        assert_eq!(json.get("yearsInBusiness").unwrap(), 4);
        assert!(json.get("whatYouDo").unwrap().is_null());
    }
}
