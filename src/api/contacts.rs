//! Contact endpoints.
//!
//! Older server builds return bare records where newer ones wrap them in
//! `{ success, ... }` envelopes, so response bodies are parsed as either.

use reqwest::Method;
use serde::Deserialize;
use url::Url;

use super::ApiClient;
use crate::error::ApiError;
use crate::types::{Contact, PipelinePayload, UniversalCreateRequest};

// Variant order matters: a bare record carries an `id`, so it is tried
// first; the envelope's fields are all optional and would otherwise match
// any object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ContactBody {
    Bare(Box<Contact>),
    Envelope {
        #[serde(default)]
        success: Option<bool>,
        #[serde(default)]
        contact: Option<Box<Contact>>,
        #[serde(default)]
        error: Option<String>,
    },
}

impl ContactBody {
    fn into_contact(self) -> Result<Contact, ApiError> {
        match self {
            ContactBody::Bare(contact) => Ok(*contact),
            ContactBody::Envelope {
                success: Some(false),
                error,
                ..
            } => Err(ApiError::Rejected(
                error.unwrap_or_else(|| "request rejected".to_string()),
            )),
            ContactBody::Envelope {
                contact: Some(contact),
                ..
            } => Ok(*contact),
            ContactBody::Envelope { error, .. } => Err(ApiError::Rejected(
                error.unwrap_or_else(|| "contact missing from response".to_string()),
            )),
        }
    }

    fn into_optional_contact(self) -> Result<Option<Contact>, ApiError> {
        match self {
            ContactBody::Bare(contact) => Ok(Some(*contact)),
            ContactBody::Envelope {
                success: Some(false),
                error,
                ..
            } => Err(ApiError::Rejected(
                error.unwrap_or_else(|| "request rejected".to_string()),
            )),
            ContactBody::Envelope { contact, .. } => Ok(contact.map(|c| *c)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContactListBody {
    Bare(Vec<Contact>),
    Envelope {
        #[serde(default)]
        success: Option<bool>,
        #[serde(default)]
        contacts: Vec<Contact>,
        #[serde(default)]
        error: Option<String>,
    },
}

impl ContactListBody {
    fn into_contacts(self) -> Result<Vec<Contact>, ApiError> {
        match self {
            ContactListBody::Bare(contacts) => Ok(contacts),
            ContactListBody::Envelope {
                success: Some(false),
                error,
                ..
            } => Err(ApiError::Rejected(
                error.unwrap_or_else(|| "request rejected".to_string()),
            )),
            ContactListBody::Envelope { contacts, .. } => Ok(contacts),
        }
    }
}

impl ApiClient {
    fn list_contacts_url(
        &self,
        company_hq_id: &str,
        pipeline: Option<&str>,
    ) -> Result<Url, ApiError> {
        let mut url = self.endpoint("/api/contacts")?;
        url.query_pairs_mut().append_pair("companyHQId", company_hq_id);
        if let Some(pipeline) = pipeline {
            url.query_pairs_mut().append_pair("pipeline", pipeline);
        }
        Ok(url)
    }

    /// `GET /api/contacts` scoped to the tenant, optionally narrowed to one
    /// pipeline type server-side.
    pub async fn list_contacts(
        &self,
        company_hq_id: &str,
        pipeline: Option<&str>,
    ) -> Result<Vec<Contact>, ApiError> {
        let url = self.list_contacts_url(company_hq_id, pipeline)?;
        let body: ContactListBody = self.request::<_, ()>(Method::GET, url, None).await?;
        body.into_contacts()
    }

    /// `GET /api/contacts/:id`.
    pub async fn get_contact(&self, id: &str) -> Result<Contact, ApiError> {
        let url = self.endpoint(&format!("/api/contacts/{id}"))?;
        let body: ContactBody = self.request::<_, ()>(Method::GET, url, None).await?;
        body.into_contact()
    }

    /// `POST /api/contacts/universal-create`: contact plus optional company
    /// and pipeline halves in one transactional request.
    pub async fn universal_create(
        &self,
        request: &UniversalCreateRequest,
    ) -> Result<Contact, ApiError> {
        let url = self.endpoint("/api/contacts/universal-create")?;
        let body: ContactBody = self.request(Method::POST, url, Some(request)).await?;
        body.into_contact()
    }

    /// `PATCH /api/contacts/:id` with a replacement pipeline membership.
    /// Returns the server's copy of the record when the response includes
    /// one; a bare ack is fine.
    pub async fn update_contact_pipeline(
        &self,
        id: &str,
        pipeline: &PipelinePayload,
    ) -> Result<Option<Contact>, ApiError> {
        let url = self.endpoint(&format!("/api/contacts/{id}"))?;
        let patch = serde_json::json!({ "pipeline": pipeline });
        let response = self.execute(Method::PATCH, url, Some(&patch)).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let body: ContactBody = serde_json::from_str(&text)?;
        body.into_optional_contact()
    }

    /// `DELETE /api/contacts/:id`. Only the status matters.
    pub async fn delete_contact(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/api/contacts/{id}"))?;
        self.request_ack::<()>(Method::DELETE, url, None).await
    }
}
