//! Contact list, detail, create, and delete flows.
//!
//! The list is cache-first: render whatever the store has, refresh from the
//! server, and fall back to the cache silently when the refresh fails while
//! cached data exists. Mutations hit the server first and only then touch
//! the store, so the cache never claims a write the server refused.

use serde::Serialize;

use crate::error::ApiError;
use crate::mapper::{map_company, map_contact, map_pipeline, validate, ContactForm, FormSchema};
use crate::session::Route;
use crate::state::AppState;
use crate::types::{Contact, UniversalCreateRequest};

/// Filters the contact list view applies after fetching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactQuery {
    /// Case-insensitive substring over "first last", email, and the
    /// employer's company name.
    pub search: Option<String>,
    /// Exact match against the membership's pipeline value, as stored.
    pub pipeline: Option<String>,
}

/// The contact list with provenance: `from_cache` tells the view to show
/// its stale-data affordance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsOverview {
    pub contacts: Vec<Contact>,
    pub total: usize,
    pub from_cache: bool,
}

/// Outcome of a contact-detail load. A record that no longer exists is a
/// routing decision, not an error the host has to interpret.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ContactDetail {
    #[serde(rename_all = "camelCase")]
    Found { contact: Box<Contact> },
    #[serde(rename_all = "camelCase")]
    Missing { redirect: Route },
}

/// Synchronous fast path: whatever the store currently holds.
pub fn cached_contacts(state: &AppState) -> Vec<Contact> {
    state.store.read_contacts()
}

/// Fetch the tenant's contacts and replace the cache with the result.
pub async fn refresh_contacts(
    state: &AppState,
    pipeline: Option<&str>,
) -> Result<Vec<Contact>, String> {
    let tenant = state.company_hq_id().ok_or("No company selected")?;
    let contacts = state
        .client
        .list_contacts(&tenant, pipeline)
        .await
        .map_err(|e| e.to_string())?;
    state
        .store
        .write_contacts(&contacts)
        .map_err(|e| e.to_string())?;
    log::debug!("refreshed {} contacts for {tenant}", contacts.len());
    Ok(contacts)
}

/// The composed list flow: refresh, fall back to the cache when the
/// refresh fails and cached data exists, then apply the view filters.
/// Only an empty cache lets the refresh error through.
pub async fn contacts_overview(
    state: &AppState,
    query: &ContactQuery,
) -> Result<ContactsOverview, String> {
    let cached = state.store.read_contacts();
    match refresh_contacts(state, None).await {
        Ok(fresh) => Ok(overview(fresh, false, query)),
        Err(err) if !cached.is_empty() => {
            log::warn!("contact refresh failed, serving cached list: {err}");
            Ok(overview(cached, true, query))
        }
        Err(err) => Err(err),
    }
}

fn overview(contacts: Vec<Contact>, from_cache: bool, query: &ContactQuery) -> ContactsOverview {
    let contacts = apply_query(contacts, query);
    ContactsOverview {
        total: contacts.len(),
        from_cache,
        contacts,
    }
}

fn apply_query(contacts: Vec<Contact>, query: &ContactQuery) -> Vec<Contact> {
    contacts
        .into_iter()
        .filter(|contact| matches_search(contact, query.search.as_deref()))
        .filter(|contact| matches_pipeline(contact, query.pipeline.as_deref()))
        .collect()
}

fn matches_search(contact: &Contact, search: Option<&str>) -> bool {
    let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();

    let name = format!(
        "{} {}",
        contact.first_name.as_deref().unwrap_or(""),
        contact.last_name.as_deref().unwrap_or("")
    )
    .to_lowercase();
    if name.contains(&needle) {
        return true;
    }
    if let Some(email) = contact.email.as_deref() {
        if email.to_lowercase().contains(&needle) {
            return true;
        }
    }
    contact
        .contact_company
        .as_ref()
        .and_then(|company| company.company_name.as_deref())
        .map(|name| name.to_lowercase().contains(&needle))
        .unwrap_or(false)
}

fn matches_pipeline(contact: &Contact, pipeline: Option<&str>) -> bool {
    let Some(wanted) = pipeline.map(str::trim).filter(|p| !p.is_empty()) else {
        return true;
    };
    contact
        .pipeline
        .as_ref()
        .and_then(|membership| membership.pipeline.as_deref())
        == Some(wanted)
}

/// Load one contact from the server. 404 and rejected envelopes both mean
/// the record is gone; send the host back to the list.
pub async fn contact_detail(state: &AppState, id: &str) -> Result<ContactDetail, String> {
    match state.client.get_contact(id).await {
        Ok(contact) => Ok(ContactDetail::Found {
            contact: Box::new(contact),
        }),
        Err(err) if err.is_not_found() => {
            log::info!("contact {id} not found, returning to list");
            Ok(ContactDetail::Missing {
                redirect: Route::ContactList,
            })
        }
        Err(ApiError::Rejected(reason)) => {
            log::info!("contact {id} unavailable ({reason}), returning to list");
            Ok(ContactDetail::Missing {
                redirect: Route::ContactList,
            })
        }
        Err(err) => Err(err.to_string()),
    }
}

/// Validate, map through the given form schema, create on the server, and
/// append the server's record to the cache. Validation failures come back
/// as one joined message in field order.
pub async fn create_contact(
    state: &AppState,
    form: &ContactForm,
    schema: FormSchema,
) -> Result<Contact, String> {
    let validation = validate(form);
    if !validation.is_valid {
        return Err(validation.errors.join("; "));
    }

    let tenant = state.company_hq_id().ok_or("No company selected")?;
    let form = schema.filter(form);
    let request = UniversalCreateRequest {
        contact: map_contact(&form, &tenant),
        company: map_company(&form, &tenant),
        pipeline: map_pipeline(&form),
    };

    let contact = state
        .client
        .universal_create(&request)
        .await
        .map_err(|e| e.to_string())?;

    let created = contact.clone();
    state
        .store
        .update_contacts(move |mut contacts| {
            contacts.push(created);
            contacts
        })
        .map_err(|e| e.to_string())?;
    log::info!("created contact {}", contact.id);
    Ok(contact)
}

/// Delete on the server, then drop the record from the cache.
pub async fn delete_contact(state: &AppState, id: &str) -> Result<(), String> {
    state
        .client
        .delete_contact(id)
        .await
        .map_err(|e| e.to_string())?;
    state
        .store
        .update_contacts(|contacts| contacts.into_iter().filter(|c| c.id != id).collect())
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Per-id outcome of [`delete_contacts`]. Successes are never rolled back
/// when a later id fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<BulkDeleteFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteFailure {
    pub id: String,
    pub error: String,
}

/// Delete several contacts, one server call each, and report which ids
/// succeeded and which failed.
pub async fn delete_contacts(state: &AppState, ids: &[String]) -> BulkDeleteReport {
    let mut report = BulkDeleteReport::default();
    for id in ids {
        match delete_contact(state, id).await {
            Ok(()) => report.deleted.push(id.clone()),
            Err(error) => {
                log::warn!("bulk delete: {id} failed: {error}");
                report.failed.push(BulkDeleteFailure {
                    id: id.clone(),
                    error,
                });
            }
        }
    }
    log::info!(
        "bulk delete: {} deleted, {} failed",
        report.deleted.len(),
        report.failed.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::NoToken;
    use crate::store::keys;
    use crate::types::AppConfig;
    use std::path::Path;
    use std::sync::Arc;

    fn contact(id: &str, first: &str, last: &str) -> Contact {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "firstName": first,
            "lastName": last,
        }))
        .unwrap()
    }

    fn state_with_api(dir: &Path, api_url: &str) -> AppState {
        let config = AppConfig {
            api_url: Some(api_url.to_string()),
            data_dir: Some(dir.to_string_lossy().into_owned()),
            ..Default::default()
        };
        AppState::new(config, Arc::new(NoToken)).unwrap()
    }

    fn state_with_dead_server(dir: &Path) -> AppState {
        // Nothing listens on the discard port, so every request fails
        // fast with a transport error.
        state_with_api(dir, "http://127.0.0.1:9")
    }

    /// One-shot loopback server for the bulk-delete flow: deletes of
    /// contact "a" succeed, every other id gets a 500 with an error body.
    fn spawn_delete_server() -> std::net::SocketAddr {
        use std::io::{BufRead, BufReader, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for _ in 0..2 {
                let (mut socket, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(socket.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).unwrap();
                    if header == "\r\n" || header.is_empty() {
                        break;
                    }
                }
                let response = if request_line.starts_with("DELETE /api/contacts/a ") {
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 16\r\nconnection: close\r\n\r\n{\"success\":true}"
                } else {
                    "HTTP/1.1 500 Internal Server Error\r\ncontent-type: application/json\r\ncontent-length: 16\r\nconnection: close\r\n\r\n{\"error\":\"boom\"}"
                };
                socket.write_all(response.as_bytes()).unwrap();
            }
        });
        addr
    }

    fn seed_tenant(state: &AppState, contacts: &[Contact]) {
        state.store.activate_scope("hq-1").unwrap();
        state.store.put(keys::COMPANY_HQ_ID, &"hq-1").unwrap();
        state.store.write_contacts(contacts).unwrap();
    }

    #[test]
    fn test_search_matches_name_email_and_employer() {
        let mut a = contact("a", "Dana", "Lee");
        a.email = Some("dana@acme.com".to_string());
        a.contact_company = Some(
            serde_json::from_value(serde_json::json!({ "companyName": "Acme Corp" })).unwrap(),
        );
        let b = contact("b", "Sam", "Ortiz");

        assert!(matches_search(&a, Some("dana le")));
        assert!(matches_search(&a, Some("ACME")));
        assert!(matches_search(&a, Some("@acme")));
        assert!(!matches_search(&b, Some("acme")));
        // Blank search matches everyone.
        assert!(matches_search(&b, Some("  ")));
        assert!(matches_search(&b, None));
    }

    #[test]
    fn test_pipeline_filter_is_exact() {
        let mut a = contact("a", "Dana", "Lee");
        a.pipeline = Some(
            serde_json::from_value(serde_json::json!({ "pipeline": "prospect" })).unwrap(),
        );

        assert!(matches_pipeline(&a, Some("prospect")));
        // The list filter compares stored values verbatim, unlike the board.
        assert!(!matches_pipeline(&a, Some("Prospect")));
        assert!(matches_pipeline(&a, None));

        let b = contact("b", "Sam", "Ortiz");
        assert!(!matches_pipeline(&b, Some("prospect")));
    }

    #[test]
    fn test_overview_applies_filters_and_counts() {
        let mut a = contact("a", "Dana", "Lee");
        a.pipeline = Some(
            serde_json::from_value(serde_json::json!({ "pipeline": "prospect" })).unwrap(),
        );
        let b = contact("b", "Sam", "Ortiz");

        let query = ContactQuery {
            pipeline: Some("prospect".to_string()),
            ..Default::default()
        };
        let result = overview(vec![a, b], true, &query);
        assert!(result.from_cache);
        assert_eq!(result.total, 1);
        assert_eq!(result.contacts[0].id, "a");
    }

    #[tokio::test]
    async fn test_overview_serves_cache_when_refresh_fails() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_dead_server(dir.path());
        seed_tenant(&state, &[contact("a", "Dana", "Lee")]);

        let result = contacts_overview(&state, &ContactQuery::default())
            .await
            .unwrap();
        assert!(result.from_cache);
        assert_eq!(result.total, 1);
        assert_eq!(result.contacts[0].id, "a");
    }

    #[tokio::test]
    async fn test_overview_errors_when_cache_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_dead_server(dir.path());
        state.store.activate_scope("hq-1").unwrap();
        state.store.put(keys::COMPANY_HQ_ID, &"hq-1").unwrap();

        let err = contacts_overview(&state, &ContactQuery::default())
            .await
            .unwrap_err();
        assert!(!err.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_requires_a_tenant() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_dead_server(dir.path());

        let err = refresh_contacts(&state, None).await.unwrap_err();
        assert_eq!(err, "No company selected");
    }

    #[tokio::test]
    async fn test_create_contact_reports_validation_errors_joined() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_dead_server(dir.path());
        seed_tenant(&state, &[]);

        let err = create_contact(&state, &ContactForm::default(), FormSchema::latest())
            .await
            .unwrap_err();
        assert_eq!(err, "First name is required; Last name is required");
        // Nothing was cached for the failed create.
        assert!(state.store.read_contacts().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_delete_reports_per_id_failures() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_dead_server(dir.path());
        seed_tenant(&state, &[contact("a", "Dana", "Lee")]);

        let ids = vec!["a".to_string(), "b".to_string()];
        let report = delete_contacts(&state, &ids).await;
        // The server is unreachable, so every id fails and the cache is
        // left alone.
        assert!(report.deleted.is_empty());
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].id, "a");
        assert_eq!(state.store.read_contacts().len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_delete_prunes_only_confirmed_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let addr = spawn_delete_server();
        let state = state_with_api(dir.path(), &format!("http://{addr}"));
        seed_tenant(
            &state,
            &[contact("a", "Dana", "Lee"), contact("b", "Sam", "Ortiz")],
        );

        let ids = vec!["a".to_string(), "b".to_string()];
        let report = delete_contacts(&state, &ids).await;

        assert_eq!(report.deleted, vec!["a".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, "b");
        assert!(report.failed[0].error.contains("boom"));

        // The cache keeps exactly the record the server refused to delete.
        let remaining = state.store.read_contacts();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "b");
    }

    #[test]
    fn test_contact_detail_serializes_with_status_tag() {
        let missing = ContactDetail::Missing {
            redirect: Route::ContactList,
        };
        let json = serde_json::to_value(&missing).unwrap();
        assert_eq!(json.get("status").unwrap(), "missing");
        assert_eq!(json.get("redirect").unwrap(), "contactList");
    }
}
