//! Launch and onboarding flows: owner hydration, tenant creation, the
//! identity survey, and sign-out.
//!
//! Every flow ends in a [`Route`] decision the shell navigates on; the
//! engine itself never navigates. Hydration treats any server failure as
//! "not signed in yet" and routes to sign-up rather than erroring, because
//! the launch screen has nothing better to do with a transport error.

use crate::mapper::{map_company_hq, CompanyHqForm};
use crate::session::{delete_session, save_session, Route, SessionContext};
use crate::state::AppState;
use crate::store::keys;
use crate::types::{Owner, OwnerSurvey};

/// Resolve the signed-in owner and decide where the shell starts.
///
/// On success the tenant cache scope is activated, the owner and tenant
/// entries are cached, and the session is persisted for the next launch.
/// Only store failures surface as errors.
pub async fn hydrate(state: &AppState) -> Result<Route, String> {
    if state.tokens.bearer_token().await.is_none() {
        log::info!("no credentials yet, routing to sign-up");
        return Ok(Route::SignUp);
    }

    let owner = match state.client.hydrate().await {
        Ok(owner) => owner,
        Err(err) => {
            log::warn!("hydrate failed, routing to sign-up: {err}");
            return Ok(Route::SignUp);
        }
    };

    let tenant = owner.tenant_id().map(str::to_string);
    let scope = tenant.clone().unwrap_or_else(|| owner.id.clone());
    state.store.activate_scope(&scope).map_err(|e| e.to_string())?;

    state
        .store
        .put(keys::OWNER_ID, &owner.id)
        .map_err(|e| e.to_string())?;
    state
        .store
        .put(keys::OWNER, &owner)
        .map_err(|e| e.to_string())?;
    if let Some(hq_id) = &tenant {
        state
            .store
            .put(keys::COMPANY_HQ_ID, hq_id)
            .map_err(|e| e.to_string())?;
    }
    if let Some(hq) = &owner.company_hq {
        state
            .store
            .put(keys::COMPANY_HQ, hq)
            .map_err(|e| e.to_string())?;
    }

    let session = SessionContext::new(owner.id.clone(), tenant);
    save_session(state.data_dir(), &session).map_err(|e| e.to_string())?;
    state.set_session(Some(session));

    Ok(route_for(&owner))
}

/// Where a hydrated owner lands, by profile completeness.
fn route_for(owner: &Owner) -> Route {
    if !owner.has_name() {
        Route::ProfileSetup
    } else if !owner.has_company_hq() {
        Route::CompanySetup
    } else {
        Route::Dashboard
    }
}

/// Create the tenant container and move the cache to its scope.
///
/// The owner entries written under the pre-company scope (keyed by owner
/// id) carry over to the new tenant directory, and the old scope is
/// cleared so no orphaned entries survive the switch.
pub async fn create_company_hq(state: &AppState, form: &CompanyHqForm) -> Result<Route, String> {
    let owner_id = state.owner_id().ok_or("No signed-in owner")?;
    let payload = map_company_hq(form, &owner_id);
    let hq = state
        .client
        .create_company_hq(&payload)
        .await
        .map_err(|e| e.to_string())?;
    log::info!("created companyHQ {}", hq.id);

    // Read what should migrate before switching scopes.
    let owner: Option<Owner> = state.store.get(keys::OWNER);
    let survey: Option<OwnerSurvey> = state.store.get(keys::OWNER_SURVEY);
    let old_scope = state
        .session()
        .map(|s| s.cache_scope().to_string())
        .unwrap_or_else(|| owner_id.clone());

    state
        .store
        .activate_scope(&hq.id)
        .map_err(|e| e.to_string())?;
    state
        .store
        .put(keys::OWNER_ID, &owner_id)
        .map_err(|e| e.to_string())?;
    if let Some(owner) = &owner {
        state.store.put(keys::OWNER, owner).map_err(|e| e.to_string())?;
    }
    if let Some(survey) = &survey {
        state
            .store
            .put(keys::OWNER_SURVEY, survey)
            .map_err(|e| e.to_string())?;
    }
    state
        .store
        .put(keys::COMPANY_HQ_ID, &hq.id)
        .map_err(|e| e.to_string())?;
    state
        .store
        .put(keys::COMPANY_HQ, &hq)
        .map_err(|e| e.to_string())?;

    if old_scope != hq.id {
        state
            .store
            .clear_scope(&old_scope)
            .map_err(|e| e.to_string())?;
    }

    let session = SessionContext::new(owner_id, Some(hq.id.clone()));
    save_session(state.data_dir(), &session).map_err(|e| e.to_string())?;
    state.set_session(Some(session));

    Ok(Route::Dashboard)
}

/// Store the identity survey server-side and cache the submitted answers.
pub async fn submit_survey(
    state: &AppState,
    owner_id: &str,
    survey: &OwnerSurvey,
) -> Result<(), String> {
    state
        .client
        .submit_survey(owner_id, survey)
        .await
        .map_err(|e| e.to_string())?;
    state
        .store
        .put(keys::OWNER_SURVEY, survey)
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Clear the active tenant's cached entries, drop the live session, and
/// delete the persisted one.
pub fn sign_out(state: &AppState) -> Result<(), String> {
    let scope = state
        .session()
        .map(|s| s.cache_scope().to_string())
        .or_else(|| state.company_hq_id())
        .or_else(|| state.owner_id());

    if let Some(scope) = scope {
        state.store.clear_scope(&scope).map_err(|e| e.to_string())?;
    }
    state.store.deactivate();
    state.set_session(None);
    delete_session(state.data_dir()).map_err(|e| e.to_string())?;
    log::info!("signed out");
    Ok(())
}
