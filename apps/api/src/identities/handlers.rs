//! Axum route handlers for identities. Accounts are minted by the external
//! issuer; this API manages roles and flags and exposes `/me`.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::{authorize, EntityKind, Facts, Operation};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::identity::{IdentityChanges, NewIdentity};
use crate::models::{Identity, Role};
use crate::pagination::{ListParams, Page};
use crate::state::AppState;
use crate::validation::required;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateIdentityRequest {
    pub email: String,
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateIdentityRequest {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

impl UpdateIdentityRequest {
    fn into_changes(self) -> Result<IdentityChanges, AppError> {
        let full_name = self.full_name.map(|n| required("full_name", n)).transpose()?;
        let role = self.role.as_deref().map(str::parse::<Role>).transpose()?;
        Ok(IdentityChanges {
            full_name,
            role,
            is_active: self.is_active,
            is_verified: self.is_verified,
        })
    }
}

/// Lowercases and sanity-checks an e-mail address.
fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
        && !email.contains(char::is_whitespace);
    if !valid {
        return Err(AppError::Validation(format!("'{email}' is not an e-mail address")));
    }
    Ok(email)
}

async fn load(state: &AppState, id: Uuid) -> Result<Identity, AppError> {
    state
        .store
        .identity(id)
        .await?
        .ok_or_else(|| AppError::not_found("identity"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/identities
///
/// Admin only. `status` filters by role.
pub async fn handle_list_identities(
    State(state): State<AppState>,
    requester: Requester,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Identity>>, AppError> {
    authorize(&requester, EntityKind::Identity, Operation::List, &Facts::default())?;

    let (window, query) = params.query::<Role>(None)?;
    let rows = state.store.list_identities(&query).await?;
    Ok(Json(Page::from_rows(rows, window)))
}

/// POST /api/v1/identities
pub async fn handle_create_identity(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<CreateIdentityRequest>,
) -> Result<(StatusCode, Json<Identity>), AppError> {
    authorize(&requester, EntityKind::Identity, Operation::Create, &Facts::default())?;

    let new = NewIdentity {
        email: normalize_email(&request.email)?,
        full_name: required("full_name", request.full_name)?,
        role: request.role.parse()?,
        is_verified: request.is_verified,
    };
    let identity = state.store.insert_identity(new).await?;

    info!(
        identity_id = %identity.id,
        requester = ?requester.id(),
        role = %identity.role,
        "identity created"
    );
    Ok((StatusCode::CREATED, Json(identity)))
}

/// GET /api/v1/identities/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    requester: Requester,
) -> Result<Json<Identity>, AppError> {
    let principal = requester.require()?;
    Ok(Json(load(&state, principal.id).await?))
}

/// GET /api/v1/identities/:id
pub async fn handle_get_identity(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<Json<Identity>, AppError> {
    requester.require()?;
    let identity = load(&state, id).await?;
    let facts = Facts::default().identity(&identity);
    authorize(&requester, EntityKind::Identity, Operation::Retrieve, &facts)?;
    Ok(Json(identity))
}

/// PATCH /api/v1/identities/:id
///
/// Role and account flags are admin-only. Demoting or deactivating the last
/// active admin is refused.
pub async fn handle_update_identity(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateIdentityRequest>,
) -> Result<Json<Identity>, AppError> {
    requester.require()?;
    let identity = load(&state, id).await?;
    let changes = request.into_changes()?;

    let restricted =
        changes.role.is_some() || changes.is_active.is_some() || changes.is_verified.is_some();
    let revokes = changes.revokes_admin(&identity);
    let mut facts = Facts::default()
        .identity(&identity)
        .with_restricted_fields(restricted)
        .with_revokes_admin(revokes);
    if revokes {
        let admins = state.store.count_active_admins().await?;
        facts = facts.with_active_admins(&identity, admins);
    }
    authorize(&requester, EntityKind::Identity, Operation::Update, &facts)?;

    let updated = state.store.update_identity(id, changes).await?;
    info!(identity_id = %id, requester = ?requester.id(), "identity updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/identities/:id
///
/// Soft delete: the identity is deactivated and can no longer authenticate.
pub async fn handle_delete_identity(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    requester.require()?;
    let identity = load(&state, id).await?;
    let admins = state.store.count_active_admins().await?;
    let facts = Facts::default()
        .identity(&identity)
        .with_active_admins(&identity, admins);
    authorize(&requester, EntityKind::Identity, Operation::Delete, &facts)?;

    state.store.deactivate_identity(id).await?;
    info!(identity_id = %id, requester = ?requester.id(), "identity deactivated");
    Ok(StatusCode::NO_CONTENT)
}
