use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::{self, authorize, list_scope, EntityKind, Facts, Operation};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::{Role, SavedJob};
use crate::pagination::{ListParams, Page};
use crate::state::AppState;
use crate::store::Scope;

#[derive(Debug, Deserialize)]
pub struct SaveJobRequest {
    pub posting_id: Uuid,
    /// Admins save on behalf of a talent.
    pub talent_id: Option<Uuid>,
}

async fn load(state: &AppState, id: Uuid) -> Result<SavedJob, AppError> {
    state
        .store
        .saved_job(id)
        .await?
        .ok_or_else(|| AppError::not_found("saved job"))
}

/// GET /api/v1/saved-jobs
///
/// Always the requester's own bookmarks, except for admins.
pub async fn handle_list_saved_jobs(
    State(state): State<AppState>,
    requester: Requester,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<SavedJob>>, AppError> {
    let facts = access::resolve(state.store.as_ref(), &requester).await?;
    authorize(&requester, EntityKind::SavedJob, Operation::List, &facts)?;

    let (window, query) = params.plain_query(params.posting_id)?;
    let scope = list_scope(&requester, EntityKind::SavedJob, &facts);
    if scope == Scope::Empty {
        return Ok(Json(Page::empty(window)));
    }
    let rows = state.store.list_saved_jobs(scope, &query).await?;
    Ok(Json(Page::from_rows(rows, window)))
}

/// POST /api/v1/saved-jobs
pub async fn handle_save_job(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<SaveJobRequest>,
) -> Result<(StatusCode, Json<SavedJob>), AppError> {
    let principal = *requester.require()?;
    let talent_id = match (principal.role, request.talent_id) {
        (Role::Admin, Some(talent_id)) => talent_id,
        (Role::Admin, None) => {
            return Err(AppError::Validation("talent_id is required".to_string()));
        }
        _ => principal.id,
    };

    let posting = state
        .store
        .posting(request.posting_id)
        .await?
        .ok_or_else(|| AppError::not_found("job posting"))?;
    let facts = Facts::default().posting(&posting);
    authorize(&requester, EntityKind::SavedJob, Operation::Create, &facts)?;
    if !posting.is_published() {
        return Err(AppError::not_found("job posting"));
    }

    let saved = state.store.insert_saved_job(talent_id, posting.id).await?;
    info!(
        saved_job_id = %saved.id,
        posting_id = %posting.id,
        requester = %principal.id,
        "job saved"
    );
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/v1/saved-jobs/:id
pub async fn handle_get_saved_job(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<Json<SavedJob>, AppError> {
    requester.require()?;
    let saved = load(&state, id).await?;
    authorize(
        &requester,
        EntityKind::SavedJob,
        Operation::Retrieve,
        &Facts::default().saved_job(&saved),
    )?;
    Ok(Json(saved))
}

/// DELETE /api/v1/saved-jobs/:id
pub async fn handle_delete_saved_job(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    requester.require()?;
    let saved = load(&state, id).await?;
    authorize(
        &requester,
        EntityKind::SavedJob,
        Operation::Delete,
        &Facts::default().saved_job(&saved),
    )?;

    state.store.delete_saved_job(id).await?;
    info!(saved_job_id = %id, requester = ?requester.id(), "saved job removed");
    Ok(StatusCode::NO_CONTENT)
}
