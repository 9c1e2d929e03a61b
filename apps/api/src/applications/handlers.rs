//! Axum route handlers for job applications.
//!
//! Applications are never physically removed: DELETE flags them DELETED,
//! which hides them from everyone but admins and frees the (talent, posting)
//! pair for a fresh application.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::{self, authorize, list_scope, EntityKind, Facts, Operation, StatusIntent};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::matching::application_score;
use crate::models::application::{ApplicationChanges, NewApplication};
use crate::models::{Application, ApplicationStatus, Role, StatusChange};
use crate::pagination::{ListParams, Page};
use crate::state::AppState;
use crate::store::Scope;
use crate::validation::{in_range, optional};

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub posting_id: Uuid,
    pub cover_letter: Option<String>,
    /// Admins apply on behalf of a talent.
    pub applicant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
    pub score: Option<f64>,
}

pub(crate) async fn load(state: &AppState, id: Uuid) -> Result<Application, AppError> {
    state
        .store
        .application(id)
        .await?
        .ok_or_else(|| AppError::not_found("application"))
}

/// Ownership facts for an existing application.
pub(crate) async fn facts_for(
    state: &AppState,
    requester: &Requester,
    application: &Application,
) -> Result<Facts, AppError> {
    let company = access::ownership::posting_company(state.store.as_ref(), application.posting_id)
        .await?;
    Ok(access::resolve(state.store.as_ref(), requester)
        .await?
        .application(application, company))
}

/// GET /api/v1/applications
///
/// Talents list their own applications, employers those on their company's
/// postings, admins everything. `posting_id` narrows further.
pub async fn handle_list_applications(
    State(state): State<AppState>,
    requester: Requester,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Application>>, AppError> {
    let facts = access::resolve(state.store.as_ref(), &requester).await?;
    authorize(&requester, EntityKind::Application, Operation::List, &facts)?;

    let (window, query) = params.query::<ApplicationStatus>(params.posting_id)?;
    let scope = list_scope(&requester, EntityKind::Application, &facts);
    if scope == Scope::Empty {
        return Ok(Json(Page::empty(window)));
    }
    let rows = state.store.list_applications(scope, &query).await?;
    Ok(Json(Page::from_rows(rows, window)))
}

/// POST /api/v1/applications
///
/// Applies to a published posting. The skill-match score is computed from the
/// applicant's profile at this point.
pub async fn handle_create_application(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let principal = *requester.require()?;

    let applicant_id = match (principal.role, request.applicant_id) {
        (Role::Admin, Some(applicant_id)) => {
            let applicant = state.store.identity(applicant_id).await?;
            if !applicant.is_some_and(|a| a.role == Role::Talent && a.is_active) {
                return Err(AppError::Validation(
                    "applicant_id must reference an active talent".to_string(),
                ));
            }
            applicant_id
        }
        (Role::Admin, None) => {
            return Err(AppError::Validation("applicant_id is required".to_string()));
        }
        _ => principal.id,
    };

    let posting = state
        .store
        .posting(request.posting_id)
        .await?
        .ok_or_else(|| AppError::not_found("job posting"))?;
    let existing = state
        .store
        .active_application(applicant_id, posting.id)
        .await?
        .is_some();
    let facts = access::resolve(state.store.as_ref(), &requester)
        .await?
        .posting(&posting)
        .with_existing_application(existing);
    authorize(&requester, EntityKind::Application, Operation::Create, &facts)?;
    if !posting.is_published() {
        return Err(AppError::not_found("job posting"));
    }

    let profile = state.store.profile_for_talent(applicant_id).await?;
    let score = application_score(state.skill_matcher.as_ref(), profile.as_ref(), &posting).await;

    let application = state
        .store
        .insert_application(NewApplication {
            applicant_id,
            posting_id: posting.id,
            score,
            cover_letter: optional(request.cover_letter),
        })
        .await?;

    info!(
        application_id = %application.id,
        posting_id = %posting.id,
        requester = %principal.id,
        "application submitted"
    );
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    requester.require()?;
    let application = load(&state, id).await?;
    let facts = facts_for(&state, &requester, &application).await?;
    authorize(&requester, EntityKind::Application, Operation::Retrieve, &facts)?;
    Ok(Json(application))
}

/// PATCH /api/v1/applications/:id
///
/// The applicant may only withdraw. The hiring company drives every other
/// move and owns the reviewer fields. All moves go through the status machine.
pub async fn handle_update_application(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateApplicationRequest>,
) -> Result<Json<Application>, AppError> {
    requester.require()?;
    let application = load(&state, id).await?;
    let facts = facts_for(&state, &requester, &application).await?;
    authorize(&requester, EntityKind::Application, Operation::Retrieve, &facts)?;

    let next = request
        .status
        .as_deref()
        .map(str::parse::<ApplicationStatus>)
        .transpose()?;
    let intent = match next {
        None => StatusIntent::Unchanged,
        Some(ApplicationStatus::Withdrawn) => StatusIntent::Withdraw,
        Some(_) => StatusIntent::Other,
    };
    let facts = facts
        .with_status_intent(intent)
        .with_restricted_fields(request.notes.is_some() || request.score.is_some());
    authorize(&requester, EntityKind::Application, Operation::Update, &facts)?;

    let score = request
        .score
        .map(|s| in_range("score", s, 0.0, 100.0))
        .transpose()?;
    let status = next
        .map(|next| application.status.transition(next))
        .transpose()?;

    let updated = state
        .store
        .update_application(
            id,
            ApplicationChanges {
                status,
                score,
                notes: optional(request.notes),
            },
        )
        .await?;

    info!(
        application_id = %id,
        requester = ?requester.id(),
        status = %updated.status,
        "application updated"
    );
    Ok(Json(updated))
}

/// DELETE /api/v1/applications/:id
///
/// Flags the application DELETED. Admins may do so from any state; the
/// applicant only once the application is closed.
pub async fn handle_delete_application(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    requester.require()?;
    let application = load(&state, id).await?;
    let facts = facts_for(&state, &requester, &application).await?;
    authorize(&requester, EntityKind::Application, Operation::Delete, &facts)?;

    if application.is_deleted() {
        return Ok(StatusCode::NO_CONTENT);
    }
    state
        .store
        .update_application(
            id,
            ApplicationChanges {
                status: Some(StatusChange {
                    from: application.status,
                    to: ApplicationStatus::Deleted,
                }),
                ..Default::default()
            },
        )
        .await?;

    info!(application_id = %id, requester = ?requester.id(), "application deleted");
    Ok(StatusCode::NO_CONTENT)
}
