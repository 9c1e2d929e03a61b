//! Axum route handlers for job postings.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::{self, authorize, list_scope, EntityKind, Operation};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::job::{JobPostingChanges, NewJobPosting};
use crate::models::{normalize_skills, JobPosting, JobStatus, Role};
use crate::pagination::{ListParams, Page};
use crate::state::AppState;
use crate::store::Scope;
use crate::validation::{optional, required};

#[derive(Debug, Deserialize)]
pub struct CreatePostingRequest {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub status: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Required for admins; employers always post for their own company.
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub status: Option<String>,
    pub required_skills: Option<Vec<String>>,
}

fn check_salary(min: Option<i64>, max: Option<i64>) -> Result<(), AppError> {
    if min.is_some_and(|v| v < 0) || max.is_some_and(|v| v < 0) {
        return Err(AppError::Validation("salary cannot be negative".to_string()));
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(AppError::Validation(
                "salary_min cannot exceed salary_max".to_string(),
            ));
        }
    }
    Ok(())
}

pub(crate) async fn load(state: &AppState, id: Uuid) -> Result<JobPosting, AppError> {
    state
        .store
        .posting(id)
        .await?
        .ok_or_else(|| AppError::not_found("job posting"))
}

/// GET /api/v1/jobs
///
/// Anonymous callers and talents see published postings; employers see every
/// posting of their own company; admins see all. `company_id` narrows further.
pub async fn handle_list_postings(
    State(state): State<AppState>,
    requester: Requester,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<JobPosting>>, AppError> {
    let facts = access::resolve(state.store.as_ref(), &requester).await?;
    authorize(&requester, EntityKind::JobPosting, Operation::List, &facts)?;

    let (window, query) = params.query::<JobStatus>(params.company_id)?;
    let scope = list_scope(&requester, EntityKind::JobPosting, &facts);
    if scope == Scope::Empty {
        return Ok(Json(Page::empty(window)));
    }
    let rows = state.store.list_postings(scope, &query).await?;
    Ok(Json(Page::from_rows(rows, window)))
}

/// POST /api/v1/jobs
pub async fn handle_create_posting(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<CreatePostingRequest>,
) -> Result<(StatusCode, Json<JobPosting>), AppError> {
    let principal = *requester.require()?;
    let facts = access::resolve(state.store.as_ref(), &requester).await?;
    authorize(&requester, EntityKind::JobPosting, Operation::Create, &facts)?;

    let company_id = match (principal.role, facts.requester_company, request.company_id) {
        (Role::Admin, _, Some(company_id)) => {
            state
                .store
                .company(company_id)
                .await?
                .ok_or_else(|| AppError::not_found("company"))?
                .id
        }
        (Role::Admin, _, None) => {
            return Err(AppError::Validation("company_id is required".to_string()));
        }
        (_, Some(own), Some(requested)) if own != requested => {
            return Err(AppError::Forbidden(
                "job postings can only be created for your own company".to_string(),
            ));
        }
        (_, Some(own), _) => own,
        (_, None, _) => return Err(AppError::not_found("company")),
    };

    check_salary(request.salary_min, request.salary_max)?;
    let status = request
        .status
        .as_deref()
        .map(str::parse::<JobStatus>)
        .transpose()?
        .unwrap_or(JobStatus::Draft);

    let new = NewJobPosting {
        company_id,
        title: required("title", request.title)?,
        description: required("description", request.description)?,
        location: optional(request.location),
        employment_type: optional(request.employment_type),
        salary_min: request.salary_min,
        salary_max: request.salary_max,
        status,
        required_skills: normalize_skills(&request.required_skills),
    };
    let posting = state.store.insert_posting(new).await?;

    info!(
        posting_id = %posting.id,
        company_id = %company_id,
        requester = %principal.id,
        "job posting created"
    );
    Ok((StatusCode::CREATED, Json(posting)))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_posting(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    let posting = load(&state, id).await?;
    let facts = access::resolve(state.store.as_ref(), &requester)
        .await?
        .posting(&posting);
    authorize(&requester, EntityKind::JobPosting, Operation::Retrieve, &facts)?;
    Ok(Json(posting))
}

/// PATCH /api/v1/jobs/:id
///
/// Status moves follow the posting lifecycle; re-stating the current status
/// is a no-op.
pub async fn handle_update_posting(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePostingRequest>,
) -> Result<Json<JobPosting>, AppError> {
    requester.require()?;
    let posting = load(&state, id).await?;
    let facts = access::resolve(state.store.as_ref(), &requester)
        .await?
        .posting(&posting);
    authorize(&requester, EntityKind::JobPosting, Operation::Update, &facts)?;

    let status = match request.status.as_deref() {
        None => None,
        Some(raw) => {
            let next: JobStatus = raw.parse()?;
            let change = posting.status.transition(next)?;
            (change.from != change.to).then_some(change)
        }
    };
    check_salary(
        request.salary_min.or(posting.salary_min),
        request.salary_max.or(posting.salary_max),
    )?;

    let changes = JobPostingChanges {
        title: request.title.map(|t| required("title", t)).transpose()?,
        description: request
            .description
            .map(|d| required("description", d))
            .transpose()?,
        location: optional(request.location),
        employment_type: optional(request.employment_type),
        salary_min: request.salary_min,
        salary_max: request.salary_max,
        status,
        required_skills: request.required_skills.as_deref().map(normalize_skills),
    };
    let updated = state.store.update_posting(id, changes).await?;

    info!(
        posting_id = %id,
        requester = ?requester.id(),
        status = %updated.status,
        "job posting updated"
    );
    Ok(Json(updated))
}

/// DELETE /api/v1/jobs/:id
///
/// Refused once the posting has applications; close it instead.
pub async fn handle_delete_posting(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    requester.require()?;
    let posting = load(&state, id).await?;
    let facts = access::resolve(state.store.as_ref(), &requester)
        .await?
        .posting(&posting);
    authorize(&requester, EntityKind::JobPosting, Operation::Delete, &facts)?;

    state.store.delete_posting(id).await?;
    info!(posting_id = %id, requester = ?requester.id(), "job posting deleted");
    Ok(StatusCode::NO_CONTENT)
}
