//! Axum route handlers for interviews. An interview inherits its visibility
//! from the parent application: the hiring company manages it, the applicant
//! may read it.

use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::{self, authorize, list_scope, EntityKind, Facts, Operation};
use crate::applications::handlers::load as load_application;
use crate::auth::Requester;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::interview::{InterviewChanges, NewInterview};
use crate::models::{
    Application, ApplicationStatus, Interview, InterviewStatus, Role, StatusChange,
};
use crate::pagination::{ListParams, Page};
use crate::state::AppState;
use crate::store::Scope;
use crate::validation::{in_range, optional};

const DEFAULT_DURATION_MINUTES: i32 = 60;
const MIN_DURATION_MINUTES: i32 = 15;
const MAX_DURATION_MINUTES: i32 = 480;

#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    pub application_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    /// Required for admins; employers always interview themselves.
    pub interviewer_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateInterviewRequest {
    pub status: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub feedback: Option<String>,
    pub score: Option<i32>,
}

fn duration(minutes: i32) -> Result<i32, AppError> {
    in_range(
        "duration_minutes",
        minutes,
        MIN_DURATION_MINUTES,
        MAX_DURATION_MINUTES,
    )
}

fn future(at: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
    if at <= Utc::now() {
        return Err(AppError::Validation(
            "scheduled_at must be in the future".to_string(),
        ));
    }
    Ok(at)
}

/// Works out the status change an update asks for. Moving the slot without
/// naming a status counts as a reschedule.
fn requested_status(
    current: InterviewStatus,
    status: Option<&str>,
    reschedules: bool,
) -> Result<Option<StatusChange<InterviewStatus>>, AppError> {
    let next = match status {
        Some(raw) => raw.parse::<InterviewStatus>()?,
        None if reschedules => InterviewStatus::Rescheduled,
        None => return Ok(None),
    };
    Ok(Some(current.transition(next)?))
}

async fn facts_for(
    state: &AppState,
    requester: &Requester,
    parent: &Application,
) -> Result<Facts, AppError> {
    let company =
        access::ownership::posting_company(state.store.as_ref(), parent.posting_id).await?;
    Ok(access::resolve(state.store.as_ref(), requester)
        .await?
        .interview(parent, company))
}

/// Loads an interview together with its parent application.
async fn load(state: &AppState, id: Uuid) -> Result<(Interview, Application), AppError> {
    let interview = state
        .store
        .interview(id)
        .await?
        .ok_or_else(|| AppError::not_found("interview"))?;
    let parent = state
        .store
        .application(interview.application_id)
        .await?
        .ok_or_else(|| AppError::not_found("interview"))?;
    Ok((interview, parent))
}

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    requester: Requester,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Interview>>, AppError> {
    let facts = access::resolve(state.store.as_ref(), &requester).await?;
    authorize(&requester, EntityKind::Interview, Operation::List, &facts)?;

    let (window, query) = params.query::<InterviewStatus>(params.application_id)?;
    let scope = list_scope(&requester, EntityKind::Interview, &facts);
    if scope == Scope::Empty {
        return Ok(Json(Page::empty(window)));
    }
    let rows = state.store.list_interviews(scope, &query).await?;
    Ok(Json(Page::from_rows(rows, window)))
}

/// POST /api/v1/interviews
///
/// The parent application must be SHORTLISTED or INTERVIEW_SCHEDULED. A
/// SHORTLISTED application moves to INTERVIEW_SCHEDULED with the insert.
pub async fn handle_create_interview(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<Interview>), AppError> {
    let principal = *requester.require()?;
    let application = load_application(&state, request.application_id).await?;
    let facts = facts_for(&state, &requester, &application).await?;
    authorize(&requester, EntityKind::Interview, Operation::Create, &facts)?;

    let interviewer_id = match (principal.role, request.interviewer_id) {
        (Role::Admin, Some(interviewer_id)) => {
            let owned = state
                .store
                .company_owned_by(interviewer_id)
                .await?
                .map(|c| c.id);
            if owned.is_none() || owned != facts.target_company {
                return Err(AppError::Validation(
                    "interviewer must own the company behind the posting".to_string(),
                ));
            }
            interviewer_id
        }
        (Role::Admin, None) => {
            return Err(AppError::Validation(
                "interviewer_id is required".to_string(),
            ));
        }
        _ => principal.id,
    };

    let advance = match application.status {
        ApplicationStatus::Shortlisted => Some(
            application
                .status
                .transition(ApplicationStatus::InterviewScheduled)?,
        ),
        ApplicationStatus::InterviewScheduled => None,
        other => {
            return Err(AppError::InvalidTransition(format!(
                "cannot schedule an interview for an application in {other}"
            )));
        }
    };

    let new = NewInterview {
        application_id: application.id,
        interviewer_id,
        scheduled_at: future(request.scheduled_at)?,
        duration_minutes: duration(
            request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
        )?,
        location: optional(request.location),
    };
    let interview = state.store.insert_interview(new, advance).await?;

    info!(
        interview_id = %interview.id,
        application_id = %application.id,
        requester = %principal.id,
        "interview scheduled"
    );
    Ok((StatusCode::CREATED, Json(interview)))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<Json<Interview>, AppError> {
    requester.require()?;
    let (interview, parent) = load(&state, id).await?;
    let facts = facts_for(&state, &requester, &parent).await?;
    authorize(&requester, EntityKind::Interview, Operation::Retrieve, &facts)?;
    Ok(Json(interview))
}

/// PATCH /api/v1/interviews/:id
pub async fn handle_update_interview(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInterviewRequest>,
) -> Result<Json<Interview>, AppError> {
    requester.require()?;
    let (interview, parent) = load(&state, id).await?;
    let facts = facts_for(&state, &requester, &parent).await?;
    authorize(&requester, EntityKind::Interview, Operation::Update, &facts)?;

    let status = requested_status(
        interview.status,
        request.status.as_deref(),
        request.scheduled_at.is_some(),
    )?;
    let changes = InterviewChanges {
        status,
        scheduled_at: request.scheduled_at.map(future).transpose()?,
        duration_minutes: request.duration_minutes.map(duration).transpose()?,
        location: optional(request.location),
        feedback: optional(request.feedback),
        score: request
            .score
            .map(|s| in_range("score", s, 0, 100))
            .transpose()?,
    };
    let updated = state.store.update_interview(id, changes).await?;

    info!(
        interview_id = %id,
        requester = ?requester.id(),
        status = %updated.status,
        "interview updated"
    );
    Ok(Json(updated))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    requester.require()?;
    let (_, parent) = load(&state, id).await?;
    let facts = facts_for(&state, &requester, &parent).await?;
    authorize(&requester, EntityKind::Interview, Operation::Delete, &facts)?;

    state.store.delete_interview(id).await?;
    info!(interview_id = %id, requester = ?requester.id(), "interview deleted");
    Ok(StatusCode::NO_CONTENT)
}
