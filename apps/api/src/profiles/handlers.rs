//! Axum route handlers for talent profiles. Resume files are uploaded and
//! parsed elsewhere; a profile keeps the extracted skills and a link.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::{authorize, EntityKind, Facts, Operation};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::profile::{NewTalentProfile, TalentProfileChanges};
use crate::models::{normalize_skills, Role, TalentProfile};
use crate::pagination::{ListParams, Page};
use crate::state::AppState;
use crate::validation::{in_range, optional};

const MAX_EXPERIENCE_YEARS: i32 = 70;

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub headline: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience_years: Option<i32>,
    pub resume_url: Option<String>,
    /// Admins create profiles on behalf of a talent.
    pub talent_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience_years: Option<i32>,
    pub resume_url: Option<String>,
}

fn experience(years: i32) -> Result<i32, AppError> {
    in_range("experience_years", years, 0, MAX_EXPERIENCE_YEARS)
}

async fn load(state: &AppState, id: Uuid) -> Result<TalentProfile, AppError> {
    state
        .store
        .profile(id)
        .await?
        .ok_or_else(|| AppError::not_found("talent profile"))
}

/// GET /api/v1/profiles
///
/// Employers and admins browse profiles; `search` matches the headline or an
/// exact skill.
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    requester: Requester,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<TalentProfile>>, AppError> {
    authorize(
        &requester,
        EntityKind::TalentProfile,
        Operation::List,
        &Facts::default(),
    )?;

    let (window, query) = params.plain_query(None)?;
    let rows = state.store.list_profiles(&query).await?;
    Ok(Json(Page::from_rows(rows, window)))
}

/// POST /api/v1/profiles
pub async fn handle_create_profile(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<TalentProfile>), AppError> {
    let principal = *requester.require()?;
    let talent_id = match (principal.role, request.talent_id) {
        (Role::Admin, Some(talent_id)) => {
            let talent = state.store.identity(talent_id).await?;
            if !talent.is_some_and(|t| t.role == Role::Talent) {
                return Err(AppError::Validation(
                    "talent_id must reference a talent".to_string(),
                ));
            }
            talent_id
        }
        (Role::Admin, None) => {
            return Err(AppError::Validation("talent_id is required".to_string()));
        }
        _ => principal.id,
    };
    authorize(
        &requester,
        EntityKind::TalentProfile,
        Operation::Create,
        &Facts::default(),
    )?;

    let new = NewTalentProfile {
        talent_id,
        headline: optional(request.headline),
        summary: optional(request.summary),
        skills: normalize_skills(&request.skills),
        experience_years: request.experience_years.map(experience).transpose()?,
        resume_url: optional(request.resume_url),
    };
    let profile = state.store.insert_profile(new).await?;

    info!(profile_id = %profile.id, requester = %principal.id, "talent profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/v1/profiles/me
pub async fn handle_get_my_profile(
    State(state): State<AppState>,
    requester: Requester,
) -> Result<Json<TalentProfile>, AppError> {
    let principal = requester.require()?;
    let profile = state
        .store
        .profile_for_talent(principal.id)
        .await?
        .ok_or_else(|| AppError::not_found("talent profile"))?;
    Ok(Json(profile))
}

/// GET /api/v1/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<Json<TalentProfile>, AppError> {
    requester.require()?;
    let profile = load(&state, id).await?;
    authorize(
        &requester,
        EntityKind::TalentProfile,
        Operation::Retrieve,
        &Facts::default().profile(&profile),
    )?;
    Ok(Json(profile))
}

/// PATCH /api/v1/profiles/:id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<TalentProfile>, AppError> {
    requester.require()?;
    let profile = load(&state, id).await?;
    authorize(
        &requester,
        EntityKind::TalentProfile,
        Operation::Update,
        &Facts::default().profile(&profile),
    )?;

    let changes = TalentProfileChanges {
        headline: optional(request.headline),
        summary: optional(request.summary),
        skills: request.skills.as_deref().map(normalize_skills),
        experience_years: request.experience_years.map(experience).transpose()?,
        resume_url: optional(request.resume_url),
    };
    let updated = state.store.update_profile(id, changes).await?;

    info!(profile_id = %id, requester = ?requester.id(), "talent profile updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/profiles/:id
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    requester.require()?;
    let profile = load(&state, id).await?;
    authorize(
        &requester,
        EntityKind::TalentProfile,
        Operation::Delete,
        &Facts::default().profile(&profile),
    )?;

    state.store.delete_profile(id).await?;
    info!(profile_id = %id, requester = ?requester.id(), "talent profile deleted");
    Ok(StatusCode::NO_CONTENT)
}
