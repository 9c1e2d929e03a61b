use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use super::SkillReport;
use crate::access::{self, authorize, EntityKind, Operation};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::extract::{Json, Path};
use crate::jobs::handlers::load as load_posting;
use crate::models::Role;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub posting_id: Uuid,
    /// Null when the posting lists no required skills.
    pub report: Option<SkillReport>,
}

/// GET /api/v1/jobs/:id/match
///
/// Previews the score the requesting talent would get by applying.
pub async fn handle_match_posting(
    State(state): State<AppState>,
    requester: Requester,
    Path(posting_id): Path<Uuid>,
) -> Result<Json<MatchResponse>, AppError> {
    let principal = *requester.require()?;
    if principal.role != Role::Talent {
        return Err(AppError::Forbidden(
            "skill matching is available to talents only".to_string(),
        ));
    }

    let posting = load_posting(&state, posting_id).await?;
    let facts = access::resolve(state.store.as_ref(), &requester)
        .await?
        .posting(&posting);
    authorize(&requester, EntityKind::JobPosting, Operation::Retrieve, &facts)?;

    let profile = state
        .store
        .profile_for_talent(principal.id)
        .await?
        .ok_or_else(|| AppError::not_found("talent profile"))?;

    let report = if posting.required_skills.is_empty() {
        None
    } else {
        Some(
            state
                .skill_matcher
                .score(&profile.skills, &posting.required_skills)
                .await?,
        )
    };

    Ok(Json(MatchResponse { posting_id, report }))
}
