//! Axum route handlers for companies.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::{self, authorize, EntityKind, Facts, Operation};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::company::{CompanyChanges, NewCompany};
use crate::models::{Company, Role};
use crate::pagination::{ListParams, Page};
use crate::state::AppState;
use crate::validation::{optional, required};

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub website: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    /// Admins create companies on behalf of an employer.
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
}

async fn load(state: &AppState, id: Uuid) -> Result<Company, AppError> {
    state
        .store
        .company(id)
        .await?
        .ok_or_else(|| AppError::not_found("company"))
}

/// GET /api/v1/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
    requester: Requester,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Company>>, AppError> {
    authorize(&requester, EntityKind::Company, Operation::List, &Facts::default())?;

    let (window, query) = params.plain_query(None)?;
    let rows = state.store.list_companies(&query).await?;
    Ok(Json(Page::from_rows(rows, window)))
}

/// POST /api/v1/companies
///
/// An employer registers its single company. Admins must name the owning
/// employer in `owner_id`.
pub async fn handle_create_company(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    let principal = *requester.require()?;
    let facts = access::resolve(state.store.as_ref(), &requester).await?;
    authorize(&requester, EntityKind::Company, Operation::Create, &facts)?;

    let owner_id = match (principal.role, request.owner_id) {
        (Role::Admin, Some(owner_id)) => {
            let owner = state.store.identity(owner_id).await?;
            if !owner.is_some_and(|o| o.role == Role::Employer && o.is_active) {
                return Err(AppError::Validation(
                    "owner_id must reference an active employer".to_string(),
                ));
            }
            owner_id
        }
        (Role::Admin, None) => {
            return Err(AppError::Validation("owner_id is required".to_string()));
        }
        _ => principal.id,
    };

    let new = NewCompany {
        owner_id,
        name: required("name", request.name)?,
        website: optional(request.website),
        description: optional(request.description),
        industry: optional(request.industry),
        location: optional(request.location),
    };
    let company = state.store.insert_company(new).await?;

    info!(company_id = %company.id, requester = %principal.id, "company created");
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/v1/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, AppError> {
    requester.require()?;
    let company = load(&state, id).await?;
    authorize(
        &requester,
        EntityKind::Company,
        Operation::Retrieve,
        &Facts::default().company(&company),
    )?;
    Ok(Json(company))
}

/// PATCH /api/v1/companies/:id
pub async fn handle_update_company(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCompanyRequest>,
) -> Result<Json<Company>, AppError> {
    requester.require()?;
    let company = load(&state, id).await?;
    authorize(
        &requester,
        EntityKind::Company,
        Operation::Update,
        &Facts::default().company(&company),
    )?;

    let changes = CompanyChanges {
        name: request.name.map(|n| required("name", n)).transpose()?,
        website: optional(request.website),
        description: optional(request.description),
        industry: optional(request.industry),
        location: optional(request.location),
    };
    let updated = state.store.update_company(id, changes).await?;

    info!(company_id = %id, requester = ?requester.id(), "company updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/companies/:id
///
/// Refused while the company still has job postings.
pub async fn handle_delete_company(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    requester.require()?;
    let company = load(&state, id).await?;
    authorize(
        &requester,
        EntityKind::Company,
        Operation::Delete,
        &Facts::default().company(&company),
    )?;

    state.store.delete_company(id).await?;
    info!(company_id = %id, requester = ?requester.id(), "company deleted");
    Ok(StatusCode::NO_CONTENT)
}
