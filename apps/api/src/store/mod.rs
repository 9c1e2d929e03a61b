//! Storage boundary. Every uniqueness and lockout invariant is enforced here
//! atomically; the access layer's own checks are advisory only.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::application::{ApplicationChanges, NewApplication};
use crate::models::company::{CompanyChanges, NewCompany};
use crate::models::identity::{IdentityChanges, NewIdentity};
use crate::models::interview::{InterviewChanges, NewInterview};
use crate::models::job::{JobPostingChanges, NewJobPosting};
use crate::models::profile::{NewTalentProfile, TalentProfileChanges};
use crate::models::{
    Application, ApplicationStatus, Company, Identity, Interview, InterviewStatus, JobPosting,
    JobStatus, Role, SavedJob, StatusChange, TalentProfile,
};

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// A compare-and-set on a status column lost to a concurrent writer.
    #[error("{0} status changed concurrently")]
    StaleStatus(&'static str),

    /// A delete would orphan dependent rows (e.g. a posting with applications).
    #[error("{0} is still referenced")]
    InUse(&'static str),

    #[error("the last active admin cannot be removed")]
    LastAdmin,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Row-level restriction produced by query shaping, applied before search and
/// pagination. Its meaning depends on the entity being listed:
///
/// | scope        | postings           | applications        | interviews                 | saved jobs     |
/// |--------------|--------------------|---------------------|----------------------------|----------------|
/// | `Published`  | status = PUBLISHED | -                   | -                          | -              |
/// | `Company(c)` | company = c        | posting.company = c | application.posting.company = c | -         |
/// | `Owner(i)`   | -                  | applicant = i       | application.applicant = i  | talent = i     |
///
/// Scopes other than `Unrestricted` also hide DELETED applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Unrestricted,
    Empty,
    Published,
    Company(Uuid),
    Owner(Uuid),
}

/// Search, filter and page window for a LIST call.
#[derive(Debug, Clone)]
pub struct ListQuery<S> {
    pub status: Option<S>,
    pub search: Option<String>,
    /// Posting for applications and saved jobs, application for interviews,
    /// company for postings.
    pub parent_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

impl<S> Default for ListQuery<S> {
    fn default() -> Self {
        Self {
            status: None,
            search: None,
            parent_id: None,
            limit: 20,
            offset: 0,
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_identity(&self, new: NewIdentity) -> Result<Identity, StoreError>;
    async fn identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError>;
    async fn list_identities(&self, query: &ListQuery<Role>) -> Result<Vec<Identity>, StoreError>;
    /// Fails with `LastAdmin` when the change would strip the last active admin.
    async fn update_identity(
        &self,
        id: Uuid,
        changes: IdentityChanges,
    ) -> Result<Identity, StoreError>;
    /// Soft delete; same last-admin guard as `update_identity`.
    async fn deactivate_identity(&self, id: Uuid) -> Result<Identity, StoreError>;
    async fn count_active_admins(&self) -> Result<u64, StoreError>;

    async fn insert_company(&self, new: NewCompany) -> Result<Company, StoreError>;
    async fn company(&self, id: Uuid) -> Result<Option<Company>, StoreError>;
    async fn company_owned_by(&self, owner_id: Uuid) -> Result<Option<Company>, StoreError>;
    async fn list_companies(&self, query: &ListQuery<()>) -> Result<Vec<Company>, StoreError>;
    async fn update_company(&self, id: Uuid, changes: CompanyChanges)
        -> Result<Company, StoreError>;
    async fn delete_company(&self, id: Uuid) -> Result<(), StoreError>;

    async fn insert_posting(&self, new: NewJobPosting) -> Result<JobPosting, StoreError>;
    async fn posting(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError>;
    async fn list_postings(
        &self,
        scope: Scope,
        query: &ListQuery<JobStatus>,
    ) -> Result<Vec<JobPosting>, StoreError>;
    async fn update_posting(
        &self,
        id: Uuid,
        changes: JobPostingChanges,
    ) -> Result<JobPosting, StoreError>;
    async fn delete_posting(&self, id: Uuid) -> Result<(), StoreError>;

    async fn insert_application(&self, new: NewApplication) -> Result<Application, StoreError>;
    async fn application(&self, id: Uuid) -> Result<Option<Application>, StoreError>;
    async fn active_application(
        &self,
        applicant_id: Uuid,
        posting_id: Uuid,
    ) -> Result<Option<Application>, StoreError>;
    async fn list_applications(
        &self,
        scope: Scope,
        query: &ListQuery<ApplicationStatus>,
    ) -> Result<Vec<Application>, StoreError>;
    async fn update_application(
        &self,
        id: Uuid,
        changes: ApplicationChanges,
    ) -> Result<Application, StoreError>;

    /// Inserts the interview and, when `advance` is set, moves the parent
    /// application in the same transaction.
    async fn insert_interview(
        &self,
        new: NewInterview,
        advance: Option<StatusChange<ApplicationStatus>>,
    ) -> Result<Interview, StoreError>;
    async fn interview(&self, id: Uuid) -> Result<Option<Interview>, StoreError>;
    async fn list_interviews(
        &self,
        scope: Scope,
        query: &ListQuery<InterviewStatus>,
    ) -> Result<Vec<Interview>, StoreError>;
    async fn update_interview(
        &self,
        id: Uuid,
        changes: InterviewChanges,
    ) -> Result<Interview, StoreError>;
    async fn delete_interview(&self, id: Uuid) -> Result<(), StoreError>;

    async fn insert_saved_job(
        &self,
        talent_id: Uuid,
        posting_id: Uuid,
    ) -> Result<SavedJob, StoreError>;
    async fn saved_job(&self, id: Uuid) -> Result<Option<SavedJob>, StoreError>;
    async fn list_saved_jobs(
        &self,
        scope: Scope,
        query: &ListQuery<()>,
    ) -> Result<Vec<SavedJob>, StoreError>;
    async fn delete_saved_job(&self, id: Uuid) -> Result<(), StoreError>;

    async fn insert_profile(&self, new: NewTalentProfile) -> Result<TalentProfile, StoreError>;
    async fn profile(&self, id: Uuid) -> Result<Option<TalentProfile>, StoreError>;
    async fn profile_for_talent(
        &self,
        talent_id: Uuid,
    ) -> Result<Option<TalentProfile>, StoreError>;
    async fn list_profiles(&self, query: &ListQuery<()>)
        -> Result<Vec<TalentProfile>, StoreError>;
    async fn update_profile(
        &self,
        id: Uuid,
        changes: TalentProfileChanges,
    ) -> Result<TalentProfile, StoreError>;
    async fn delete_profile(&self, id: Uuid) -> Result<(), StoreError>;
}
