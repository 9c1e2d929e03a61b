//! Ownership resolution: the structural relations between a requester and a
//! target, gathered once and fed to both `decide` and `list_scope`.

use uuid::Uuid;

use crate::auth::Requester;
use crate::models::{Application, Company, Identity, JobPosting, Role, SavedJob, TalentProfile};
use crate::store::{Store, StoreError};

/// What an update asks of a status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusIntent {
    #[default]
    Unchanged,
    Withdraw,
    Other,
}

/// Ownership facts for one decision. Fields that do not apply to the entity
/// at hand keep their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facts {
    /// Company owned by the requester, when the requester is an employer.
    pub requester_company: Option<Uuid>,
    /// Identity the target belongs to: the identity itself, a company's owner,
    /// an application's applicant (also for its interviews), a saved job's or
    /// profile's talent.
    pub target_owner: Option<Uuid>,
    /// Company the target hangs off.
    pub target_company: Option<Uuid>,
    /// Posting is PUBLISHED. For creates, refers to the posting being applied
    /// to or saved.
    pub target_published: bool,
    /// Target is a DELETED application or belongs to one.
    pub target_deleted: bool,
    /// Application is in a terminal state.
    pub target_terminal: bool,
    /// Target is the only active admin.
    pub target_last_admin: bool,
    /// The requester already holds a non-deleted application for the posting.
    pub existing_application: bool,
    pub status_intent: StatusIntent,
    /// The update touches fields reserved to admins or reviewers.
    pub restricted_fields: bool,
    /// The update demotes or deactivates an active admin.
    pub revokes_admin: bool,
}

/// Resolves the requester side of the facts. Employers are mapped to the
/// company they own; everyone else has none.
pub async fn resolve(store: &dyn Store, requester: &Requester) -> Result<Facts, StoreError> {
    let requester_company = match requester.principal() {
        Some(principal) if principal.role == Role::Employer => {
            store.company_owned_by(principal.id).await?.map(|c| c.id)
        }
        _ => None,
    };
    Ok(Facts {
        requester_company,
        ..Default::default()
    })
}

/// Company owning `posting_id`, if the posting still exists.
pub async fn posting_company(
    store: &dyn Store,
    posting_id: Uuid,
) -> Result<Option<Uuid>, StoreError> {
    Ok(store.posting(posting_id).await?.map(|p| p.company_id))
}

impl Facts {
    pub fn identity(mut self, target: &Identity) -> Self {
        self.target_owner = Some(target.id);
        self
    }

    /// `active_admins` is the current count of active admins, target included.
    pub fn with_active_admins(mut self, target: &Identity, active_admins: u64) -> Self {
        self.target_last_admin = target.is_active_admin() && active_admins <= 1;
        self
    }

    pub fn company(mut self, target: &Company) -> Self {
        self.target_owner = Some(target.owner_id);
        self.target_company = Some(target.id);
        self
    }

    pub fn posting(mut self, target: &JobPosting) -> Self {
        self.target_company = Some(target.company_id);
        self.target_published = target.is_published();
        self
    }

    /// `company_id` is the company owning the application's posting.
    pub fn application(mut self, target: &Application, company_id: Option<Uuid>) -> Self {
        self.target_owner = Some(target.applicant_id);
        self.target_company = company_id;
        self.target_deleted = target.is_deleted();
        self.target_terminal = target.status.is_terminal();
        self
    }

    /// An interview inherits the visibility of its parent application.
    pub fn interview(self, parent: &Application, company_id: Option<Uuid>) -> Self {
        let mut facts = self.application(parent, company_id);
        facts.target_terminal = false;
        facts
    }

    pub fn saved_job(mut self, target: &SavedJob) -> Self {
        self.target_owner = Some(target.talent_id);
        self
    }

    pub fn profile(mut self, target: &TalentProfile) -> Self {
        self.target_owner = Some(target.talent_id);
        self
    }

    pub fn with_existing_application(mut self, exists: bool) -> Self {
        self.existing_application = exists;
        self
    }

    pub fn with_status_intent(mut self, intent: StatusIntent) -> Self {
        self.status_intent = intent;
        self
    }

    pub fn with_restricted_fields(mut self, restricted: bool) -> Self {
        self.restricted_fields = restricted;
        self
    }

    pub fn with_revokes_admin(mut self, revokes: bool) -> Self {
        self.revokes_admin = revokes;
        self
    }

    /// True when the requester's company is known and equals the target's.
    pub fn same_company(&self) -> bool {
        self.requester_company.is_some() && self.requester_company == self.target_company
    }

    pub fn owned_by(&self, requester: Uuid) -> bool {
        self.target_owner == Some(requester)
    }
}
