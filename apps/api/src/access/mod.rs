//! Access control and query shaping.
//!
//! Every handler follows the same sequence: resolve ownership `Facts` for the
//! requester and target, ask `decide` for a verdict, and for LIST calls narrow
//! the row set with `list_scope`. Both functions read the same `Facts`, so an
//! employer's view of "their company" can never differ between the two.

pub mod ownership;
pub mod policy;
pub mod query;

use std::fmt;

use tracing::debug;

pub use ownership::{resolve, Facts, StatusIntent};
pub use policy::decide;
pub use query::list_scope;

use crate::auth::Requester;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Retrieve,
    Update,
    Delete,
}

impl Operation {
    #[cfg(test)]
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Create,
        Operation::Retrieve,
        Operation::Update,
        Operation::Delete,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Identity,
    Company,
    JobPosting,
    Application,
    Interview,
    SavedJob,
    TalentProfile,
}

impl EntityKind {
    #[cfg(test)]
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Identity,
        EntityKind::Company,
        EntityKind::JobPosting,
        EntityKind::Application,
        EntityKind::Interview,
        EntityKind::SavedJob,
        EntityKind::TalentProfile,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Identity => "identity",
            EntityKind::Company => "company",
            EntityKind::JobPosting => "job posting",
            EntityKind::Application => "application",
            EntityKind::Interview => "interview",
            EntityKind::SavedJob => "saved job",
            EntityKind::TalentProfile => "talent profile",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    AuthRequired,
    Forbidden(&'static str),
    /// The target is outside the requester's view; reported as absent.
    NotFound,
    Duplicate(&'static str),
    LastAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

/// Runs `decide` and turns a denial into the matching `AppError`.
pub fn authorize(
    requester: &Requester,
    entity: EntityKind,
    operation: Operation,
    facts: &Facts,
) -> Result<(), AppError> {
    let denial = match decide(requester, entity, operation, facts) {
        Decision::Allow => return Ok(()),
        Decision::Deny(denial) => denial,
    };

    debug!(
        requester = ?requester.id(),
        entity = %entity,
        operation = ?operation,
        reason = ?denial,
        "access denied"
    );

    Err(match denial {
        Denial::AuthRequired => AppError::AuthRequired,
        Denial::Forbidden(reason) => AppError::Forbidden(reason.to_string()),
        Denial::NotFound => AppError::not_found(entity.as_str()),
        Denial::Duplicate(reason) => AppError::Duplicate(reason.to_string()),
        Denial::LastAdmin => {
            AppError::Forbidden("the last active admin cannot be removed".to_string())
        }
    })
}
