//! Query shaping for LIST operations. Total over every requester and entity:
//! a requester with no claim on an entity gets `Scope::Empty`, never an error.

use super::{EntityKind, Facts};
use crate::auth::Requester;
use crate::models::Role;
use crate::store::Scope;

pub fn list_scope(requester: &Requester, entity: EntityKind, facts: &Facts) -> Scope {
    let Some(principal) = requester.principal() else {
        return match entity {
            EntityKind::JobPosting => Scope::Published,
            _ => Scope::Empty,
        };
    };
    let own_company = facts.requester_company.map_or(Scope::Empty, Scope::Company);

    match (principal.role, entity) {
        (Role::Admin, _) => Scope::Unrestricted,
        (_, EntityKind::Company) => Scope::Unrestricted,

        (Role::Talent, EntityKind::JobPosting) => Scope::Published,
        (Role::Employer, EntityKind::JobPosting) => own_company,

        (Role::Talent, EntityKind::Application | EntityKind::Interview) => {
            Scope::Owner(principal.id)
        }
        (Role::Employer, EntityKind::Application | EntityKind::Interview) => own_company,

        (_, EntityKind::SavedJob) => Scope::Owner(principal.id),

        (Role::Employer, EntityKind::TalentProfile) => Scope::Unrestricted,
        (Role::Talent, EntityKind::TalentProfile) => Scope::Owner(principal.id),

        (_, EntityKind::Identity) => Scope::Owner(principal.id),
    }
}
