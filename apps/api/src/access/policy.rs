//! The capability resolver: a pure function from requester, entity kind,
//! operation and ownership facts to a decision. Handlers never branch on
//! roles themselves.

use uuid::Uuid;

use super::{Decision, Denial, EntityKind, Facts, Operation, StatusIntent};
use crate::auth::Requester;
use crate::models::Role;

const ALLOW: Decision = Decision::Allow;
/// Outside the requester's view. Indistinguishable from a missing record.
const HIDDEN: Decision = Decision::Deny(Denial::NotFound);

fn forbid(reason: &'static str) -> Decision {
    Decision::Deny(Denial::Forbidden(reason))
}

pub fn decide(
    requester: &Requester,
    entity: EntityKind,
    operation: Operation,
    facts: &Facts,
) -> Decision {
    match requester {
        Requester::Anonymous => anonymous(entity, operation, facts),
        Requester::Authenticated(principal) => match principal.role {
            Role::Admin => admin(entity, operation, facts),
            Role::Employer => employer(principal.id, entity, operation, facts),
            Role::Talent => talent(principal.id, entity, operation, facts),
        },
    }
}

fn anonymous(entity: EntityKind, operation: Operation, facts: &Facts) -> Decision {
    match (entity, operation) {
        (EntityKind::JobPosting, Operation::List) => ALLOW,
        (EntityKind::JobPosting, Operation::Retrieve) if facts.target_published => ALLOW,
        (EntityKind::JobPosting, Operation::Retrieve) => HIDDEN,
        _ => Decision::Deny(Denial::AuthRequired),
    }
}

fn admin(entity: EntityKind, operation: Operation, facts: &Facts) -> Decision {
    match (entity, operation) {
        (EntityKind::Identity, Operation::Delete) if facts.target_last_admin => {
            Decision::Deny(Denial::LastAdmin)
        }
        (EntityKind::Identity, Operation::Update)
            if facts.target_last_admin && facts.revokes_admin =>
        {
            Decision::Deny(Denial::LastAdmin)
        }
        _ => ALLOW,
    }
}

/// Identity rules shared by employers and talents: self-service on the
/// requester's own record, nothing else.
fn own_identity(id: Uuid, operation: Operation, facts: &Facts) -> Decision {
    match operation {
        Operation::Retrieve | Operation::Update if !facts.owned_by(id) => HIDDEN,
        Operation::Update if facts.restricted_fields => {
            forbid("only admins may change role or account flags")
        }
        Operation::Retrieve | Operation::Update => ALLOW,
        Operation::List | Operation::Create | Operation::Delete => {
            forbid("identity management requires an admin")
        }
    }
}

/// A reviewer sees applications and interviews on its own company's postings,
/// except DELETED ones.
fn reviewer_sees(facts: &Facts) -> bool {
    facts.same_company() && !facts.target_deleted
}

fn employer(id: Uuid, entity: EntityKind, operation: Operation, facts: &Facts) -> Decision {
    use EntityKind as E;
    use Operation as Op;

    match (entity, operation) {
        (E::Identity, op) => own_identity(id, op, facts),

        (E::Company, Op::List | Op::Retrieve) => ALLOW,
        (E::Company, Op::Create) if facts.requester_company.is_some() => {
            Decision::Deny(Denial::Duplicate("employer already owns a company"))
        }
        (E::Company, Op::Create) => ALLOW,
        (E::Company, Op::Update | Op::Delete) if facts.owned_by(id) => ALLOW,
        (E::Company, Op::Update | Op::Delete) => forbid("company belongs to another employer"),

        (E::JobPosting, Op::List) => ALLOW,
        (E::JobPosting, Op::Retrieve) if facts.same_company() || facts.target_published => ALLOW,
        (E::JobPosting, Op::Retrieve) => HIDDEN,
        (E::JobPosting, Op::Create) if facts.requester_company.is_some() => ALLOW,
        (E::JobPosting, Op::Create) => forbid("register a company before posting jobs"),
        (E::JobPosting, Op::Update | Op::Delete) if facts.same_company() => ALLOW,
        (E::JobPosting, Op::Update | Op::Delete) => {
            forbid("job posting belongs to another company")
        }

        (E::Application, Op::List) => ALLOW,
        (E::Application, Op::Create) => forbid("only talents apply to job postings"),
        (E::Application, _) if !reviewer_sees(facts) => HIDDEN,
        (E::Application, Op::Update) if facts.status_intent == StatusIntent::Withdraw => {
            forbid("forbidden transition")
        }
        (E::Application, Op::Retrieve | Op::Update) => ALLOW,
        (E::Application, Op::Delete) => {
            forbid("only the applicant or an admin may delete an application")
        }

        (E::Interview, Op::List) => ALLOW,
        (E::Interview, _) if !reviewer_sees(facts) => HIDDEN,
        (E::Interview, _) => ALLOW,

        (E::SavedJob, Op::List) => ALLOW,
        (E::SavedJob, Op::Create | Op::Update) => forbid("only talents save job postings"),
        (E::SavedJob, Op::Retrieve | Op::Delete) if facts.owned_by(id) => ALLOW,
        (E::SavedJob, Op::Retrieve | Op::Delete) => HIDDEN,

        (E::TalentProfile, Op::List | Op::Retrieve) => ALLOW,
        (E::TalentProfile, _) => forbid("profiles are managed by their talent"),
    }
}

fn talent(id: Uuid, entity: EntityKind, operation: Operation, facts: &Facts) -> Decision {
    use EntityKind as E;
    use Operation as Op;

    match (entity, operation) {
        (E::Identity, op) => own_identity(id, op, facts),

        (E::Company, Op::List | Op::Retrieve) => ALLOW,
        (E::Company, _) => forbid("only employers manage companies"),

        (E::JobPosting, Op::List) => ALLOW,
        (E::JobPosting, Op::Retrieve) if facts.target_published => ALLOW,
        (E::JobPosting, Op::Retrieve) => HIDDEN,
        (E::JobPosting, _) => forbid("only employers manage job postings"),

        (E::Application, Op::List) => ALLOW,
        (E::Application, Op::Create) if !facts.target_published => HIDDEN,
        (E::Application, Op::Create) if facts.existing_application => {
            Decision::Deny(Denial::Duplicate("duplicate application"))
        }
        (E::Application, Op::Create) => ALLOW,
        (E::Application, _) if !facts.owned_by(id) || facts.target_deleted => HIDDEN,
        (E::Application, Op::Retrieve) => ALLOW,
        (E::Application, Op::Update)
            if facts.restricted_fields || facts.status_intent == StatusIntent::Other =>
        {
            forbid("forbidden transition")
        }
        (E::Application, Op::Update) => ALLOW,
        (E::Application, Op::Delete) if facts.target_terminal => ALLOW,
        (E::Application, Op::Delete) => forbid("withdraw the application before deleting it"),

        (E::Interview, Op::List) => ALLOW,
        (E::Interview, Op::Retrieve) if facts.owned_by(id) && !facts.target_deleted => ALLOW,
        (E::Interview, Op::Retrieve) => HIDDEN,
        (E::Interview, _) => forbid("interviews are managed by the hiring company"),

        (E::SavedJob, Op::List) => ALLOW,
        (E::SavedJob, Op::Create) if facts.target_published => ALLOW,
        (E::SavedJob, Op::Create) => HIDDEN,
        (E::SavedJob, Op::Update) => forbid("saved jobs cannot be edited"),
        (E::SavedJob, Op::Retrieve | Op::Delete) if facts.owned_by(id) => ALLOW,
        (E::SavedJob, Op::Retrieve | Op::Delete) => HIDDEN,

        (E::TalentProfile, Op::List) => forbid("only employers and admins browse profiles"),
        (E::TalentProfile, Op::Create) => ALLOW,
        (E::TalentProfile, _) if facts.owned_by(id) => ALLOW,
        (E::TalentProfile, _) => HIDDEN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;

    fn as_role(role: Role) -> (Uuid, Requester) {
        let id = Uuid::new_v4();
        (id, Requester::Authenticated(Principal { id, role }))
    }

    fn denied_with(decision: Decision) -> Option<Denial> {
        match decision {
            Decision::Allow => None,
            Decision::Deny(denial) => Some(denial),
        }
    }

    // ── anonymous ───────────────────────────────────────────────────────────

    #[test]
    fn test_anonymous_decision_table() {
        let published = Facts {
            target_published: true,
            ..Default::default()
        };
        for entity in EntityKind::ALL {
            for op in Operation::ALL {
                let decision = decide(&Requester::Anonymous, entity, op, &published);
                let expected = match (entity, op) {
                    (EntityKind::JobPosting, Operation::List | Operation::Retrieve) => ALLOW,
                    _ => Decision::Deny(Denial::AuthRequired),
                };
                assert_eq!(decision, expected, "{entity:?} {op:?}");
            }
        }
    }

    #[test]
    fn test_anonymous_cannot_see_unpublished_posting() {
        let draft = Facts::default();
        assert_eq!(
            decide(
                &Requester::Anonymous,
                EntityKind::JobPosting,
                Operation::Retrieve,
                &draft
            ),
            HIDDEN
        );
    }

    #[test]
    fn test_only_anonymous_gets_auth_required() {
        for role in Role::ALL {
            let (_, requester) = as_role(role);
            for entity in EntityKind::ALL {
                for op in Operation::ALL {
                    let decision = decide(&requester, entity, op, &Facts::default());
                    assert_ne!(
                        denied_with(decision),
                        Some(Denial::AuthRequired),
                        "{role:?} {entity:?} {op:?}"
                    );
                }
            }
        }
    }

    // ── admin ───────────────────────────────────────────────────────────────

    #[test]
    fn test_admin_allows_everything_on_foreign_targets() {
        let (_, admin) = as_role(Role::Admin);
        let foreign = Facts {
            target_owner: Some(Uuid::new_v4()),
            target_company: Some(Uuid::new_v4()),
            target_deleted: true,
            ..Default::default()
        };
        for entity in EntityKind::ALL {
            for op in Operation::ALL {
                assert_eq!(decide(&admin, entity, op, &foreign), ALLOW, "{entity:?} {op:?}");
            }
        }
    }

    #[test]
    fn test_admin_cannot_delete_last_admin() {
        let (_, admin) = as_role(Role::Admin);
        let last = Facts {
            target_last_admin: true,
            ..Default::default()
        };
        assert_eq!(
            decide(&admin, EntityKind::Identity, Operation::Delete, &last),
            Decision::Deny(Denial::LastAdmin)
        );

        let one_of_two = Facts::default();
        assert_eq!(
            decide(&admin, EntityKind::Identity, Operation::Delete, &one_of_two),
            ALLOW
        );
    }

    #[test]
    fn test_admin_cannot_demote_last_admin_but_may_rename() {
        let (_, admin) = as_role(Role::Admin);
        let demote = Facts {
            target_last_admin: true,
            revokes_admin: true,
            ..Default::default()
        };
        let rename = Facts {
            target_last_admin: true,
            ..Default::default()
        };
        assert_eq!(
            decide(&admin, EntityKind::Identity, Operation::Update, &demote),
            Decision::Deny(Denial::LastAdmin)
        );
        assert_eq!(
            decide(&admin, EntityKind::Identity, Operation::Update, &rename),
            ALLOW
        );
    }

    // ── identities ──────────────────────────────────────────────────────────

    #[test]
    fn test_non_admin_identity_self_service() {
        for role in [Role::Talent, Role::Employer] {
            let (id, requester) = as_role(role);
            let own = Facts {
                target_owner: Some(id),
                ..Default::default()
            };
            let other = Facts {
                target_owner: Some(Uuid::new_v4()),
                ..Default::default()
            };
            let escalate = own.clone().with_restricted_fields(true);

            let check = |op, facts: &Facts| decide(&requester, EntityKind::Identity, op, facts);
            assert_eq!(check(Operation::Retrieve, &own), ALLOW);
            assert_eq!(check(Operation::Update, &own), ALLOW);
            assert_eq!(check(Operation::Retrieve, &other), HIDDEN);
            assert!(matches!(
                check(Operation::Update, &escalate),
                Decision::Deny(Denial::Forbidden(_))
            ));
            for op in [Operation::List, Operation::Create, Operation::Delete] {
                assert!(matches!(
                    check(op, &own),
                    Decision::Deny(Denial::Forbidden(_))
                ));
            }
        }
    }

    // ── employers ───────────────────────────────────────────────────────────

    #[test]
    fn test_employer_company_rules() {
        let (id, employer) = as_role(Role::Employer);
        let fresh = Facts::default();
        let owning = Facts {
            requester_company: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert_eq!(
            decide(&employer, EntityKind::Company, Operation::Create, &fresh),
            ALLOW
        );
        assert_eq!(
            decide(&employer, EntityKind::Company, Operation::Create, &owning),
            Decision::Deny(Denial::Duplicate("employer already owns a company"))
        );

        let own = Facts {
            target_owner: Some(id),
            ..Default::default()
        };
        let foreign = Facts {
            target_owner: Some(Uuid::new_v4()),
            ..Default::default()
        };
        for op in [Operation::Update, Operation::Delete] {
            assert_eq!(decide(&employer, EntityKind::Company, op, &own), ALLOW);
            assert!(matches!(
                decide(&employer, EntityKind::Company, op, &foreign),
                Decision::Deny(Denial::Forbidden(_))
            ));
        }
    }

    #[test]
    fn test_employer_posting_rules() {
        let (_, employer) = as_role(Role::Employer);
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        let own = Facts {
            requester_company: Some(c1),
            target_company: Some(c1),
            ..Default::default()
        };
        let foreign_published = Facts {
            requester_company: Some(c1),
            target_company: Some(c2),
            target_published: true,
            ..Default::default()
        };
        let foreign_draft = Facts {
            requester_company: Some(c1),
            target_company: Some(c2),
            ..Default::default()
        };
        let no_company = Facts::default();

        let check = |op, facts: &Facts| decide(&employer, EntityKind::JobPosting, op, facts);
        assert_eq!(check(Operation::Create, &own), ALLOW);
        assert!(matches!(
            check(Operation::Create, &no_company),
            Decision::Deny(Denial::Forbidden(_))
        ));
        assert_eq!(check(Operation::Retrieve, &own), ALLOW);
        assert_eq!(check(Operation::Retrieve, &foreign_published), ALLOW);
        assert_eq!(check(Operation::Retrieve, &foreign_draft), HIDDEN);
        for op in [Operation::Update, Operation::Delete] {
            assert_eq!(check(op, &own), ALLOW);
            for facts in [&foreign_published, &foreign_draft] {
                assert_eq!(
                    check(op, facts),
                    forbid("job posting belongs to another company")
                );
            }
        }
    }

    #[test]
    fn test_employer_without_company_owns_nothing() {
        // Neither side knows a company, which must not count as a match.
        let (_, employer) = as_role(Role::Employer);
        let facts = Facts::default();
        assert_eq!(
            decide(&employer, EntityKind::Application, Operation::Retrieve, &facts),
            HIDDEN
        );
        assert!(matches!(
            decide(&employer, EntityKind::JobPosting, Operation::Update, &facts),
            Decision::Deny(Denial::Forbidden(_))
        ));
    }

    #[test]
    fn test_employer_application_and_interview_rules() {
        let (_, employer) = as_role(Role::Employer);
        let company = Uuid::new_v4();
        let own = Facts {
            requester_company: Some(company),
            target_company: Some(company),
            target_owner: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let foreign = Facts {
            requester_company: Some(company),
            target_company: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let deleted = Facts {
            target_deleted: true,
            ..own.clone()
        };

        let app = |op, facts: &Facts| decide(&employer, EntityKind::Application, op, facts);
        assert_eq!(app(Operation::Retrieve, &own), ALLOW);
        assert_eq!(app(Operation::Update, &own), ALLOW);
        assert_eq!(app(Operation::Retrieve, &foreign), HIDDEN);
        assert_eq!(app(Operation::Update, &foreign), HIDDEN);
        assert_eq!(app(Operation::Retrieve, &deleted), HIDDEN);
        assert_eq!(
            app(
                Operation::Update,
                &own.clone().with_status_intent(StatusIntent::Withdraw)
            ),
            forbid("forbidden transition")
        );
        assert!(matches!(
            app(Operation::Create, &own),
            Decision::Deny(Denial::Forbidden(_))
        ));
        assert!(matches!(
            app(Operation::Delete, &own),
            Decision::Deny(Denial::Forbidden(_))
        ));

        for op in Operation::ALL {
            let interview = decide(&employer, EntityKind::Interview, op, &own);
            assert_eq!(interview, ALLOW, "{op:?}");
            if op != Operation::List {
                assert_eq!(
                    decide(&employer, EntityKind::Interview, op, &foreign),
                    HIDDEN,
                    "{op:?}"
                );
            }
        }
    }

    // ── talents ─────────────────────────────────────────────────────────────

    #[test]
    fn test_talent_apply_rules() {
        let (_, talent) = as_role(Role::Talent);
        let open = Facts {
            target_published: true,
            ..Default::default()
        };
        let check = |facts: &Facts| decide(&talent, EntityKind::Application, Operation::Create, facts);

        assert_eq!(check(&open), ALLOW);
        assert_eq!(
            check(&open.clone().with_existing_application(true)),
            Decision::Deny(Denial::Duplicate("duplicate application"))
        );
        assert_eq!(check(&Facts::default()), HIDDEN);
    }

    #[test]
    fn test_talent_update_may_only_withdraw() {
        let (id, talent) = as_role(Role::Talent);
        let own = Facts {
            target_owner: Some(id),
            ..Default::default()
        };
        let check = |facts: &Facts| decide(&talent, EntityKind::Application, Operation::Update, facts);

        assert_eq!(
            check(&own.clone().with_status_intent(StatusIntent::Withdraw)),
            ALLOW
        );
        assert_eq!(
            check(&own.clone().with_status_intent(StatusIntent::Other)),
            forbid("forbidden transition")
        );
        assert_eq!(
            check(&own.clone().with_restricted_fields(true)),
            forbid("forbidden transition")
        );

        let someone_else = Facts {
            target_owner: Some(Uuid::new_v4()),
            status_intent: StatusIntent::Withdraw,
            ..Default::default()
        };
        assert_eq!(check(&someone_else), HIDDEN);
    }

    #[test]
    fn test_talent_delete_requires_terminal_application() {
        let (id, talent) = as_role(Role::Talent);
        let active = Facts {
            target_owner: Some(id),
            ..Default::default()
        };
        let closed = Facts {
            target_terminal: true,
            ..active.clone()
        };
        let check = |facts: &Facts| decide(&talent, EntityKind::Application, Operation::Delete, facts);

        assert!(matches!(check(&active), Decision::Deny(Denial::Forbidden(_))));
        assert_eq!(check(&closed), ALLOW);
    }

    #[test]
    fn test_talent_saved_job_rules() {
        let (id, talent) = as_role(Role::Talent);
        let published = Facts {
            target_published: true,
            ..Default::default()
        };
        let own = Facts {
            target_owner: Some(id),
            ..Default::default()
        };
        let other = Facts {
            target_owner: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let check = |op, facts: &Facts| decide(&talent, EntityKind::SavedJob, op, facts);

        assert_eq!(check(Operation::Create, &published), ALLOW);
        assert_eq!(check(Operation::Create, &Facts::default()), HIDDEN);
        assert_eq!(check(Operation::Delete, &own), ALLOW);
        assert_eq!(check(Operation::Delete, &other), HIDDEN);
        assert_eq!(check(Operation::Retrieve, &other), HIDDEN);
    }

    #[test]
    fn test_talent_interviews_are_read_only() {
        let (id, talent) = as_role(Role::Talent);
        let own = Facts {
            target_owner: Some(id),
            ..Default::default()
        };
        assert_eq!(
            decide(&talent, EntityKind::Interview, Operation::Retrieve, &own),
            ALLOW
        );
        for op in [Operation::Create, Operation::Update, Operation::Delete] {
            assert!(matches!(
                decide(&talent, EntityKind::Interview, op, &own),
                Decision::Deny(Denial::Forbidden(_))
            ));
        }
    }

    #[test]
    fn test_profile_visibility() {
        let (id, talent) = as_role(Role::Talent);
        let (_, employer) = as_role(Role::Employer);
        let own = Facts {
            target_owner: Some(id),
            ..Default::default()
        };
        let other = Facts {
            target_owner: Some(Uuid::new_v4()),
            ..Default::default()
        };

        assert!(matches!(
            decide(&talent, EntityKind::TalentProfile, Operation::List, &own),
            Decision::Deny(Denial::Forbidden(_))
        ));
        assert_eq!(
            decide(&talent, EntityKind::TalentProfile, Operation::Retrieve, &own),
            ALLOW
        );
        assert_eq!(
            decide(&talent, EntityKind::TalentProfile, Operation::Retrieve, &other),
            HIDDEN
        );
        assert_eq!(
            decide(&employer, EntityKind::TalentProfile, Operation::List, &other),
            ALLOW
        );
        assert_eq!(
            decide(&employer, EntityKind::TalentProfile, Operation::Retrieve, &other),
            ALLOW
        );
        assert!(matches!(
            decide(&employer, EntityKind::TalentProfile, Operation::Update, &other),
            Decision::Deny(Denial::Forbidden(_))
        ));
    }
}
