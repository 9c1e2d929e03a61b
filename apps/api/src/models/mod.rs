//! Domain records shared by the store, the access layer and the handlers.
//!
//! Closed enumerations are persisted as upper-case text and parsed back through
//! `TryFrom<String>`, so a row carrying an unknown value fails to decode instead
//! of leaking an open string into the domain.

pub mod application;
pub mod company;
pub mod identity;
pub mod interview;
pub mod job;
pub mod profile;
pub mod saved_job;

use thiserror::Error;

pub use application::{Application, ApplicationStatus};
pub use company::Company;
pub use identity::{Identity, Role};
pub use interview::{Interview, InterviewStatus};
pub use job::{JobPosting, JobStatus};
pub use profile::TalentProfile;
pub use saved_job::SavedJob;

/// Raised when a string does not name a member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// A requested move between two states of a status machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange<S> {
    pub from: S,
    pub to: S,
}

/// Raised when a status machine has no edge between two states.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot move {entity} from {from} to {to}")]
pub struct TransitionError {
    pub entity: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

/// Trims, lowercases and de-duplicates a skill list, keeping first-seen order.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim().to_lowercase();
        if !skill.is_empty() && !out.contains(&skill) {
            out.push(skill);
        }
    }
    out
}
