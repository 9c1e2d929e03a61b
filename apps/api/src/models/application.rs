use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{ParseEnumError, StatusChange, TransitionError};

/// Progression of an application from submission to a final outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Applied,
    Reviewed,
    Shortlisted,
    InterviewScheduled,
    Interviewed,
    OfferExtended,
    OfferAccepted,
    OfferRejected,
    Rejected,
    Hired,
    Withdrawn,
    Deleted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 12] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::InterviewScheduled,
        ApplicationStatus::Interviewed,
        ApplicationStatus::OfferExtended,
        ApplicationStatus::OfferAccepted,
        ApplicationStatus::OfferRejected,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
        ApplicationStatus::Withdrawn,
        ApplicationStatus::Deleted,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "APPLIED",
            ApplicationStatus::Reviewed => "REVIEWED",
            ApplicationStatus::Shortlisted => "SHORTLISTED",
            ApplicationStatus::InterviewScheduled => "INTERVIEW_SCHEDULED",
            ApplicationStatus::Interviewed => "INTERVIEWED",
            ApplicationStatus::OfferExtended => "OFFER_EXTENDED",
            ApplicationStatus::OfferAccepted => "OFFER_ACCEPTED",
            ApplicationStatus::OfferRejected => "OFFER_REJECTED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Hired => "HIRED",
            ApplicationStatus::Withdrawn => "WITHDRAWN",
            ApplicationStatus::Deleted => "DELETED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::OfferRejected
                | ApplicationStatus::Rejected
                | ApplicationStatus::Hired
                | ApplicationStatus::Withdrawn
                | ApplicationStatus::Deleted
        )
    }

    /// Forward moves driven by the reviewing company.
    pub const fn forward_targets(self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            Applied => &[Reviewed, Rejected],
            Reviewed => &[Shortlisted, Rejected],
            Shortlisted => &[InterviewScheduled, Rejected],
            InterviewScheduled => &[Interviewed, Rejected],
            Interviewed => &[OfferExtended, Rejected],
            OfferExtended => &[OfferAccepted, OfferRejected],
            OfferAccepted => &[Hired],
            OfferRejected | Rejected | Hired | Withdrawn | Deleted => &[],
        }
    }

    /// WITHDRAWN is reachable from every non-terminal state; DELETED is never a
    /// transition target, it is set by the delete operation.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        if next == ApplicationStatus::Withdrawn {
            return !self.is_terminal();
        }
        self.forward_targets().contains(&next)
    }

    pub fn transition(self, next: ApplicationStatus) -> Result<StatusChange<Self>, TransitionError> {
        if self.can_transition_to(next) {
            Ok(StatusChange {
                from: self,
                to: next,
            })
        } else {
            Err(TransitionError {
                entity: "application",
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "application status",
                value: value.to_string(),
            })
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub posting_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub score: Option<f64>,
    pub cover_letter: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn is_deleted(&self) -> bool {
        self.status == ApplicationStatus::Deleted
    }
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub applicant_id: Uuid,
    pub posting_id: Uuid,
    pub score: Option<f64>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationChanges {
    pub status: Option<StatusChange<ApplicationStatus>>,
    pub score: Option<f64>,
    pub notes: Option<String>,
}
