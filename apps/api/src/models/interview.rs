use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{ParseEnumError, StatusChange, TransitionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterviewStatus {
    Scheduled,
    Rescheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl InterviewStatus {
    pub const ALL: [InterviewStatus; 5] = [
        InterviewStatus::Scheduled,
        InterviewStatus::Rescheduled,
        InterviewStatus::Completed,
        InterviewStatus::Cancelled,
        InterviewStatus::NoShow,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "SCHEDULED",
            InterviewStatus::Rescheduled => "RESCHEDULED",
            InterviewStatus::Completed => "COMPLETED",
            InterviewStatus::Cancelled => "CANCELLED",
            InterviewStatus::NoShow => "NO_SHOW",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            InterviewStatus::Completed | InterviewStatus::Cancelled | InterviewStatus::NoShow
        )
    }

    pub fn can_transition_to(self, next: InterviewStatus) -> bool {
        !self.is_terminal() && next != InterviewStatus::Scheduled
    }

    pub fn transition(self, next: InterviewStatus) -> Result<StatusChange<Self>, TransitionError> {
        if self.can_transition_to(next) {
            Ok(StatusChange {
                from: self,
                to: next,
            })
        } else {
            Err(TransitionError {
                entity: "interview",
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "interview status",
                value: value.to_string(),
            })
    }
}

impl TryFrom<String> for InterviewStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: Uuid,
    pub application_id: Uuid,
    pub interviewer_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: InterviewStatus,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub location: Option<String>,
    pub feedback: Option<String>,
    pub score: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInterview {
    pub application_id: Uuid,
    pub interviewer_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InterviewChanges {
    pub status: Option<StatusChange<InterviewStatus>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub feedback: Option<String>,
    pub score: Option<i32>,
}
