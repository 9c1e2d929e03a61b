use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Talent,
    Employer,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Talent, Role::Employer, Role::Admin];

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Talent => "TALENT",
            Role::Employer => "EMPLOYER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "role",
                value: value.to_string(),
            })
    }
}

impl TryFrom<String> for Role {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An account with exactly one role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn is_active_admin(&self) -> bool {
        self.is_active && self.role == Role::Admin
    }
}

#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IdentityChanges {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

impl IdentityChanges {
    /// True when applying these changes would leave `current` without active admin rights.
    pub fn revokes_admin(&self, current: &Identity) -> bool {
        if !current.is_active_admin() {
            return false;
        }
        let demoted = self.role.is_some_and(|role| role != Role::Admin);
        let deactivated = self.is_active == Some(false);
        demoted || deactivated
    }
}
