use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Resume data a talent keeps on the platform. File storage and parsing happen
/// elsewhere; only the extracted skills and a link are kept here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TalentProfile {
    pub id: Uuid,
    pub talent_id: Uuid,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: Option<i32>,
    pub resume_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTalentProfile {
    pub talent_id: Uuid,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: Option<i32>,
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TalentProfileChanges {
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience_years: Option<i32>,
    pub resume_url: Option<String>,
}
