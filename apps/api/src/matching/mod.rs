//! Skill matching: pluggable, trait-based scorer that measures a talent's
//! skills against a posting's required skills.
//!
//! Default: `KeywordSkillMatcher` (pure set intersection, deterministic).
//! Alternative: `LlmSkillMatcher`, selected with `ENABLE_LLM_SKILL_MATCH`.
//!
//! `AppState` holds an `Arc<dyn SkillMatcher>`, swapped at startup via config.

pub mod handlers;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::{prompts::JSON_ONLY_SYSTEM, LlmClient};
use crate::models::{normalize_skills, JobPosting, TalentProfile};

// ────────────────────────────────────────────────────────────────────────────
// Output data model (shared across all matcher backends)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillReport {
    /// 0 – 100, two decimals.
    pub score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendation: String,
    pub backend: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap backends without touching handlers.
#[async_trait]
pub trait SkillMatcher: Send + Sync {
    /// `required` is never empty; callers treat an empty list as unscorable.
    async fn score(&self, talent: &[String], required: &[String]) -> Result<SkillReport, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordSkillMatcher
// ────────────────────────────────────────────────────────────────────────────

/// score = |required ∩ talent| / |required| × 100, after normalising both sides.
pub struct KeywordSkillMatcher;

#[async_trait]
impl SkillMatcher for KeywordSkillMatcher {
    async fn score(&self, talent: &[String], required: &[String]) -> Result<SkillReport, AppError> {
        Ok(compute_keyword_match(talent, required))
    }
}

fn compute_keyword_match(talent: &[String], required: &[String]) -> SkillReport {
    let talent = normalize_skills(talent);
    let required = normalize_skills(required);

    let (matched, missing): (Vec<String>, Vec<String>) =
        required.iter().cloned().partition(|skill| talent.contains(skill));

    let score = if required.is_empty() {
        0.0
    } else {
        round2(matched.len() as f64 / required.len() as f64 * 100.0)
    };

    SkillReport {
        score,
        recommendation: build_recommendation(score, &missing),
        matched_skills: matched,
        missing_skills: missing,
        backend: "keyword".to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn build_recommendation(score: f64, missing: &[String]) -> String {
    let top_gaps: Vec<&str> = missing.iter().take(3).map(String::as_str).collect();

    if missing.is_empty() {
        "Strong fit. Every required skill is covered.".to_string()
    } else if score >= 60.0 {
        format!(
            "Moderate fit ({score}/100). Missing: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Low fit ({score}/100). Significant gaps: {}.",
            top_gaps.join(", ")
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmSkillMatcher
// ────────────────────────────────────────────────────────────────────────────

/// Semantic matcher via the hosted LLM. Treats near-synonyms (e.g. "postgres"
/// and "postgresql") as matches, which the keyword backend cannot.
pub struct LlmSkillMatcher(pub LlmClient);

#[derive(Debug, Deserialize)]
struct LlmSkillVerdict {
    score: f64,
    #[serde(default)]
    matched_skills: Vec<String>,
    #[serde(default)]
    missing_skills: Vec<String>,
    #[serde(default)]
    recommendation: String,
}

impl LlmSkillVerdict {
    fn into_report(self) -> SkillReport {
        let score = if self.score.is_finite() {
            round2(self.score.clamp(0.0, 100.0))
        } else {
            0.0
        };
        SkillReport {
            score,
            matched_skills: self.matched_skills,
            missing_skills: self.missing_skills,
            recommendation: self.recommendation,
            backend: "llm".to_string(),
        }
    }
}

#[async_trait]
impl SkillMatcher for LlmSkillMatcher {
    async fn score(&self, talent: &[String], required: &[String]) -> Result<SkillReport, AppError> {
        let prompt = prompts::skill_match_prompt(&normalize_skills(talent), &normalize_skills(required));
        let verdict: LlmSkillVerdict = self.0.call_json(&prompt, JSON_ONLY_SYSTEM).await?;
        Ok(verdict.into_report())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Application scoring
// ────────────────────────────────────────────────────────────────────────────

/// Score stored on a new application. `None` when there is nothing to compare:
/// the talent has no profile or the posting lists no required skills. A
/// matcher failure also leaves the application unscored rather than
/// blocking the apply.
pub async fn application_score(
    matcher: &dyn SkillMatcher,
    profile: Option<&TalentProfile>,
    posting: &JobPosting,
) -> Option<f64> {
    let profile = profile?;
    if posting.required_skills.is_empty() {
        return None;
    }
    match matcher.score(&profile.skills, &posting.required_skills).await {
        Ok(report) => Some(report.score),
        Err(e) => {
            warn!(posting_id = %posting.id, "skill matching failed, leaving application unscored: {e}");
            None
        }
    }
}
