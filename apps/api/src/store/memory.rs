//! In-process store for unit and router tests. A single mutex makes every
//! check-and-write atomic, mirroring the constraints the Postgres schema holds.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{ListQuery, Scope, Store, StoreError};
use crate::models::application::{ApplicationChanges, NewApplication};
use crate::models::company::{CompanyChanges, NewCompany};
use crate::models::identity::{IdentityChanges, NewIdentity};
use crate::models::interview::{InterviewChanges, NewInterview};
use crate::models::job::{JobPostingChanges, NewJobPosting};
use crate::models::profile::{NewTalentProfile, TalentProfileChanges};
use crate::models::{
    Application, ApplicationStatus, Company, Identity, Interview, InterviewStatus, JobPosting,
    JobStatus, Role, SavedJob, StatusChange, TalentProfile,
};

#[derive(Default)]
struct Tables {
    identities: Vec<Identity>,
    companies: Vec<Company>,
    postings: Vec<JobPosting>,
    applications: Vec<Application>,
    interviews: Vec<Interview>,
    saved_jobs: Vec<SavedJob>,
    profiles: Vec<TalentProfile>,
}

impl Tables {
    fn posting_company(&self, posting_id: Uuid) -> Option<Uuid> {
        self.postings
            .iter()
            .find(|p| p.id == posting_id)
            .map(|p| p.company_id)
    }

    fn application(&self, id: Uuid) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("store mutex poisoned")
    }
}

fn matches_search(search: &Option<String>, fields: &[Option<&str>]) -> bool {
    match search {
        None => true,
        Some(needle) => {
            let needle = needle.to_lowercase();
            fields
                .iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
        }
    }
}

/// Newest first, then the page window.
fn page<T: Clone, S>(rows: Vec<&T>, query: &ListQuery<S>) -> Vec<T> {
    rows.into_iter()
        .rev()
        .skip(query.offset.max(0) as usize)
        .take(query.limit.max(0) as usize)
        .cloned()
        .collect()
}

fn check_status<S: PartialEq>(current: S, change: Option<StatusChange<S>>) -> bool {
    change.map_or(true, |change| change.from == current)
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_identity(&self, new: NewIdentity) -> Result<Identity, StoreError> {
        let mut tables = self.lock();
        if tables.identities.iter().any(|i| i.email == new.email) {
            return Err(StoreError::Duplicate("identity"));
        }
        let now = Utc::now();
        let identity = Identity {
            id: Uuid::new_v4(),
            email: new.email,
            full_name: new.full_name,
            role: new.role,
            is_active: true,
            is_verified: new.is_verified,
            created_at: now,
            updated_at: now,
        };
        tables.identities.push(identity.clone());
        Ok(identity)
    }

    async fn identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        Ok(self.lock().identities.iter().find(|i| i.id == id).cloned())
    }

    async fn list_identities(&self, query: &ListQuery<Role>) -> Result<Vec<Identity>, StoreError> {
        let tables = self.lock();
        let rows = tables
            .identities
            .iter()
            .filter(|i| query.status.map_or(true, |role| i.role == role))
            .filter(|i| {
                matches_search(
                    &query.search,
                    &[Some(i.email.as_str()), Some(i.full_name.as_str())],
                )
            })
            .collect();
        Ok(page(rows, query))
    }

    async fn update_identity(
        &self,
        id: Uuid,
        changes: IdentityChanges,
    ) -> Result<Identity, StoreError> {
        let mut tables = self.lock();
        let current = tables
            .identities
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("identity"))?;

        if changes.revokes_admin(&current)
            && !tables
                .identities
                .iter()
                .any(|i| i.id != id && i.is_active_admin())
        {
            return Err(StoreError::LastAdmin);
        }

        let identity = tables
            .identities
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound("identity"))?;
        if let Some(full_name) = changes.full_name {
            identity.full_name = full_name;
        }
        if let Some(role) = changes.role {
            identity.role = role;
        }
        if let Some(is_active) = changes.is_active {
            identity.is_active = is_active;
        }
        if let Some(is_verified) = changes.is_verified {
            identity.is_verified = is_verified;
        }
        identity.updated_at = Utc::now();
        Ok(identity.clone())
    }

    async fn deactivate_identity(&self, id: Uuid) -> Result<Identity, StoreError> {
        self.update_identity(
            id,
            IdentityChanges {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    async fn count_active_admins(&self) -> Result<u64, StoreError> {
        Ok(self
            .lock()
            .identities
            .iter()
            .filter(|i| i.is_active_admin())
            .count() as u64)
    }

    async fn insert_company(&self, new: NewCompany) -> Result<Company, StoreError> {
        let mut tables = self.lock();
        if tables.companies.iter().any(|c| c.owner_id == new.owner_id) {
            return Err(StoreError::Duplicate("company"));
        }
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            name: new.name,
            website: new.website,
            description: new.description,
            industry: new.industry,
            location: new.location,
            created_at: now,
            updated_at: now,
        };
        tables.companies.push(company.clone());
        Ok(company)
    }

    async fn company(&self, id: Uuid) -> Result<Option<Company>, StoreError> {
        Ok(self.lock().companies.iter().find(|c| c.id == id).cloned())
    }

    async fn company_owned_by(&self, owner_id: Uuid) -> Result<Option<Company>, StoreError> {
        Ok(self
            .lock()
            .companies
            .iter()
            .find(|c| c.owner_id == owner_id)
            .cloned())
    }

    async fn list_companies(&self, query: &ListQuery<()>) -> Result<Vec<Company>, StoreError> {
        let tables = self.lock();
        let rows = tables
            .companies
            .iter()
            .filter(|c| matches_search(&query.search, &[Some(c.name.as_str())]))
            .collect();
        Ok(page(rows, query))
    }

    async fn update_company(
        &self,
        id: Uuid,
        changes: CompanyChanges,
    ) -> Result<Company, StoreError> {
        let mut tables = self.lock();
        let company = tables
            .companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound("company"))?;
        if let Some(name) = changes.name {
            company.name = name;
        }
        if changes.website.is_some() {
            company.website = changes.website;
        }
        if changes.description.is_some() {
            company.description = changes.description;
        }
        if changes.industry.is_some() {
            company.industry = changes.industry;
        }
        if changes.location.is_some() {
            company.location = changes.location;
        }
        company.updated_at = Utc::now();
        Ok(company.clone())
    }

    async fn delete_company(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.lock();
        if tables.postings.iter().any(|p| p.company_id == id) {
            return Err(StoreError::InUse("company"));
        }
        let before = tables.companies.len();
        tables.companies.retain(|c| c.id != id);
        if tables.companies.len() == before {
            return Err(StoreError::NotFound("company"));
        }
        Ok(())
    }

    async fn insert_posting(&self, new: NewJobPosting) -> Result<JobPosting, StoreError> {
        let mut tables = self.lock();
        if !tables.companies.iter().any(|c| c.id == new.company_id) {
            return Err(StoreError::NotFound("company"));
        }
        let now = Utc::now();
        let posting = JobPosting {
            id: Uuid::new_v4(),
            company_id: new.company_id,
            title: new.title,
            description: new.description,
            location: new.location,
            employment_type: new.employment_type,
            salary_min: new.salary_min,
            salary_max: new.salary_max,
            status: new.status,
            required_skills: new.required_skills,
            posted_at: (new.status == JobStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        };
        tables.postings.push(posting.clone());
        Ok(posting)
    }

    async fn posting(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        Ok(self.lock().postings.iter().find(|p| p.id == id).cloned())
    }

    async fn list_postings(
        &self,
        scope: Scope,
        query: &ListQuery<JobStatus>,
    ) -> Result<Vec<JobPosting>, StoreError> {
        let tables = self.lock();
        let rows = tables
            .postings
            .iter()
            .filter(|p| match scope {
                Scope::Unrestricted => true,
                Scope::Published => p.status == JobStatus::Published,
                Scope::Company(company_id) => p.company_id == company_id,
                Scope::Empty | Scope::Owner(_) => false,
            })
            .filter(|p| query.status.map_or(true, |status| p.status == status))
            .filter(|p| query.parent_id.map_or(true, |id| p.company_id == id))
            .filter(|p| {
                matches_search(
                    &query.search,
                    &[Some(p.title.as_str()), Some(p.description.as_str())],
                )
            })
            .collect();
        Ok(page(rows, query))
    }

    async fn update_posting(
        &self,
        id: Uuid,
        changes: JobPostingChanges,
    ) -> Result<JobPosting, StoreError> {
        let mut tables = self.lock();
        let posting = tables
            .postings
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound("job posting"))?;
        if !check_status(posting.status, changes.status) {
            return Err(StoreError::StaleStatus("job posting"));
        }
        let now = Utc::now();
        if let Some(title) = changes.title {
            posting.title = title;
        }
        if let Some(description) = changes.description {
            posting.description = description;
        }
        if changes.location.is_some() {
            posting.location = changes.location;
        }
        if changes.employment_type.is_some() {
            posting.employment_type = changes.employment_type;
        }
        if changes.salary_min.is_some() {
            posting.salary_min = changes.salary_min;
        }
        if changes.salary_max.is_some() {
            posting.salary_max = changes.salary_max;
        }
        if let Some(skills) = changes.required_skills {
            posting.required_skills = skills;
        }
        if let Some(change) = changes.status {
            posting.status = change.to;
            if change.to == JobStatus::Published && posting.posted_at.is_none() {
                posting.posted_at = Some(now);
            }
        }
        posting.updated_at = now;
        Ok(posting.clone())
    }

    async fn delete_posting(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.lock();
        if tables.applications.iter().any(|a| a.posting_id == id) {
            return Err(StoreError::InUse("job posting"));
        }
        let before = tables.postings.len();
        tables.postings.retain(|p| p.id != id);
        if tables.postings.len() == before {
            return Err(StoreError::NotFound("job posting"));
        }
        tables.saved_jobs.retain(|s| s.posting_id != id);
        Ok(())
    }

    async fn insert_application(&self, new: NewApplication) -> Result<Application, StoreError> {
        let mut tables = self.lock();
        let duplicate = tables.applications.iter().any(|a| {
            a.applicant_id == new.applicant_id && a.posting_id == new.posting_id && !a.is_deleted()
        });
        if duplicate {
            return Err(StoreError::Duplicate("application"));
        }
        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            applicant_id: new.applicant_id,
            posting_id: new.posting_id,
            status: ApplicationStatus::Applied,
            score: new.score,
            cover_letter: new.cover_letter,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        tables.applications.push(application.clone());
        Ok(application)
    }

    async fn application(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        Ok(self.lock().application(id).cloned())
    }

    async fn active_application(
        &self,
        applicant_id: Uuid,
        posting_id: Uuid,
    ) -> Result<Option<Application>, StoreError> {
        Ok(self
            .lock()
            .applications
            .iter()
            .find(|a| {
                a.applicant_id == applicant_id && a.posting_id == posting_id && !a.is_deleted()
            })
            .cloned())
    }

    async fn list_applications(
        &self,
        scope: Scope,
        query: &ListQuery<ApplicationStatus>,
    ) -> Result<Vec<Application>, StoreError> {
        let tables = self.lock();
        let rows = tables
            .applications
            .iter()
            .filter(|a| match scope {
                Scope::Unrestricted => true,
                Scope::Owner(applicant_id) => !a.is_deleted() && a.applicant_id == applicant_id,
                Scope::Company(company_id) => {
                    !a.is_deleted() && tables.posting_company(a.posting_id) == Some(company_id)
                }
                Scope::Empty | Scope::Published => false,
            })
            .filter(|a| query.status.map_or(true, |status| a.status == status))
            .filter(|a| query.parent_id.map_or(true, |id| a.posting_id == id))
            .filter(|a| matches_search(&query.search, &[a.cover_letter.as_deref()]))
            .collect();
        Ok(page(rows, query))
    }

    async fn update_application(
        &self,
        id: Uuid,
        changes: ApplicationChanges,
    ) -> Result<Application, StoreError> {
        let mut tables = self.lock();
        let application = tables
            .applications
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("application"))?;
        if !check_status(application.status, changes.status) {
            return Err(StoreError::StaleStatus("application"));
        }
        // Reviving a deleted application must respect the per-pair uniqueness.
        if let Some(change) = changes.status {
            let revives = application.is_deleted() && change.to != ApplicationStatus::Deleted;
            let clash = tables.applications.iter().any(|a| {
                a.id != id
                    && a.applicant_id == application.applicant_id
                    && a.posting_id == application.posting_id
                    && !a.is_deleted()
            });
            if revives && clash {
                return Err(StoreError::Duplicate("application"));
            }
        }
        let application = tables
            .applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound("application"))?;
        if let Some(change) = changes.status {
            application.status = change.to;
        }
        if changes.score.is_some() {
            application.score = changes.score;
        }
        if changes.notes.is_some() {
            application.notes = changes.notes;
        }
        application.updated_at = Utc::now();
        Ok(application.clone())
    }

    async fn insert_interview(
        &self,
        new: NewInterview,
        advance: Option<StatusChange<ApplicationStatus>>,
    ) -> Result<Interview, StoreError> {
        let mut tables = self.lock();
        let now = Utc::now();
        let application = tables
            .applications
            .iter_mut()
            .find(|a| a.id == new.application_id)
            .ok_or(StoreError::NotFound("application"))?;
        if let Some(change) = advance {
            if application.status != change.from {
                return Err(StoreError::StaleStatus("application"));
            }
            application.status = change.to;
            application.updated_at = now;
        }
        let interview = Interview {
            id: Uuid::new_v4(),
            application_id: new.application_id,
            interviewer_id: new.interviewer_id,
            status: InterviewStatus::Scheduled,
            scheduled_at: new.scheduled_at,
            duration_minutes: new.duration_minutes,
            location: new.location,
            feedback: None,
            score: None,
            created_at: now,
            updated_at: now,
        };
        tables.interviews.push(interview.clone());
        Ok(interview)
    }

    async fn interview(&self, id: Uuid) -> Result<Option<Interview>, StoreError> {
        Ok(self.lock().interviews.iter().find(|i| i.id == id).cloned())
    }

    async fn list_interviews(
        &self,
        scope: Scope,
        query: &ListQuery<InterviewStatus>,
    ) -> Result<Vec<Interview>, StoreError> {
        let tables = self.lock();
        let rows = tables
            .interviews
            .iter()
            .filter(|i| {
                let parent = tables.application(i.application_id);
                match scope {
                    Scope::Unrestricted => true,
                    Scope::Owner(applicant_id) => parent
                        .is_some_and(|a| !a.is_deleted() && a.applicant_id == applicant_id),
                    Scope::Company(company_id) => parent.is_some_and(|a| {
                        !a.is_deleted() && tables.posting_company(a.posting_id) == Some(company_id)
                    }),
                    Scope::Empty | Scope::Published => false,
                }
            })
            .filter(|i| query.status.map_or(true, |status| i.status == status))
            .filter(|i| query.parent_id.map_or(true, |id| i.application_id == id))
            .filter(|i| matches_search(&query.search, &[i.location.as_deref()]))
            .collect();
        Ok(page(rows, query))
    }

    async fn update_interview(
        &self,
        id: Uuid,
        changes: InterviewChanges,
    ) -> Result<Interview, StoreError> {
        let mut tables = self.lock();
        let interview = tables
            .interviews
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound("interview"))?;
        if !check_status(interview.status, changes.status) {
            return Err(StoreError::StaleStatus("interview"));
        }
        if let Some(change) = changes.status {
            interview.status = change.to;
        }
        if let Some(scheduled_at) = changes.scheduled_at {
            interview.scheduled_at = scheduled_at;
        }
        if let Some(duration) = changes.duration_minutes {
            interview.duration_minutes = duration;
        }
        if changes.location.is_some() {
            interview.location = changes.location;
        }
        if changes.feedback.is_some() {
            interview.feedback = changes.feedback;
        }
        if changes.score.is_some() {
            interview.score = changes.score;
        }
        interview.updated_at = Utc::now();
        Ok(interview.clone())
    }

    async fn delete_interview(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let before = tables.interviews.len();
        tables.interviews.retain(|i| i.id != id);
        if tables.interviews.len() == before {
            return Err(StoreError::NotFound("interview"));
        }
        Ok(())
    }

    async fn insert_saved_job(
        &self,
        talent_id: Uuid,
        posting_id: Uuid,
    ) -> Result<SavedJob, StoreError> {
        let mut tables = self.lock();
        if tables
            .saved_jobs
            .iter()
            .any(|s| s.talent_id == talent_id && s.posting_id == posting_id)
        {
            return Err(StoreError::Duplicate("saved job"));
        }
        let saved = SavedJob {
            id: Uuid::new_v4(),
            talent_id,
            posting_id,
            saved_at: Utc::now(),
        };
        tables.saved_jobs.push(saved.clone());
        Ok(saved)
    }

    async fn saved_job(&self, id: Uuid) -> Result<Option<SavedJob>, StoreError> {
        Ok(self.lock().saved_jobs.iter().find(|s| s.id == id).cloned())
    }

    async fn list_saved_jobs(
        &self,
        scope: Scope,
        query: &ListQuery<()>,
    ) -> Result<Vec<SavedJob>, StoreError> {
        let tables = self.lock();
        let rows = tables
            .saved_jobs
            .iter()
            .filter(|s| match scope {
                Scope::Unrestricted => true,
                Scope::Owner(talent_id) => s.talent_id == talent_id,
                Scope::Empty | Scope::Published | Scope::Company(_) => false,
            })
            .filter(|s| query.parent_id.map_or(true, |id| s.posting_id == id))
            .collect();
        Ok(page(rows, query))
    }

    async fn delete_saved_job(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let before = tables.saved_jobs.len();
        tables.saved_jobs.retain(|s| s.id != id);
        if tables.saved_jobs.len() == before {
            return Err(StoreError::NotFound("saved job"));
        }
        Ok(())
    }

    async fn insert_profile(&self, new: NewTalentProfile) -> Result<TalentProfile, StoreError> {
        let mut tables = self.lock();
        if tables.profiles.iter().any(|p| p.talent_id == new.talent_id) {
            return Err(StoreError::Duplicate("talent profile"));
        }
        let now = Utc::now();
        let profile = TalentProfile {
            id: Uuid::new_v4(),
            talent_id: new.talent_id,
            headline: new.headline,
            summary: new.summary,
            skills: new.skills,
            experience_years: new.experience_years,
            resume_url: new.resume_url,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn profile(&self, id: Uuid) -> Result<Option<TalentProfile>, StoreError> {
        Ok(self.lock().profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn profile_for_talent(
        &self,
        talent_id: Uuid,
    ) -> Result<Option<TalentProfile>, StoreError> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .find(|p| p.talent_id == talent_id)
            .cloned())
    }

    async fn list_profiles(
        &self,
        query: &ListQuery<()>,
    ) -> Result<Vec<TalentProfile>, StoreError> {
        let tables = self.lock();
        let rows = tables
            .profiles
            .iter()
            .filter(|p| {
                let skill_hit = query.search.as_ref().is_some_and(|search| {
                    p.skills.contains(&search.trim().to_lowercase())
                });
                skill_hit || matches_search(&query.search, &[p.headline.as_deref()])
            })
            .collect();
        Ok(page(rows, query))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: TalentProfileChanges,
    ) -> Result<TalentProfile, StoreError> {
        let mut tables = self.lock();
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound("talent profile"))?;
        if changes.headline.is_some() {
            profile.headline = changes.headline;
        }
        if changes.summary.is_some() {
            profile.summary = changes.summary;
        }
        if let Some(skills) = changes.skills {
            profile.skills = skills;
        }
        if changes.experience_years.is_some() {
            profile.experience_years = changes.experience_years;
        }
        if changes.resume_url.is_some() {
            profile.resume_url = changes.resume_url;
        }
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let before = tables.profiles.len();
        tables.profiles.retain(|p| p.id != id);
        if tables.profiles.len() == before {
            return Err(StoreError::NotFound("talent profile"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn identity(store: &MemoryStore, role: Role) -> Identity {
        store
            .insert_identity(NewIdentity {
                email: format!("{}@jobhub.test", Uuid::new_v4()),
                full_name: "Test".to_string(),
                role,
                is_verified: true,
            })
            .await
            .unwrap()
    }

    async fn published_posting(store: &MemoryStore) -> JobPosting {
        let owner = identity(store, Role::Employer).await;
        let company = store
            .insert_company(NewCompany {
                owner_id: owner.id,
                name: "Acme".to_string(),
                website: None,
                description: None,
                industry: None,
                location: None,
            })
            .await
            .unwrap();
        store
            .insert_posting(NewJobPosting {
                company_id: company.id,
                title: "Engineer".to_string(),
                description: "Build things".to_string(),
                location: None,
                employment_type: None,
                salary_min: None,
                salary_max: None,
                status: JobStatus::Published,
                required_skills: vec![],
            })
            .await
            .unwrap()
    }

    fn application_for(applicant_id: Uuid, posting_id: Uuid) -> NewApplication {
        NewApplication {
            applicant_id,
            posting_id,
            score: None,
            cover_letter: None,
        }
    }

    #[tokio::test]
    async fn test_concurrent_applies_leave_one_application() {
        let store = MemoryStore::default();
        let posting = published_posting(&store).await;
        let talent = identity(&store, Role::Talent).await;

        // Both requests passed the advisory lookup before either wrote.
        assert!(store
            .active_application(talent.id, posting.id)
            .await
            .unwrap()
            .is_none());
        let (first, second) = tokio::join!(
            store.insert_application(application_for(talent.id, posting.id)),
            store.insert_application(application_for(talent.id, posting.id)),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(StoreError::Duplicate("application")))));
    }

    #[tokio::test]
    async fn test_status_update_with_stale_origin_is_rejected() {
        let store = MemoryStore::default();
        let posting = published_posting(&store).await;
        let talent = identity(&store, Role::Talent).await;
        let application = store
            .insert_application(application_for(talent.id, posting.id))
            .await
            .unwrap();

        let review = StatusChange {
            from: ApplicationStatus::Applied,
            to: ApplicationStatus::Reviewed,
        };
        store
            .update_application(
                application.id,
                ApplicationChanges {
                    status: Some(review),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // A second writer still believes the application is APPLIED.
        let err = store
            .update_application(
                application.id,
                ApplicationChanges {
                    status: Some(StatusChange {
                        from: ApplicationStatus::Applied,
                        to: ApplicationStatus::Rejected,
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::StaleStatus("application")));
        let current = store.application(application.id).await.unwrap().unwrap();
        assert_eq!(current.status, ApplicationStatus::Reviewed);
    }

    #[tokio::test]
    async fn test_stale_interview_advance_inserts_nothing() {
        let store = MemoryStore::default();
        let posting = published_posting(&store).await;
        let talent = identity(&store, Role::Talent).await;
        let application = store
            .insert_application(application_for(talent.id, posting.id))
            .await
            .unwrap();

        let err = store
            .insert_interview(
                NewInterview {
                    application_id: application.id,
                    interviewer_id: Uuid::new_v4(),
                    scheduled_at: Utc::now() + chrono::Duration::days(1),
                    duration_minutes: 60,
                    location: None,
                },
                Some(StatusChange {
                    from: ApplicationStatus::Shortlisted,
                    to: ApplicationStatus::InterviewScheduled,
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::StaleStatus("application")));
        assert!(store.lock().interviews.is_empty());
    }

    #[tokio::test]
    async fn test_store_refuses_to_remove_last_admin() {
        let store = MemoryStore::default();
        let admin = identity(&store, Role::Admin).await;

        let err = store.deactivate_identity(admin.id).await.unwrap_err();
        assert!(matches!(err, StoreError::LastAdmin));

        let err = store
            .update_identity(
                admin.id,
                IdentityChanges {
                    role: Some(Role::Talent),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::LastAdmin));
        assert_eq!(store.count_active_admins().await.unwrap(), 1);

        // With a second admin the same deactivation goes through.
        identity(&store, Role::Admin).await;
        let deactivated = store.deactivate_identity(admin.id).await.unwrap();
        assert!(!deactivated.is_active);
        assert_eq!(store.count_active_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deleted_application_cannot_be_revived_over_a_live_one() {
        let store = MemoryStore::default();
        let posting = published_posting(&store).await;
        let talent = identity(&store, Role::Talent).await;
        let old = store
            .insert_application(application_for(talent.id, posting.id))
            .await
            .unwrap();
        store
            .update_application(
                old.id,
                ApplicationChanges {
                    status: Some(StatusChange {
                        from: ApplicationStatus::Applied,
                        to: ApplicationStatus::Deleted,
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .insert_application(application_for(talent.id, posting.id))
            .await
            .unwrap();

        let err = store
            .update_application(
                old.id,
                ApplicationChanges {
                    status: Some(StatusChange {
                        from: ApplicationStatus::Deleted,
                        to: ApplicationStatus::Applied,
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("application")));
    }
}
