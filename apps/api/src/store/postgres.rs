use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::info;
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

/// PostgreSQL-backed store. Uniqueness rides on the schema's unique indexes;
/// status changes are compare-and-set updates.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a connection pool and applies the embedded migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("PostgreSQL connection pool established, migrations applied");
        Ok(Self::new(pool))
    }

    /// Locks every active admin row (in id order, so concurrent guards queue
    /// instead of deadlocking) and fails if `id` is the only one.
    async fn guard_last_admin(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<(), StoreError> {
        let admins: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM identities WHERE role = 'ADMIN' AND is_active ORDER BY id FOR UPDATE",
        )
        .fetch_all(&mut **tx)
        .await?;

        if admins.iter().all(|admin| *admin == id) {
            return Err(StoreError::LastAdmin);
        }
        Ok(())
    }

    async fn exists(&self, table: &'static str, id: Uuid) -> Result<bool, StoreError> {
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)");
        Ok(sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?)
    }
}

/// Maps constraint violations onto the store's error vocabulary.
fn classify(err: sqlx::Error, entity: &'static str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Duplicate(entity);
        }
        if db.is_foreign_key_violation() {
            return StoreError::InUse(entity);
        }
    }
    StoreError::Database(err)
}

/// Escapes LIKE metacharacters so user search text matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_page<S>(qb: &mut QueryBuilder<'_, Postgres>, query: &ListQuery<S>) {
    qb.push(" ORDER BY created_at DESC, id LIMIT ")
        .push_bind(query.limit)
        .push(" OFFSET ")
        .push_bind(query.offset);
}

#[async_trait]
impl Store for PgStore {
    // ── identities ──────────────────────────────────────────────────────────

    async fn insert_identity(&self, new: NewIdentity) -> Result<Identity, StoreError> {
        sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO identities (id, email, full_name, role, is_verified)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(new.role.as_str())
        .bind(new.is_verified)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "identity"))
    }

    async fn identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        Ok(
            sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_identities(&self, query: &ListQuery<Role>) -> Result<Vec<Identity>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM identities WHERE TRUE");
        if let Some(role) = query.status {
            qb.push(" AND role = ").push_bind(role.as_str());
        }
        if let Some(search) = &query.search {
            let pattern = like_pattern(search);
            qb.push(" AND (email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR full_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        push_page(&mut qb, query);
        Ok(qb
            .build_query_as::<Identity>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_identity(
        &self,
        id: Uuid,
        changes: IdentityChanges,
    ) -> Result<Identity, StoreError> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::NotFound("identity"))?;

        if changes.revokes_admin(&current) {
            Self::guard_last_admin(&mut tx, id).await?;
        }

        let updated = sqlx::query_as::<_, Identity>(
            r#"
            UPDATE identities
            SET full_name = COALESCE($2, full_name),
                role = COALESCE($3, role),
                is_active = COALESCE($4, is_active),
                is_verified = COALESCE($5, is_verified),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.full_name)
        .bind(changes.role.map(Role::as_str))
        .bind(changes.is_active)
        .bind(changes.is_verified)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
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
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM identities WHERE role = 'ADMIN' AND is_active",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    // ── companies ───────────────────────────────────────────────────────────

    async fn insert_company(&self, new: NewCompany) -> Result<Company, StoreError> {
        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (id, owner_id, name, website, description, industry, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.owner_id)
        .bind(&new.name)
        .bind(&new.website)
        .bind(&new.description)
        .bind(&new.industry)
        .bind(&new.location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "company"))
    }

    async fn company(&self, id: Uuid) -> Result<Option<Company>, StoreError> {
        Ok(
            sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn company_owned_by(&self, owner_id: Uuid) -> Result<Option<Company>, StoreError> {
        Ok(
            sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_companies(&self, query: &ListQuery<()>) -> Result<Vec<Company>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM companies WHERE TRUE");
        if let Some(search) = &query.search {
            qb.push(" AND name ILIKE ").push_bind(like_pattern(search));
        }
        push_page(&mut qb, query);
        Ok(qb.build_query_as::<Company>().fetch_all(&self.pool).await?)
    }

    async fn update_company(
        &self,
        id: Uuid,
        changes: CompanyChanges,
    ) -> Result<Company, StoreError> {
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET name = COALESCE($2, name),
                website = COALESCE($3, website),
                description = COALESCE($4, description),
                industry = COALESCE($5, industry),
                location = COALESCE($6, location),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.website)
        .bind(changes.description)
        .bind(changes.industry)
        .bind(changes.location)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("company"))
    }

    async fn delete_company(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, "company"))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("company"));
        }
        Ok(())
    }

    // ── job postings ────────────────────────────────────────────────────────

    async fn insert_posting(&self, new: NewJobPosting) -> Result<JobPosting, StoreError> {
        sqlx::query_as::<_, JobPosting>(
            r#"
            INSERT INTO job_postings
                (id, company_id, title, description, location, employment_type,
                 salary_min, salary_max, status, required_skills, posted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    CASE WHEN $9 = 'PUBLISHED' THEN now() END)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.company_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.location)
        .bind(&new.employment_type)
        .bind(new.salary_min)
        .bind(new.salary_max)
        .bind(new.status.as_str())
        .bind(&new.required_skills)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "job posting"))
    }

    async fn posting(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        Ok(
            sqlx::query_as::<_, JobPosting>("SELECT * FROM job_postings WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_postings(
        &self,
        scope: Scope,
        query: &ListQuery<JobStatus>,
    ) -> Result<Vec<JobPosting>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM job_postings WHERE TRUE");
        match scope {
            Scope::Unrestricted => {}
            Scope::Published => {
                qb.push(" AND status = 'PUBLISHED'");
            }
            Scope::Company(company_id) => {
                qb.push(" AND company_id = ").push_bind(company_id);
            }
            Scope::Empty | Scope::Owner(_) => return Ok(Vec::new()),
        }
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(company_id) = query.parent_id {
            qb.push(" AND company_id = ").push_bind(company_id);
        }
        if let Some(search) = &query.search {
            let pattern = like_pattern(search);
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        push_page(&mut qb, query);
        Ok(qb
            .build_query_as::<JobPosting>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_posting(
        &self,
        id: Uuid,
        changes: JobPostingChanges,
    ) -> Result<JobPosting, StoreError> {
        let (expected, next) = match changes.status {
            Some(StatusChange { from, to }) => (Some(from.as_str()), Some(to.as_str())),
            None => (None, None),
        };

        let updated = sqlx::query_as::<_, JobPosting>(
            r#"
            UPDATE job_postings
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                employment_type = COALESCE($5, employment_type),
                salary_min = COALESCE($6, salary_min),
                salary_max = COALESCE($7, salary_max),
                status = COALESCE($8, status),
                required_skills = COALESCE($9, required_skills),
                posted_at = CASE
                    WHEN $8 = 'PUBLISHED' AND posted_at IS NULL THEN now()
                    ELSE posted_at
                END,
                updated_at = now()
            WHERE id = $1 AND ($10::TEXT IS NULL OR status = $10)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.location)
        .bind(changes.employment_type)
        .bind(changes.salary_min)
        .bind(changes.salary_max)
        .bind(next)
        .bind(changes.required_skills)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(posting) => Ok(posting),
            None if self.exists("job_postings", id).await? => {
                Err(StoreError::StaleStatus("job posting"))
            }
            None => Err(StoreError::NotFound("job posting")),
        }
    }

    async fn delete_posting(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM job_postings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, "job posting"))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("job posting"));
        }
        Ok(())
    }

    // ── applications ────────────────────────────────────────────────────────

    async fn insert_application(&self, new: NewApplication) -> Result<Application, StoreError> {
        sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (id, applicant_id, posting_id, status, score, cover_letter)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.applicant_id)
        .bind(new.posting_id)
        .bind(ApplicationStatus::Applied.as_str())
        .bind(new.score)
        .bind(&new.cover_letter)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "application"))
    }

    async fn application(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        Ok(
            sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn active_application(
        &self,
        applicant_id: Uuid,
        posting_id: Uuid,
    ) -> Result<Option<Application>, StoreError> {
        Ok(sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE applicant_id = $1 AND posting_id = $2 AND status <> 'DELETED'
            "#,
        )
        .bind(applicant_id)
        .bind(posting_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_applications(
        &self,
        scope: Scope,
        query: &ListQuery<ApplicationStatus>,
    ) -> Result<Vec<Application>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM applications WHERE TRUE");
        match scope {
            Scope::Unrestricted => {}
            Scope::Owner(applicant_id) => {
                qb.push(" AND status <> 'DELETED' AND applicant_id = ")
                    .push_bind(applicant_id);
            }
            Scope::Company(company_id) => {
                qb.push(
                    " AND status <> 'DELETED' AND posting_id IN \
                     (SELECT id FROM job_postings WHERE company_id = ",
                )
                .push_bind(company_id)
                .push(")");
            }
            Scope::Empty | Scope::Published => return Ok(Vec::new()),
        }
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(posting_id) = query.parent_id {
            qb.push(" AND posting_id = ").push_bind(posting_id);
        }
        if let Some(search) = &query.search {
            qb.push(" AND cover_letter ILIKE ")
                .push_bind(like_pattern(search));
        }
        push_page(&mut qb, query);
        Ok(qb
            .build_query_as::<Application>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_application(
        &self,
        id: Uuid,
        changes: ApplicationChanges,
    ) -> Result<Application, StoreError> {
        let (expected, next) = match changes.status {
            Some(StatusChange { from, to }) => (Some(from.as_str()), Some(to.as_str())),
            None => (None, None),
        };

        let updated = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = COALESCE($2, status),
                score = COALESCE($3, score),
                notes = COALESCE($4, notes),
                updated_at = now()
            WHERE id = $1 AND ($5::TEXT IS NULL OR status = $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(next)
        .bind(changes.score)
        .bind(changes.notes)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(e, "application"))?;

        match updated {
            Some(application) => Ok(application),
            None if self.exists("applications", id).await? => {
                Err(StoreError::StaleStatus("application"))
            }
            None => Err(StoreError::NotFound("application")),
        }
    }

    // ── interviews ──────────────────────────────────────────────────────────

    async fn insert_interview(
        &self,
        new: NewInterview,
        advance: Option<StatusChange<ApplicationStatus>>,
    ) -> Result<Interview, StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(change) = advance {
            let result = sqlx::query(
                r#"
                UPDATE applications SET status = $2, updated_at = now()
                WHERE id = $1 AND status = $3
                "#,
            )
            .bind(new.application_id)
            .bind(change.to.as_str())
            .bind(change.from.as_str())
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::StaleStatus("application"));
            }
        }

        let interview = sqlx::query_as::<_, Interview>(
            r#"
            INSERT INTO interviews
                (id, application_id, interviewer_id, status, scheduled_at, duration_minutes, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.application_id)
        .bind(new.interviewer_id)
        .bind(InterviewStatus::Scheduled.as_str())
        .bind(new.scheduled_at)
        .bind(new.duration_minutes)
        .bind(&new.location)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify(e, "interview"))?;

        tx.commit().await?;
        Ok(interview)
    }

    async fn interview(&self, id: Uuid) -> Result<Option<Interview>, StoreError> {
        Ok(
            sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_interviews(
        &self,
        scope: Scope,
        query: &ListQuery<InterviewStatus>,
    ) -> Result<Vec<Interview>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM interviews WHERE TRUE");
        match scope {
            Scope::Unrestricted => {}
            Scope::Owner(applicant_id) => {
                qb.push(" AND application_id IN (SELECT id FROM applications WHERE applicant_id = ")
                    .push_bind(applicant_id)
                    .push(" AND status <> 'DELETED')");
            }
            Scope::Company(company_id) => {
                qb.push(
                    " AND application_id IN (SELECT a.id FROM applications a \
                     JOIN job_postings p ON p.id = a.posting_id \
                     WHERE a.status <> 'DELETED' AND p.company_id = ",
                )
                .push_bind(company_id)
                .push(")");
            }
            Scope::Empty | Scope::Published => return Ok(Vec::new()),
        }
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(application_id) = query.parent_id {
            qb.push(" AND application_id = ").push_bind(application_id);
        }
        if let Some(search) = &query.search {
            qb.push(" AND location ILIKE ").push_bind(like_pattern(search));
        }
        push_page(&mut qb, query);
        Ok(qb
            .build_query_as::<Interview>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_interview(
        &self,
        id: Uuid,
        changes: InterviewChanges,
    ) -> Result<Interview, StoreError> {
        let (expected, next) = match changes.status {
            Some(StatusChange { from, to }) => (Some(from.as_str()), Some(to.as_str())),
            None => (None, None),
        };

        let updated = sqlx::query_as::<_, Interview>(
            r#"
            UPDATE interviews
            SET status = COALESCE($2, status),
                scheduled_at = COALESCE($3, scheduled_at),
                duration_minutes = COALESCE($4, duration_minutes),
                location = COALESCE($5, location),
                feedback = COALESCE($6, feedback),
                score = COALESCE($7, score),
                updated_at = now()
            WHERE id = $1 AND ($8::TEXT IS NULL OR status = $8)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(next)
        .bind(changes.scheduled_at)
        .bind(changes.duration_minutes)
        .bind(changes.location)
        .bind(changes.feedback)
        .bind(changes.score)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(interview) => Ok(interview),
            None if self.exists("interviews", id).await? => {
                Err(StoreError::StaleStatus("interview"))
            }
            None => Err(StoreError::NotFound("interview")),
        }
    }

    async fn delete_interview(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM interviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("interview"));
        }
        Ok(())
    }

    // ── saved jobs ──────────────────────────────────────────────────────────

    async fn insert_saved_job(
        &self,
        talent_id: Uuid,
        posting_id: Uuid,
    ) -> Result<SavedJob, StoreError> {
        sqlx::query_as::<_, SavedJob>(
            r#"
            INSERT INTO saved_jobs (id, talent_id, posting_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(talent_id)
        .bind(posting_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "saved job"))
    }

    async fn saved_job(&self, id: Uuid) -> Result<Option<SavedJob>, StoreError> {
        Ok(
            sqlx::query_as::<_, SavedJob>("SELECT * FROM saved_jobs WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_saved_jobs(
        &self,
        scope: Scope,
        query: &ListQuery<()>,
    ) -> Result<Vec<SavedJob>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM saved_jobs WHERE TRUE");
        match scope {
            Scope::Unrestricted => {}
            Scope::Owner(talent_id) => {
                qb.push(" AND talent_id = ").push_bind(talent_id);
            }
            Scope::Empty | Scope::Published | Scope::Company(_) => return Ok(Vec::new()),
        }
        if let Some(posting_id) = query.parent_id {
            qb.push(" AND posting_id = ").push_bind(posting_id);
        }
        qb.push(" ORDER BY saved_at DESC, id LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);
        Ok(qb.build_query_as::<SavedJob>().fetch_all(&self.pool).await?)
    }

    async fn delete_saved_job(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM saved_jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("saved job"));
        }
        Ok(())
    }

    // ── talent profiles ─────────────────────────────────────────────────────

    async fn insert_profile(&self, new: NewTalentProfile) -> Result<TalentProfile, StoreError> {
        sqlx::query_as::<_, TalentProfile>(
            r#"
            INSERT INTO talent_profiles
                (id, talent_id, headline, summary, skills, experience_years, resume_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.talent_id)
        .bind(&new.headline)
        .bind(&new.summary)
        .bind(&new.skills)
        .bind(new.experience_years)
        .bind(&new.resume_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "talent profile"))
    }

    async fn profile(&self, id: Uuid) -> Result<Option<TalentProfile>, StoreError> {
        Ok(
            sqlx::query_as::<_, TalentProfile>("SELECT * FROM talent_profiles WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn profile_for_talent(
        &self,
        talent_id: Uuid,
    ) -> Result<Option<TalentProfile>, StoreError> {
        Ok(sqlx::query_as::<_, TalentProfile>(
            "SELECT * FROM talent_profiles WHERE talent_id = $1",
        )
        .bind(talent_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_profiles(
        &self,
        query: &ListQuery<()>,
    ) -> Result<Vec<TalentProfile>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM talent_profiles WHERE TRUE");
        if let Some(search) = &query.search {
            qb.push(" AND (headline ILIKE ")
                .push_bind(like_pattern(search))
                .push(" OR ")
                .push_bind(search.trim().to_lowercase())
                .push(" = ANY(skills))");
        }
        push_page(&mut qb, query);
        Ok(qb
            .build_query_as::<TalentProfile>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: TalentProfileChanges,
    ) -> Result<TalentProfile, StoreError> {
        sqlx::query_as::<_, TalentProfile>(
            r#"
            UPDATE talent_profiles
            SET headline = COALESCE($2, headline),
                summary = COALESCE($3, summary),
                skills = COALESCE($4, skills),
                experience_years = COALESCE($5, experience_years),
                resume_url = COALESCE($6, resume_url),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.headline)
        .bind(changes.summary)
        .bind(changes.skills)
        .bind(changes.experience_years)
        .bind(changes.resume_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("talent profile"))
    }

    async fn delete_profile(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM talent_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("talent profile"));
        }
        Ok(())
    }
}
