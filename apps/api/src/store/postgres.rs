use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{Connection, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    Accomplishment, Award, BasicInfo, CandidateSkillRow, Certificate, Education, Language,
    NewCandidateSkill, NewCatalogEntry, Project, SkillCatalogEntry, Volunteering, WorkExperience,
};
use crate::store::{ProfileStore, ProfileTx, StoreError};

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        // SQLSTATE class 22 (data exception) and 23 (integrity constraint
        // violation) are about the row, not the connection.
        let record_level = match &e {
            sqlx::Error::Database(db) => db
                .code()
                .is_some_and(|code| code.starts_with("22") || code.starts_with("23")),
            _ => false,
        };
        if record_level {
            StoreError::Rejected(e.to_string())
        } else {
            StoreError::Backend(e.to_string())
        }
    }
}

/// Postgres-backed profile store. Each unit of work is one database transaction.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn begin(&self) -> Result<Box<dyn ProfileTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgProfileTx { tx }))
    }
}

pub struct PgProfileTx {
    tx: Transaction<'static, Postgres>,
}

impl PgProfileTx {
    /// Runs a single-row insert under a savepoint so a refused row rolls back
    /// alone and the surrounding transaction stays usable.
    async fn insert_isolated(
        &mut self,
        query: Query<'_, Postgres, PgArguments>,
    ) -> Result<(), StoreError> {
        let mut savepoint = Connection::begin(&mut *self.tx).await?;
        query.execute(&mut *savepoint).await?;
        savepoint.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileTx for PgProfileTx {
    async fn lock_basic_info(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Option<BasicInfo>, StoreError> {
        Ok(sqlx::query_as::<_, BasicInfo>(
            "SELECT * FROM candidate_profiles WHERE id = $1 FOR UPDATE",
        )
        .bind(candidate_id)
        .fetch_optional(&mut *self.tx)
        .await?)
    }

    async fn update_basic_info(
        &mut self,
        candidate_id: Uuid,
        info: &BasicInfo,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE candidate_profiles SET
                first_name = $2, middle_name = $3, last_name = $4, title = $5, bio = $6,
                email = $7, phone = $8, alternate_phone = $9, date_of_birth = $10,
                gender = $11, nationality = $12, address = $13, city = $14, state = $15,
                country = $16, postal_code = $17, location = $18, linkedin_url = $19,
                github_url = $20, portfolio_url = $21, website_url = $22, twitter_url = $23,
                current_company = $24, current_salary = $25, expected_salary_min = $26,
                expected_salary_max = $27, salary_currency = $28, notice_period_days = $29,
                availability = $30, available_from = $31, total_experience_years = $32,
                work_mode_preference = $33, preferred_employment_type = $34,
                willing_to_relocate = $35, open_to_work = $36,
                requires_visa_sponsorship = $37, visa_status = $38,
                profile_picture_url = $39, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(candidate_id)
        .bind(&info.first_name)
        .bind(&info.middle_name)
        .bind(&info.last_name)
        .bind(&info.title)
        .bind(&info.bio)
        .bind(&info.email)
        .bind(&info.phone)
        .bind(&info.alternate_phone)
        .bind(info.date_of_birth)
        .bind(info.gender)
        .bind(&info.nationality)
        .bind(&info.address)
        .bind(&info.city)
        .bind(&info.state)
        .bind(&info.country)
        .bind(&info.postal_code)
        .bind(&info.location)
        .bind(&info.linkedin_url)
        .bind(&info.github_url)
        .bind(&info.portfolio_url)
        .bind(&info.website_url)
        .bind(&info.twitter_url)
        .bind(&info.current_company)
        .bind(info.current_salary)
        .bind(info.expected_salary_min)
        .bind(info.expected_salary_max)
        .bind(&info.salary_currency)
        .bind(info.notice_period_days)
        .bind(info.availability)
        .bind(info.available_from)
        .bind(info.total_experience_years)
        .bind(info.work_mode_preference)
        .bind(info.preferred_employment_type)
        .bind(info.willing_to_relocate)
        .bind(info.open_to_work)
        .bind(info.requires_visa_sponsorship)
        .bind(&info.visa_status)
        .bind(&info.profile_picture_url)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn find_work_experiences(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<WorkExperience>, StoreError> {
        Ok(sqlx::query_as::<_, WorkExperience>(
            "SELECT * FROM work_experiences WHERE candidate_id = $1 ORDER BY created_at",
        )
        .bind(candidate_id)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn create_work_experience(
        &mut self,
        candidate_id: Uuid,
        record: &WorkExperience,
    ) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO work_experiences
                (id, candidate_id, title, company, employment_type, is_current,
                 start_date, end_date, location, description, skill_ids, media_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(record.title.trim())
        .bind(record.company.trim())
        .bind(record.employment_type)
        .bind(record.is_current)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(&record.location)
        .bind(&record.description)
        .bind(&record.skill_ids)
        .bind(&record.media_url);
        self.insert_isolated(query).await
    }

    async fn find_educations(&mut self, candidate_id: Uuid) -> Result<Vec<Education>, StoreError> {
        Ok(sqlx::query_as::<_, Education>(
            "SELECT * FROM educations WHERE candidate_id = $1 ORDER BY created_at",
        )
        .bind(candidate_id)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn create_education(
        &mut self,
        candidate_id: Uuid,
        record: &Education,
    ) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO educations
                (id, candidate_id, degree_diploma, university_school, field_of_study,
                 is_current, start_date, end_date, grade, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(record.degree_diploma.trim())
        .bind(record.university_school.trim())
        .bind(&record.field_of_study)
        .bind(record.is_current)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(&record.grade)
        .bind(&record.description);
        self.insert_isolated(query).await
    }

    async fn find_certificates(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<Certificate>, StoreError> {
        Ok(sqlx::query_as::<_, Certificate>(
            "SELECT * FROM certificates WHERE candidate_id = $1 ORDER BY created_at",
        )
        .bind(candidate_id)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn create_certificate(
        &mut self,
        candidate_id: Uuid,
        record: &Certificate,
    ) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO certificates
                (id, candidate_id, name, issuing_authority, issue_date, expiry_date,
                 credential_id, credential_url, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(record.name.trim())
        .bind(&record.issuing_authority)
        .bind(record.issue_date)
        .bind(record.expiry_date)
        .bind(&record.credential_id)
        .bind(&record.credential_url)
        .bind(&record.description);
        self.insert_isolated(query).await
    }

    async fn find_projects(&mut self, candidate_id: Uuid) -> Result<Vec<Project>, StoreError> {
        Ok(sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE candidate_id = $1 ORDER BY created_at",
        )
        .bind(candidate_id)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn create_project(
        &mut self,
        candidate_id: Uuid,
        record: &Project,
    ) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO projects
                (id, candidate_id, name, description, is_current, start_date, end_date,
                 role, technologies, project_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(record.name.trim())
        .bind(&record.description)
        .bind(record.is_current)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(&record.role)
        .bind(&record.technologies)
        .bind(&record.project_url);
        self.insert_isolated(query).await
    }

    async fn find_awards(&mut self, candidate_id: Uuid) -> Result<Vec<Award>, StoreError> {
        Ok(sqlx::query_as::<_, Award>(
            "SELECT * FROM awards WHERE candidate_id = $1 ORDER BY created_at",
        )
        .bind(candidate_id)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn create_award(&mut self, candidate_id: Uuid, record: &Award) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO awards
                (id, candidate_id, title, offered_by, associated_with, date, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(record.title.trim())
        .bind(record.offered_by.trim())
        .bind(&record.associated_with)
        .bind(record.date)
        .bind(&record.description);
        self.insert_isolated(query).await
    }

    async fn find_volunteering(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<Volunteering>, StoreError> {
        Ok(sqlx::query_as::<_, Volunteering>(
            "SELECT * FROM volunteering WHERE candidate_id = $1 ORDER BY created_at",
        )
        .bind(candidate_id)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn create_volunteering(
        &mut self,
        candidate_id: Uuid,
        record: &Volunteering,
    ) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO volunteering
                (id, candidate_id, role, institution, cause, is_current,
                 start_date, end_date, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(record.role.trim())
        .bind(record.institution.trim())
        .bind(&record.cause)
        .bind(record.is_current)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(&record.description);
        self.insert_isolated(query).await
    }

    async fn find_languages(&mut self, candidate_id: Uuid) -> Result<Vec<Language>, StoreError> {
        Ok(sqlx::query_as::<_, Language>(
            "SELECT * FROM languages WHERE candidate_id = $1 ORDER BY created_at",
        )
        .bind(candidate_id)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn create_language(
        &mut self,
        candidate_id: Uuid,
        record: &Language,
    ) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO languages
                (id, candidate_id, language, is_native, oral_proficiency, written_proficiency)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(record.language.trim())
        .bind(record.is_native)
        .bind(record.oral_proficiency)
        .bind(record.written_proficiency);
        self.insert_isolated(query).await
    }

    async fn find_accomplishments(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<Accomplishment>, StoreError> {
        Ok(sqlx::query_as::<_, Accomplishment>(
            "SELECT * FROM accomplishments WHERE candidate_id = $1 ORDER BY created_at",
        )
        .bind(candidate_id)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn create_accomplishment(
        &mut self,
        candidate_id: Uuid,
        record: &Accomplishment,
    ) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO accomplishments
                (id, candidate_id, title, description, work_experience_id, resume_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(record.title.trim())
        .bind(record.description.trim())
        .bind(record.work_experience_id)
        .bind(record.resume_id);
        self.insert_isolated(query).await
    }

    async fn find_candidate_skills(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<CandidateSkillRow>, StoreError> {
        Ok(sqlx::query_as::<_, CandidateSkillRow>(
            r#"
            SELECT cs.id, cs.candidate_id, cs.skill_id, s.name AS skill_name,
                   cs.proficiency, cs.description, cs.source, cs.created_at
            FROM candidate_skills cs
            JOIN skills s ON s.id = cs.skill_id
            WHERE cs.candidate_id = $1
            ORDER BY cs.created_at
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn find_catalog_by_normalized_names(
        &mut self,
        names: &[String],
    ) -> Result<Vec<SkillCatalogEntry>, StoreError> {
        Ok(sqlx::query_as::<_, SkillCatalogEntry>(
            "SELECT * FROM skills WHERE normalized_name = ANY($1)",
        )
        .bind(names)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn create_catalog_entries_ignoring_conflicts(
        &mut self,
        entries: &[NewCatalogEntry],
    ) -> Result<(), StoreError> {
        if entries.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        let normalized: Vec<&str> = entries.iter().map(|e| e.normalized_name.as_str()).collect();
        let categories: Vec<Option<&str>> = entries.iter().map(|e| e.category.as_deref()).collect();

        let inserted = sqlx::query(
            r#"
            INSERT INTO skills (id, name, normalized_name, category)
            SELECT * FROM UNNEST($1::uuid[], $2::text[], $3::text[], $4::text[])
            ON CONFLICT (normalized_name) DO NOTHING
            "#,
        )
        .bind(&ids)
        .bind(&names)
        .bind(&normalized)
        .bind(&categories)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        debug!(
            "Skill catalog: {inserted} of {} entries inserted",
            entries.len()
        );
        Ok(())
    }

    async fn create_candidate_skills_ignoring_conflicts(
        &mut self,
        candidate_id: Uuid,
        rows: &[NewCandidateSkill],
    ) -> Result<u64, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let skill_ids: Vec<Uuid> = rows.iter().map(|r| r.skill_id).collect();
        let proficiencies: Vec<Option<i32>> = rows.iter().map(|r| r.proficiency).collect();
        let descriptions: Vec<Option<&str>> =
            rows.iter().map(|r| r.description.as_deref()).collect();
        let sources: Vec<&str> = rows.iter().map(|r| r.source).collect();

        let inserted = sqlx::query(
            r#"
            INSERT INTO candidate_skills
                (id, candidate_id, skill_id, proficiency, description, source)
            SELECT t.id, $1, t.skill_id, t.proficiency, t.description, t.source
            FROM UNNEST($2::uuid[], $3::uuid[], $4::int4[], $5::text[], $6::text[])
                AS t(id, skill_id, proficiency, description, source)
            ON CONFLICT (candidate_id, skill_id) DO NOTHING
            "#,
        )
        .bind(candidate_id)
        .bind(&ids)
        .bind(&skill_ids)
        .bind(&proficiencies)
        .bind(&descriptions)
        .bind(&sources)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        Ok(inserted)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
