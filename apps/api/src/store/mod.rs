// Store collaborator: find/create access to a candidate's profile, scoped to
// one explicit unit of work.
//
// A `ProfileStore` hands out one `ProfileTx` per merge call. Nothing written
// through a `ProfileTx` is visible to anyone else until `commit`; dropping it
// (error, timeout, cancellation) discards every write.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Accomplishment, Award, BasicInfo, CandidateSkillRow, Certificate, Education, Language,
    NewCandidateSkill, NewCatalogEntry, Project, SkillCatalogEntry, Volunteering, WorkExperience,
};

pub use postgres::PgProfileStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused this one record (constraint or data error). The
    /// unit of work is still usable.
    #[error("Record rejected by store: {0}")]
    Rejected(String),

    /// Connectivity, pool or protocol failure. The unit of work is lost.
    #[error("Store unavailable: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Opens a unit of work.
    async fn begin(&self) -> Result<Box<dyn ProfileTx>, StoreError>;
}

/// One open unit of work against the profile store.
///
/// `create_*` methods write a single record each and report a refused row as
/// `StoreError::Rejected` without poisoning the unit of work. Bulk skill
/// writes ignore conflicts on their unique keys.
#[async_trait]
pub trait ProfileTx: Send {
    /// Reads the candidate's scalar fields and holds the profile for the rest
    /// of the unit of work, serializing overlapping merges for one candidate.
    async fn lock_basic_info(&mut self, candidate_id: Uuid)
        -> Result<Option<BasicInfo>, StoreError>;
    async fn update_basic_info(
        &mut self,
        candidate_id: Uuid,
        info: &BasicInfo,
    ) -> Result<(), StoreError>;

    async fn find_work_experiences(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<WorkExperience>, StoreError>;
    async fn create_work_experience(
        &mut self,
        candidate_id: Uuid,
        record: &WorkExperience,
    ) -> Result<(), StoreError>;

    async fn find_educations(&mut self, candidate_id: Uuid) -> Result<Vec<Education>, StoreError>;
    async fn create_education(
        &mut self,
        candidate_id: Uuid,
        record: &Education,
    ) -> Result<(), StoreError>;

    async fn find_certificates(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<Certificate>, StoreError>;
    async fn create_certificate(
        &mut self,
        candidate_id: Uuid,
        record: &Certificate,
    ) -> Result<(), StoreError>;

    async fn find_projects(&mut self, candidate_id: Uuid) -> Result<Vec<Project>, StoreError>;
    async fn create_project(&mut self, candidate_id: Uuid, record: &Project)
        -> Result<(), StoreError>;

    async fn find_awards(&mut self, candidate_id: Uuid) -> Result<Vec<Award>, StoreError>;
    async fn create_award(&mut self, candidate_id: Uuid, record: &Award) -> Result<(), StoreError>;

    async fn find_volunteering(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<Volunteering>, StoreError>;
    async fn create_volunteering(
        &mut self,
        candidate_id: Uuid,
        record: &Volunteering,
    ) -> Result<(), StoreError>;

    async fn find_languages(&mut self, candidate_id: Uuid) -> Result<Vec<Language>, StoreError>;
    async fn create_language(
        &mut self,
        candidate_id: Uuid,
        record: &Language,
    ) -> Result<(), StoreError>;

    async fn find_accomplishments(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<Accomplishment>, StoreError>;
    async fn create_accomplishment(
        &mut self,
        candidate_id: Uuid,
        record: &Accomplishment,
    ) -> Result<(), StoreError>;

    /// The candidate's skills, each joined with its catalog name.
    async fn find_candidate_skills(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<CandidateSkillRow>, StoreError>;
    async fn find_catalog_by_normalized_names(
        &mut self,
        names: &[String],
    ) -> Result<Vec<SkillCatalogEntry>, StoreError>;
    /// Inserts catalog entries, silently skipping names another writer already added.
    async fn create_catalog_entries_ignoring_conflicts(
        &mut self,
        entries: &[NewCatalogEntry],
    ) -> Result<(), StoreError>;
    /// Inserts join rows, skipping ones that already exist. Returns the number inserted.
    async fn create_candidate_skills_ignoring_conflicts(
        &mut self,
        candidate_id: Uuid,
        rows: &[NewCandidateSkill],
    ) -> Result<u64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
