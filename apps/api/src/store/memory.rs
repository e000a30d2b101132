//! In-memory profile store for tests.
//!
//! A unit of work operates on a private copy of the state and publishes it
//! wholesale on commit, so anything short of `commit` leaves the shared state
//! untouched. Faults can be injected to exercise the executor's failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::merge::EntityKind;
use crate::models::{
    Accomplishment, Award, BasicInfo, CandidateSkillRow, Certificate, Education, Language,
    NewCandidateSkill, NewCatalogEntry, Project, SkillCatalogEntry, Volunteering, WorkExperience,
};
use crate::store::{ProfileStore, ProfileTx, StoreError};

#[derive(Debug, Clone)]
pub struct Owned<T> {
    pub candidate_id: Uuid,
    pub record: T,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub profiles: HashMap<Uuid, BasicInfo>,
    pub work_experiences: Vec<Owned<WorkExperience>>,
    pub educations: Vec<Owned<Education>>,
    pub certificates: Vec<Owned<Certificate>>,
    pub projects: Vec<Owned<Project>>,
    pub awards: Vec<Owned<Award>>,
    pub volunteering: Vec<Owned<Volunteering>>,
    pub languages: Vec<Owned<Language>>,
    pub accomplishments: Vec<Owned<Accomplishment>>,
    pub catalog: Vec<SkillCatalogEntry>,
    pub candidate_skills: Vec<CandidateSkillRow>,
}

impl MemoryState {
    fn owned_by<T: Clone>(rows: &[Owned<T>], candidate_id: Uuid) -> Vec<T> {
        rows.iter()
            .filter(|row| row.candidate_id == candidate_id)
            .map(|row| row.record.clone())
            .collect()
    }

    pub fn skill_names(&self, candidate_id: Uuid) -> Vec<String> {
        self.candidate_skills
            .iter()
            .filter(|row| row.candidate_id == candidate_id)
            .map(|row| row.skill_name.clone())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum Fault {
    /// The nth create (1-based, per unit of work) of this kind is refused as a bad row.
    RejectCreate { kind: EntityKind, nth: usize },
    /// The nth create of this kind fails as if the database went away.
    BackendDown { kind: EntityKind, nth: usize },
    /// Every write sleeps this long first.
    WriteDelay(Duration),
    /// Catalog inserts report success without writing anything.
    DropCatalogInserts,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Mutex<Vec<Fault>>>,
    begun: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidate(candidate_id: Uuid, info: BasicInfo) -> Self {
        let store = Self::new();
        store.seed(|state| {
            state.profiles.insert(candidate_id, info);
        });
        store
    }

    pub fn seed(&self, f: impl FnOnce(&mut MemoryState)) {
        f(&mut self.state.lock().expect("memory store poisoned"));
    }

    pub fn snapshot(&self) -> MemoryState {
        self.state.lock().expect("memory store poisoned").clone()
    }

    pub fn inject(&self, fault: Fault) {
        self.faults.lock().expect("memory store poisoned").push(fault);
    }

    /// Number of units of work opened so far.
    pub fn units_begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn ProfileTx>, StoreError> {
        self.begun.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryTx {
            shared: Arc::clone(&self.state),
            working: self.snapshot(),
            faults: self.faults.lock().expect("memory store poisoned").clone(),
            attempts: HashMap::new(),
        }))
    }
}

pub struct MemoryTx {
    shared: Arc<Mutex<MemoryState>>,
    working: MemoryState,
    faults: Vec<Fault>,
    attempts: HashMap<EntityKind, usize>,
}

impl MemoryTx {
    async fn before_write(&mut self, kind: Option<EntityKind>) -> Result<(), StoreError> {
        let delay = self.faults.iter().find_map(|fault| match fault {
            Fault::WriteDelay(d) => Some(*d),
            _ => None,
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let Some(kind) = kind else {
            return Ok(());
        };
        let attempt = self.attempts.entry(kind).or_insert(0);
        *attempt += 1;
        let attempt = *attempt;

        for fault in &self.faults {
            match *fault {
                Fault::RejectCreate { kind: k, nth } if k == kind && nth == attempt => {
                    return Err(StoreError::Rejected(format!(
                        "{} #{attempt} violates a constraint",
                        kind.as_str()
                    )));
                }
                Fault::BackendDown { kind: k, nth } if k == kind && nth == attempt => {
                    return Err(StoreError::Backend("connection reset".to_string()));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl MemoryTx {
    async fn push<T: Clone + Send + Sync>(
        &mut self,
        kind: EntityKind,
        table: fn(&mut MemoryState) -> &mut Vec<Owned<T>>,
        candidate_id: Uuid,
        record: &T,
    ) -> Result<(), StoreError> {
        self.before_write(Some(kind)).await?;
        table(&mut self.working).push(Owned {
            candidate_id,
            record: record.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl ProfileTx for MemoryTx {
    async fn lock_basic_info(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Option<BasicInfo>, StoreError> {
        Ok(self.working.profiles.get(&candidate_id).cloned())
    }

    async fn update_basic_info(
        &mut self,
        candidate_id: Uuid,
        info: &BasicInfo,
    ) -> Result<(), StoreError> {
        self.before_write(None).await?;
        self.working.profiles.insert(candidate_id, info.clone());
        Ok(())
    }

    async fn find_work_experiences(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<WorkExperience>, StoreError> {
        Ok(MemoryState::owned_by(&self.working.work_experiences, candidate_id))
    }

    async fn create_work_experience(
        &mut self,
        candidate_id: Uuid,
        record: &WorkExperience,
    ) -> Result<(), StoreError> {
        self.push(EntityKind::WorkExperience, |s| &mut s.work_experiences, candidate_id, record)
            .await
    }

    async fn find_educations(&mut self, candidate_id: Uuid) -> Result<Vec<Education>, StoreError> {
        Ok(MemoryState::owned_by(&self.working.educations, candidate_id))
    }

    async fn create_education(
        &mut self,
        candidate_id: Uuid,
        record: &Education,
    ) -> Result<(), StoreError> {
        self.push(EntityKind::Education, |s| &mut s.educations, candidate_id, record)
            .await
    }

    async fn find_certificates(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<Certificate>, StoreError> {
        Ok(MemoryState::owned_by(&self.working.certificates, candidate_id))
    }

    async fn create_certificate(
        &mut self,
        candidate_id: Uuid,
        record: &Certificate,
    ) -> Result<(), StoreError> {
        self.push(EntityKind::Certificate, |s| &mut s.certificates, candidate_id, record)
            .await
    }

    async fn find_projects(&mut self, candidate_id: Uuid) -> Result<Vec<Project>, StoreError> {
        Ok(MemoryState::owned_by(&self.working.projects, candidate_id))
    }

    async fn create_project(
        &mut self,
        candidate_id: Uuid,
        record: &Project,
    ) -> Result<(), StoreError> {
        self.push(EntityKind::Project, |s| &mut s.projects, candidate_id, record)
            .await
    }

    async fn find_awards(&mut self, candidate_id: Uuid) -> Result<Vec<Award>, StoreError> {
        Ok(MemoryState::owned_by(&self.working.awards, candidate_id))
    }

    async fn create_award(
        &mut self,
        candidate_id: Uuid,
        record: &Award,
    ) -> Result<(), StoreError> {
        self.push(EntityKind::Award, |s| &mut s.awards, candidate_id, record)
            .await
    }

    async fn find_volunteering(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<Volunteering>, StoreError> {
        Ok(MemoryState::owned_by(&self.working.volunteering, candidate_id))
    }

    async fn create_volunteering(
        &mut self,
        candidate_id: Uuid,
        record: &Volunteering,
    ) -> Result<(), StoreError> {
        self.push(EntityKind::Volunteering, |s| &mut s.volunteering, candidate_id, record)
            .await
    }

    async fn find_languages(&mut self, candidate_id: Uuid) -> Result<Vec<Language>, StoreError> {
        Ok(MemoryState::owned_by(&self.working.languages, candidate_id))
    }

    async fn create_language(
        &mut self,
        candidate_id: Uuid,
        record: &Language,
    ) -> Result<(), StoreError> {
        self.push(EntityKind::Language, |s| &mut s.languages, candidate_id, record)
            .await
    }

    async fn find_accomplishments(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<Accomplishment>, StoreError> {
        Ok(MemoryState::owned_by(&self.working.accomplishments, candidate_id))
    }

    async fn create_accomplishment(
        &mut self,
        candidate_id: Uuid,
        record: &Accomplishment,
    ) -> Result<(), StoreError> {
        self.push(EntityKind::Accomplishment, |s| &mut s.accomplishments, candidate_id, record)
            .await
    }

    async fn find_candidate_skills(
        &mut self,
        candidate_id: Uuid,
    ) -> Result<Vec<CandidateSkillRow>, StoreError> {
        Ok(self
            .working
            .candidate_skills
            .iter()
            .filter(|row| row.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    async fn find_catalog_by_normalized_names(
        &mut self,
        names: &[String],
    ) -> Result<Vec<SkillCatalogEntry>, StoreError> {
        Ok(self
            .working
            .catalog
            .iter()
            .filter(|entry| names.contains(&entry.normalized_name))
            .cloned()
            .collect())
    }

    async fn create_catalog_entries_ignoring_conflicts(
        &mut self,
        entries: &[NewCatalogEntry],
    ) -> Result<(), StoreError> {
        self.before_write(None).await?;
        if self
            .faults
            .iter()
            .any(|fault| matches!(fault, Fault::DropCatalogInserts))
        {
            return Ok(());
        }
        for entry in entries {
            let exists = self
                .working
                .catalog
                .iter()
                .any(|known| known.normalized_name == entry.normalized_name);
            if !exists {
                self.working.catalog.push(SkillCatalogEntry {
                    id: entry.id,
                    name: entry.name.clone(),
                    normalized_name: entry.normalized_name.clone(),
                    category: entry.category.clone(),
                    created_at: Utc::now(),
                });
            }
        }
        Ok(())
    }

    async fn create_candidate_skills_ignoring_conflicts(
        &mut self,
        candidate_id: Uuid,
        rows: &[NewCandidateSkill],
    ) -> Result<u64, StoreError> {
        self.before_write(Some(EntityKind::Skill)).await?;
        let mut inserted = 0;
        for row in rows {
            let exists = self
                .working
                .candidate_skills
                .iter()
                .any(|known| known.candidate_id == candidate_id && known.skill_id == row.skill_id);
            if exists {
                continue;
            }
            let skill_name = self
                .working
                .catalog
                .iter()
                .find(|entry| entry.id == row.skill_id)
                .map(|entry| entry.name.clone())
                .ok_or_else(|| StoreError::Rejected(format!("unknown skill {}", row.skill_id)))?;
            self.working.candidate_skills.push(CandidateSkillRow {
                id: row.id,
                candidate_id,
                skill_id: row.skill_id,
                skill_name,
                proficiency: row.proficiency,
                description: row.description.clone(),
                source: row.source.to_string(),
                created_at: Utc::now(),
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx { shared, working, .. } = *self;
        *shared.lock().expect("memory store poisoned") = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work(title: &str) -> WorkExperience {
        WorkExperience {
            title: title.to_string(),
            company: "Acme Corp".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_writes_are_visible_only_after_commit() {
        let id = Uuid::new_v4();
        let store = MemoryStore::with_candidate(id, BasicInfo::default());
        let profiles: &dyn ProfileStore = &store;

        let mut tx = profiles.begin().await.unwrap();
        tx.create_work_experience(id, &work("Engineer")).await.unwrap();
        tx.create_language(
            id,
            &Language {
                language: "French".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(tx.find_work_experiences(id).await.unwrap().len(), 1);
        assert!(store.snapshot().work_experiences.is_empty());

        tx.commit().await.unwrap();
        let state = store.snapshot();
        assert_eq!(state.work_experiences[0].record.title, "Engineer");
        assert_eq!(state.languages.len(), 1);
        assert_eq!(store.units_begun(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let id = Uuid::new_v4();
        let store = MemoryStore::with_candidate(id, BasicInfo::default());

        let mut tx = store.begin().await.unwrap();
        tx.create_award(
            id,
            &Award {
                title: "Best Paper".to_string(),
                offered_by: "ACM".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        tx.rollback().await.unwrap();

        assert!(store.snapshot().awards.is_empty());
    }

    #[tokio::test]
    async fn test_reject_fault_hits_only_the_nth_create() {
        let id = Uuid::new_v4();
        let store = MemoryStore::with_candidate(id, BasicInfo::default());
        store.inject(Fault::RejectCreate {
            kind: EntityKind::WorkExperience,
            nth: 2,
        });

        let mut tx = store.begin().await.unwrap();
        tx.create_work_experience(id, &work("First")).await.unwrap();
        let err = tx.create_work_experience(id, &work("Second")).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        tx.create_work_experience(id, &work("Third")).await.unwrap();
        assert_eq!(tx.find_work_experiences(id).await.unwrap().len(), 2);
    }
}
