//! Merge Executor: applies one ExtractedProfileData to a stored profile.
//!
//! # Unit of work
//! The whole merge runs inside one store transaction bounded by a wall-clock
//! budget. Basic info and all nine entity types commit together or not at all.
//!
//! # Record failures
//! A record the store refuses individually (`StoreError::Rejected`) is rolled
//! back on its own, counted in `failed`, and the merge continues. Its keys are
//! not accepted, so a later identical record gets its own attempt. Anything
//! else (backend failure, a failed skill batch, the basic-info update, the
//! budget running out) aborts the unit of work.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::extraction::ExtractedProfileData;
use crate::merge::basic_info::resolve_basic_info_fill;
use crate::merge::normalize::normalize;
use crate::merge::resolver::{DuplicateResolver, MatchKeys, MissingField, Resolution};
use crate::merge::result::{EntityKind, MergeResult, MergeTally};
use crate::merge::synonyms::skill_name_variants;
use crate::models::{
    Accomplishment, Award, Certificate, Education, Language, NewCandidateSkill, NewCatalogEntry,
    Project, Skill, SkillCatalogEntry, Volunteering, WorkExperience,
};
use crate::store::{ProfileStore, ProfileTx, StoreError};

/// `candidate_skills.source` for rows written by a merge.
pub const CV_IMPORT_SOURCE: &str = "cv_import";

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Candidate profile {0} not found")]
    CandidateNotFound(Uuid),

    #[error("Merge exceeded its {}s budget", .0.as_secs())]
    Timeout(Duration),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Merges `data` into the candidate's profile and returns what changed.
///
/// Either every resolved write commits, or the store is left exactly as it
/// was. Dropping the in-flight transaction on timeout rolls it back.
pub async fn merge_profile(
    store: &dyn ProfileStore,
    candidate_id: Uuid,
    data: &ExtractedProfileData,
    budget: Duration,
) -> Result<MergeResult, MergeError> {
    let started = Instant::now();
    info!(
        %candidate_id,
        records = data.record_count(),
        "Starting profile merge"
    );

    let outcome = match tokio::time::timeout(budget, run_merge(store, candidate_id, data)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(MergeError::Timeout(budget)),
    };

    match &outcome {
        Ok(result) => info!(
            %candidate_id,
            basic_info_updated = result.basic_info_updated,
            created = result.total_new(),
            duplicates = result.skipped_duplicates.total(),
            invalid = result.skipped_invalid.total(),
            failed = result.failed.total(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Profile merge committed"
        ),
        Err(e) => error!(
            %candidate_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Profile merge aborted, nothing written: {e}"
        ),
    }
    outcome
}

async fn run_merge(
    store: &dyn ProfileStore,
    candidate_id: Uuid,
    data: &ExtractedProfileData,
) -> Result<MergeResult, MergeError> {
    let mut tx = store.begin().await?;
    match apply(tx.as_mut(), candidate_id, data).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(%candidate_id, "Rollback after failed merge also failed: {rollback_err}");
            }
            Err(e)
        }
    }
}

async fn apply(
    tx: &mut dyn ProfileTx,
    candidate_id: Uuid,
    data: &ExtractedProfileData,
) -> Result<MergeResult, MergeError> {
    let stored = tx
        .lock_basic_info(candidate_id)
        .await?
        .ok_or(MergeError::CandidateNotFound(candidate_id))?;

    let mut tally = MergeTally::with_invalid(data.malformed);

    let fill = resolve_basic_info_fill(&stored, &data.basic_info);
    if fill.updated() {
        tx.update_basic_info(candidate_id, &fill.merged).await?;
        debug!(%candidate_id, fields = ?fill.written, "Filled empty basic info fields");
    }
    tally.basic_info(fill.written);

    merge_entities(&mut *tx, candidate_id, &data.work_experiences, &mut tally).await?;
    merge_entities(&mut *tx, candidate_id, &data.educations, &mut tally).await?;
    merge_entities(&mut *tx, candidate_id, &data.certificates, &mut tally).await?;
    merge_entities(&mut *tx, candidate_id, &data.projects, &mut tally).await?;
    merge_skills(&mut *tx, candidate_id, &data.skills, &mut tally).await?;
    merge_entities(&mut *tx, candidate_id, &data.awards, &mut tally).await?;
    merge_entities(&mut *tx, candidate_id, &data.volunteering, &mut tally).await?;
    merge_entities(&mut *tx, candidate_id, &data.languages, &mut tally).await?;
    merge_entities(&mut *tx, candidate_id, &data.accomplishments, &mut tally).await?;

    Ok(tally.finish())
}

/// A sub-entity created one record at a time.
#[async_trait]
trait MergeEntity: MatchKeys + Send + Sync + Sized {
    const KIND: EntityKind;

    async fn find_existing(
        tx: &mut dyn ProfileTx,
        candidate_id: Uuid,
    ) -> Result<Vec<Self>, StoreError>;

    async fn create(
        tx: &mut dyn ProfileTx,
        candidate_id: Uuid,
        record: &Self,
    ) -> Result<(), StoreError>;
}

macro_rules! merge_entity {
    ($ty:ty, $kind:expr, $find:ident, $create:ident $(,)?) => {
        #[async_trait]
        impl MergeEntity for $ty {
            const KIND: EntityKind = $kind;

            async fn find_existing(
                tx: &mut dyn ProfileTx,
                candidate_id: Uuid,
            ) -> Result<Vec<Self>, StoreError> {
                tx.$find(candidate_id).await
            }

            async fn create(
                tx: &mut dyn ProfileTx,
                candidate_id: Uuid,
                record: &Self,
            ) -> Result<(), StoreError> {
                tx.$create(candidate_id, record).await
            }
        }
    };
}

merge_entity!(
    WorkExperience,
    EntityKind::WorkExperience,
    find_work_experiences,
    create_work_experience,
);
merge_entity!(Education, EntityKind::Education, find_educations, create_education);
merge_entity!(Certificate, EntityKind::Certificate, find_certificates, create_certificate);
merge_entity!(Project, EntityKind::Project, find_projects, create_project);
merge_entity!(Award, EntityKind::Award, find_awards, create_award);
merge_entity!(Volunteering, EntityKind::Volunteering, find_volunteering, create_volunteering);
merge_entity!(Language, EntityKind::Language, find_languages, create_language);
merge_entity!(
    Accomplishment,
    EntityKind::Accomplishment,
    find_accomplishments,
    create_accomplishment,
);

fn skip_invalid(
    kind: EntityKind,
    index: usize,
    MissingField(field): MissingField,
    tally: &mut MergeTally,
) {
    warn!(
        entity = kind.as_str(),
        index,
        field,
        "Skipping extracted record without identifying field"
    );
    tally.invalid(kind);
}

async fn merge_entities<E: MergeEntity>(
    tx: &mut dyn ProfileTx,
    candidate_id: Uuid,
    incoming: &[E],
    tally: &mut MergeTally,
) -> Result<(), StoreError> {
    if incoming.is_empty() {
        return Ok(());
    }

    let existing = E::find_existing(&mut *tx, candidate_id).await?;
    let mut resolver = DuplicateResolver::<E>::seeded(&existing);

    for (index, record) in incoming.iter().enumerate() {
        match resolver.resolve(record) {
            Resolution::Invalid(missing) => skip_invalid(E::KIND, index, missing, tally),
            Resolution::Duplicate => {
                debug!(entity = E::KIND.as_str(), index, "Skipping duplicate record");
                tally.duplicate(E::KIND, 1);
            }
            Resolution::New(keys) => match E::create(&mut *tx, candidate_id, record).await {
                Ok(()) => {
                    resolver.accept(keys);
                    tally.created(E::KIND, 1);
                }
                Err(StoreError::Rejected(reason)) => {
                    warn!(entity = E::KIND.as_str(), index, "Store rejected record: {reason}");
                    tally.failed(E::KIND);
                }
                Err(e) => return Err(e),
            },
        }
    }
    Ok(())
}

/// Skills resolve against the candidate's catalog-backed skills, then write in
/// two batches: missing catalog entries first, then the join rows.
async fn merge_skills(
    tx: &mut dyn ProfileTx,
    candidate_id: Uuid,
    incoming: &[Skill],
    tally: &mut MergeTally,
) -> Result<(), StoreError> {
    if incoming.is_empty() {
        return Ok(());
    }

    let existing = tx.find_candidate_skills(candidate_id).await?;
    let mut resolver = DuplicateResolver::<Skill>::seeded(&existing);

    let mut pending: Vec<&Skill> = Vec::new();
    for (index, skill) in incoming.iter().enumerate() {
        match resolver.resolve(skill) {
            Resolution::Invalid(missing) => skip_invalid(EntityKind::Skill, index, missing, tally),
            Resolution::Duplicate => {
                debug!(entity = "skills", index, name = %skill.name, "Skipping duplicate skill");
                tally.duplicate(EntityKind::Skill, 1);
            }
            Resolution::New(keys) => {
                resolver.accept(keys);
                pending.push(skill);
            }
        }
    }
    if pending.is_empty() {
        return Ok(());
    }

    let catalog = resolve_catalog(&mut *tx, &pending).await?;

    let mut rows = Vec::with_capacity(pending.len());
    for skill in &pending {
        let Some(entry) = catalog.get(&normalize(&skill.name)) else {
            warn!(name = %skill.name, "Skill has no catalog entry after insert");
            tally.failed(EntityKind::Skill);
            continue;
        };
        rows.push(NewCandidateSkill {
            id: Uuid::new_v4(),
            skill_id: entry.id,
            proficiency: skill.proficiency,
            description: skill.description.clone(),
            source: CV_IMPORT_SOURCE,
        });
    }
    if rows.is_empty() {
        return Ok(());
    }

    let inserted = tx
        .create_candidate_skills_ignoring_conflicts(candidate_id, &rows)
        .await? as u32;
    let attempted = rows.len() as u32;
    tally.created(EntityKind::Skill, inserted);
    // Rows lost to a concurrent insert already exist for this candidate.
    tally.duplicate(EntityKind::Skill, attempted.saturating_sub(inserted));
    Ok(())
}

/// Maps each pending skill's normalized name to a catalog entry, creating the
/// entries nobody has added yet. An existing entry under a synonym is reused.
async fn resolve_catalog(
    tx: &mut dyn ProfileTx,
    pending: &[&Skill],
) -> Result<HashMap<String, SkillCatalogEntry>, StoreError> {
    let mut lookup: Vec<String> = pending
        .iter()
        .flat_map(|skill| skill_name_variants(&normalize(&skill.name)))
        .collect();
    lookup.sort();
    lookup.dedup();

    let known: HashMap<String, SkillCatalogEntry> = tx
        .find_catalog_by_normalized_names(&lookup)
        .await?
        .into_iter()
        .map(|entry| (entry.normalized_name.clone(), entry))
        .collect();

    let mut resolved = HashMap::new();
    let mut missing = Vec::new();
    for skill in pending {
        let name = normalize(&skill.name);
        // The exact spelling wins over a synonym.
        let found = skill_name_variants(&name)
            .iter()
            .filter_map(|variant| known.get(variant))
            .min_by_key(|entry| entry.normalized_name != name)
            .cloned();
        match found {
            Some(entry) => {
                resolved.insert(name, entry);
            }
            None => missing.push(NewCatalogEntry {
                id: Uuid::new_v4(),
                name: skill.name.trim().to_string(),
                normalized_name: name,
                category: skill.category.clone(),
            }),
        }
    }

    if !missing.is_empty() {
        tx.create_catalog_entries_ignoring_conflicts(&missing).await?;
        let names: Vec<String> = missing.iter().map(|e| e.normalized_name.clone()).collect();
        // Re-read: a concurrent merge may have won the insert with its own id.
        for entry in tx.find_catalog_by_normalized_names(&names).await? {
            resolved.insert(entry.normalized_name.clone(), entry);
        }
    }
    Ok(resolved)
}
