use serde::{Deserialize, Serialize};

/// The nine repeating sub-entity types a merge reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    WorkExperience,
    Education,
    Certificate,
    Project,
    Skill,
    Award,
    Volunteering,
    Language,
    Accomplishment,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::WorkExperience,
        EntityKind::Education,
        EntityKind::Certificate,
        EntityKind::Project,
        EntityKind::Skill,
        EntityKind::Award,
        EntityKind::Volunteering,
        EntityKind::Language,
        EntityKind::Accomplishment,
    ];

    /// Collection name, as used in payloads and `MergeResult` counters.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::WorkExperience => "work_experiences",
            EntityKind::Education => "educations",
            EntityKind::Certificate => "certificates",
            EntityKind::Project => "projects",
            EntityKind::Skill => "skills",
            EntityKind::Award => "awards",
            EntityKind::Volunteering => "volunteering",
            EntityKind::Language => "languages",
            EntityKind::Accomplishment => "accomplishments",
        }
    }
}

/// One counter per entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub work_experiences: u32,
    pub educations: u32,
    pub certificates: u32,
    pub projects: u32,
    pub skills: u32,
    pub awards: u32,
    pub volunteering: u32,
    pub languages: u32,
    pub accomplishments: u32,
}

impl EntityCounts {
    fn slot_mut(&mut self, kind: EntityKind) -> &mut u32 {
        match kind {
            EntityKind::WorkExperience => &mut self.work_experiences,
            EntityKind::Education => &mut self.educations,
            EntityKind::Certificate => &mut self.certificates,
            EntityKind::Project => &mut self.projects,
            EntityKind::Skill => &mut self.skills,
            EntityKind::Award => &mut self.awards,
            EntityKind::Volunteering => &mut self.volunteering,
            EntityKind::Language => &mut self.languages,
            EntityKind::Accomplishment => &mut self.accomplishments,
        }
    }

    pub fn get(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::WorkExperience => self.work_experiences,
            EntityKind::Education => self.educations,
            EntityKind::Certificate => self.certificates,
            EntityKind::Project => self.projects,
            EntityKind::Skill => self.skills,
            EntityKind::Award => self.awards,
            EntityKind::Volunteering => self.volunteering,
            EntityKind::Language => self.languages,
            EntityKind::Accomplishment => self.accomplishments,
        }
    }

    pub fn add(&mut self, kind: EntityKind, n: u32) {
        *self.slot_mut(kind) += n;
    }

    pub fn total(&self) -> u32 {
        EntityKind::ALL.iter().map(|&kind| self.get(kind)).sum()
    }
}

/// Outcome of one merge call. The only externally observable result besides
/// the store mutation itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeResult {
    pub basic_info_updated: bool,
    pub basic_info_fields: Vec<String>,
    pub new_work_experiences: u32,
    pub new_educations: u32,
    pub new_certificates: u32,
    pub new_projects: u32,
    pub new_skills: u32,
    pub new_awards: u32,
    pub new_volunteering: u32,
    pub new_languages: u32,
    pub new_accomplishments: u32,
    pub skipped_duplicates: EntityCounts,
    /// Records dropped for a blank identifying field or an unreadable shape.
    pub skipped_invalid: EntityCounts,
    /// Records the store refused individually; the rest of the merge committed.
    pub failed: EntityCounts,
}

impl MergeResult {
    pub fn new_count(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::WorkExperience => self.new_work_experiences,
            EntityKind::Education => self.new_educations,
            EntityKind::Certificate => self.new_certificates,
            EntityKind::Project => self.new_projects,
            EntityKind::Skill => self.new_skills,
            EntityKind::Award => self.new_awards,
            EntityKind::Volunteering => self.new_volunteering,
            EntityKind::Language => self.new_languages,
            EntityKind::Accomplishment => self.new_accomplishments,
        }
    }

    pub fn total_new(&self) -> u32 {
        EntityKind::ALL.iter().map(|&kind| self.new_count(kind)).sum()
    }
}

/// Result Aggregator: accumulates outcomes while a merge runs.
#[derive(Debug, Default)]
pub struct MergeTally {
    created: EntityCounts,
    duplicates: EntityCounts,
    invalid: EntityCounts,
    failed: EntityCounts,
    basic_info_fields: Vec<&'static str>,
}

impl MergeTally {
    /// Starts from the records already dropped while parsing the payload.
    pub fn with_invalid(invalid: EntityCounts) -> Self {
        Self {
            invalid,
            ..Default::default()
        }
    }

    pub fn created(&mut self, kind: EntityKind, n: u32) {
        self.created.add(kind, n);
    }

    pub fn duplicate(&mut self, kind: EntityKind, n: u32) {
        self.duplicates.add(kind, n);
    }

    pub fn invalid(&mut self, kind: EntityKind) {
        self.invalid.add(kind, 1);
    }

    pub fn failed(&mut self, kind: EntityKind) {
        self.failed.add(kind, 1);
    }

    pub fn basic_info(&mut self, written: Vec<&'static str>) {
        self.basic_info_fields = written;
    }

    pub fn finish(self) -> MergeResult {
        let created = self.created;
        MergeResult {
            basic_info_updated: !self.basic_info_fields.is_empty(),
            basic_info_fields: self
                .basic_info_fields
                .into_iter()
                .map(str::to_string)
                .collect(),
            new_work_experiences: created.work_experiences,
            new_educations: created.educations,
            new_certificates: created.certificates,
            new_projects: created.projects,
            new_skills: created.skills,
            new_awards: created.awards,
            new_volunteering: created.volunteering,
            new_languages: created.languages,
            new_accomplishments: created.accomplishments,
            skipped_duplicates: self.duplicates,
            skipped_invalid: self.invalid,
            failed: self.failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_maps_every_kind() {
        let mut tally = MergeTally::default();
        for (i, kind) in EntityKind::ALL.into_iter().enumerate() {
            tally.created(kind, i as u32 + 1);
            tally.duplicate(kind, 1);
        }
        let result = tally.finish();
        for (i, kind) in EntityKind::ALL.into_iter().enumerate() {
            assert_eq!(result.new_count(kind), i as u32 + 1, "{}", kind.as_str());
            assert_eq!(result.skipped_duplicates.get(kind), 1);
        }
        assert_eq!(result.total_new(), 45);
        assert!(!result.basic_info_updated);
    }

    #[test]
    fn test_basic_info_flag_follows_written_fields() {
        let mut tally = MergeTally::default();
        tally.basic_info(vec!["bio"]);
        let result = tally.finish();
        assert!(result.basic_info_updated);
        assert_eq!(result.basic_info_fields, vec!["bio".to_string()]);
    }

    #[test]
    fn test_serialized_shape() {
        let mut tally = MergeTally::default();
        tally.created(EntityKind::WorkExperience, 1);
        tally.duplicate(EntityKind::WorkExperience, 1);
        let json = serde_json::to_value(tally.finish()).unwrap();
        assert_eq!(json["new_work_experiences"], 1);
        assert_eq!(json["skipped_duplicates"]["work_experiences"], 1);
        assert_eq!(json["basic_info_updated"], false);
    }
}
