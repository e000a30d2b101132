use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::extraction::ExtractionError;
use crate::merge::{EntityCounts, EntityKind};
use crate::models::{
    Accomplishment, Award, BasicInfo, Certificate, Education, Language, Project, Skill,
    Volunteering, WorkExperience,
};

/// Structured CV record produced by the extraction step.
///
/// Built with [`ExtractedProfileData::from_value`], which validates the
/// overall shape and parses each array element on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProfileData {
    pub basic_info: BasicInfo,
    pub work_experiences: Vec<WorkExperience>,
    pub educations: Vec<Education>,
    pub certificates: Vec<Certificate>,
    pub projects: Vec<Project>,
    pub skills: Vec<Skill>,
    pub awards: Vec<Award>,
    pub volunteering: Vec<Volunteering>,
    pub languages: Vec<Language>,
    pub accomplishments: Vec<Accomplishment>,
    /// Elements dropped because they were not readable as their entity type.
    #[serde(skip)]
    pub malformed: EntityCounts,
}

fn camel_alias(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::WorkExperience => "workExperiences",
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

/// Alternate spellings of record fields, as `(alias, canonical)`.
fn field_aliases(kind: EntityKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        EntityKind::Education => &[
            ("degree", "degree_diploma"),
            ("university", "university_school"),
            ("school", "university_school"),
        ],
        EntityKind::Certificate => &[("issuer", "issuing_authority")],
        EntityKind::Project => &[("tech_stack", "technologies"), ("url", "project_url")],
        EntityKind::Award => &[("issuer", "offered_by")],
        EntityKind::Volunteering => &[("organization", "institution")],
        EntityKind::Language => &[("name", "language")],
        EntityKind::WorkExperience | EntityKind::Skill | EntityKind::Accomplishment => &[],
    }
}

/// Moves alias keys onto their canonical field. A non-null canonical value
/// always wins; leftover aliases are removed.
fn fold_aliases(item: &mut Value, kind: EntityKind) {
    let Value::Object(fields) = item else {
        return;
    };
    for (alias, canonical) in field_aliases(kind) {
        let Some(value) = fields.remove(*alias) else {
            continue;
        };
        let canonical_missing = fields.get(*canonical).map_or(true, Value::is_null);
        if canonical_missing && !value.is_null() {
            fields.insert((*canonical).to_string(), value);
        }
    }
}

fn take_field(object: &mut Map<String, Value>, names: &[&str]) -> Option<Value> {
    names
        .iter()
        .find_map(|name| object.remove(*name))
        .filter(|value| !value.is_null())
}

impl ExtractedProfileData {
    /// Parses an extraction payload.
    ///
    /// Fails only when the overall shape is wrong. A single unreadable element
    /// is dropped and counted in `malformed` so the rest still merge.
    pub fn from_value(value: Value) -> Result<Self, ExtractionError> {
        let Value::Object(mut object) = value else {
            return Err(ExtractionError::Malformed(
                "payload must be a JSON object".to_string(),
            ));
        };

        let basic_info = match take_field(&mut object, &["basic_info", "basicInfo"]) {
            None => BasicInfo::default(),
            Some(value @ Value::Object(_)) => serde_json::from_value(value).map_err(|e| {
                ExtractionError::Malformed(format!("basic_info is not readable: {e}"))
            })?,
            Some(_) => {
                return Err(ExtractionError::Malformed(
                    "basic_info must be an object".to_string(),
                ))
            }
        };

        let mut data = Self {
            basic_info,
            ..Default::default()
        };
        data.work_experiences = data.parse_list(&mut object, EntityKind::WorkExperience)?;
        data.educations = data.parse_list(&mut object, EntityKind::Education)?;
        data.certificates = data.parse_list(&mut object, EntityKind::Certificate)?;
        data.projects = data.parse_list(&mut object, EntityKind::Project)?;
        data.skills = data.parse_list(&mut object, EntityKind::Skill)?;
        data.awards = data.parse_list(&mut object, EntityKind::Award)?;
        data.volunteering = data.parse_list(&mut object, EntityKind::Volunteering)?;
        data.languages = data.parse_list(&mut object, EntityKind::Language)?;
        data.accomplishments = data.parse_list(&mut object, EntityKind::Accomplishment)?;

        for skill in &mut data.skills {
            skill.proficiency = skill.proficiency.map(|p| p.clamp(0, 100));
        }

        Ok(data)
    }

    fn parse_list<T: DeserializeOwned>(
        &mut self,
        object: &mut Map<String, Value>,
        kind: EntityKind,
    ) -> Result<Vec<T>, ExtractionError> {
        let items = match take_field(object, &[kind.as_str(), camel_alias(kind)]) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ExtractionError::Malformed(format!(
                    "{} must be an array",
                    kind.as_str()
                )))
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, mut item) in items.into_iter().enumerate() {
            fold_aliases(&mut item, kind);
            match serde_json::from_value::<T>(item) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        entity = kind.as_str(),
                        index, "Dropping unreadable extracted record: {e}"
                    );
                    self.malformed.add(kind, 1);
                }
            }
        }
        Ok(records)
    }

    /// Number of sub-entity records carried, readable or not.
    pub fn record_count(&self) -> usize {
        self.work_experiences.len()
            + self.educations.len()
            + self.certificates.len()
            + self.projects.len()
            + self.skills.len()
            + self.awards.len()
            + self.volunteering.len()
            + self.languages.len()
            + self.accomplishments.len()
            + self.malformed.total() as usize
    }
}
