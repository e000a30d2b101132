//! Duplicate Resolver. Decides "new", "duplicate" or "invalid" for each incoming record.
//!
//! Every entity type derives a small set of normalized composite keys from its
//! identifying fields. A record is a duplicate when ANY of its keys is already
//! known, either from the candidate's stored records or from a record accepted
//! earlier in the same call. Keys carry a shape prefix so that two different
//! key shapes can never collide on equal text.

use std::collections::HashSet;
use std::marker::PhantomData;

use crate::merge::normalize::{normalize, normalize_opt};
use crate::merge::synonyms::skill_name_variants;
use crate::models::{
    Accomplishment, Award, CandidateSkillRow, Certificate, Education, Language, Project, Skill,
    Volunteering, WorkExperience,
};

/// The first required identifying field found blank on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingField(pub &'static str);

pub trait MatchKeys {
    /// Normalized duplicate keys, or the missing field that makes the record unmatchable.
    fn match_keys(&self) -> Result<Vec<String>, MissingField>;
}

fn required(value: &str, field: &'static str) -> Result<String, MissingField> {
    let normalized = normalize(value);
    if normalized.is_empty() {
        Err(MissingField(field))
    } else {
        Ok(normalized)
    }
}

fn key(shape: &str, parts: &[&str]) -> String {
    format!("{shape}:{}", parts.join("\u{1f}"))
}

impl MatchKeys for WorkExperience {
    fn match_keys(&self) -> Result<Vec<String>, MissingField> {
        let title = required(&self.title, "title")?;
        let company = required(&self.company, "company")?;
        let mut keys = vec![key("title+company", &[title.as_str(), company.as_str()])];
        if let Some(employment_type) = self.employment_type {
            let employment_type = employment_type.as_str();
            keys.push(key(
                "title+company+type",
                &[title.as_str(), company.as_str(), employment_type],
            ));
            keys.push(key("company+type", &[company.as_str(), employment_type]));
        }
        Ok(keys)
    }
}

impl MatchKeys for Education {
    fn match_keys(&self) -> Result<Vec<String>, MissingField> {
        let degree = required(&self.degree_diploma, "degree_diploma")?;
        let university = required(&self.university_school, "university_school")?;
        let mut keys = vec![
            key("degree+university", &[degree.as_str(), university.as_str()]),
            key("university", &[university.as_str()]),
        ];
        if let Some(field) = normalize_opt(self.field_of_study.as_deref()) {
            keys.push(key("degree+field", &[degree.as_str(), field.as_str()]));
        }
        Ok(keys)
    }
}

impl MatchKeys for Certificate {
    fn match_keys(&self) -> Result<Vec<String>, MissingField> {
        let name = required(&self.name, "name")?;
        let mut keys = vec![key("name", &[name.as_str()])];
        if let Some(authority) = normalize_opt(self.issuing_authority.as_deref()) {
            keys.push(key("name+authority", &[name.as_str(), authority.as_str()]));
        }
        if let Some(credential_id) = normalize_opt(self.credential_id.as_deref()) {
            keys.push(key("credential", &[credential_id.as_str()]));
        }
        Ok(keys)
    }
}

impl MatchKeys for Project {
    fn match_keys(&self) -> Result<Vec<String>, MissingField> {
        let name = required(&self.name, "name")?;
        let mut keys = vec![key("name", &[name.as_str()])];
        if let Some(role) = normalize_opt(self.role.as_deref()) {
            keys.push(key("name+role", &[name.as_str(), role.as_str()]));
        }
        if let Some(tech) = normalize_opt(self.technologies.first().map(String::as_str)) {
            keys.push(key("name+tech", &[name.as_str(), tech.as_str()]));
        }
        Ok(keys)
    }
}

impl MatchKeys for Award {
    fn match_keys(&self) -> Result<Vec<String>, MissingField> {
        let title = required(&self.title, "title")?;
        let offered_by = required(&self.offered_by, "offered_by")?;
        Ok(vec![key("title+offered_by", &[title.as_str(), offered_by.as_str()])])
    }
}

impl MatchKeys for Volunteering {
    fn match_keys(&self) -> Result<Vec<String>, MissingField> {
        let role = required(&self.role, "role")?;
        let institution = required(&self.institution, "institution")?;
        Ok(vec![key("role+institution", &[role.as_str(), institution.as_str()])])
    }
}

impl MatchKeys for Language {
    fn match_keys(&self) -> Result<Vec<String>, MissingField> {
        let language = required(&self.language, "language")?;
        Ok(vec![key("language", &[language.as_str()])])
    }
}

impl MatchKeys for Accomplishment {
    fn match_keys(&self) -> Result<Vec<String>, MissingField> {
        let title = required(&self.title, "title")?;
        let description = required(&self.description, "description")?;
        Ok(vec![key("title+description", &[title.as_str(), description.as_str()])])
    }
}

fn skill_keys(name: &str) -> Result<Vec<String>, MissingField> {
    let name = required(name, "name")?;
    Ok(skill_name_variants(&name)
        .iter()
        .map(|variant| key("skill", &[variant.as_str()]))
        .collect())
}

impl MatchKeys for Skill {
    fn match_keys(&self) -> Result<Vec<String>, MissingField> {
        skill_keys(&self.name)
    }
}

impl MatchKeys for CandidateSkillRow {
    fn match_keys(&self) -> Result<Vec<String>, MissingField> {
        skill_keys(&self.skill_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Not seen before; carries the keys to `accept` once the record is written.
    New(Vec<String>),
    Duplicate,
    Invalid(MissingField),
}

/// Key set for one entity type within one merge call.
#[derive(Debug)]
pub struct DuplicateResolver<T> {
    seen: HashSet<String>,
    _record: PhantomData<fn(&T)>,
}

impl<T: MatchKeys> DuplicateResolver<T> {
    /// Builds the key set from the candidate's stored records. Stored records
    /// with blank identifying fields contribute no keys.
    pub fn seeded<E: MatchKeys>(existing: &[E]) -> Self {
        let seen = existing
            .iter()
            .filter_map(|record| record.match_keys().ok())
            .flatten()
            .collect();
        Self {
            seen,
            _record: PhantomData,
        }
    }

    pub fn resolve(&self, incoming: &T) -> Resolution {
        match incoming.match_keys() {
            Err(missing) => Resolution::Invalid(missing),
            Ok(keys) if keys.iter().any(|k| self.seen.contains(k)) => Resolution::Duplicate,
            Ok(keys) => Resolution::New(keys),
        }
    }

    /// Records keys of a newly written record so later records in the same
    /// batch are matched against it.
    pub fn accept(&mut self, keys: Vec<String>) {
        self.seen.extend(keys);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmploymentType;

    fn work(title: &str, company: &str, employment_type: Option<EmploymentType>) -> WorkExperience {
        WorkExperience {
            title: title.to_string(),
            company: company.to_string(),
            employment_type,
            ..Default::default()
        }
    }

    fn skill(name: &str) -> Skill {
        Skill {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_work_experience_case_and_whitespace_invariant() {
        let existing = vec![work("Senior Engineer", "Acme Corp", Some(EmploymentType::FullTime))];
        let resolver = DuplicateResolver::<WorkExperience>::seeded(&existing);
        let incoming = work("  senior engineer ", "ACME CORP", Some(EmploymentType::FullTime));
        assert_eq!(resolver.resolve(&incoming), Resolution::Duplicate);
    }

    #[test]
    fn test_work_experience_same_company_and_type_is_duplicate() {
        let existing = vec![work("Engineer", "Acme", Some(EmploymentType::Contract))];
        let resolver = DuplicateResolver::<WorkExperience>::seeded(&existing);
        let incoming = work("Staff Engineer", "Acme", Some(EmploymentType::Contract));
        assert_eq!(resolver.resolve(&incoming), Resolution::Duplicate);
    }

    #[test]
    fn test_work_experience_different_company_is_new() {
        let existing = vec![work("Senior Engineer", "Acme Corp", Some(EmploymentType::FullTime))];
        let resolver = DuplicateResolver::<WorkExperience>::seeded(&existing);
        let incoming = work("Developer", "Beta Inc", Some(EmploymentType::FullTime));
        assert!(matches!(resolver.resolve(&incoming), Resolution::New(_)));
    }

    #[test]
    fn test_missing_required_field_is_invalid() {
        let resolver = DuplicateResolver::<WorkExperience>::seeded::<WorkExperience>(&[]);
        assert_eq!(
            resolver.resolve(&work("Engineer", "   ", None)),
            Resolution::Invalid(MissingField("company"))
        );
    }

    #[test]
    fn test_accepted_keys_catch_in_batch_duplicates() {
        let mut resolver = DuplicateResolver::<WorkExperience>::seeded::<WorkExperience>(&[]);
        let record = work("Engineer", "Acme", Some(EmploymentType::FullTime));
        let Resolution::New(keys) = resolver.resolve(&record) else {
            panic!("expected a new record");
        };
        resolver.accept(keys);
        assert_eq!(resolver.resolve(&record), Resolution::Duplicate);
    }

    #[test]
    fn test_education_same_university_is_duplicate() {
        let existing = vec![Education {
            degree_diploma: "BSc".to_string(),
            university_school: "MIT".to_string(),
            ..Default::default()
        }];
        let resolver = DuplicateResolver::<Education>::seeded(&existing);
        let incoming = Education {
            degree_diploma: "MSc".to_string(),
            university_school: " mit ".to_string(),
            ..Default::default()
        };
        assert_eq!(resolver.resolve(&incoming), Resolution::Duplicate);
    }

    #[test]
    fn test_education_degree_and_field_match_across_universities() {
        let existing = vec![Education {
            degree_diploma: "BSc".to_string(),
            university_school: "MIT".to_string(),
            field_of_study: Some("Physics".to_string()),
            ..Default::default()
        }];
        let resolver = DuplicateResolver::<Education>::seeded(&existing);
        let incoming = Education {
            degree_diploma: "bsc".to_string(),
            university_school: "Caltech".to_string(),
            field_of_study: Some("physics".to_string()),
            ..Default::default()
        };
        assert_eq!(resolver.resolve(&incoming), Resolution::Duplicate);
    }

    #[test]
    fn test_certificate_matches_on_credential_id() {
        let existing = vec![Certificate {
            name: "AWS Solutions Architect".to_string(),
            credential_id: Some("ABC-123".to_string()),
            ..Default::default()
        }];
        let resolver = DuplicateResolver::<Certificate>::seeded(&existing);
        let incoming = Certificate {
            name: "AWS SA Associate".to_string(),
            credential_id: Some("abc-123".to_string()),
            ..Default::default()
        };
        assert_eq!(resolver.resolve(&incoming), Resolution::Duplicate);
    }

    #[test]
    fn test_award_requires_both_parts() {
        let resolver = DuplicateResolver::<Award>::seeded::<Award>(&[]);
        let incoming = Award {
            title: "Best Paper".to_string(),
            ..Default::default()
        };
        assert_eq!(
            resolver.resolve(&incoming),
            Resolution::Invalid(MissingField("offered_by"))
        );
    }

    #[test]
    fn test_accomplishment_composite_key() {
        let existing = vec![Accomplishment {
            title: "Migration".to_string(),
            description: "Moved billing to Postgres".to_string(),
            ..Default::default()
        }];
        let resolver = DuplicateResolver::<Accomplishment>::seeded(&existing);
        let same_title = Accomplishment {
            title: "migration".to_string(),
            description: "Moved search to Elastic".to_string(),
            ..Default::default()
        };
        assert!(matches!(resolver.resolve(&same_title), Resolution::New(_)));
    }

    #[test]
    fn test_skill_synonym_is_duplicate_both_ways() {
        let resolver = DuplicateResolver::<Skill>::seeded(&[skill("JavaScript")]);
        assert_eq!(resolver.resolve(&skill("js")), Resolution::Duplicate);

        let resolver = DuplicateResolver::<Skill>::seeded(&[skill("JS")]);
        assert_eq!(resolver.resolve(&skill(" javascript ")), Resolution::Duplicate);
    }

    #[test]
    fn test_key_shapes_do_not_collide() {
        // Without shape prefixes "acme|full_time" would be both a title+company
        // key and a company+type key.
        let existing = vec![work("acme", "full_time", None)];
        let resolver = DuplicateResolver::<WorkExperience>::seeded(&existing);
        let incoming = work("Engineer", "Acme", Some(EmploymentType::FullTime));
        assert!(matches!(resolver.resolve(&incoming), Resolution::New(_)));
    }
}
