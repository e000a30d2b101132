// Profile data model: the candidate aggregate, its sub-entities and the
// closed enums used by both stored rows and extracted payloads.

pub mod enums;
pub mod lenient;
pub mod profile;

pub use enums::{Availability, EmploymentType, Gender, LanguageProficiency, WorkMode};
pub use profile::{
    Accomplishment, Award, BasicInfo, CandidateSkillRow, Certificate, Education, Language,
    NewCandidateSkill, NewCatalogEntry, Project, Skill, SkillCatalogEntry, Volunteering,
    WorkExperience,
};
