use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::lenient;
use crate::models::{Availability, EmploymentType, Gender, LanguageProficiency, WorkMode};

/// Scalar fields of a candidate profile (`candidate_profiles` row).
///
/// The same type carries the incoming `basic_info` payload, where every field
/// is optional and parsed leniently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BasicInfo {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub middle_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub alternate_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_enum")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub nationality: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub linkedin_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub github_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub portfolio_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub website_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub twitter_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub current_company: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub current_salary: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub expected_salary_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub expected_salary_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub salary_currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub notice_period_days: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_enum")]
    pub availability: Option<Availability>,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub available_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_experience_years: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_enum")]
    pub work_mode_preference: Option<WorkMode>,
    #[serde(default, deserialize_with = "lenient::opt_enum")]
    pub preferred_employment_type: Option<EmploymentType>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub willing_to_relocate: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub open_to_work: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub requires_visa_sponsorship: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub visa_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub profile_picture_url: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Repeating sub-entities
//
// Each record struct is both the incoming extracted shape and the column set
// of its table (minus `id`, `candidate_id` and `created_at`).
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkExperience {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient::opt_enum")]
    pub employment_type: Option<EmploymentType>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_current: bool,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::uuid_list")]
    pub skill_ids: Vec<Uuid>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Education {
    #[serde(default, deserialize_with = "lenient::text")]
    pub degree_diploma: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub university_school: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub field_of_study: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_current: bool,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Certificate {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub issuing_authority: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub credential_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub credential_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_current: bool,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub technologies: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub project_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Award {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub offered_by: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub associated_with: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Volunteering {
    #[serde(default, deserialize_with = "lenient::text")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub cause: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_current: bool,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Language {
    #[serde(default, deserialize_with = "lenient::text")]
    pub language: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_native: bool,
    #[serde(default, deserialize_with = "lenient::opt_enum")]
    pub oral_proficiency: Option<LanguageProficiency>,
    #[serde(default, deserialize_with = "lenient::opt_enum")]
    pub written_proficiency: Option<LanguageProficiency>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Accomplishment {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::opt_uuid")]
    pub work_experience_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient::opt_uuid")]
    pub resume_id: Option<Uuid>,
}

// ────────────────────────────────────────────────────────────────────────────
// Skills: global catalog + per-candidate join rows
// ────────────────────────────────────────────────────────────────────────────

/// An extracted skill mention. Not stored as-is: it resolves to a catalog
/// entry plus a `candidate_skills` row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub proficiency: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SkillCatalogEntry {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A candidate's skill joined with the catalog name it references.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CandidateSkillRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub skill_id: Uuid,
    pub skill_name: String,
    pub proficiency: Option<i32>,
    pub description: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCatalogEntry {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidateSkill {
    pub id: Uuid,
    pub skill_id: Uuid,
    pub proficiency: Option<i32>,
    pub description: Option<String>,
    pub source: &'static str,
}
