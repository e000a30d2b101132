//! Basic-Info Fill Resolver: selective fill of the scalar profile fields.
//!
//! A stored field is written only when it is currently empty. Every updatable
//! field is declared once in `BASIC_INFO_FIELDS`; nothing is inferred from
//! whichever keys happen to be present on the incoming payload.

use chrono::NaiveDate;

use crate::models::{Availability, BasicInfo, EmploymentType, Gender, WorkMode};

/// Decides whether a present value still counts as "not filled in".
trait Fillable: Clone {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Fillable for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Fillable for f64 {}
impl Fillable for i32 {}
impl Fillable for bool {}
impl Fillable for NaiveDate {}
impl Fillable for Gender {}
impl Fillable for Availability {}
impl Fillable for WorkMode {}
impl Fillable for EmploymentType {}

fn fill_slot<T: Fillable>(stored: &mut Option<T>, incoming: &Option<T>) -> bool {
    let Some(value) = incoming.as_ref().filter(|v| !v.is_blank()) else {
        return false;
    };
    if stored.as_ref().is_some_and(|v| !v.is_blank()) {
        return false;
    }
    *stored = Some(value.clone());
    true
}

/// One updatable scalar field: its column name and how to fill it.
pub struct BasicInfoField {
    pub name: &'static str,
    fill: fn(&mut BasicInfo, &BasicInfo) -> bool,
}

macro_rules! basic_info_fields {
    ($($field:ident),+ $(,)?) => {
        pub const BASIC_INFO_FIELDS: &[BasicInfoField] = &[
            $(BasicInfoField {
                name: stringify!($field),
                fill: |stored: &mut BasicInfo, incoming: &BasicInfo| {
                    fill_slot(&mut stored.$field, &incoming.$field)
                },
            }),+
        ];
    };
}

basic_info_fields![
    first_name,
    middle_name,
    last_name,
    title,
    bio,
    email,
    phone,
    alternate_phone,
    date_of_birth,
    gender,
    nationality,
    address,
    city,
    state,
    country,
    postal_code,
    location,
    linkedin_url,
    github_url,
    portfolio_url,
    website_url,
    twitter_url,
    current_company,
    current_salary,
    expected_salary_min,
    expected_salary_max,
    salary_currency,
    notice_period_days,
    availability,
    available_from,
    total_experience_years,
    work_mode_preference,
    preferred_employment_type,
    willing_to_relocate,
    open_to_work,
    requires_visa_sponsorship,
    visa_status,
    profile_picture_url,
];

#[derive(Debug, Clone)]
pub struct BasicInfoFill {
    /// Stored values with the empty fields filled in.
    pub merged: BasicInfo,
    /// Names of the fields actually written, in table order.
    pub written: Vec<&'static str>,
}

impl BasicInfoFill {
    pub fn updated(&self) -> bool {
        !self.written.is_empty()
    }
}

pub fn resolve_basic_info_fill(stored: &BasicInfo, incoming: &BasicInfo) -> BasicInfoFill {
    let mut merged = stored.clone();
    let written = BASIC_INFO_FIELDS
        .iter()
        .filter(|field| (field.fill)(&mut merged, incoming))
        .map(|field| field.name)
        .collect();
    BasicInfoFill { merged, written }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_only_empty_fields() {
        let stored = BasicInfo {
            first_name: Some("Ada".to_string()),
            bio: None,
            city: Some("   ".to_string()),
            ..Default::default()
        };
        let incoming = BasicInfo {
            first_name: Some("Augusta".to_string()),
            bio: Some("hello".to_string()),
            city: Some("London".to_string()),
            ..Default::default()
        };

        let fill = resolve_basic_info_fill(&stored, &incoming);

        assert!(fill.updated());
        assert_eq!(fill.written, vec!["bio", "city"]);
        assert_eq!(fill.merged.first_name.as_deref(), Some("Ada"));
        assert_eq!(fill.merged.bio.as_deref(), Some("hello"));
        assert_eq!(fill.merged.city.as_deref(), Some("London"));
    }

    #[test]
    fn test_blank_incoming_never_writes() {
        let incoming = BasicInfo {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        let fill = resolve_basic_info_fill(&BasicInfo::default(), &incoming);
        assert!(!fill.updated());
        assert_eq!(fill.merged, BasicInfo::default());
    }

    #[test]
    fn test_false_flag_counts_as_filled() {
        let stored = BasicInfo {
            open_to_work: Some(false),
            ..Default::default()
        };
        let incoming = BasicInfo {
            open_to_work: Some(true),
            willing_to_relocate: Some(false),
            ..Default::default()
        };
        let fill = resolve_basic_info_fill(&stored, &incoming);
        assert_eq!(fill.merged.open_to_work, Some(false));
        assert_eq!(fill.merged.willing_to_relocate, Some(false));
        assert_eq!(fill.written, vec!["willing_to_relocate"]);
    }

    #[test]
    fn test_typed_fields_fill_when_absent() {
        let incoming = BasicInfo {
            expected_salary_min: Some(90000.0),
            notice_period_days: Some(30),
            work_mode_preference: Some(WorkMode::Hybrid),
            available_from: NaiveDate::from_ymd_opt(2026, 1, 5),
            ..Default::default()
        };
        let fill = resolve_basic_info_fill(&BasicInfo::default(), &incoming);
        assert_eq!(
            fill.written,
            vec![
                "expected_salary_min",
                "notice_period_days",
                "available_from",
                "work_mode_preference"
            ]
        );
    }

    #[test]
    fn test_every_field_is_declared_once() {
        let mut names: Vec<_> = BASIC_INFO_FIELDS.iter().map(|f| f.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 38);
    }
}
