//! Closed enums for the narrow-valued profile fields.
//!
//! Every enum is stored as TEXT in Postgres and travels as its snake_case
//! string over JSON. Parsing is forgiving about case, hyphens and spaces
//! ("Full-time", "FULL TIME" and "full_time" all parse), but an unknown value
//! is always an error here. The extraction boundary decides what to do with it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Folds a raw enum label to the canonical snake_case spelling used for matching.
fn fold_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' || c == '/' { '_' } else { c })
        .collect()
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $kind:literal {
            $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match fold_label(raw).as_str() {
                    $($text $(| $alias)* => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: raw.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(text.parse()?)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

text_enum! {
    EmploymentType as "employment type" {
        FullTime => "full_time" | "fulltime" | "permanent",
        PartTime => "part_time" | "parttime",
        Contract => "contract" | "contractor",
        Freelance => "freelance" | "freelancer",
        Internship => "internship" | "intern",
        Temporary => "temporary" | "temp",
        SelfEmployed => "self_employed",
        Apprenticeship => "apprenticeship" | "apprentice",
    }
}

text_enum! {
    /// LinkedIn-style proficiency scale used for spoken and written language levels.
    LanguageProficiency as "language proficiency" {
        Elementary => "elementary" | "basic" | "beginner" | "a1" | "a2",
        LimitedWorking => "limited_working" | "intermediate" | "b1",
        ProfessionalWorking => "professional_working" | "professional" | "b2",
        FullProfessional => "full_professional" | "fluent" | "advanced" | "c1",
        NativeBilingual => "native_bilingual" | "native" | "bilingual" | "native_or_bilingual" | "c2",
    }
}

text_enum! {
    WorkMode as "work mode" {
        Remote => "remote",
        Hybrid => "hybrid",
        Onsite => "onsite" | "on_site" | "office" | "in_office",
    }
}

text_enum! {
    Availability as "availability" {
        Immediate => "immediate" | "immediately" | "now",
        TwoWeeks => "two_weeks" | "2_weeks",
        OneMonth => "one_month" | "1_month",
        ThreeMonths => "three_months" | "3_months",
        NotLooking => "not_looking" | "unavailable",
    }
}

text_enum! {
    Gender as "gender" {
        Male => "male",
        Female => "female",
        NonBinary => "non_binary" | "nonbinary",
        Other => "other",
        PreferNotToSay => "prefer_not_to_say",
    }
}
