//! Abbreviation equivalences applied to skill names only.

/// Bidirectional pairs, both sides already normalized.
const SKILL_SYNONYMS: &[(&str, &str)] = &[
    ("javascript", "js"),
    ("typescript", "ts"),
    ("reactjs", "react"),
    ("nodejs", "node"),
    ("expressjs", "express"),
    ("mongodb", "mongo"),
    ("postgresql", "postgres"),
    ("sql server", "mssql"),
];

/// Returns the normalized skill name followed by every known synonym of it.
pub fn skill_name_variants(normalized: &str) -> Vec<String> {
    let mut variants = vec![normalized.to_string()];
    for &(long, short) in SKILL_SYNONYMS {
        if normalized == long {
            variants.push(short.to_string());
        } else if normalized == short {
            variants.push(long.to_string());
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pair_is_symmetric() {
        for &(long, short) in SKILL_SYNONYMS {
            assert!(skill_name_variants(long).contains(&short.to_string()));
            assert!(skill_name_variants(short).contains(&long.to_string()));
        }
    }

    #[test]
    fn test_unknown_name_has_no_synonyms() {
        assert_eq!(skill_name_variants("rust"), vec!["rust".to_string()]);
    }

    #[test]
    fn test_multi_word_entry() {
        assert_eq!(
            skill_name_variants("mssql"),
            vec!["mssql".to_string(), "sql server".to_string()]
        );
    }
}
