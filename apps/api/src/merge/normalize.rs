/// Canonical form of a matching-key string: surrounding whitespace removed, lower-cased.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalizes an optional field; blank values are treated as absent.
pub fn normalize_opt(raw: Option<&str>) -> Option<String> {
    raw.map(normalize).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_lowercases() {
        assert_eq!(normalize("  Senior Engineer \n"), "senior engineer");
        assert_eq!(normalize("ACME Corp"), "acme corp");
    }

    #[test]
    fn test_inner_whitespace_is_kept() {
        assert_eq!(normalize("Sql  Server"), "sql  server");
    }

    #[test]
    fn test_blank_optional_is_absent() {
        assert_eq!(normalize_opt(Some("   ")), None);
        assert_eq!(normalize_opt(None), None);
        assert_eq!(normalize_opt(Some(" Rust ")), Some("rust".to_string()));
    }
}
