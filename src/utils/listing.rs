/// Builds an ILIKE pattern matching any record containing `filter` as a
/// substring. An empty filter matches everything. Pattern metacharacters in
/// the filter are escaped so clients cannot inject wildcards.
pub fn like_pattern(filter: &str) -> String {
    let escaped = filter
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Maps the `sortOrder` query parameter to a SQL direction, falling back to
/// ascending for anything other than "desc".
pub fn sort_direction(raw: Option<&str>) -> &'static str {
    match raw {
        Some("desc") => "DESC",
        _ => "ASC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn plain_filter_is_wrapped() {
        assert_eq!(like_pattern("lime"), "%lime%");
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(like_pattern("50%_\\"), "%50\\%\\_\\\\%");
    }

    #[test]
    fn sort_direction_defaults_to_ascending() {
        assert_eq!(sort_direction(None), "ASC");
        assert_eq!(sort_direction(Some("asc")), "ASC");
        assert_eq!(sort_direction(Some("sideways")), "ASC");
    }

    #[test]
    fn sort_direction_descending() {
        assert_eq!(sort_direction(Some("desc")), "DESC");
    }
}
