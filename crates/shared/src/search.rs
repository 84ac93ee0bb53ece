//! Case-insensitive substring search used by list views and the
//! recommendation catalogue.

/// Normalizes a search term: trims it and lowercases it.
///
/// Returns `None` for a blank term, meaning "match everything".
pub fn normalize_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Returns true if `haystack` contains the already-normalized `needle`.
pub fn contains_term(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Returns true if any of `fields` contains the term.
///
/// A blank or missing term matches every record.
pub fn matches_any<'a, I>(term: Option<&str>, fields: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    match normalize_term(term) {
        None => true,
        Some(needle) => fields.into_iter().any(|f| contains_term(f, &needle)),
    }
}
