//! Hotel search filter normalization.

use super::escape_like;

/// Maximum number of hotels returned by one search.
pub const HOTEL_SEARCH_LIMIT: usize = 100;

/// Wildcard accepted in place of a description or location.
const WILDCARD: &str = "*";

/// Phrase filters applied to a hotel search. `None` means unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotelFilter {
    /// Phrase matched against description and name.
    pub description: Option<String>,
    /// Phrase matched against country, city, state and address.
    pub location: Option<String>,
}

impl HotelFilter {
    /// Build a filter from raw path segments; empty or `*` disables a filter.
    pub fn new(description: &str, location: &str) -> Self {
        Self {
            description: phrase(description),
            location: phrase(location),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.description.is_none() && self.location.is_none()
    }

    /// Case-insensitive phrase match of `field` against `phrase`.
    pub fn phrase_matches(phrase: &str, field: &str) -> bool {
        field.to_lowercase().contains(&phrase.to_lowercase())
    }

    /// `ILIKE` pattern for a phrase: `%phrase%` with wildcards escaped.
    pub fn like_pattern(phrase: &str) -> String {
        format!("%{}%", escape_like(phrase))
    }
}

fn phrase(raw: &str) -> Option<String> {
    if raw.is_empty() || raw == WILDCARD {
        None
    } else {
        Some(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards_and_blanks_disable_filters() {
        assert!(HotelFilter::new("", "").is_unfiltered());
        assert!(HotelFilter::new("*", "*").is_unfiltered());
    }

    #[test]
    fn test_whitespace_is_a_phrase() {
        let filter = HotelFilter::new(" ", "*");
        assert_eq!(filter.description.as_deref(), Some(" "));
        assert_eq!(filter.location, None);

        let filter = HotelFilter::new(" spa ", "");
        assert_eq!(filter.description.as_deref(), Some(" spa "));
    }

    #[test]
    fn test_filters_keep_phrases() {
        let filter = HotelFilter::new("Four star", "London");
        assert_eq!(filter.description.as_deref(), Some("Four star"));
        assert_eq!(filter.location.as_deref(), Some("London"));

        let filter = HotelFilter::new("pool", "*");
        assert_eq!(filter.description.as_deref(), Some("pool"));
        assert_eq!(filter.location, None);
    }

    #[test]
    fn test_phrase_matches_case_insensitively() {
        assert!(HotelFilter::phrase_matches("london", "Central London"));
        assert!(HotelFilter::phrase_matches("FOUR STAR", "A four star hotel"));
        assert!(!HotelFilter::phrase_matches("paris", "London"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(HotelFilter::like_pattern("spa"), "%spa%");
        assert_eq!(HotelFilter::like_pattern("100%"), "%100\\%%");
        assert_eq!(HotelFilter::like_pattern("a_b"), "%a\\_b%");
        assert_eq!(HotelFilter::like_pattern("c:\\"), "%c:\\\\%");
    }
}
