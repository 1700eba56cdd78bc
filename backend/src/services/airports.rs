//! Airport search key classification.

use super::escape_like;

/// How an airport search key is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AirportQuery {
    /// Three-letter FAA code, upper-cased.
    Faa(String),
    /// Four-letter ICAO code, upper-cased.
    Icao(String),
    /// Case-insensitive airport name prefix, lower-cased.
    NamePrefix(String),
}

impl AirportQuery {
    /// Classify a raw search key.
    ///
    /// Keys written in a single case are treated as codes when their length
    /// matches a code format. Everything else is a name prefix.
    pub fn classify(search_key: &str) -> Self {
        let same_case =
            search_key.to_uppercase() == search_key || search_key.to_lowercase() == search_key;

        match search_key.chars().count() {
            3 if same_case => Self::Faa(search_key.to_uppercase()),
            4 if same_case => Self::Icao(search_key.to_uppercase()),
            _ => Self::NamePrefix(search_key.to_lowercase()),
        }
    }

    /// The bound query parameter.
    pub fn param(&self) -> &str {
        match self {
            Self::Faa(code) | Self::Icao(code) => code,
            Self::NamePrefix(prefix) => prefix,
        }
    }

    /// Whether an airport with these fields satisfies the query.
    pub fn matches(&self, faa: Option<&str>, icao: Option<&str>, airportname: &str) -> bool {
        match self {
            Self::Faa(code) => faa == Some(code.as_str()),
            Self::Icao(code) => icao == Some(code.as_str()),
            Self::NamePrefix(prefix) => airportname.to_lowercase().starts_with(prefix.as_str()),
        }
    }

    /// `LIKE` pattern for a name prefix: `prefix%` with wildcards escaped.
    pub fn prefix_pattern(&self) -> Option<String> {
        match self {
            Self::NamePrefix(prefix) => Some(format!("{}%", escape_like(prefix))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_letters_are_faa() {
        assert_eq!(AirportQuery::classify("SFO"), AirportQuery::Faa("SFO".into()));
        assert_eq!(AirportQuery::classify("sfo"), AirportQuery::Faa("SFO".into()));
    }

    #[test]
    fn test_four_letters_are_icao() {
        assert_eq!(
            AirportQuery::classify("KSFO"),
            AirportQuery::Icao("KSFO".into())
        );
        assert_eq!(
            AirportQuery::classify("ksfo"),
            AirportQuery::Icao("KSFO".into())
        );
    }

    #[test]
    fn test_mixed_case_is_name_prefix() {
        assert_eq!(
            AirportQuery::classify("Sfo"),
            AirportQuery::NamePrefix("sfo".into())
        );
        assert_eq!(
            AirportQuery::classify("Heat"),
            AirportQuery::NamePrefix("heat".into())
        );
    }

    #[test]
    fn test_other_lengths_are_name_prefix() {
        assert_eq!(
            AirportQuery::classify("san francisco"),
            AirportQuery::NamePrefix("san francisco".into())
        );
        assert_eq!(AirportQuery::classify(""), AirportQuery::NamePrefix("".into()));
        assert_eq!(
            AirportQuery::classify("LA"),
            AirportQuery::NamePrefix("la".into())
        );
    }

    #[test]
    fn test_param_returns_bound_value() {
        assert_eq!(AirportQuery::classify("lax").param(), "LAX");
        assert_eq!(AirportQuery::classify("Los").param(), "los");
    }

    #[test]
    fn test_matches() {
        let faa = AirportQuery::classify("sfo");
        assert!(faa.matches(Some("SFO"), Some("KSFO"), "San Francisco Intl"));
        assert!(!faa.matches(None, Some("KSFO"), "San Francisco Intl"));

        let icao = AirportQuery::classify("KSMO");
        assert!(icao.matches(None, Some("KSMO"), "Santa Monica Municipal"));

        let prefix = AirportQuery::classify("San");
        assert!(prefix.matches(None, None, "San Francisco Intl"));
        assert!(prefix.matches(None, None, "SANTA MONICA"));
        assert!(!prefix.matches(None, None, "Los Angeles Intl"));
    }

    #[test]
    fn test_prefix_pattern() {
        assert_eq!(
            AirportQuery::classify("San F").prefix_pattern().as_deref(),
            Some("san f%")
        );
        assert_eq!(
            AirportQuery::classify("o'h_r").prefix_pattern().as_deref(),
            Some("o'h\\_r%")
        );
        assert_eq!(AirportQuery::classify("LAX").prefix_pattern(), None);
    }
}
