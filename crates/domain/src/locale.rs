//! Supported analysis locales.

use crate::errors::InvalidValue;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Languages the analysis pipeline can produce feedback in.
///
/// A closed set: unknown codes are rejected at the boundary rather than
/// carried around as raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    /// English
    En,
    /// Spanish
    Es,
}

impl Locale {
    /// Every supported locale.
    pub fn all() -> &'static [Locale] {
        &[Self::En, Self::Es]
    }

    /// The ISO 639-1 codes of every supported locale.
    pub fn codes() -> &'static [&'static str] {
        &["en", "es"]
    }

    /// The ISO 639-1 code for this locale.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    /// Parse an ISO 639-1 code, rejecting unsupported ones.
    pub fn parse(code: &str) -> Result<Self, InvalidValue> {
        match code {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            other => Err(InvalidValue::UnsupportedLocale {
                code: other.to_string(),
                supported: Self::codes(),
            }),
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::En
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_codes() {
        assert_eq!(Locale::parse("en").unwrap(), Locale::En);
        assert_eq!(Locale::parse("es").unwrap(), Locale::Es);
    }

    #[test]
    fn test_parse_rejects_unknown_codes() {
        assert!(Locale::parse("fr").is_err());
        assert!(Locale::parse("EN").is_err());
        assert!(Locale::parse("").is_err());
    }

    #[test]
    fn test_default_is_english() {
        assert_eq!(Locale::default(), Locale::En);
    }

    #[test]
    fn test_roundtrip_through_code() {
        for locale in Locale::all() {
            assert_eq!(Locale::parse(locale.as_str()).unwrap(), *locale);
        }
    }
}
