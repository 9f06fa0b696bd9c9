//! Analysis categories.
//!
//! A [`Category`] is a tagged value: either a free-form general domain
//! label ("fintech", "devtools") or one of the closed hackathon
//! competition tracks. Callers branch on the tag with pattern matching,
//! never on raw string comparison, so a typo'd label cannot silently
//! match nothing.

use crate::errors::InvalidValue;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Competition tracks for hackathon project analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HackathonTrack {
    /// AI / machine learning
    Ai,
    /// Web applications
    Web,
    /// Mobile applications
    Mobile,
    /// Blockchain / web3
    Blockchain,
    /// Games
    Gaming,
    /// Social / community
    Social,
    /// Open track (no theme restriction)
    Open,
}

impl HackathonTrack {
    /// Every competition track.
    pub fn all() -> &'static [HackathonTrack] {
        &[
            Self::Ai,
            Self::Web,
            Self::Mobile,
            Self::Blockchain,
            Self::Gaming,
            Self::Social,
            Self::Open,
        ]
    }

    /// The wire codes of every track.
    pub fn codes() -> &'static [&'static str] {
        &[
            "ai",
            "web",
            "mobile",
            "blockchain",
            "gaming",
            "social",
            "open",
        ]
    }

    /// The wire code for this track.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Web => "web",
            Self::Mobile => "mobile",
            Self::Blockchain => "blockchain",
            Self::Gaming => "gaming",
            Self::Social => "social",
            Self::Open => "open",
        }
    }

    /// Parse a wire code, rejecting anything outside the closed set.
    pub fn parse(code: &str) -> Result<Self, InvalidValue> {
        match code {
            "ai" => Ok(Self::Ai),
            "web" => Ok(Self::Web),
            "mobile" => Ok(Self::Mobile),
            "blockchain" => Ok(Self::Blockchain),
            "gaming" => Ok(Self::Gaming),
            "social" => Ok(Self::Social),
            "open" => Ok(Self::Open),
            other => Err(InvalidValue::unknown_track(other)),
        }
    }
}

impl Display for HackathonTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged category value: general domain label or hackathon track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Category {
    /// Free-form domain label for a general idea
    General {
        /// Non-empty label, e.g. "fintech"
        name: String,
    },
    /// Closed competition track for a hackathon project
    Hackathon {
        /// The competition track
        track: HackathonTrack,
    },
}

impl Category {
    /// Build a general category; the name must not be blank.
    pub fn general(name: impl Into<String>) -> Result<Self, InvalidValue> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InvalidValue::EmptyCategoryName);
        }
        Ok(Self::General { name })
    }

    /// Build a hackathon-track category.
    pub fn hackathon(track: HackathonTrack) -> Self {
        Self::Hackathon { track }
    }

    /// Whether this category carries the hackathon tag.
    pub fn is_hackathon(&self) -> bool {
        matches!(self, Self::Hackathon { .. })
    }

    /// Human-readable label for either variant.
    pub fn label(&self) -> &str {
        match self {
            Self::General { name } => name,
            Self::Hackathon { track } => track.as_str(),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_rejects_blank_names() {
        assert!(Category::general("").is_err());
        assert!(Category::general("   ").is_err());
        assert!(Category::general("fintech").is_ok());
    }

    #[test]
    fn test_tag_discrimination() {
        let general = Category::general("fintech").unwrap();
        let hackathon = Category::hackathon(HackathonTrack::Ai);
        assert!(!general.is_hackathon());
        assert!(hackathon.is_hackathon());
    }

    #[test]
    fn test_track_parse_roundtrip() {
        for track in HackathonTrack::all() {
            assert_eq!(HackathonTrack::parse(track.as_str()).unwrap(), *track);
        }
        assert!(HackathonTrack::parse("robotics").is_err());
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(
            Category::general("fintech").unwrap(),
            Category::general("fintech").unwrap()
        );
        assert_ne!(
            Category::hackathon(HackathonTrack::Web),
            Category::hackathon(HackathonTrack::Mobile)
        );
    }

    #[test]
    fn test_serialization_carries_the_tag() {
        let json =
            serde_json::to_value(Category::hackathon(HackathonTrack::Gaming)).unwrap();
        assert_eq!(json["kind"], "hackathon");
        assert_eq!(json["track"], "gaming");

        let json = serde_json::to_value(Category::general("fintech").unwrap()).unwrap();
        assert_eq!(json["kind"], "general");
        assert_eq!(json["name"], "fintech");
    }
}
