// Career Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Career identifier (catalog primary key, e.g. "software-engineer")
pub type CareerId = String;

/// Seniority band of a career entry.
///
/// Stored as a single-letter code: Entry, Intermediate, Advanced, eXpert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CareerLevel {
    #[serde(rename = "E")]
    Entry,
    #[serde(rename = "I")]
    Intermediate,
    #[serde(rename = "A")]
    Advanced,
    #[serde(rename = "X")]
    Expert,
}

impl CareerLevel {
    pub fn as_code(&self) -> &'static str {
        match self {
            CareerLevel::Entry => "E",
            CareerLevel::Intermediate => "I",
            CareerLevel::Advanced => "A",
            CareerLevel::Expert => "X",
        }
    }

    /// Magnitude multiplier applied to level-sensitive metrics (growth, salary)
    pub fn multiplier(&self) -> f64 {
        match self {
            CareerLevel::Entry => 0.8,
            CareerLevel::Intermediate => 1.0,
            CareerLevel::Advanced => 1.2,
            CareerLevel::Expert => 1.4,
        }
    }

    pub fn is_senior(&self) -> bool {
        matches!(self, CareerLevel::Advanced | CareerLevel::Expert)
    }
}

impl fmt::Display for CareerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for CareerLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "E" | "ENTRY" => Ok(CareerLevel::Entry),
            "I" | "INTERMEDIATE" => Ok(CareerLevel::Intermediate),
            "A" | "ADVANCED" => Ok(CareerLevel::Advanced),
            "X" | "EXPERT" => Ok(CareerLevel::Expert),
            other => Err(DomainError::UnknownLevel(other.to_string())),
        }
    }
}

/// Catalog entry that trend refreshes are computed for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Career {
    pub id: CareerId,
    pub title: String,
    pub industry: String,
    pub level: CareerLevel,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl Career {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        industry: impl Into<String>,
        level: CareerLevel,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            industry: industry.into(),
            level,
            skills: Vec::new(),
            description: String::new(),
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Reject entries that cannot be keyed or bucketed
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "career id must not be empty".to_string(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(DomainError::ValidationError(format!(
                "career {} has an empty title",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_codes_round_trip_through_from_str() {
        for level in [
            CareerLevel::Entry,
            CareerLevel::Intermediate,
            CareerLevel::Advanced,
            CareerLevel::Expert,
        ] {
            assert_eq!(level.as_code().parse::<CareerLevel>().unwrap(), level);
        }
        assert!("Z".parse::<CareerLevel>().is_err());
    }

    #[test]
    fn test_level_serializes_as_single_letter() {
        let career = Career::new("ai-engineer", "AI Engineer", "tech", CareerLevel::Intermediate);
        let json = serde_json::to_value(&career).unwrap();
        assert_eq!(json["level"], "I");
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let career = Career::new(" ", "AI Engineer", "tech", CareerLevel::Entry);
        assert!(career.validate().is_err());
    }
}
