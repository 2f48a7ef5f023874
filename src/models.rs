//! Shared models and types for the event catalog
//!
//! Enumerations used by several components live here
//! to avoid circular dependencies between stores and the query engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event category (fixed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Cultural,
    Professional,
    Academic,
    Social,
    Sports,
    Service,
    Arts,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 7] = [
        Category::Cultural,
        Category::Professional,
        Category::Academic,
        Category::Social,
        Category::Sports,
        Category::Service,
        Category::Arts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cultural => "Cultural",
            Category::Professional => "Professional",
            Category::Academic => "Academic",
            Category::Social => "Social",
            Category::Sports => "Sports",
            Category::Service => "Service",
            Category::Arts => "Arts",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Cultural
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    /// Exact, case-sensitive match on the display name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("category", s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who an event is open to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Eligibility {
    #[serde(rename = "All Students")]
    AllStudents,
    Freshmen,
    Sophomores,
    Juniors,
    Seniors,
    #[serde(rename = "Grad Students")]
    GradStudents,
    #[serde(rename = "Specific Majors")]
    SpecificMajors,
}

impl Eligibility {
    pub const ALL: [Eligibility; 7] = [
        Eligibility::AllStudents,
        Eligibility::Freshmen,
        Eligibility::Sophomores,
        Eligibility::Juniors,
        Eligibility::Seniors,
        Eligibility::GradStudents,
        Eligibility::SpecificMajors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Eligibility::AllStudents => "All Students",
            Eligibility::Freshmen => "Freshmen",
            Eligibility::Sophomores => "Sophomores",
            Eligibility::Juniors => "Juniors",
            Eligibility::Seniors => "Seniors",
            Eligibility::GradStudents => "Grad Students",
            Eligibility::SpecificMajors => "Specific Majors",
        }
    }
}

impl Default for Eligibility {
    fn default() -> Self {
        Self::AllStudents
    }
}

impl FromStr for Eligibility {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Eligibility::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("eligibility", s))
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance confidence label of an event
///
/// `Community` has no creation path yet; it is kept so stored data and
/// filters can name it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VerificationTier {
    Official,
    #[serde(rename = "Student Posted")]
    StudentPosted,
    Community,
}

impl VerificationTier {
    pub const ALL: [VerificationTier; 3] = [
        VerificationTier::Official,
        VerificationTier::StudentPosted,
        VerificationTier::Community,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationTier::Official => "Official",
            VerificationTier::StudentPosted => "Student Posted",
            VerificationTier::Community => "Community",
        }
    }
}

impl fmt::Display for VerificationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Student,
    Club,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Student => f.write_str("student"),
            AccountKind::Club => f.write_str("club"),
        }
    }
}

/// Selected presentation view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Calendar,
    List,
    Insights,
}

/// A single toggleable filter value; the variant names its dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dimension", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    Category(Category),
    Verification(VerificationTier),
    Eligibility(Eligibility),
}

/// Unrecognized enum text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
