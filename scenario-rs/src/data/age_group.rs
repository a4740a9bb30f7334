use serde::{Deserialize, Serialize};
use std::{
    convert::TryFrom,
    fmt::{self, Display},
    str::FromStr,
};

/// Age brackets of 10 years, with a single open bracket for 80+.
///
/// The declaration order is the canonical order of every age-indexed table in
/// this crate: distributions are sorted by it and row indices of the editor
/// map to age groups through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "0-9")]
    Age0To9,
    #[serde(rename = "10-19")]
    Age10To19,
    #[serde(rename = "20-29")]
    Age20To29,
    #[serde(rename = "30-39")]
    Age30To39,
    #[serde(rename = "40-49")]
    Age40To49,
    #[serde(rename = "50-59")]
    Age50To59,
    #[serde(rename = "60-69")]
    Age60To69,
    #[serde(rename = "70-79")]
    Age70To79,
    #[serde(rename = "80+")]
    Age80Plus,
}

impl AgeGroup {
    /// Number of age groups.
    pub const COUNT: usize = 9;

    /// All age groups in canonical order.
    pub const ALL: [AgeGroup; AgeGroup::COUNT] = [
        AgeGroup::Age0To9,
        AgeGroup::Age10To19,
        AgeGroup::Age20To29,
        AgeGroup::Age30To39,
        AgeGroup::Age40To49,
        AgeGroup::Age50To59,
        AgeGroup::Age60To69,
        AgeGroup::Age70To79,
        AgeGroup::Age80Plus,
    ];

    /// Return the n-th age group or None if n is out of range.
    pub fn from_index(n: usize) -> Option<AgeGroup> {
        AgeGroup::ALL.get(n).copied()
    }

    /// Position of the age group in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Age0To9 => "0-9",
            AgeGroup::Age10To19 => "10-19",
            AgeGroup::Age20To29 => "20-29",
            AgeGroup::Age30To39 => "30-39",
            AgeGroup::Age40To49 => "40-49",
            AgeGroup::Age50To59 => "50-59",
            AgeGroup::Age60To69 => "60-69",
            AgeGroup::Age70To79 => "70-79",
            AgeGroup::Age80Plus => "80+",
        }
    }
}

impl Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeGroup {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeGroup::ALL
            .iter()
            .find(|g| g.label() == s)
            .copied()
            .ok_or("unknown age group")
    }
}

impl TryFrom<usize> for AgeGroup {
    type Error = &'static str;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        AgeGroup::from_index(n).ok_or("invalid index for age group")
    }
}
