use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::{self, Display};

use super::AgeGroup;
use crate::prelude::{ForAgeGroup, Real};

/// Clinical severity of infections in one age group. All values are
/// percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityDistributionDatum {
    pub age_group: AgeGroup,
    /// Share of infections that become confirmed cases.
    pub confirmed: Real,
    /// Share of confirmed cases that become severe.
    pub severe: Real,
    /// Share of severe cases that become critical.
    pub critical: Real,
    /// Share of critical cases that die.
    pub fatal: Real,
    /// Share of cases that are isolated and stop transmitting.
    pub isolated: Real,
}

/// Population in one age group, either as a count or as a share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeDistributionDatum {
    pub age_group: AgeGroup,
    pub population: Real,
}

impl ForAgeGroup for SeverityDistributionDatum {
    fn age_group(&self) -> AgeGroup {
        self.age_group
    }
}

impl ForAgeGroup for AgeDistributionDatum {
    fn age_group(&self) -> AgeGroup {
        self.age_group
    }
}

/// A named distribution as stored on disk.
///
/// Standalone files only carry `data`, entries of a bundled collection also
/// carry `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionData<T> {
    #[serde(default)]
    pub name: String,
    pub data: Vec<T>,
}

/// The two kinds of age-stratified datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Severity,
    Age,
}

impl Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Severity => f.write_str("severity distribution"),
            DatasetKind::Age => f.write_str("age distribution"),
        }
    }
}

/// Datum types that can be resolved from a dataset.
pub trait Distribution: ForAgeGroup + DeserializeOwned {
    const KIND: DatasetKind;
}

impl Distribution for SeverityDistributionDatum {
    const KIND: DatasetKind = DatasetKind::Severity;
}

impl Distribution for AgeDistributionDatum {
    const KIND: DatasetKind = DatasetKind::Age;
}
