use getset::{CopyGetters, Getters};
use paste::paste;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    data::{AgeDistributionDatum, AgeGroup, SeverityDistributionDatum},
    prelude::{ForAgeGroup, Real, TOTAL_FATAL_SCALE},
};

/// Fatal cases as a percentage of all infections.
///
/// This is pure arithmetic on the four severity percentages; rounding for
/// display is left to the caller.
pub fn total_fatal(confirmed: Real, severe: Real, critical: Real, fatal: Real) -> Real {
    confirmed * severe * critical * fatal * TOTAL_FATAL_SCALE
}

/// A stored row of the age group table: the severity and age data of one age
/// group. Derived columns are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroupRecord {
    #[getset(get = "pub")]
    id: String,
    #[getset(get_copy = "pub")]
    age_group: AgeGroup,
    #[getset(get_copy = "pub")]
    population: Real,
    #[getset(get_copy = "pub")]
    confirmed: Real,
    #[getset(get_copy = "pub")]
    severe: Real,
    #[getset(get_copy = "pub")]
    critical: Real,
    #[getset(get_copy = "pub")]
    fatal: Real,
    #[getset(get_copy = "pub")]
    isolated: Real,
}

impl AgeGroupRecord {
    /// Join the severity and age data of the same age group.
    pub fn join(severity: &SeverityDistributionDatum, age: &AgeDistributionDatum) -> Self {
        debug_assert_eq!(severity.age_group, age.age_group);
        AgeGroupRecord {
            id: severity.age_group.to_string(),
            age_group: severity.age_group,
            population: age.population,
            confirmed: severity.confirmed,
            severe: severity.severe,
            critical: severity.critical,
            fatal: severity.fatal,
            isolated: severity.isolated,
        }
    }

    /// Return the view of this record, with derived columns computed from the
    /// current values.
    pub fn to_row(&self) -> AgeGroupRow {
        AgeGroupRow {
            id: self.id.clone(),
            age_group: self.age_group,
            population: self.population,
            confirmed: self.confirmed,
            severe: self.severe,
            critical: self.critical,
            fatal: self.fatal,
            total_fatal: total_fatal(self.confirmed, self.severe, self.critical, self.fatal),
            isolated: self.isolated,
        }
    }

    pub fn severity(&self) -> SeverityDistributionDatum {
        SeverityDistributionDatum {
            age_group: self.age_group,
            confirmed: self.confirmed,
            severe: self.severe,
            critical: self.critical,
            fatal: self.fatal,
            isolated: self.isolated,
        }
    }

    pub fn age(&self) -> AgeDistributionDatum {
        AgeDistributionDatum {
            age_group: self.age_group,
            population: self.population,
        }
    }
}

/// Copy only the stored columns of a view row.
impl From<&AgeGroupRow> for AgeGroupRecord {
    fn from(row: &AgeGroupRow) -> Self {
        AgeGroupRecord {
            id: row.id.clone(),
            age_group: row.age_group,
            population: row.population,
            confirmed: row.confirmed,
            severe: row.severe,
            critical: row.critical,
            fatal: row.fatal,
            isolated: row.isolated,
        }
    }
}

impl ForAgeGroup for AgeGroupRecord {
    fn age_group(&self) -> AgeGroup {
        self.age_group
    }
}

/// A row of the age group table as presented to users, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroupRow {
    pub id: String,
    pub age_group: AgeGroup,
    pub population: Real,
    pub confirmed: Real,
    pub severe: Real,
    pub critical: Real,
    pub fatal: Real,
    pub total_fatal: Real,
    pub isolated: Real,
}

/// A partial edit of one row. Unset columns are left untouched.
///
/// `totalFatal` is accepted so that rows read from the view can be sent back
/// as they are, but it is always discarded on commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RowPatch {
    pub population: Option<Real>,
    pub confirmed: Option<Real>,
    pub severe: Option<Real>,
    pub critical: Option<Real>,
    pub fatal: Option<Real>,
    pub total_fatal: Option<Real>,
    pub isolated: Option<Real>,
}

macro_rules! row_patch_fields {
    ($($field:ident),* $(,)?) => {
        paste! {
            impl RowPatch {
                $(
                    pub fn [<with_ $field>](mut self, value: Real) -> Self {
                        self.$field = Some(value);
                        self
                    }
                )*

                /// Shallow-merge the set columns into a view row.
                pub fn merge_into(&self, row: &mut AgeGroupRow) {
                    $(
                        if let Some(value) = self.$field {
                            row.$field = value;
                        }
                    )*
                }

                /// Return true if no column is set.
                pub fn is_empty(&self) -> bool {
                    true $(&& self.$field.is_none())*
                }
            }

            impl From<&AgeGroupRow> for RowPatch {
                fn from(row: &AgeGroupRow) -> Self {
                    RowPatch {
                        $($field: Some(row.$field),)*
                    }
                }
            }
        }
    };
}

row_patch_fields!(population, confirmed, severe, critical, fatal, total_fatal, isolated);

/// Edits keyed by row id.
pub type ChangeSet = BTreeMap<String, RowPatch>;
