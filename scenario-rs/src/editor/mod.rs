//! The editable age group table.
//!
//! The editor joins the severity and age distributions into one row per age
//! group and keeps those rows as the single source of truth for both
//! datasets. Derived columns are computed on every read and dropped on every
//! write, so they can never go stale. Validation errors are plain data: they
//! never block viewing or editing other rows.
mod errors;
mod row;
mod validate;

pub use errors::*;
pub use row::*;
pub use validate::*;

use getset::Getters;
use log::debug;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::{
    data::{AgeDistributionDatum, AgeGroup, DatasetKind, SeverityDistributionDatum},
    prelude::ForAgeGroup,
};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("age group {age_group} has severity data but no age distribution data")]
    MissingAge { age_group: AgeGroup },

    #[error("age group {age_group} has age distribution data but no severity data")]
    MissingSeverity { age_group: AgeGroup },

    #[error("age group {age_group} appears more than once in the {kind}")]
    Duplicate {
        age_group: AgeGroup,
        kind: DatasetKind,
    },

    #[error("cannot export table: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Getters)]
pub struct AgeGroupEditor {
    /// Committed rows, in age group order.
    #[getset(get = "pub")]
    records: Vec<AgeGroupRecord>,

    /// Current validation errors, by row index and column.
    #[getset(get = "pub")]
    errors: FieldErrors,

    /// Ids of rows changed by a commit.
    #[getset(get = "pub")]
    touched: BTreeSet<String>,
}

fn find_unique<T: ForAgeGroup>(
    data: &[T],
    age_group: AgeGroup,
    kind: DatasetKind,
) -> Result<Option<&T>, EditorError> {
    let mut found = data.iter().filter(|d| d.age_group() == age_group);
    let first = found.next();
    if found.next().is_some() {
        return Err(EditorError::Duplicate { age_group, kind });
    }
    Ok(first)
}

impl AgeGroupEditor {
    /// Join both distributions by age group.
    ///
    /// A row exists for every age group present in both datasets. An age
    /// group present in only one of them is an error: it must be fixed in the
    /// data, not filled with defaults.
    pub fn new(
        severity: &[SeverityDistributionDatum],
        age: &[AgeDistributionDatum],
    ) -> Result<Self, EditorError> {
        let mut records = Vec::with_capacity(AgeGroup::COUNT);
        for &age_group in AgeGroup::ALL.iter() {
            let s = find_unique(severity, age_group, DatasetKind::Severity)?;
            let a = find_unique(age, age_group, DatasetKind::Age)?;
            match (s, a) {
                (Some(s), Some(a)) => records.push(AgeGroupRecord::join(s, a)),
                (Some(_), None) => return Err(EditorError::MissingAge { age_group }),
                (None, Some(_)) => return Err(EditorError::MissingSeverity { age_group }),
                (None, None) => {}
            }
        }
        Ok(AgeGroupEditor {
            records,
            errors: FieldErrors::new(),
            touched: BTreeSet::new(),
        })
    }

    /// Rows with derived columns computed from the committed values.
    pub fn view(&self) -> Vec<AgeGroupRow> {
        self.records.iter().map(AgeGroupRecord::to_row).collect()
    }

    /// Merge edits into the committed rows.
    ///
    /// Each patch is merged into the row with the same id and the result is
    /// stored without its derived columns, even if the patch sets them. Rows
    /// without a patch and patches without a row are ignored. An empty or
    /// missing change set does nothing.
    pub fn commit<'a>(&mut self, changes: impl Into<Option<&'a ChangeSet>>) {
        let changes = match changes.into() {
            Some(changes) if !changes.is_empty() => changes,
            _ => return,
        };

        for record in self.records.iter_mut() {
            if let Some(patch) = changes.get(record.id()) {
                let mut row = record.to_row();
                patch.merge_into(&mut row);
                let updated = AgeGroupRecord::from(&row);
                if updated != *record {
                    *record = updated;
                    self.touched.insert(record.id().clone());
                }
            }
        }

        for id in changes.keys() {
            if !self.records.iter().any(|r| r.id() == id) {
                debug!("commit: no row with id \"{}\"", id);
            }
        }
    }

    /// Replace the validation errors reported for the table.
    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    /// Validate the committed rows and store the resulting errors. Return true
    /// if the table is valid.
    pub fn validate(&mut self) -> bool {
        self.errors = validate_records(&self.records);
        self.errors.is_empty()
    }

    /// Human readable validation messages, one per row and column.
    pub fn error_messages(&self) -> Vec<String> {
        error_messages(&self.errors)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Return true if any row was changed by a commit.
    pub fn is_touched(&self) -> bool {
        !self.touched.is_empty()
    }

    /// The committed severity distribution, in age group order.
    pub fn severity(&self) -> Vec<SeverityDistributionDatum> {
        self.records.iter().map(AgeGroupRecord::severity).collect()
    }

    /// The committed age distribution, in age group order.
    pub fn age_distribution(&self) -> Vec<AgeDistributionDatum> {
        self.records.iter().map(AgeGroupRecord::age).collect()
    }

    /// Render the current view as CSV, with a header row.
    pub fn render_csv(&self) -> Result<String, EditorError> {
        let mut writer = csv::Writer::from_writer(vec![]);
        for row in self.view() {
            writer.serialize(row)?;
        }
        let data = writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}
