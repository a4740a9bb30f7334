pub use crate::data::{
    AgeDistributionDatum, AgeGroup, DatasetKind, DatasetSet, SeverityDistributionDatum,
};
pub use crate::editor::{AgeGroupEditor, AgeGroupRecord, AgeGroupRow, ChangeSet, FieldErrors, RowPatch};
pub use crate::scenario::{Overrides, Scenario, ScenarioFlat};

/// Base Real type used by this crate. Uses an alias to easily change precision
/// if necessary.
pub type Real = f64;

/// Scaling applied to the product of the four severity percentages. They are
/// all given in percent, so the product carries a factor of 100^4 and the
/// result is rescaled back to a percentage.
pub const TOTAL_FATAL_SCALE: Real = 1e-6;

/// Simple trait for records that belong to exactly one age group.
pub trait ForAgeGroup {
    /// Return the age group of this record.
    fn age_group(&self) -> AgeGroup;
}

/// Sort records by the canonical age group ordering.
pub fn sort_by_age_group<T: ForAgeGroup>(data: &mut [T]) {
    data.sort_by(|a, b| a.age_group().cmp(&b.age_group()));
}
