//! Age-stratified datasets: the age group ordering, the two distribution
//! types, and resolution of a distribution from a file or from a bundled
//! collection of named distributions.
mod age_group;
mod distributions;
mod resolver;

pub use age_group::*;
pub use distributions::*;
pub use resolver::*;

use crate::error::DecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("{kind} \"{name}\" not found in JSON")]
    NotFound { kind: DatasetKind, name: String },

    #[error("{kind} \"{name}\" lists age group {age_group} more than once")]
    DuplicateAgeGroup {
        kind: DatasetKind,
        name: String,
        age_group: AgeGroup,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
