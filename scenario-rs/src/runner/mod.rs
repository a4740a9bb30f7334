//! The model runner seam.
//!
//! Resolution produces a flat parameter map and two distributions; a
//! [`ModelRunner`] turns them into a [`RunResult`]. [`SeirRunner`] is the
//! reference implementation used by the command line tool.
mod params;
mod seir;

pub use params::*;
pub use seir::*;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    data::{AgeDistributionDatum, SeverityDistributionDatum},
    prelude::Real,
    scenario::ScenarioFlat,
};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid model parameters: {0}")]
    Params(#[source] serde_json::Error),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: &'static str },

    #[error("the age distribution is empty or has no population")]
    EmptyPopulation,

    #[error("{0}")]
    Failed(String),
}

impl RunnerError {
    pub fn invalid(name: &str, reason: &'static str) -> Self {
        RunnerError::InvalidParameter {
            name: name.to_string(),
            reason,
        }
    }
}

/// Executes an epidemic simulation from resolved inputs.
pub trait ModelRunner {
    fn run(
        &self,
        params: &ScenarioFlat,
        severity: &[SeverityDistributionDatum],
        age_distribution: &[AgeDistributionDatum],
    ) -> Result<RunResult, RunnerError>;
}

/// Number of tracked compartments.
pub const N_COMPARTMENTS: usize = 8;

/// Totals of each compartment at the end of one simulated day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayState {
    pub time: String,
    pub susceptible: Real,
    pub exposed: Real,
    pub infectious: Real,
    pub severe: Real,
    pub critical: Real,
    pub overflow: Real,
    pub recovered: Real,
    pub fatality: Real,
}

impl DayState {
    pub fn from_components(time: String, c: [Real; N_COMPARTMENTS]) -> Self {
        DayState {
            time,
            susceptible: c[0],
            exposed: c[1],
            infectious: c[2],
            severe: c[3],
            critical: c[4],
            overflow: c[5],
            recovered: c[6],
            fatality: c[7],
        }
    }

    pub fn components(&self) -> [Real; N_COMPARTMENTS] {
        [
            self.susceptible,
            self.exposed,
            self.infectious,
            self.severe,
            self.critical,
            self.overflow,
            self.recovered,
            self.fatality,
        ]
    }
}

/// Mean and envelope of the trajectories of all stochastic runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub mean: Vec<DayState>,
    pub lower: Vec<DayState>,
    pub upper: Vec<DayState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    #[getset(get_copy = "pub")]
    number_of_runs: usize,
    /// R0 sampled by each run.
    #[getset(get = "pub")]
    r0_samples: Vec<Real>,
    #[getset(get = "pub")]
    trajectory: Trajectory,
}

impl RunResult {
    pub fn new(r0_samples: Vec<Real>, trajectory: Trajectory) -> Self {
        RunResult {
            number_of_runs: r0_samples.len(),
            r0_samples,
            trajectory,
        }
    }
}
