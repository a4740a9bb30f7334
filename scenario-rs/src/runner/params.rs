use serde::Deserialize;
use time::Date;

use super::RunnerError;
use crate::{
    prelude::Real,
    scenario::{DateRange, MitigationInterval, NumericRange, ScenarioFlat},
};

/// Typed view of the flat scenario parameters used by the runner.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunParams {
    pub population_served: Real,
    pub initial_number_of_cases: Real,
    pub imports_per_day: Real,
    pub hospital_beds: Real,
    pub icu_beds: Real,
    pub hospital_stay_days: Real,
    pub icu_stay_days: Real,
    pub infectious_period_days: Real,
    pub latency_days: Real,
    pub overflow_severity: Real,
    pub peak_month: Real,
    #[serde(default)]
    pub seasonal_forcing: Real,
    pub r0: NumericRange,
    pub number_stochastic_runs: Real,
    pub simulation_time_range: DateRange,
    #[serde(default)]
    pub mitigation_intervals: Vec<MitigationInterval>,
}

impl RunParams {
    /// Decode runner parameters from the flat scenario.
    pub fn from_flat(flat: &ScenarioFlat) -> Result<Self, RunnerError> {
        let value = serde_json::to_value(flat).map_err(RunnerError::Params)?;
        let params: RunParams = serde_json::from_value(value).map_err(RunnerError::Params)?;
        params.check()?;
        Ok(params)
    }

    fn check(&self) -> Result<(), RunnerError> {
        let positive = [
            ("latencyDays", self.latency_days),
            ("infectiousPeriodDays", self.infectious_period_days),
            ("hospitalStayDays", self.hospital_stay_days),
            ("icuStayDays", self.icu_stay_days),
        ];
        for (name, value) in positive.iter() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(RunnerError::invalid(name, "must be a positive number"));
            }
        }
        let non_negative = [
            ("populationServed", self.population_served),
            ("initialNumberOfCases", self.initial_number_of_cases),
            ("importsPerDay", self.imports_per_day),
            ("hospitalBeds", self.hospital_beds),
            ("icuBeds", self.icu_beds),
            ("overflowSeverity", self.overflow_severity),
        ];
        for (name, value) in non_negative.iter() {
            if !(value.is_finite() && *value >= 0.0) {
                return Err(RunnerError::invalid(name, "must be a non-negative number"));
            }
        }
        if !self.r0.is_ordered() || self.r0.begin < 0.0 {
            return Err(RunnerError::invalid("r0", "must be an ordered range of non-negative numbers"));
        }
        for (i, interval) in self.mitigation_intervals.iter().enumerate() {
            let reduction = &interval.transmission_reduction;
            if !reduction.is_ordered() || reduction.begin < 0.0 || reduction.end > 100.0 {
                return Err(RunnerError::invalid(
                    &format!("mitigationIntervals[{}].transmissionReduction", i),
                    "must be an ordered range of percentages",
                ));
            }
        }
        self.number_of_runs()?;
        self.time_range()?;
        Ok(())
    }

    /// Number of stochastic runs, at least one.
    pub fn number_of_runs(&self) -> Result<usize, RunnerError> {
        let n = self.number_stochastic_runs;
        if n.is_finite() && n >= 1.0 && n.fract() == 0.0 {
            Ok(n as usize)
        } else {
            Err(RunnerError::invalid(
                "numberStochasticRuns",
                "must be a positive integer",
            ))
        }
    }

    /// First and last simulated day.
    pub fn time_range(&self) -> Result<(Date, Date), RunnerError> {
        match self.simulation_time_range.dates() {
            Some((begin, end)) if begin <= end => Ok((begin, end)),
            _ => Err(RunnerError::invalid(
                "simulationTimeRange",
                "must be an ordered range of dates",
            )),
        }
    }
}
