use getset::{CopyGetters, Setters};
use log::{debug, info};
use ndarray::prelude::*;
use rand::prelude::*;
use rayon::prelude::*;
use std::f64::consts::PI;
use time::{Date, Duration};

use super::{DayState, ModelRunner, RunParams, RunResult, RunnerError, Trajectory, N_COMPARTMENTS};
use crate::{
    data::{AgeDistributionDatum, AgeGroup, SeverityDistributionDatum},
    prelude::{ForAgeGroup, Real},
    scenario::ScenarioFlat,
};

/// Compartment totals for one day.
type Tip = [Real; N_COMPARTMENTS];

/// Age-stratified deterministic compartment model, repeated over several runs
/// with parameters drawn from their plausible ranges.
///
/// Each run draws R0 and the transmission reduction of every mitigation
/// interval uniformly from their ranges, then integrates a
/// S -> E -> I -> (R | H -> (R | C -> (R | D))) model with a fixed number of
/// sub-steps per day. Critical patients above ICU capacity die with the
/// fatality rate scaled by `overflowSeverity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters, Setters)]
#[getset(get_copy = "pub", set = "pub")]
pub struct SeirRunner {
    seed: u64,
    substeps: usize,
    parallel: bool,
}

impl Default for SeirRunner {
    fn default() -> Self {
        SeirRunner {
            seed: 0,
            substeps: 4,
            parallel: true,
        }
    }
}

/// Rates of one age group, as fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GroupRates {
    share: Real,
    confirmed: Real,
    severe: Real,
    critical: Real,
    fatal: Real,
    isolated: Real,
}

fn percent(x: Real) -> Real {
    (x / 100.0).max(0.0).min(1.0)
}

/// Fraction of a compartment with mean residence time `period` leaving it
/// during `dt`.
fn exit_fraction(dt: Real, period: Real) -> Real {
    (dt / period).min(1.0)
}

/// Fractional month of the year, starting at 0 on January 1st.
fn month_of(date: Date) -> Real {
    12.0 * (date.ordinal() as Real - 1.0) / 365.25
}

impl SeirRunner {
    pub fn new(seed: u64) -> Self {
        SeirRunner {
            seed,
            ..Default::default()
        }
    }

    fn group_rates(
        severity: &[SeverityDistributionDatum],
        age_distribution: &[AgeDistributionDatum],
    ) -> Result<Vec<GroupRates>, RunnerError> {
        let total: Real = age_distribution.iter().map(|a| a.population).sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(RunnerError::EmptyPopulation);
        }

        let mut groups = Vec::with_capacity(AgeGroup::COUNT);
        for age in age_distribution {
            let sev = severity
                .iter()
                .find(|s| s.age_group() == age.age_group())
                .ok_or_else(|| {
                    RunnerError::Failed(format!("no severity data for age group {}", age.age_group))
                })?;
            groups.push(GroupRates {
                share: age.population / total,
                confirmed: percent(sev.confirmed),
                severe: percent(sev.severe),
                critical: percent(sev.critical),
                fatal: percent(sev.fatal),
                isolated: percent(sev.isolated),
            });
        }
        Ok(groups)
    }

    /// Run a single trajectory. Return the sampled R0 and one tip per day.
    fn simulate(&self, params: &RunParams, groups: &[GroupRates], run: usize) -> (Real, Vec<Tip>) {
        let mut rng = SmallRng::seed_from_u64(self.seed.wrapping_add(run as u64));
        let r0 = params.r0.at(rng.gen());
        let reductions: Vec<Real> = params
            .mitigation_intervals
            .iter()
            .map(|iv| percent(iv.transmission_reduction.at(rng.gen())))
            .collect();
        debug!("run [{}]: R0 = {:.2}, reductions = {:?}", run, r0, reductions);

        // Checked when decoding the parameters.
        let (begin, end) = match params.time_range() {
            Ok(range) => range,
            Err(_) => return (r0, vec![]),
        };
        let days = (end - begin).whole_days() + 1;

        let n = groups.len();
        let pop = params.population_served;
        let mut s: Vec<Real> = groups.iter().map(|g| g.share * pop).collect();
        let mut e = vec![0.0; n];
        let mut i = vec![0.0; n];
        let mut h = vec![0.0; n];
        let mut c = vec![0.0; n];
        let mut r = vec![0.0; n];
        let mut d = vec![0.0; n];
        for (k, g) in groups.iter().enumerate() {
            let seeded = (params.initial_number_of_cases * g.share).min(s[k]);
            s[k] -= seeded;
            e[k] += seeded;
        }

        let dt = 1.0 / self.substeps.max(1) as Real;
        let to_infectious = exit_fraction(dt, params.latency_days);
        let from_infectious = exit_fraction(dt, params.infectious_period_days);
        let from_hospital = exit_fraction(dt, params.hospital_stay_days);
        let from_icu = exit_fraction(dt, params.icu_stay_days);

        let mut tips = Vec::with_capacity(days as usize);
        for day in 0..days {
            let date = begin + Duration::days(day);
            let mitigation: Real = params
                .mitigation_intervals
                .iter()
                .zip(reductions.iter())
                .filter(|(iv, _)| iv.time_range.contains(date))
                .map(|(_, red)| 1.0 - red)
                .product();
            let seasonal = 1.0
                + params.seasonal_forcing
                    * (2.0 * PI * (month_of(date) - params.peak_month) / 12.0).cos();
            let beta = r0 * seasonal.max(0.0) * mitigation / params.infectious_period_days;

            for _ in 0..self.substeps.max(1) {
                let infectious: Real = groups
                    .iter()
                    .zip(i.iter())
                    .map(|(g, x)| x * (1.0 - g.isolated))
                    .sum();
                let lambda = if pop > 0.0 { beta * infectious / pop } else { 0.0 };
                let critical: Real = c.iter().sum();
                let overflow = if critical > params.icu_beds {
                    (critical - params.icu_beds) / critical
                } else {
                    0.0
                };

                for (k, g) in groups.iter().enumerate() {
                    let exposed = (lambda * s[k] * dt).min(s[k]);
                    let imported = (params.imports_per_day * g.share * dt).min(s[k] - exposed);
                    let new_infectious = e[k] * to_infectious;
                    let leaving_i = i[k] * from_infectious;
                    let to_severe = leaving_i * g.confirmed * g.severe;
                    let leaving_h = h[k] * from_hospital;
                    let to_critical = leaving_h * g.critical;
                    let leaving_c = c[k] * from_icu;
                    let fatal = g.fatal * (1.0 - overflow)
                        + (g.fatal * params.overflow_severity).min(1.0) * overflow;
                    let deaths = leaving_c * fatal;

                    s[k] -= exposed + imported;
                    e[k] += exposed + imported - new_infectious;
                    i[k] += new_infectious - leaving_i;
                    h[k] += to_severe - leaving_h;
                    c[k] += to_critical - leaving_c;
                    r[k] += (leaving_i - to_severe) + (leaving_h - to_critical) + (leaving_c - deaths);
                    d[k] += deaths;
                }
            }

            let critical: Real = c.iter().sum();
            tips.push([
                s.iter().sum(),
                e.iter().sum(),
                i.iter().sum(),
                h.iter().sum(),
                critical,
                (critical - params.icu_beds).max(0.0),
                r.iter().sum(),
                d.iter().sum(),
            ]);
        }
        (r0, tips)
    }
}

/// Convert a (days x compartments) table into day states.
fn to_days(table: &Array2<Real>, labels: &[String]) -> Vec<DayState> {
    labels
        .iter()
        .enumerate()
        .map(|(t, label)| {
            let mut tip = [0.0; N_COMPARTMENTS];
            for (j, x) in tip.iter_mut().enumerate() {
                *x = table[[t, j]];
            }
            DayState::from_components(label.clone(), tip)
        })
        .collect()
}

impl ModelRunner for SeirRunner {
    fn run(
        &self,
        params: &ScenarioFlat,
        severity: &[SeverityDistributionDatum],
        age_distribution: &[AgeDistributionDatum],
    ) -> Result<RunResult, RunnerError> {
        let params = RunParams::from_flat(params)?;
        let groups = Self::group_rates(severity, age_distribution)?;
        let n_runs = params.number_of_runs()?;
        let (begin, end) = params.time_range()?;
        let labels: Vec<String> = (0..=(end - begin).whole_days())
            .map(|day| (begin + Duration::days(day)).to_string())
            .collect();
        info!(
            "running {} stochastic runs from {} to {}",
            n_runs, begin, end
        );

        let runs: Vec<(Real, Vec<Tip>)> = if self.parallel {
            (0..n_runs)
                .into_par_iter()
                .map(|run| self.simulate(&params, &groups, run))
                .collect()
        } else {
            (0..n_runs)
                .map(|run| self.simulate(&params, &groups, run))
                .collect()
        };

        let mut data = Array3::<Real>::zeros((n_runs, labels.len(), N_COMPARTMENTS));
        for (k, (_, tips)) in runs.iter().enumerate() {
            for (t, tip) in tips.iter().enumerate() {
                for (j, x) in tip.iter().enumerate() {
                    data[[k, t, j]] = *x;
                }
            }
        }
        let mean = data
            .mean_axis(Axis(0))
            .ok_or_else(|| RunnerError::Failed("no stochastic run was executed".to_string()))?;
        let lower = data.fold_axis(Axis(0), Real::INFINITY, |&acc, &x| acc.min(x));
        let upper = data.fold_axis(Axis(0), Real::NEG_INFINITY, |&acc, &x| acc.max(x));

        let trajectory = Trajectory {
            mean: to_days(&mean, &labels),
            lower: to_days(&lower, &labels),
            upper: to_days(&upper, &labels),
        };
        Ok(RunResult::new(runs.iter().map(|(r0, _)| *r0).collect(), trajectory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::tests::scenario;
    use assert_approx_eq::assert_approx_eq;
    use serde_json::json;

    fn severity() -> Vec<SeverityDistributionDatum> {
        AgeGroup::ALL
            .iter()
            .map(|&age_group| SeverityDistributionDatum {
                age_group,
                confirmed: 30.0,
                severe: 10.0,
                critical: 25.0,
                fatal: 40.0,
                isolated: 0.0,
            })
            .collect()
    }

    fn age() -> Vec<AgeDistributionDatum> {
        AgeGroup::ALL
            .iter()
            .enumerate()
            .map(|(i, &age_group)| AgeDistributionDatum {
                age_group,
                population: 100.0 + 10.0 * i as Real,
            })
            .collect()
    }

    fn run(runner: SeirRunner, flat: &ScenarioFlat) -> RunResult {
        runner.run(flat, &severity(), &age()).unwrap()
    }

    #[test]
    fn same_seed_same_result() {
        let flat = scenario().flatten();
        let a = run(SeirRunner::new(7), &flat);
        let b = run(SeirRunner::new(7), &flat);
        let mut serial = SeirRunner::new(7);
        serial.set_parallel(false);
        let c = run(serial, &flat);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.number_of_runs(), 10);
        assert_eq!(a.trajectory().mean.len(), 61);
        assert_eq!(a.trajectory().mean[0].time, "2020-03-01");
        assert_eq!(a.trajectory().mean[60].time, "2020-04-30");
    }

    #[test]
    fn r0_is_sampled_from_its_range() {
        let result = run(SeirRunner::new(1), &scenario().flatten());
        assert!(result.r0_samples().iter().all(|r0| (2.0..=3.0).contains(r0)));
        let first = result.r0_samples()[0];
        assert!(result.r0_samples().iter().any(|r0| *r0 != first));
    }

    #[test]
    fn population_is_conserved() {
        let result = run(SeirRunner::default(), &scenario().flatten());
        for day in &result.trajectory().mean {
            let c = day.components();
            let total: Real = c.iter().sum::<Real>() - day.overflow;
            assert_approx_eq!(total, 100_000.0, 1e-6);
        }
    }

    #[test]
    fn envelope_contains_the_mean() {
        let result = run(SeirRunner::default(), &scenario().flatten());
        let t = result.trajectory();
        for ((lo, m), hi) in t.lower.iter().zip(t.mean.iter()).zip(t.upper.iter()) {
            for ((a, b), c) in lo.components().iter().zip(m.components().iter()).zip(hi.components().iter()) {
                assert!(a <= &(b + 1e-9) && b <= &(c + 1e-9));
            }
        }
    }

    #[test]
    fn no_cases_no_epidemic() {
        let mut flat = scenario().flatten();
        flat.insert("initialNumberOfCases".into(), json!(0));
        flat.insert("importsPerDay".into(), json!(0));
        let result = run(SeirRunner::default(), &flat);
        let last = result.trajectory().mean.last().unwrap();
        assert_approx_eq!(last.susceptible, 100_000.0, 1e-9);
        assert_eq!(last.fatality, 0.0);
    }

    #[test]
    fn mitigation_reduces_infections() {
        let mut flat = scenario().flatten();
        flat.insert("mitigationIntervals".into(), json!([]));
        let free = run(SeirRunner::default(), &flat);

        flat.insert(
            "mitigationIntervals".into(),
            json!([{
                "timeRange": { "begin": "2020-03-01", "end": "2020-04-30" },
                "transmissionReduction": { "begin": 90, "end": 90 }
            }]),
        );
        let mitigated = run(SeirRunner::default(), &flat);
        let last = |r: &RunResult| r.trajectory().mean.last().unwrap().susceptible;
        assert!(last(&mitigated) > last(&free));
    }

    #[test]
    fn missing_inputs_are_errors() {
        let flat = scenario().flatten();
        let runner = SeirRunner::default();
        assert!(matches!(
            runner.run(&flat, &severity(), &[]),
            Err(RunnerError::EmptyPopulation)
        ));
        assert!(matches!(
            runner.run(&flat, &severity()[..3], &age()),
            Err(RunnerError::Failed(_))
        ));
    }
}
