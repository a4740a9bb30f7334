//! Resolve a scenario, run the model and write the results.
//!
//! Usage: `cli <scenario> <output> [options]`
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};
use simple_logger::SimpleLogger;

use covid_scenario::{
    config::Config,
    pipeline::{execute, Inputs},
    scenario::Overrides,
    Error, SeirRunner,
};

#[derive(Parser, Debug)]
#[command(name = "cli")]
#[command(about = "Run an epidemic scenario with command line overrides")]
struct Args {
    /// Scenario file
    scenario: PathBuf,

    /// Where to write the results
    output: PathBuf,

    /// Age distribution file, used instead of the bundled ones
    #[arg(long)]
    age: Option<PathBuf>,

    /// Name of a bundled age distribution
    #[arg(long = "ageDistribution")]
    age_distribution: Option<String>,

    /// Severity distribution file, used instead of the bundled one
    #[arg(long)]
    severity: Option<PathBuf>,

    #[arg(long = "hospitalStayDays")]
    hospital_stay_days: Option<String>,

    #[arg(long = "icuStayDays")]
    icu_stay_days: Option<String>,

    #[arg(long = "infectiousPeriodDays")]
    infectious_period_days: Option<String>,

    #[arg(long = "latencyDays")]
    latency_days: Option<String>,

    #[arg(long = "overflowSeverity")]
    overflow_severity: Option<String>,

    #[arg(long = "peakMonth")]
    peak_month: Option<String>,

    /// Lower bound of R0
    #[arg(long = "r0Low")]
    r0_low: Option<String>,

    /// Upper bound of R0
    #[arg(long = "r0High")]
    r0_high: Option<String>,

    #[arg(long = "ageDistributionName")]
    age_distribution_name: Option<String>,

    #[arg(long = "caseCountsName")]
    case_counts_name: Option<String>,

    #[arg(long = "hospitalBeds")]
    hospital_beds: Option<String>,

    #[arg(long = "icuBeds")]
    icu_beds: Option<String>,

    #[arg(long = "importsPerDay")]
    imports_per_day: Option<String>,

    #[arg(long = "initialNumberOfCases")]
    initial_number_of_cases: Option<String>,

    #[arg(long = "populationServed")]
    population_served: Option<String>,

    #[arg(long = "numberStochasticRuns")]
    number_stochastic_runs: Option<String>,

    /// Start of the first mitigation interval
    #[arg(long = "mitTimeRangeBegin")]
    mit_time_range_begin: Option<String>,

    /// End of the first mitigation interval
    #[arg(long = "mitTimeRangeEnd")]
    mit_time_range_end: Option<String>,

    #[arg(long = "transmissionReductionLow")]
    transmission_reduction_low: Option<String>,

    #[arg(long = "transmissionReductionHigh")]
    transmission_reduction_high: Option<String>,

    #[arg(long = "simulationRangeBegin")]
    simulation_range_begin: Option<String>,

    #[arg(long = "simulationRangeEnd")]
    simulation_range_end: Option<String>,

    /// Scenario name
    #[arg(long)]
    name: Option<String>,

    /// Ignored
    #[arg(long)]
    color: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        let flags = [
            ("hospitalStayDays", &self.hospital_stay_days),
            ("icuStayDays", &self.icu_stay_days),
            ("infectiousPeriodDays", &self.infectious_period_days),
            ("latencyDays", &self.latency_days),
            ("overflowSeverity", &self.overflow_severity),
            ("peakMonth", &self.peak_month),
            ("r0Low", &self.r0_low),
            ("r0High", &self.r0_high),
            ("ageDistributionName", &self.age_distribution_name),
            ("caseCountsName", &self.case_counts_name),
            ("hospitalBeds", &self.hospital_beds),
            ("icuBeds", &self.icu_beds),
            ("importsPerDay", &self.imports_per_day),
            ("initialNumberOfCases", &self.initial_number_of_cases),
            ("populationServed", &self.population_served),
            ("numberStochasticRuns", &self.number_stochastic_runs),
            ("mitTimeRangeBegin", &self.mit_time_range_begin),
            ("mitTimeRangeEnd", &self.mit_time_range_end),
            ("transmissionReductionLow", &self.transmission_reduction_low),
            ("transmissionReductionHigh", &self.transmission_reduction_high),
            ("simulationRangeBegin", &self.simulation_range_begin),
            ("simulationRangeEnd", &self.simulation_range_end),
            ("name", &self.name),
        ];
        flags
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (*key, v.clone())))
            .collect()
    }

    fn inputs(&self) -> Inputs {
        Inputs {
            scenario: self.scenario.clone(),
            severity: self.severity.clone(),
            age: self.age.clone(),
            age_distribution: self.age_distribution.clone(),
            overrides: self.overrides(),
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let config = Config::load()?;
    if let Err(err) = SimpleLogger::new().with_level(config.level_filter()?).init() {
        eprintln!("cannot initialize logging: {}", err);
    }
    if let Some(path) = Config::locate() {
        info!("Using configuration from {}", path.display());
    }
    if let Some(color) = &args.color {
        debug!("ignoring --color {}", color);
    }

    let runner = SeirRunner::new(config.seed);
    let result = execute(&args.inputs(), &args.output, &config, &runner)?;
    debug!("finished {} runs", result.number_of_runs());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_become_overrides() {
        let args = Args::parse_from([
            "cli",
            "scenario.json",
            "out.json",
            "--r0Low",
            "1.2",
            "--simulationRangeEnd",
            "2020-09-01",
            "--ageDistribution",
            "CountryA",
            "--color",
            "red",
        ]);
        let overrides = args.overrides();
        assert_eq!(overrides.get("r0Low"), Some("1.2"));
        assert_eq!(overrides.get("simulationRangeEnd"), Some("2020-09-01"));
        assert_eq!(overrides.get("color"), None);
        assert_eq!(overrides.get("ageDistribution"), None);

        let inputs = args.inputs();
        assert_eq!(inputs.scenario, PathBuf::from("scenario.json"));
        assert_eq!(inputs.age_distribution.as_deref(), Some("CountryA"));
        assert!(inputs.severity.is_none());
    }
}
