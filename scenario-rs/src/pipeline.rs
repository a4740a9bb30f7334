//! From files on disk to a finished run.
//!
//! [`resolve_inputs`] decodes the scenario, resolves both distributions,
//! applies the overrides and flattens it, one step after the other. [`run_model`]
//! passes the result through the age group editor and hands it to a
//! [`ModelRunner`]. Nothing is written unless the run succeeds.
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::{
    config::Config,
    data::{resolve_from_file, AgeDistributionDatum, SeverityDistributionDatum},
    editor::AgeGroupEditor,
    error::{write_file, Error, Result},
    runner::{ModelRunner, RunResult},
    scenario::{apply_overrides, Overrides, Scenario, ScenarioFlat},
};

/// Everything given on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    pub scenario: PathBuf,
    /// Standalone severity distribution file.
    pub severity: Option<PathBuf>,
    /// Standalone age distribution file.
    pub age: Option<PathBuf>,
    /// Name of a bundled age distribution.
    pub age_distribution: Option<String>,
    pub overrides: Overrides,
}

/// Fully resolved inputs of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Scenario after overrides, before flattening.
    pub scenario: Scenario,
    pub flat: ScenarioFlat,
    pub severity: Vec<SeverityDistributionDatum>,
    pub age_distribution: Vec<AgeDistributionDatum>,
}

/// Name of the age distribution to look up: the explicit name if given,
/// otherwise the one selected by the scenario file.
fn age_distribution_name<'a>(inputs: &'a Inputs, scenario: &'a Scenario) -> &'a str {
    match inputs.age_distribution.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => scenario.age_distribution_name().unwrap_or_default(),
    }
}

/// Resolve both distributions, then apply the overrides and flatten the
/// scenario.
///
/// Distributions are looked up with the scenario as decoded, so an
/// `ageDistributionName` override changes the flat parameters but not the
/// age distribution that is loaded.
pub fn resolve_inputs(inputs: &Inputs, config: &Config) -> Result<Resolved> {
    let mut scenario = Scenario::from_path(&inputs.scenario)?;

    let severity = resolve_from_file(
        inputs.severity.as_deref(),
        &config.default_severity_name,
        &config.severity_distributions,
    )?;
    let age_distribution = resolve_from_file(
        inputs.age.as_deref(),
        age_distribution_name(inputs, &scenario),
        &config.age_distributions,
    )?;

    apply_overrides(&mut scenario, &inputs.overrides)?;
    let flat = scenario.flatten();

    Ok(Resolved {
        scenario,
        flat,
        severity,
        age_distribution,
    })
}

/// Build the age group table, commit the configured edits and run the model
/// with the committed distributions.
///
/// Validation problems in the table are reported as warnings and do not stop
/// the run.
pub fn run_model(
    resolved: &Resolved,
    config: &Config,
    runner: &impl ModelRunner,
) -> Result<(AgeGroupEditor, RunResult)> {
    let mut editor = AgeGroupEditor::new(&resolved.severity, &resolved.age_distribution)?;
    editor.commit(&config.edits);
    if !editor.validate() {
        for message in editor.error_messages() {
            warn!("{}", message);
        }
    }

    let result = runner.run(
        &resolved.flat,
        &editor.severity(),
        &editor.age_distribution(),
    )?;
    Ok((editor, result))
}

/// Write the run result to `output`, the scenario that produced it to the
/// audit path and, if configured, the age group table as CSV.
pub fn write_outputs(
    resolved: &Resolved,
    editor: &AgeGroupEditor,
    result: &RunResult,
    output: &Path,
    config: &Config,
) -> Result<()> {
    let scenario = resolved
        .scenario
        .to_file_json()
        .map_err(|source| Error::Serialize {
            what: "scenario",
            source,
        })?;
    let data = serde_json::to_string_pretty(result).map_err(|source| Error::Serialize {
        what: "run result",
        source,
    })?;
    let table = match &config.table_csv {
        Some(_) => Some(editor.render_csv()?),
        None => None,
    };

    write_file(&config.audit_path, &scenario)?;
    if let (Some(path), Some(table)) = (&config.table_csv, table) {
        info!("Writing age group table to {}", path.display());
        write_file(path, &table)?;
    }
    info!("Writing results to {}", output.display());
    write_file(output, &data)
}

/// Resolve, run and write the outputs.
pub fn execute(
    inputs: &Inputs,
    output: &Path,
    config: &Config,
    runner: &impl ModelRunner,
) -> Result<RunResult> {
    let resolved = resolve_inputs(inputs, config)?;
    let (editor, result) = run_model(&resolved, config, runner)?;
    write_outputs(&resolved, &editor, &result, output, config)?;
    Ok(result)
}
