use indexmap::IndexMap;
use log::{debug, info};
use serde_json::{Number, Value};
use thiserror::Error;

use super::{Scenario, Section};

/// Command line overrides, flag name (without the leading dashes) -> raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    values: IndexMap<String, String>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an override. Empty values are treated as absent.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Return the override for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(String::is_empty)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut new = Overrides::new();
        for (k, v) in iter {
            new.set(k, v);
        }
        new
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum OverrideError {
    #[error("invalid value for --{key}: \"{value}\" is not {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("--{key} targets `{target}`, which the scenario does not define")]
    MissingTarget { key: String, target: String },

    #[error("--{key} requires at least one mitigation interval")]
    NoInterval { key: String },
}

/// Which bound of a `{begin, end}` range an override addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Begin,
    End,
}

impl Bound {
    fn key(self) -> &'static str {
        match self {
            Bound::Begin => "begin",
            Bound::End => "end",
        }
    }
}

/// Where a dedicated override key writes to.
#[derive(Debug, Clone, Copy)]
enum Target {
    R0(Bound),
    StochasticRuns,
    MitigationTime(Bound),
    TransmissionReduction(Bound),
    SimulationRange(Bound),
    Name,
}

/// Dedicated keys reaching into the epidemiological section.
const EPIDEMIOLOGICAL_KEYS: &[(&str, Target)] = &[
    ("r0Low", Target::R0(Bound::Begin)),
    ("r0High", Target::R0(Bound::End)),
];

/// Dedicated keys for the remaining sections and the scenario itself.
const SCENARIO_KEYS: &[(&str, Target)] = &[
    ("numberStochasticRuns", Target::StochasticRuns),
    ("mitTimeRangeBegin", Target::MitigationTime(Bound::Begin)),
    ("mitTimeRangeEnd", Target::MitigationTime(Bound::End)),
    (
        "transmissionReductionLow",
        Target::TransmissionReduction(Bound::Begin),
    ),
    (
        "transmissionReductionHigh",
        Target::TransmissionReduction(Bound::End),
    ),
    ("simulationRangeBegin", Target::SimulationRange(Bound::Begin)),
    ("simulationRangeEnd", Target::SimulationRange(Bound::End)),
    ("name", Target::Name),
];

/// Apply command line overrides to a decoded scenario.
///
/// Every key of the epidemiological and population sections can be replaced
/// by an override of the same name. Dedicated keys (`r0Low`, `mitTimeRangeEnd`,
/// ...) address nested values and are applied after the generic sweep, so they
/// win when both touch the same value. Raw strings are coerced to the JSON
/// type of the value they replace.
pub fn apply_overrides(scenario: &mut Scenario, overrides: &Overrides) -> Result<(), OverrideError> {
    if overrides.is_empty() {
        return Ok(());
    }
    override_section("epidemiological", &mut scenario.epidemiological, overrides)?;
    for &(key, target) in EPIDEMIOLOGICAL_KEYS {
        if let Some(raw) = overrides.get(key) {
            apply_target(scenario, key, target, raw)?;
        }
    }
    override_section("population", &mut scenario.population, overrides)?;
    for &(key, target) in SCENARIO_KEYS {
        if let Some(raw) = overrides.get(key) {
            apply_target(scenario, key, target, raw)?;
        }
    }
    Ok(())
}

fn override_section(
    section_name: &str,
    section: &mut Section,
    overrides: &Overrides,
) -> Result<(), OverrideError> {
    for (key, value) in section.iter_mut() {
        if let Some(raw) = overrides.get(key) {
            *value = coerce(key, value, raw)?;
            info!("override {}.{} = {}", section_name, key, value);
        }
    }
    Ok(())
}

fn apply_target(
    scenario: &mut Scenario,
    key: &str,
    target: Target,
    raw: &str,
) -> Result<(), OverrideError> {
    let (slot, path) = match target {
        Target::Name => {
            scenario.name = Some(raw.to_string());
            info!("override name = {}", raw);
            return Ok(());
        }
        Target::R0(bound) => (
            range_bound(&mut scenario.epidemiological, "r0", bound),
            format!("epidemiological.r0.{}", bound.key()),
        ),
        Target::StochasticRuns => (
            scenario.simulation.get_mut("numberStochasticRuns"),
            "simulation.numberStochasticRuns".to_string(),
        ),
        Target::SimulationRange(bound) => (
            range_bound(&mut scenario.simulation, "simulationTimeRange", bound),
            format!("simulation.simulationTimeRange.{}", bound.key()),
        ),
        Target::MitigationTime(bound) | Target::TransmissionReduction(bound) => {
            let range = match target {
                Target::MitigationTime(_) => "timeRange",
                _ => "transmissionReduction",
            };
            let interval = scenario
                .first_interval_mut()
                .ok_or_else(|| OverrideError::NoInterval {
                    key: key.to_string(),
                })?;
            (
                interval
                    .get_mut(range)
                    .and_then(|r| r.get_mut(bound.key())),
                format!("mitigation.mitigationIntervals[0].{}.{}", range, bound.key()),
            )
        }
    };

    let slot = slot.ok_or_else(|| OverrideError::MissingTarget {
        key: key.to_string(),
        target: path.clone(),
    })?;
    *slot = coerce(key, slot, raw)?;
    info!("override {} = {}", path, slot);
    Ok(())
}

fn range_bound<'a>(section: &'a mut Section, name: &str, bound: Bound) -> Option<&'a mut Value> {
    section.get_mut(name)?.get_mut(bound.key())
}

/// Convert a raw override into the JSON type of the value it replaces.
fn coerce(key: &str, current: &Value, raw: &str) -> Result<Value, OverrideError> {
    let invalid = |expected| OverrideError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        expected,
    };
    let raw = raw.trim();

    match current {
        Value::String(_) => Ok(Value::String(raw.to_string())),
        Value::Number(n) if n.is_i64() || n.is_u64() => match raw.parse::<i64>() {
            Ok(v) => Ok(Value::from(v)),
            Err(_) => parse_float(raw).ok_or_else(|| invalid("a number")),
        },
        Value::Number(_) => parse_float(raw).ok_or_else(|| invalid("a number")),
        Value::Bool(_) => raw
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| invalid("a boolean")),
        Value::Object(_) => match serde_json::from_str::<Value>(raw) {
            Ok(v) if v.is_object() => Ok(v),
            _ => Err(invalid("a JSON object")),
        },
        Value::Array(_) => match serde_json::from_str::<Value>(raw) {
            Ok(v) if v.is_array() => Ok(v),
            _ => Err(invalid("a JSON list")),
        },
        Value::Null => {
            debug!("--{} replaces a null value, keeping it as text", key);
            Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
        }
    }
}

fn parse_float(raw: &str) -> Option<Value> {
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}
