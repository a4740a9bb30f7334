//! Scenario files: decoding, command line overrides and flattening.
//!
//! A scenario groups the simulation inputs in four sections. Sections are
//! kept as ordered maps of JSON values instead of fixed structs: overrides are
//! applied by iterating over the keys a section actually defines, and the
//! model runner receives all sections merged into one flat map.
mod flat;
mod overrides;
pub mod schema;
mod types;

pub use flat::*;
pub use overrides::*;
pub use types::*;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{decode_json, read_json, DecodeError};

/// One section of a scenario, field name -> value, in file order.
pub type Section = IndexMap<String, Value>;

/// A decoded scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub population: Section,
    pub epidemiological: Section,
    pub simulation: Section,
    pub mitigation: Section,
}

/// Sections of a scenario as stored under the `data` key of a scenario file.
#[derive(Debug, Clone, Deserialize)]
struct ScenarioDatum {
    population: Section,
    epidemiological: Section,
    simulation: Section,
    mitigation: Section,
}

/// On-disk layout, `{ "name": ..., "data": { ... } }`.
#[derive(Debug, Clone, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    name: Option<String>,
    data: ScenarioDatum,
}

impl Scenario {
    /// Decode and validate a scenario file payload.
    pub fn decode(json: &str) -> Result<Scenario, DecodeError> {
        let file: ScenarioFile = decode_json(json)?;
        Scenario::from_file(file)
    }

    /// Read, decode and validate a scenario file.
    pub fn from_path(path: &Path) -> Result<Scenario, DecodeError> {
        let file: ScenarioFile = read_json(path)?;
        Scenario::from_file(file).map_err(|err| err.with_origin(path))
    }

    fn from_file(file: ScenarioFile) -> Result<Scenario, DecodeError> {
        let scenario = Scenario {
            name: file.name,
            population: file.data.population,
            epidemiological: file.data.epidemiological,
            simulation: file.data.simulation,
            mitigation: file.data.mitigation,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check that all sections define the fields the pipeline relies on.
    pub fn validate(&self) -> Result<(), DecodeError> {
        schema::check_section("population", &self.population, schema::POPULATION)?;
        schema::check_section(
            "epidemiological",
            &self.epidemiological,
            schema::EPIDEMIOLOGICAL,
        )?;
        schema::check_section("simulation", &self.simulation, schema::SIMULATION)?;
        schema::check_section("mitigation", &self.mitigation, schema::MITIGATION)
    }

    /// Name of the age distribution selected by the scenario.
    pub fn age_distribution_name(&self) -> Option<&str> {
        self.population
            .get("ageDistributionName")
            .and_then(Value::as_str)
    }

    /// Mutable access to the first mitigation interval, if any.
    pub fn first_interval_mut(&mut self) -> Option<&mut Value> {
        self.mitigation
            .get_mut("mitigationIntervals")?
            .as_array_mut()?
            .first_mut()
    }

    /// Encode the scenario with the same layout as a scenario file.
    pub fn to_file_json(&self) -> Result<String, serde_json::Error> {
        let mut file = serde_json::Map::new();
        if let Some(name) = &self.name {
            file.insert("name".into(), Value::String(name.clone()));
        }
        file.insert(
            "data".into(),
            serde_json::json!({
                "population": self.population,
                "epidemiological": self.epidemiological,
                "simulation": self.simulation,
                "mitigation": self.mitigation,
            }),
        );
        serde_json::to_string_pretty(&Value::Object(file))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// A complete, valid scenario file used across the crate tests.
    pub fn scenario_json() -> Value {
        json!({
            "name": "Test scenario",
            "data": {
                "population": {
                    "ageDistributionName": "CountryA",
                    "caseCountsName": "none",
                    "hospitalBeds": 1000,
                    "icuBeds": 100,
                    "importsPerDay": 0.1,
                    "initialNumberOfCases": 10,
                    "populationServed": 100000
                },
                "epidemiological": {
                    "hospitalStayDays": 3,
                    "icuStayDays": 14,
                    "infectiousPeriodDays": 3,
                    "latencyDays": 3,
                    "overflowSeverity": 2,
                    "peakMonth": 0,
                    "r0": { "begin": 2.0, "end": 3.0 },
                    "seasonalForcing": 0.0
                },
                "simulation": {
                    "numberStochasticRuns": 10,
                    "simulationTimeRange": { "begin": "2020-03-01", "end": "2020-04-30" }
                },
                "mitigation": {
                    "mitigationIntervals": [
                        {
                            "name": "Lockdown",
                            "color": "#bf5b17",
                            "timeRange": { "begin": "2020-03-15", "end": "2020-04-15" },
                            "transmissionReduction": { "begin": 40, "end": 60 }
                        },
                        {
                            "name": "Masks",
                            "timeRange": { "begin": "2020-04-16", "end": "2020-04-30" },
                            "transmissionReduction": { "begin": 10, "end": 20 }
                        }
                    ]
                }
            }
        })
    }

    pub fn scenario() -> Scenario {
        Scenario::decode(&scenario_json().to_string()).unwrap()
    }

    #[test]
    fn decode_keeps_sections_and_name() {
        let s = scenario();
        assert_eq!(s.name.as_deref(), Some("Test scenario"));
        assert_eq!(s.age_distribution_name(), Some("CountryA"));
        assert_eq!(s.epidemiological["r0"]["end"], json!(3.0));
        let keys: Vec<&String> = s.population.keys().collect();
        assert_eq!(keys[0], "ageDistributionName");
        assert_eq!(keys[6], "populationServed");
    }

    #[test]
    fn schema_violations_are_fatal() {
        let mut data = scenario_json();
        data["data"]["epidemiological"]["r0"] = json!(2.5);
        let err = Scenario::decode(&data.to_string()).unwrap_err();
        assert!(matches!(err, DecodeError::Schema { ref field, .. } if field == "epidemiological.r0"));

        let mut data = scenario_json();
        data["data"].as_object_mut().unwrap().remove("mitigation");
        assert!(matches!(
            Scenario::decode(&data.to_string()),
            Err(DecodeError::Json { .. })
        ));

        assert!(Scenario::decode("{ not json").is_err());
    }

    #[test]
    fn file_layout_is_preserved() {
        let s = scenario();
        let encoded = s.to_file_json().unwrap();
        assert_eq!(Scenario::decode(&encoded).unwrap(), s);
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["name"], json!("Test scenario"));
        assert!(value["data"]["population"].is_object());
    }

    #[test]
    fn unknown_fields_are_kept() {
        let mut data = scenario_json();
        data["data"]["simulation"]["extra"] = json!("kept");
        let s = Scenario::decode(&data.to_string()).unwrap();
        assert_eq!(s.simulation["extra"], json!("kept"));
    }
}
