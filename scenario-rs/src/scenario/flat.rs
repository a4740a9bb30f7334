use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use super::Scenario;

/// All scenario sections merged into a single map. This is the parameter bag
/// handed to the model runner.
pub type ScenarioFlat = IndexMap<String, Value>;

/// Merge the population, epidemiological, simulation and mitigation sections,
/// in this order, into one map.
///
/// Sections are expected to define disjoint keys. When they do not, the value
/// of the section merged last wins.
pub fn flatten(scenario: &Scenario) -> ScenarioFlat {
    let sections = [
        &scenario.population,
        &scenario.epidemiological,
        &scenario.simulation,
        &scenario.mitigation,
    ];
    let mut flat = ScenarioFlat::with_capacity(sections.iter().map(|s| s.len()).sum());
    for section in sections.iter() {
        for (key, value) in section.iter() {
            if let Some(previous) = flat.insert(key.clone(), value.clone()) {
                debug!("flatten: `{}` = {} replaced by {}", key, previous, value);
            }
        }
    }
    flat
}

impl Scenario {
    pub fn flatten(&self) -> ScenarioFlat {
        flatten(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::tests::scenario;
    use serde_json::json;

    #[test]
    fn all_sections_are_merged() {
        let s = scenario();
        let flat = s.flatten();
        assert_eq!(
            flat.len(),
            s.population.len() + s.epidemiological.len() + s.simulation.len() + s.mitigation.len()
        );
        assert_eq!(flat["ageDistributionName"], json!("CountryA"));
        assert_eq!(flat["r0"], json!({ "begin": 2.0, "end": 3.0 }));
        assert_eq!(flat["numberStochasticRuns"], json!(10));
        assert!(flat["mitigationIntervals"].is_array());
        assert_eq!(flat.keys().next().map(String::as_str), Some("ageDistributionName"));
    }

    #[test]
    fn last_merged_section_wins_on_collision() {
        let mut s = scenario();
        s.population.insert("shared".into(), json!("population"));
        s.epidemiological.insert("shared".into(), json!("epidemiological"));
        s.mitigation.insert("shared".into(), json!("mitigation"));
        let flat = flatten(&s);
        assert_eq!(flat["shared"], json!("mitigation"));
    }

    #[test]
    fn flattening_does_not_touch_the_scenario() {
        let s = scenario();
        let _ = flatten(&s);
        assert_eq!(s, scenario());
    }
}
