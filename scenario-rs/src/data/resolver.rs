use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use super::{DatasetError, Distribution, DistributionData};
use crate::{
    error::{read_json, DecodeError},
    prelude::sort_by_age_group,
};

/// A bundled collection of named distributions, `{ "all": [...] }`.
///
/// Entries are kept as raw JSON. Only the entry selected by name is decoded
/// into typed data, so a malformed entry that is never selected does not make
/// resolution fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSet {
    pub all: Vec<Value>,
}

impl DatasetSet {
    /// Load a bundled collection from disk.
    pub fn from_path(path: &Path) -> Result<Self, DecodeError> {
        read_json(path)
    }

    /// Names of all entries, in file order.
    pub fn names(&self) -> Vec<&str> {
        self.all
            .iter()
            .filter_map(|entry| entry.get("name").and_then(Value::as_str))
            .collect()
    }

    /// Return the raw entry whose name is exactly `name`.
    pub fn entry(&self, name: &str) -> Option<&Value> {
        self.all
            .iter()
            .find(|entry| entry.get("name").and_then(Value::as_str) == Some(name))
    }

    /// Decode the entry called `name` and return its data sorted by age group.
    pub fn find<T: Distribution>(&self, name: &str) -> Result<Vec<T>, DatasetError> {
        let entry = self.entry(name).ok_or_else(|| {
            warn!(
                "{} \"{}\" not found, available: {:?}",
                T::KIND,
                name,
                self.names()
            );
            DatasetError::NotFound {
                kind: T::KIND,
                name: name.to_string(),
            }
        })?;

        let mut distribution: DistributionData<T> = serde_json::from_value(entry.clone())
            .map_err(|source| DecodeError::Json {
                origin: format!("{} \"{}\"", T::KIND, name),
                source,
            })?;

        sort_by_age_group(&mut distribution.data);
        for pair in distribution.data.windows(2) {
            if pair[0].age_group() == pair[1].age_group() {
                return Err(DatasetError::DuplicateAgeGroup {
                    kind: T::KIND,
                    name: name.to_string(),
                    age_group: pair[0].age_group(),
                });
            }
        }
        debug!("resolved {} \"{}\" from bundled data", T::KIND, name);
        Ok(distribution.data)
    }
}

/// Read a standalone distribution file, `{ "data": [...] }`, and return its
/// data exactly as written.
pub fn read_standalone<T: Distribution>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let distribution: DistributionData<T> = read_json(path)?;
    Ok(distribution.data)
}

/// Resolve a distribution.
///
/// An explicit file takes priority and is returned verbatim: no name lookup,
/// no sorting. Otherwise the entry called `name` is taken from `bundled` and
/// sorted by age group.
pub fn resolve<T: Distribution>(
    explicit: Option<&Path>,
    name: &str,
    bundled: &DatasetSet,
) -> Result<Vec<T>, DatasetError> {
    match explicit {
        Some(path) => read_standalone(path),
        None => bundled.find(name),
    }
}

/// Same as [`resolve`], but only loads the bundled collection from
/// `bundled_path` when no explicit file is given.
pub fn resolve_from_file<T: Distribution>(
    explicit: Option<&Path>,
    name: &str,
    bundled_path: &Path,
) -> Result<Vec<T>, DatasetError> {
    match explicit {
        Some(path) => read_standalone(path),
        None => DatasetSet::from_path(bundled_path)?.find(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AgeDistributionDatum, AgeGroup, DatasetKind, SeverityDistributionDatum};
    use crate::prelude::ForAgeGroup;
    use serde_json::json;
    use std::{fs, path::PathBuf};

    fn temp_file(name: &str, value: &Value) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "covid-scenario-resolver-{}-{}.json",
            std::process::id(),
            name
        ));
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn bundled() -> DatasetSet {
        serde_json::from_value(json!({
            "all": [
                {
                    "name": "CountryA",
                    "data": [
                        { "ageGroup": "80+", "population": 5.0 },
                        { "ageGroup": "0-9", "population": 10.0 },
                        { "ageGroup": "20-29", "population": 30.0 },
                        { "ageGroup": "10-19", "population": 20.0 }
                    ]
                },
                { "name": "Broken", "data": "not a list" },
                {
                    "name": "Duplicated",
                    "data": [
                        { "ageGroup": "0-9", "population": 1.0 },
                        { "ageGroup": "0-9", "population": 2.0 }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn named_entry_is_sorted() {
        let data: Vec<AgeDistributionDatum> = resolve(None, "CountryA", &bundled()).unwrap();
        let groups: Vec<AgeGroup> = data.iter().map(|d| d.age_group()).collect();
        assert_eq!(
            groups,
            vec![
                AgeGroup::Age0To9,
                AgeGroup::Age10To19,
                AgeGroup::Age20To29,
                AgeGroup::Age80Plus
            ]
        );
        assert!(groups.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(data[3].population, 5.0);
    }

    #[test]
    fn missing_name_is_not_found() {
        let res: Result<Vec<AgeDistributionDatum>, _> = resolve(None, "countrya", &bundled());
        match res {
            Err(DatasetError::NotFound { kind, name }) => {
                assert_eq!(kind, DatasetKind::Age);
                assert_eq!(name, "countrya");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn only_the_selected_entry_is_decoded() {
        let res: Result<Vec<AgeDistributionDatum>, _> = resolve(None, "Broken", &bundled());
        assert!(matches!(res, Err(DatasetError::Decode(DecodeError::Json { .. }))));
        assert!(resolve::<AgeDistributionDatum>(None, "CountryA", &bundled()).is_ok());
    }

    #[test]
    fn duplicates_are_rejected() {
        let res: Result<Vec<AgeDistributionDatum>, _> = resolve(None, "Duplicated", &bundled());
        assert!(matches!(
            res,
            Err(DatasetError::DuplicateAgeGroup {
                age_group: AgeGroup::Age0To9,
                ..
            })
        ));
    }

    #[test]
    fn explicit_file_is_returned_verbatim() {
        let path = temp_file(
            "explicit",
            &json!({
                "data": [
                    { "ageGroup": "20-29", "confirmed": 5.0, "severe": 1.0, "critical": 2.0, "fatal": 3.0, "isolated": 0.0 },
                    { "ageGroup": "0-9", "confirmed": 5.0, "severe": 1.0, "critical": 2.0, "fatal": 3.0, "isolated": 0.0 }
                ]
            }),
        );
        // Neither the name nor the (empty) bundled collection are consulted.
        let data: Vec<SeverityDistributionDatum> =
            resolve(Some(&path), "does not exist", &DatasetSet::default()).unwrap();
        assert_eq!(data[0].age_group, AgeGroup::Age20To29);
        assert_eq!(data[1].age_group, AgeGroup::Age0To9);

        let data: Vec<SeverityDistributionDatum> =
            resolve_from_file(Some(&path), "", Path::new("/no/bundled/file.json")).unwrap();
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn names_are_listed_in_order() {
        assert_eq!(bundled().names(), vec!["CountryA", "Broken", "Duplicated"]);
    }
}
