//! Settings read from `conf.toml`.
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path, path::PathBuf};
use thiserror::Error;

use crate::editor::ChangeSet;

/// Default location of the configuration file.
pub const CONFIG_FILE: &str = "conf.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown log level \"{0}\"")]
    LogLevel(String),
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Bundled collection of named severity distributions.
    pub severity_distributions: PathBuf,
    /// Bundled collection of named age distributions.
    pub age_distributions: PathBuf,
    /// Severity distribution used when no file is given.
    pub default_severity_name: String,
    /// Where the scenario actually run is written.
    pub audit_path: PathBuf,
    /// Optional CSV export of the age group table.
    pub table_csv: Option<PathBuf>,
    pub seed: u64,
    pub log_level: String,
    /// Edits committed to the age group table before running.
    pub edits: ChangeSet,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            severity_distributions: "./src/assets/data/severityDistributions.json".into(),
            age_distributions: "./src/assets/data/ageDistribution.json".into(),
            default_severity_name: "China CDC".into(),
            audit_path: "scenariofile.json".into(),
            table_csv: None,
            seed: 0,
            log_level: "info".into(),
            edits: ChangeSet::new(),
        }
    }
}

impl Config {
    pub fn from_toml(data: &str, path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(data).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_path(path: &Path) -> Result<Config, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_toml(&data, path)
    }

    /// Path of `conf.toml` in the working directory, if there is one.
    pub fn locate() -> Option<&'static Path> {
        Some(Path::new(CONFIG_FILE)).filter(|path| path.exists())
    }

    /// Read `conf.toml` from the working directory, or use the defaults if
    /// there is no such file.
    pub fn load() -> Result<Config, ConfigError> {
        match Config::locate() {
            Some(path) => Config::from_path(path),
            None => Ok(Config::default()),
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn missing_keys_use_defaults() {
        let cfg = Config::from_toml("seed = 42\n", Path::new("conf.toml")).unwrap();
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.default_severity_name, "China CDC");
        assert_eq!(cfg.audit_path, PathBuf::from("scenariofile.json"));
        assert!(cfg.edits.is_empty());
        assert_eq!(cfg.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn edits_are_read_by_row_id() {
        let data = r#"
            log_level = "debug"
            table_csv = "table.csv"

            [edits."20-29"]
            population = 1500.0
            fatal = 12.5
        "#;
        let cfg = Config::from_toml(data, Path::new("conf.toml")).unwrap();
        assert_eq!(cfg.level_filter().unwrap(), LevelFilter::Debug);
        assert_eq!(cfg.table_csv, Some(PathBuf::from("table.csv")));
        let patch = &cfg.edits["20-29"];
        assert_approx_eq!(patch.population.unwrap(), 1500.0);
        assert_approx_eq!(patch.fatal.unwrap(), 12.5);
        assert!(patch.severe.is_none());
    }

    #[test]
    fn load_falls_back_to_defaults() {
        if Config::locate().is_none() {
            assert_eq!(Config::load().unwrap(), Config::default());
        }
        let missing = Path::new("no-such-dir").join(CONFIG_FILE);
        assert!(matches!(
            Config::from_path(&missing),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn invalid_config() {
        let err = Config::from_toml("seed = \"x\"", Path::new("conf.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));

        let cfg = Config {
            log_level: "loud".into(),
            ..Default::default()
        };
        assert!(matches!(cfg.level_filter(), Err(ConfigError::LogLevel(_))));
    }
}
