//! Error types shared by the whole crate.
use log::info;
use serde::de::DeserializeOwned;
use std::{fs, io, path::Path, path::PathBuf};
use thiserror::Error;

use crate::{
    config::ConfigError, data::DatasetError, editor::EditorError, runner::RunnerError,
    scenario::OverrideError,
};

/// Origin label used when a payload does not come from a file.
pub const INLINE_ORIGIN: &str = "<input>";

/// Malformed or schema-invalid JSON input. Always fatal.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid data in {origin}: `{field}` must be {expected}")]
    Schema {
        origin: String,
        field: String,
        expected: &'static str,
    },
}

impl DecodeError {
    /// Schema violation for a payload that did not come from a file.
    pub fn schema(field: impl Into<String>, expected: &'static str) -> Self {
        DecodeError::Schema {
            origin: INLINE_ORIGIN.to_string(),
            field: field.into(),
            expected,
        }
    }

    /// Attach the file the payload came from.
    pub fn with_origin(self, path: &Path) -> Self {
        let origin = path.display().to_string();
        match self {
            DecodeError::Json { source, .. } => DecodeError::Json { origin, source },
            DecodeError::Schema {
                field, expected, ..
            } => DecodeError::Schema {
                origin,
                field,
                expected,
            },
            other => other,
        }
    }
}

/// Crate level error. Every variant terminates a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Override(#[from] OverrideError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("Run failed: {0}")]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Decode a JSON payload into T.
pub fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, DecodeError> {
    serde_json::from_str(text).map_err(|source| DecodeError::Json {
        origin: INLINE_ORIGIN.to_string(),
        source,
    })
}

/// Read a file in JSON format.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DecodeError> {
    info!("Reading data from file {}", path.display());
    let text = fs::read_to_string(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_json(&text).map_err(|err| err.with_origin(path))
}

/// Write text to a file, creating or truncating it.
pub fn write_file(path: &Path, data: &str) -> Result<()> {
    fs::write(path, data).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
