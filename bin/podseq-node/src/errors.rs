//! Error types for initialization and configuration.

use std::{io, path::PathBuf};

use format_serde_error::SerdeError;
use podseq_common::logging::LoggingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum InitError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("unparsable chain info file: {0}")]
    UnparsableChainInfo(#[from] SerdeError),

    #[error("unparsable config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config: {0}")]
    MalformedConfig(#[from] ConfigError),

    #[error("datadir path is not valid utf-8: {0:?}")]
    InvalidDatadirPath(PathBuf),

    #[error("building runtime: {0}")]
    RuntimeBuild(#[source] io::Error),

    #[error("logging: {0}")]
    Logging(#[from] LoggingError),
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// Missing key in table.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// Tried to traverse into a primitive.
    #[error("can't traverse into non-table key '{key}' at '{path}'")]
    TraverseNonTableAt { key: String, path: String },

    /// Invalid override string.
    #[error("invalid override: '{0}'")]
    InvalidOverride(String),
}
