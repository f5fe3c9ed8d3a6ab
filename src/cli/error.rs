//! CLI-specific error types

use crate::config::ConfigError;
use crate::import::ImportError;
use crate::model::LoadError;
use crate::resolver::ResolutionError;
use crate::validation::ClassificationError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read file {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("{0}")]
    Classification(#[from] ClassificationError),

    #[error("Validation failed with {} error(s):\n{}", .0.len(), .0.join("\n"))]
    ValidationFailed(Vec<String>),
}
