//! CLI command implementations

pub mod classify;
pub mod inspect;
pub mod validate;

use crate::cli::error::CliError;
use crate::config::MetadataConfig;
use crate::import::MetadataFormat;
use crate::model::MetadataLoader;
use crate::resolver::ResolvedModel;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Load input content from file or stdin (`-`)
pub fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

/// Format hint from the input's file extension; stdin is sniffed
pub fn input_format(input: &str) -> Option<MetadataFormat> {
    if input == "-" {
        None
    } else {
        MetadataFormat::from_path(Path::new(input))
    }
}

/// Read an explicit config file, or `.odata-metadata.toml` in the current
/// directory. Environment overrides apply in both cases.
pub fn load_config(path: Option<&Path>) -> Result<MetadataConfig, CliError> {
    let config = match path {
        Some(path) => {
            let mut config = MetadataConfig::from_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| CliError::InvalidArgument(format!("No working directory: {}", e)))?;
            MetadataConfig::load(&cwd)?
        }
    };
    Ok(config)
}

/// Parse and resolve a document without running the validator
pub fn resolve_input(
    content: &str,
    format: Option<MetadataFormat>,
    config: &MetadataConfig,
) -> Result<ResolvedModel, CliError> {
    let mut config = config.clone();
    config.loader.validate_on_load = false;
    Ok(MetadataLoader::with_config(config).build_model(content, format)?)
}
