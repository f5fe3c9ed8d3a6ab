//! Validate command implementation

use super::{input_format, load_config, load_input, resolve_input};
use crate::cli::error::CliError;
use crate::config::MetadataConfig;
use crate::import::MetadataFormat;
use crate::validation::MetadataValidator;
use std::path::PathBuf;

/// Arguments of `validate`
#[derive(Debug, Clone)]
pub struct ValidateArgs {
    /// File path or `-` for stdin
    pub input: String,
    /// Report every violation instead of the first
    pub all: bool,
    /// Explicit configuration file
    pub config: Option<PathBuf>,
}

/// Handle the validate command
pub fn handle_validate(args: &ValidateArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let content = load_input(&args.input)?;

    let messages = validate_content(&content, input_format(&args.input), &config, args.all)?;
    if !messages.is_empty() {
        return Err(CliError::ValidationFailed(messages));
    }

    println!("Validation successful");
    Ok(())
}

/// Validate a document and return the violation messages in check order
pub fn validate_content(
    content: &str,
    format: Option<MetadataFormat>,
    config: &MetadataConfig,
    all: bool,
) -> Result<Vec<String>, CliError> {
    let model = resolve_input(content, format, config)?;

    let mut options = config.validation_options();
    if all {
        options.fail_fast = false;
    }
    let result = MetadataValidator::with_options(options).validate_configured(&model);
    Ok(result.messages())
}
