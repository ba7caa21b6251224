//! Loading partial configurations from documents and the environment.

use super::{OutputEncoding, OutputFormat, OutputOptions, PipelineOptions, MAX_JSON_INDENT};
use crate::errors::{ConfigurationError, ErrorInfo};
use std::path::Path;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "RECORDFLOW_";

const ENV_OUTPUT_PATH: &str = "RECORDFLOW_OUTPUT_PATH";
const ENV_OUTPUT_FORMAT: &str = "RECORDFLOW_OUTPUT_FORMAT";
const ENV_OUTPUT_ENCODING: &str = "RECORDFLOW_OUTPUT_ENCODING";
const ENV_OUTPUT_JSON_INDENT: &str = "RECORDFLOW_OUTPUT_JSONINDENT";

impl PipelineOptions {
    /// Parses options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the document is malformed.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(text).map_err(|err| parse_error("json", &err.to_string()))
    }

    /// Parses options from a YAML document.
    ///
    /// An empty document yields empty options.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the document is malformed.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigurationError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|err| parse_error("yaml", &err.to_string()))
    }

    /// Reads options from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the file cannot be read, has an
    /// unknown extension, or is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            ConfigurationError::new(format!(
                "Failed to read options file '{}': {err}",
                path.display()
            ))
            .with_info(
                ErrorInfo::new("CONFIG-FILE-READ", "Options file could not be read")
                    .with_context_entry("path", path.display().to_string()),
            )
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Self::from_json_str(&text),
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            _ => Err(ConfigurationError::new(format!(
                "Unsupported options file '{}'",
                path.display()
            ))
            .with_info(
                ErrorInfo::new("CONFIG-FILE-FORMAT", "Unknown options file extension")
                    .with_fix_hint("Use a .json, .yaml or .yml options file."),
            )),
        }
    }

    /// Builds a partial configuration from `RECORDFLOW_OUTPUT_*` variables.
    ///
    /// Unrelated variables are ignored and unset variables leave the
    /// corresponding field unset, so the result merges cleanly.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a recognised variable has an
    /// invalid value.
    pub fn from_env_vars<I, K, V>(vars: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut output = OutputOptions::new();

        for (key, value) in vars {
            let key = key.as_ref();
            if !key.starts_with(ENV_PREFIX) {
                continue;
            }
            let value = value.as_ref();

            match key {
                ENV_OUTPUT_PATH if !value.is_empty() => output.path = Some(value.into()),
                ENV_OUTPUT_FORMAT => {
                    output.format = Some(
                        value
                            .parse::<OutputFormat>()
                            .map_err(|msg: String| env_error(key, &msg))?,
                    );
                }
                ENV_OUTPUT_ENCODING => {
                    output.encoding = Some(
                        value
                            .parse::<OutputEncoding>()
                            .map_err(|msg: String| env_error(key, &msg))?,
                    );
                }
                ENV_OUTPUT_JSON_INDENT => {
                    let indent = value
                        .trim()
                        .parse::<u8>()
                        .ok()
                        .filter(|indent| *indent <= MAX_JSON_INDENT)
                        .ok_or_else(|| {
                            env_error(key, &format!("expected 0..={MAX_JSON_INDENT}, got '{value}'"))
                        })?;
                    output.json_indent = Some(indent);
                }
                _ => {}
            }
        }

        Ok(Self::new().with_output(output))
    }

    /// Builds a partial configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`PipelineOptions::from_env_vars`].
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_env_vars(std::env::vars())
    }
}

fn parse_error(kind: &str, detail: &str) -> ConfigurationError {
    ConfigurationError::new(format!("Invalid {kind} options document: {detail}")).with_info(
        ErrorInfo::new("CONFIG-PARSE", "Options document could not be parsed")
            .with_context_entry("format", kind),
    )
}

fn env_error(key: &str, detail: &str) -> ConfigurationError {
    ConfigurationError::new(format!("Invalid value for {key}: {detail}")).with_info(
        ErrorInfo::new("CONFIG-ENV", "Environment override has an invalid value")
            .with_context_entry("variable", key),
    )
}
