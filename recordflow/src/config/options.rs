//! Option groups and the merge rule.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default JSON indentation when none is configured.
pub const DEFAULT_JSON_INDENT: u8 = 2;

/// Largest accepted JSON indentation.
pub const MAX_JSON_INDENT: u8 = 4;

/// Serialization format for sink output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Records are emitted as-is.
    #[default]
    #[serde(alias = "None")]
    None,
    /// A single JSON array document.
    #[serde(alias = "Json", alias = "JSON")]
    Json,
    /// A single YAML sequence document.
    #[serde(alias = "Yaml", alias = "YAML")]
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Json => "json",
            Self::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

/// Text encoding for serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputEncoding {
    /// Platform default, which is UTF-8 without a byte order mark.
    #[default]
    #[serde(alias = "Default")]
    Default,
    /// UTF-8 without a byte order mark.
    #[serde(alias = "UTF8", alias = "utf-8")]
    Utf8,
    /// UTF-8 with a byte order mark.
    #[serde(alias = "UTF8BOM")]
    Utf8Bom,
    /// UTF-16 little endian with a byte order mark.
    #[serde(alias = "Unicode")]
    Unicode,
    /// 7-bit ASCII; other characters become `?`.
    #[serde(alias = "ASCII")]
    Ascii,
}

impl FromStr for OutputEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "default" | "" => Ok(Self::Default),
            "utf8" => Ok(Self::Utf8),
            "utf8bom" | "utf8_bom" => Ok(Self::Utf8Bom),
            "unicode" | "utf16" => Ok(Self::Unicode),
            "ascii" => Ok(Self::Ascii),
            other => Err(format!("unknown output encoding '{other}'")),
        }
    }
}

/// The "output" option group.
///
/// Every field is optional so a partial configuration can be told apart
/// from one that explicitly sets a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Destination file path. Unset means output goes to the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Serialization format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    /// Text encoding for serialized output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<OutputEncoding>,
    /// JSON indentation in spaces.
    #[serde(default, alias = "jsonIndent", skip_serializing_if = "Option::is_none")]
    pub json_indent: Option<u8>,
}

impl OutputOptions {
    /// Creates an empty output group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the output encoding.
    #[must_use]
    pub const fn with_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Sets the JSON indentation.
    #[must_use]
    pub const fn with_json_indent(mut self, indent: u8) -> Self {
        self.json_indent = Some(indent);
        self
    }

    /// Merges `other` into `self`; fields set in `other` win.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref path) = other.path {
            self.path = Some(path.clone());
        }
        if other.format.is_some() {
            self.format = other.format;
        }
        if other.encoding.is_some() {
            self.encoding = other.encoding;
        }
        if other.json_indent.is_some() {
            self.json_indent = other.json_indent;
        }
    }

    /// Returns the resolved format.
    #[must_use]
    pub fn resolved_format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    /// Returns the resolved encoding.
    #[must_use]
    pub fn resolved_encoding(&self) -> OutputEncoding {
        self.encoding.unwrap_or_default()
    }

    /// Returns the resolved JSON indentation.
    #[must_use]
    pub fn resolved_json_indent(&self) -> u8 {
        self.json_indent.unwrap_or(DEFAULT_JSON_INDENT)
    }

    /// Returns true if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.path.is_none()
            && self.format.is_none()
            && self.encoding.is_none()
            && self.json_indent.is_none()
    }
}

/// A (possibly partial) pipeline configuration.
///
/// Only the `output` group is interpreted here. Every other top-level group
/// is kept verbatim in `extra` for collaborators that understand it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// The output option group.
    #[serde(default, skip_serializing_if = "OutputOptions::is_empty")]
    pub output: OutputOptions,
    /// Uninterpreted option groups.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PipelineOptions {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output group.
    #[must_use]
    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }

    /// Sets an uninterpreted option group.
    #[must_use]
    pub fn with_group(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    /// Returns an uninterpreted option group.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }

    /// Merges `other` into `self`.
    ///
    /// Output fields merge individually; other groups are replaced per key.
    pub fn merge(&mut self, other: &Self) {
        self.output.merge(&other.output);
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Returns true if nothing is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.output.is_empty() && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_last_writer_wins() {
        let mut options = PipelineOptions::new().with_output(
            OutputOptions::new()
                .with_path("a.json")
                .with_format(OutputFormat::Json),
        );
        options.merge(
            &PipelineOptions::new().with_output(OutputOptions::new().with_path("b.json")),
        );

        assert_eq!(options.output.path, Some(PathBuf::from("b.json")));
        assert_eq!(options.output.format, Some(OutputFormat::Json));
        assert_eq!(options.output.encoding, None);
    }

    #[test]
    fn test_merge_sequence_matches_last_setter() {
        let partials = [
            OutputOptions::new().with_json_indent(1),
            OutputOptions::new().with_encoding(OutputEncoding::Ascii),
            OutputOptions::new().with_json_indent(4),
            OutputOptions::new(),
        ];

        let mut merged = OutputOptions::new();
        for partial in &partials {
            merged.merge(partial);
        }

        assert_eq!(merged.json_indent, Some(4));
        assert_eq!(merged.encoding, Some(OutputEncoding::Ascii));
        assert_eq!(merged.path, None);
        assert_eq!(merged.format, None);
    }

    #[test]
    fn test_merge_extra_groups() {
        let mut options = PipelineOptions::new()
            .with_group("rule", serde_json::json!({"include": ["a"]}))
            .with_group("execution", serde_json::json!({"mode": "strict"}));
        options.merge(&PipelineOptions::new().with_group("rule", serde_json::json!({"include": ["b"]})));

        assert_eq!(options.group("rule"), Some(&serde_json::json!({"include": ["b"]})));
        assert_eq!(options.group("execution"), Some(&serde_json::json!({"mode": "strict"})));
    }

    #[test]
    fn test_resolved_defaults() {
        let output = OutputOptions::new();
        assert_eq!(output.resolved_format(), OutputFormat::None);
        assert_eq!(output.resolved_encoding(), OutputEncoding::Default);
        assert_eq!(output.resolved_json_indent(), DEFAULT_JSON_INDENT);
    }

    #[test]
    fn test_default_encoding_is_plain_utf8() {
        let text = "naïve";
        let resolved = OutputOptions::new().resolved_encoding();
        assert_eq!(
            crate::sink::encode_text(text, resolved),
            crate::sink::encode_text(text, OutputEncoding::Utf8)
        );
    }

    #[test]
    fn test_deserialize_passes_through_unknown_groups() {
        let options: PipelineOptions = serde_json::from_value(serde_json::json!({
            "output": {"path": "out.json", "format": "Json", "jsonIndent": 0},
            "configuration": {"token": "abc"}
        }))
        .unwrap();

        assert_eq!(options.output.format, Some(OutputFormat::Json));
        assert_eq!(options.output.json_indent, Some(0));
        assert_eq!(options.group("configuration"), Some(&serde_json::json!({"token": "abc"})));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("yml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert!("csv".parse::<OutputFormat>().is_err());
        assert_eq!("UTF-8".parse::<OutputEncoding>(), Ok(OutputEncoding::Utf8));
    }
}
