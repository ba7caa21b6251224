//! Serialization and text encoding for buffered sink output.

use crate::config::{OutputEncoding, OutputFormat};
use crate::errors::SinkError;
use crate::Record;
use serde::Serialize;

/// Serializes records into a single document.
///
/// `OutputFormat::None` has no document form of its own and falls back to
/// JSON. An indent of zero produces compact JSON.
pub fn serialize_records(
    records: &[Record],
    format: OutputFormat,
    json_indent: u8,
) -> Result<String, SinkError> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(records)?),
        OutputFormat::Json | OutputFormat::None => to_json(records, json_indent),
    }
}

fn to_json(records: &[Record], indent: u8) -> Result<String, SinkError> {
    if indent == 0 {
        return Ok(serde_json::to_string(records)?);
    }

    let indent = vec![b' '; usize::from(indent)];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|err| SinkError::Serialization(err.to_string()))
}

/// Encodes text for writing to a byte destination.
#[must_use]
pub fn encode_text(text: &str, encoding: OutputEncoding) -> Vec<u8> {
    match encoding {
        OutputEncoding::Default | OutputEncoding::Utf8 => text.as_bytes().to_vec(),
        OutputEncoding::Utf8Bom => {
            let mut bytes = Vec::with_capacity(text.len() + 3);
            bytes.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
            bytes.extend_from_slice(text.as_bytes());
            bytes
        }
        OutputEncoding::Unicode => {
            let mut bytes = Vec::with_capacity(text.len() * 2 + 2);
            bytes.extend_from_slice(&[0xFF, 0xFE]);
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
            bytes
        }
        OutputEncoding::Ascii => text
            .chars()
            .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
            .collect(),
    }
}
