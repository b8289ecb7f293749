//! Value-to-bytes conversion applied before every storage write.
//!
//! Structured values are written as JSON with `", "` and `": "` separators and
//! every non-ASCII character escaped, so a payload always produces the same
//! bytes regardless of platform or locale.

use crate::domain::model::Payload;
use crate::utils::error::{IngestError, Result};
use chrono::SecondsFormat;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::io;

#[derive(Debug, Clone, Copy, Default)]
pub struct ByteEncoder;

impl ByteEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, value: &Payload) -> Result<Vec<u8>> {
        match value {
            Payload::Text(text) => Ok(text.as_bytes().to_vec()),
            Payload::Bytes(bytes) => Ok(bytes.clone()),
            Payload::Mapping(_) | Payload::Sequence(_) => encode_structured(value),
            Payload::Integer(integer) => Ok(integer.to_string().into_bytes()),
            Payload::UnsignedInteger(integer) => Ok(integer.to_string().into_bytes()),
            Payload::Float(float) => Ok(format_float(*float).into_bytes()),
            // a lone boolean is written the way a number is, not as JSON
            Payload::Boolean(true) => Ok(b"True".to_vec()),
            Payload::Boolean(false) => Ok(b"False".to_vec()),
            Payload::DateTime(moment) => {
                let format = if moment.timestamp_subsec_nanos() == 0 {
                    SecondsFormat::Secs
                } else {
                    SecondsFormat::Micros
                };
                Ok(moment.to_rfc3339_opts(format, false).into_bytes())
            }
            Payload::Date(date) => Ok(date.format("%Y-%m-%d").to_string().into_bytes()),
            Payload::Duration(delta) => {
                let seconds =
                    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1_000_000_000.0;
                Ok(format_float(seconds).into_bytes())
            }
            Payload::Null => Err(IngestError::UnsupportedValueType {
                kind: value.kind().to_string(),
            }),
        }
    }
}

fn encode_structured(value: &Payload) -> Result<Vec<u8>> {
    if let Some(kind) = first_unencodable(value) {
        return Err(IngestError::UnsupportedValueType {
            kind: format!("{} nested inside a {}", kind, value.kind()),
        });
    }

    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, SpacedAsciiFormatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| IngestError::UnsupportedValueType {
            kind: e.to_string(),
        })?;
    Ok(buffer)
}

/// Depth-first search for a value JSON cannot carry.
fn first_unencodable(value: &Payload) -> Option<&'static str> {
    match value {
        Payload::Null
        | Payload::Boolean(_)
        | Payload::Integer(_)
        | Payload::UnsignedInteger(_)
        | Payload::Text(_) => None,
        Payload::Float(float) if float.is_finite() => None,
        Payload::Float(_) => Some("non-finite float"),
        Payload::Sequence(items) => items.iter().find_map(first_unencodable),
        Payload::Mapping(entries) => entries
            .iter()
            .find_map(|(_, entry)| first_unencodable(entry)),
        Payload::Bytes(_) | Payload::DateTime(_) | Payload::Date(_) | Payload::Duration(_) => {
            Some(value.kind())
        }
    }
}

fn format_float(float: f64) -> String {
    if float.is_nan() {
        "nan".to_string()
    } else if float == f64::INFINITY {
        "inf".to_string()
    } else if float == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        serde_json::Number::from_f64(float)
            .map(|number| number.to_string())
            .unwrap_or_else(|| float.to_string())
    }
}

impl Serialize for Payload {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Payload::Null => serializer.serialize_unit(),
            Payload::Boolean(flag) => serializer.serialize_bool(*flag),
            Payload::Integer(integer) => serializer.serialize_i64(*integer),
            Payload::UnsignedInteger(integer) => serializer.serialize_u64(*integer),
            Payload::Float(float) if float.is_finite() => serializer.serialize_f64(*float),
            Payload::Text(text) => serializer.serialize_str(text),
            Payload::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Payload::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, entry) in entries {
                    map.serialize_entry(key, entry)?;
                }
                map.end()
            }
            other => Err(S::Error::custom(format!(
                "{} cannot be written as JSON",
                other.kind()
            ))),
        }
    }
}

/// JSON formatter with spaced separators and `\uXXXX` escapes for non-ASCII text.
struct SpacedAsciiFormatter;

impl serde_json::ser::Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        let mut ascii_start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[ascii_start..index])?;
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            ascii_start = index + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[ascii_start..])
    }
}
