use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

/// A value travelling from a source, through a transformer, into storage.
///
/// Mappings keep their entries in insertion order; that order is what ends
/// up on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Null,
    Boolean(bool),
    Integer(i64),
    /// Integers above `i64::MAX`.
    UnsignedInteger(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
    Duration(TimeDelta),
    Sequence(Vec<Payload>),
    Mapping(Vec<(String, Payload)>),
}

impl Payload {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Null => "null",
            Payload::Boolean(_) => "boolean",
            Payload::Integer(_) | Payload::UnsignedInteger(_) => "integer",
            Payload::Float(_) => "float",
            Payload::Text(_) => "text",
            Payload::Bytes(_) => "bytes",
            Payload::DateTime(_) => "datetime",
            Payload::Date(_) => "date",
            Payload::Duration(_) => "duration",
            Payload::Sequence(_) => "sequence",
            Payload::Mapping(_) => "mapping",
        }
    }

    /// First value stored under `key`, if this is a mapping.
    pub fn get(&self, key: &str) -> Option<&Payload> {
        match self {
            Payload::Mapping(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Payload::Null,
            serde_json::Value::Bool(flag) => Payload::Boolean(flag),
            serde_json::Value::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    Payload::Integer(integer)
                } else if let Some(integer) = number.as_u64() {
                    Payload::UnsignedInteger(integer)
                } else {
                    Payload::Float(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(text) => Payload::Text(text),
            serde_json::Value::Array(items) => {
                Payload::Sequence(items.into_iter().map(Payload::from).collect())
            }
            serde_json::Value::Object(object) => Payload::Mapping(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Payload::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<i64> for Payload {
    fn from(integer: i64) -> Self {
        Payload::Integer(integer)
    }
}

impl From<u64> for Payload {
    fn from(integer: u64) -> Self {
        i64::try_from(integer)
            .map(Payload::Integer)
            .unwrap_or(Payload::UnsignedInteger(integer))
    }
}

impl From<f64> for Payload {
    fn from(float: f64) -> Self {
        Payload::Float(float)
    }
}

impl From<bool> for Payload {
    fn from(flag: bool) -> Self {
        Payload::Boolean(flag)
    }
}

impl From<DateTime<FixedOffset>> for Payload {
    fn from(moment: DateTime<FixedOffset>) -> Self {
        Payload::DateTime(moment)
    }
}

impl From<NaiveDate> for Payload {
    fn from(date: NaiveDate) -> Self {
        Payload::Date(date)
    }
}

impl From<TimeDelta> for Payload {
    fn from(delta: TimeDelta) -> Self {
        Payload::Duration(delta)
    }
}

/// A frame as the business sees it, independent of any API response shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
}

impl Frame {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
        }
    }
}

impl From<Frame> for Payload {
    fn from(frame: Frame) -> Self {
        Payload::Mapping(vec![
            ("id".to_string(), Payload::Text(frame.id)),
            ("name".to_string(), Payload::Text(frame.name)),
            (
                "location".to_string(),
                frame.location.map(Payload::Text).unwrap_or(Payload::Null),
            ),
        ])
    }
}

impl From<Vec<Frame>> for Payload {
    fn from(frames: Vec<Frame>) -> Self {
        Payload::Sequence(frames.into_iter().map(Payload::from).collect())
    }
}
