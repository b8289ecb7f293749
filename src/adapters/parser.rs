use crate::domain::model::{Frame, Payload};
use crate::domain::ports::Transformer;
use crate::utils::error::{IngestError, Result};
use thiserror::Error;

/// Pass-through transformer: storage receives exactly what the source returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsIsParser;

impl AsIsParser {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for AsIsParser {
    fn apply(&self, input: Payload) -> Result<Payload> {
        Ok(input)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum FrameParseError {
    #[error("response has no 'payload' or 'data' list")]
    MissingFrameList,

    #[error("frame #{index} is a {kind}, not a mapping")]
    NotAMapping { index: usize, kind: &'static str },

    #[error("frame #{index} has no usable '{field}'")]
    MissingField { index: usize, field: &'static str },
}

/// Maps an API response onto [`Frame`]s, then hands storage the frame list.
///
/// Frames are read from the `payload` list (GraphQL responses) or the `data`
/// list (REST responses). Numeric ids are kept as their decimal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameParser;

impl FrameParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_frames(
        &self,
        input: &Payload,
    ) -> std::result::Result<Vec<Frame>, FrameParseError> {
        let items = match input.get("payload").or_else(|| input.get("data")) {
            Some(Payload::Sequence(items)) => items,
            _ => return Err(FrameParseError::MissingFrameList),
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_frame(index, item))
            .collect()
    }
}

fn parse_frame(index: usize, item: &Payload) -> std::result::Result<Frame, FrameParseError> {
    if !matches!(item, Payload::Mapping(_)) {
        return Err(FrameParseError::NotAMapping {
            index,
            kind: item.kind(),
        });
    }

    let id = match item.get("id") {
        Some(Payload::Integer(id)) => id.to_string(),
        Some(Payload::UnsignedInteger(id)) => id.to_string(),
        Some(Payload::Text(id)) if !id.is_empty() => id.clone(),
        _ => return Err(FrameParseError::MissingField { index, field: "id" }),
    };
    let name = item
        .get("name")
        .and_then(Payload::as_str)
        .ok_or(FrameParseError::MissingField {
            index,
            field: "name",
        })?;
    let location = item
        .get("location")
        .and_then(Payload::as_str)
        .map(str::to_string);

    Ok(Frame::new(id, name, location))
}

impl Transformer for FrameParser {
    fn apply(&self, input: Payload) -> Result<Payload> {
        let frames = self
            .parse_frames(&input)
            .map_err(IngestError::collaborator)?;
        tracing::debug!("Parsed {} frames", frames.len());
        Ok(Payload::from(frames))
    }
}
