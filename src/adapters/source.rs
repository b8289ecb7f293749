//! Frame services. Both return canned responses shaped like their upstream
//! APIs; no network traffic is made.

use crate::domain::model::Payload;
use crate::domain::ports::Source;
use crate::utils::error::Result;
use serde_json::json;

/// GraphQL-style frame API: frames under `payload`, each with a location.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphQlFrameService;

impl GraphQlFrameService {
    pub fn new() -> Self {
        Self
    }
}

impl Source for GraphQlFrameService {
    fn fetch(&self) -> Result<Payload> {
        tracing::debug!("GraphQlFrameService.fetch() has been called");
        Ok(Payload::from(json!({
            "payload": [
                {"id": 10, "name": "frame1", "location": "London, UK"},
                {"id": 12, "name": "frame2", "location": "London, UK"},
                {"id": 13, "name": "frame3", "location": "London, UK"},
                {"id": 14, "name": "frame4", "location": "London, UK"}
            ]
        })))
    }
}

/// REST-style frame API: a paginated envelope with frames under `data`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestFrameService;

impl RestFrameService {
    pub fn new() -> Self {
        Self
    }
}

impl Source for RestFrameService {
    fn fetch(&self) -> Result<Payload> {
        tracing::debug!("RestFrameService.fetch() has been called");
        Ok(Payload::from(json!({
            "start": 0,
            "offset": 0,
            "limit": 500,
            "data": [
                {"id": 1, "name": "frame1"},
                {"id": 2, "name": "frame2"},
                {"id": 3, "name": "frame3"}
            ]
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_service_returns_four_frames() {
        let payload = GraphQlFrameService::new().fetch().unwrap();

        match payload.get("payload") {
            Some(Payload::Sequence(frames)) => assert_eq!(frames.len(), 4),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_rest_service_returns_paginated_envelope() {
        let payload = RestFrameService::new().fetch().unwrap();

        assert_eq!(payload.get("limit"), Some(&Payload::Integer(500)));
        match payload.get("data") {
            Some(Payload::Sequence(frames)) => assert_eq!(frames.len(), 3),
            other => panic!("unexpected payload: {:?}", other),
        }
    }
}
