//! Reading and writing route data, plus the collaborators at the crate's edge.
//!
//! - [`read_route`] / [`read_routes`] parse JSON and run it through the validator
//! - [`read_scoring_config`] loads a TOML [`ScoringConfig`]
//! - [`write_json`] pretty-prints any result type
//! - [`catalog`] holds the built-in metal, ore, and route reference data
//! - [`generator`] talks to the remote route generator
//! - [`store`] defines the persistence interface for projects and scenarios

use crate::pipeline::{ScoringConfig, ValidatedRoute, validate};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io::{Read, Write};

pub mod catalog;
pub mod error;
pub mod generator;
pub mod store;

pub use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "JSON"),
            Format::Toml => write!(f, "TOML"),
        }
    }
}

/// Reads one route payload and validates it.
pub fn read_route<R: Read>(reader: R) -> Result<ValidatedRoute, Error> {
    let payload: Value = serde_json::from_reader(reader)?;
    Ok(validate(&payload)?)
}

/// Reads either a single route object or an array of them.
///
/// Validation stops at the first rejected route.
pub fn read_routes<R: Read>(reader: R) -> Result<Vec<ValidatedRoute>, Error> {
    let payload: Value = serde_json::from_reader(reader)?;
    match payload {
        Value::Array(items) => items
            .iter()
            .map(|item| validate(item).map_err(Error::from))
            .collect(),
        other => Ok(vec![validate(&other)?]),
    }
}

pub fn read_scoring_config<R: Read>(mut reader: R) -> Result<ScoringConfig, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(ScoringConfig::from_toml_str(&text)?)
}

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| {
        if e.is_io() {
            Error::Io { source: e.into() }
        } else {
            Error::Write {
                format: Format::Json,
                details: e.to_string(),
            }
        }
    })?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ValidationError;

    const ROUTE: &str = r#"{
        "id": "r1",
        "stages": [
            { "id": "a", "type": "extraction", "metrics": { "carbonEmissions": 5 } },
            { "id": "b", "type": "recycling",
              "circularLoops": [{ "targetStage": "a", "recoveryRate": 50, "carbonSavings": 2 }] }
        ]
    }"#;

    #[test]
    fn reads_and_validates_a_route() {
        let validated = read_route(ROUTE.as_bytes()).unwrap();
        assert_eq!(validated.route.id, "r1");
        assert_eq!(validated.route.stage_count(), 2);
        // stage b has no metrics
        assert_eq!(validated.warnings.len(), 1);
    }

    #[test]
    fn reads_route_arrays() {
        let text = format!("[{}, {}]", ROUTE, ROUTE);
        let routes = read_routes(text.as_bytes()).unwrap();
        assert_eq!(routes.len(), 2);

        let single = read_routes(ROUTE.as_bytes()).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = read_route("{ not json".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { format: Format::Json, .. }));
    }

    #[test]
    fn invalid_route_surfaces_validation_error() {
        let err = read_route(r#"{ "stages": [] }"#.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidRoute(ValidationError::NoStages)));
    }

    #[test]
    fn reads_scoring_config_from_toml() {
        let config = read_scoring_config("[weights]\nrecovery = 2.0\n".as_bytes()).unwrap();
        assert_eq!(config.weights.recovery, 2.0);

        let err = read_scoring_config("[weights".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { format: Format::Toml, .. }));
    }

    #[test]
    fn writes_pretty_json_with_trailing_newline() {
        let mut out = Vec::new();
        write_json(&mut out, &serde_json::json!({ "a": 1 })).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"a\": 1"));
    }
}
