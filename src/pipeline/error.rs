//! Error and diagnostic types for route validation and evaluation.
//!
//! Fatal problems are reported through [`ValidationError`] and stop a payload
//! from ever becoming a typed route. Recoverable problems are collected as
//! [`ValidationWarning`]s next to the normalized route, so a partially
//! malformed generator response can still be evaluated.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that make a route payload unusable.
///
/// Every stage-level variant carries the zero-based index of the offending
/// stage so callers can point at the exact entry in the payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The payload is not a JSON object.
    #[error("route payload must be a JSON object")]
    NotAnObject,

    /// The payload has no `stages` array, or the array is empty.
    #[error("no stages")]
    NoStages,

    /// A stage declares a `type` outside the fixed stage enumeration.
    #[error("unknown stage type '{value}' at stage {index}")]
    UnknownStageType {
        /// Zero-based stage index.
        index: usize,
        /// The rejected type value.
        value: String,
    },

    /// Two stages share the same identifier.
    #[error("duplicate stage id '{id}' at stage {index}")]
    DuplicateStageId {
        /// Zero-based index of the second occurrence.
        index: usize,
        /// The repeated identifier.
        id: String,
    },

    /// A stage field has the wrong shape or an out-of-domain value.
    #[error("invalid field '{field}' at stage {index}: {detail}")]
    InvalidField {
        /// Zero-based stage index.
        index: usize,
        /// Field path within the stage (e.g. `metrics.carbonEmissions`).
        field: String,
        /// Description of the problem.
        detail: String,
    },

    /// A route-level field has the wrong shape or an out-of-domain value.
    #[error("invalid route field '{field}': {detail}")]
    InvalidRouteField {
        /// Field name on the route object.
        field: String,
        /// Description of the problem.
        detail: String,
    },
}

impl ValidationError {
    /// Creates an [`InvalidField`](ValidationError::InvalidField) error.
    pub fn invalid_field(index: usize, field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidField {
            index,
            field: field.into(),
            detail: detail.into(),
        }
    }

    /// Creates an [`InvalidRouteField`](ValidationError::InvalidRouteField) error.
    pub fn invalid_route_field(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidRouteField {
            field: field.into(),
            detail: detail.into(),
        }
    }

    /// Zero-based index of the offending stage, if the error is stage-specific.
    pub fn stage_index(&self) -> Option<usize> {
        match self {
            Self::UnknownStageType { index, .. }
            | Self::DuplicateStageId { index, .. }
            | Self::InvalidField { index, .. } => Some(*index),
            Self::NotAnObject | Self::NoStages | Self::InvalidRouteField { .. } => None,
        }
    }
}

/// Non-fatal conditions found while normalizing a payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationWarning {
    /// A circular loop targets a stage id that does not exist in the route.
    ///
    /// The loop is kept on the route but excluded from every aggregate.
    #[serde(rename_all = "camelCase")]
    DanglingLoopReference {
        stage_index: usize,
        stage_id: String,
        target_stage: String,
    },

    /// A stage had no metrics; the zero vector was substituted.
    #[serde(rename_all = "camelCase")]
    MissingMetrics { stage_index: usize, stage_id: String },

    /// A bounded value exceeded its range and was clamped.
    #[serde(rename_all = "camelCase")]
    Clamped {
        stage_index: Option<usize>,
        field: String,
        original: f64,
        clamped: f64,
    },
}

impl ValidationWarning {
    #[inline]
    pub fn is_dangling_loop(&self) -> bool {
        matches!(self, Self::DanglingLoopReference { .. })
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingLoopReference {
                stage_index,
                stage_id,
                target_stage,
            } => write!(
                f,
                "loop on stage {} ('{}') targets unknown stage '{}'",
                stage_index, stage_id, target_stage
            ),
            Self::MissingMetrics {
                stage_index,
                stage_id,
            } => write!(
                f,
                "stage {} ('{}') has no metrics, using zero",
                stage_index, stage_id
            ),
            Self::Clamped {
                stage_index: Some(index),
                field,
                original,
                clamped,
            } => write!(
                f,
                "stage {} field '{}' clamped from {} to {}",
                index, field, original, clamped
            ),
            Self::Clamped {
                stage_index: None,
                field,
                original,
                clamped,
            } => write!(
                f,
                "route field '{}' clamped from {} to {}",
                field, original, clamped
            ),
        }
    }
}

/// Errors raised when comparing evaluated scenarios.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompareError {
    /// An alternative was produced for a different metal than the baseline.
    #[error("scenario '{name}' is for metal '{found}', baseline is for '{expected}'")]
    MetalMismatch {
        /// Name of the offending alternative.
        name: String,
        /// Metal of the baseline.
        expected: String,
        /// Metal of the alternative.
        found: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_stages_message() {
        assert_eq!(ValidationError::NoStages.to_string(), "no stages");
    }

    #[test]
    fn unknown_stage_type_carries_index() {
        let err = ValidationError::UnknownStageType {
            index: 3,
            value: "casting".into(),
        };
        assert!(err.to_string().contains("unknown stage type"));
        assert_eq!(err.stage_index(), Some(3));
    }

    #[test]
    fn route_level_errors_have_no_stage_index() {
        assert_eq!(ValidationError::NoStages.stage_index(), None);
        assert_eq!(
            ValidationError::invalid_route_field("circularityScore", "not a number").stage_index(),
            None
        );
    }

    #[test]
    fn warning_display_and_kind() {
        let w = ValidationWarning::DanglingLoopReference {
            stage_index: 1,
            stage_id: "smelt".into(),
            target_stage: "ghost".into(),
        };
        assert!(w.is_dangling_loop());
        assert_eq!(
            w.to_string(),
            "loop on stage 1 ('smelt') targets unknown stage 'ghost'"
        );

        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "danglingLoopReference");
        assert_eq!(json["targetStage"], "ghost");
    }
}
