//! Validation boundary between untyped route payloads and the typed model.
//!
//! Payloads arrive as [`serde_json::Value`] from user files, the reference
//! catalog, or the route generator. [`validate`] is the only way such a
//! payload becomes a [`ProcessingRoute`]: structural problems are rejected
//! with a [`ValidationError`], recoverable ones are normalized and reported
//! as [`ValidationWarning`]s.

use super::error::{ValidationError, ValidationWarning};
use crate::model::route::{LogisticsData, ProcessingRoute, ScoreWeights};
use crate::model::stage::{
    ByproductFlow, CircularLoop, Facility, InputMass, Stage, StageMetrics,
};
use crate::model::types::StageType;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

const MAX_PERCENT: f64 = 100.0;

/// A normalized route together with the non-fatal findings of validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRoute {
    /// The typed, normalized route.
    pub route: ProcessingRoute,
    /// Recoverable problems found while normalizing.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidatedRoute {
    /// Warnings about loops whose target stage does not exist.
    pub fn dangling_loops(&self) -> impl Iterator<Item = &ValidationWarning> {
        self.warnings.iter().filter(|w| w.is_dangling_loop())
    }

    /// Consumes the wrapper, dropping the warnings.
    pub fn into_route(self) -> ProcessingRoute {
        self.route
    }
}

/// Validates an untyped route payload and normalizes it into a [`ProcessingRoute`].
///
/// # Arguments
///
/// * `payload` — The untyped route, typically parsed JSON
///
/// # Errors
///
/// Returns [`ValidationError::NoStages`] if the payload has no usable
/// `stages` array, [`ValidationError::UnknownStageType`] for a stage type
/// outside the fixed enumeration, [`ValidationError::DuplicateStageId`] for
/// repeated stage ids, and [`ValidationError::InvalidField`] /
/// [`ValidationError::InvalidRouteField`] for malformed values.
pub fn validate(payload: &Value) -> Result<ValidatedRoute, ValidationError> {
    let obj = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    let raw_stages = obj
        .get("stages")
        .and_then(Value::as_array)
        .filter(|stages| !stages.is_empty())
        .ok_or(ValidationError::NoStages)?;

    let mut warnings = Vec::new();
    let mut stages = Vec::with_capacity(raw_stages.len());
    let mut seen_ids = HashSet::with_capacity(raw_stages.len());

    for (index, raw) in raw_stages.iter().enumerate() {
        let stage = parse_stage(index, raw, &mut warnings)?;
        if !seen_ids.insert(stage.id.clone()) {
            return Err(ValidationError::DuplicateStageId {
                index,
                id: stage.id,
            });
        }
        stages.push(stage);
    }

    for (index, stage) in stages.iter().enumerate() {
        for circular_loop in &stage.circular_loops {
            if !seen_ids.contains(&circular_loop.target_stage) {
                warn!(
                    stage = %stage.id,
                    target_stage = %circular_loop.target_stage,
                    "circular loop targets an unknown stage"
                );
                warnings.push(ValidationWarning::DanglingLoopReference {
                    stage_index: index,
                    stage_id: stage.id.clone(),
                    target_stage: circular_loop.target_stage.clone(),
                });
            }
        }
    }

    let route = ProcessingRoute {
        id: text(obj, &["id", "routeId"]).unwrap_or_else(|| "route".to_string()),
        name: text(obj, &["name", "routeName"]).unwrap_or_else(|| "Unnamed route".to_string()),
        stages,
        total_carbon: route_number(obj, "totalCarbon")?,
        total_energy: route_number(obj, "totalEnergy")?,
        circularity_score: parse_authoritative_score(obj, &mut warnings)?,
        score_weights: parse_weights(obj)?,
        logistics: parse_descriptive::<LogisticsData>(obj.get("logistics"))
            .map_err(|e| ValidationError::invalid_route_field("logistics", e))?,
    };

    debug!(
        route = %route.id,
        stages = route.stage_count(),
        loops = route.loop_count(),
        warnings = warnings.len(),
        "validated route payload"
    );

    Ok(ValidatedRoute { route, warnings })
}

fn parse_stage(
    index: usize,
    raw: &Value,
    warnings: &mut Vec<ValidationWarning>,
) -> Result<Stage, ValidationError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ValidationError::invalid_field(index, "stage", "expected an object"))?;

    let id = identifier(obj, &["id", "stageId"]).unwrap_or_else(|| format!("stage-{}", index + 1));

    let stage_type = match obj.get("type").or_else(|| obj.get("stageType")) {
        Some(Value::String(s)) => {
            s.parse::<StageType>()
                .map_err(|_| ValidationError::UnknownStageType {
                    index,
                    value: s.clone(),
                })?
        }
        Some(Value::Null) | None => {
            return Err(ValidationError::invalid_field(index, "type", "missing stage type"));
        }
        Some(other) => {
            return Err(ValidationError::UnknownStageType {
                index,
                value: other.to_string(),
            });
        }
    };

    let metrics = match obj.get("metrics") {
        None | Some(Value::Null) => {
            debug!(stage = %id, "stage has no metrics, substituting zero");
            warnings.push(ValidationWarning::MissingMetrics {
                stage_index: index,
                stage_id: id.clone(),
            });
            StageMetrics::ZERO
        }
        Some(Value::Object(m)) => parse_metrics(index, m)?,
        Some(_) => {
            return Err(ValidationError::invalid_field(index, "metrics", "expected an object"));
        }
    };

    let input_mass = match obj.get("inputMass") {
        None | Some(Value::Null) => None,
        Some(Value::Object(m)) => Some(InputMass {
            recycled: non_negative(index, m, &["recycled"], "inputMass.recycled")?.unwrap_or(0.0),
            total: non_negative(index, m, &["total"], "inputMass.total")?.unwrap_or(0.0),
        }),
        Some(_) => {
            return Err(ValidationError::invalid_field(index, "inputMass", "expected an object"));
        }
    };

    let circular_loops = match obj.get("circularLoops") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(j, item)| parse_loop(index, j, item, warnings))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(ValidationError::invalid_field(
                index,
                "circularLoops",
                "expected an array",
            ));
        }
    };

    let byproduct_flows = match obj.get("byproductFlows") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| serde_json::from_value::<ByproductFlow>(item.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ValidationError::invalid_field(index, "byproductFlows", e.to_string()))?,
        Some(_) => {
            return Err(ValidationError::invalid_field(
                index,
                "byproductFlows",
                "expected an array",
            ));
        }
    };

    let facility = parse_descriptive::<Facility>(obj.get("facility"))
        .map_err(|e| ValidationError::invalid_field(index, "facility", e))?;

    Ok(Stage {
        name: text(obj, &["name"]).unwrap_or_else(|| stage_type.label().to_string()),
        id,
        stage_type,
        description: text(obj, &["description"]).unwrap_or_default(),
        inputs: string_list(index, obj, "inputs")?,
        outputs: string_list(index, obj, "outputs")?,
        metrics,
        input_mass,
        circular_loops,
        byproduct_flows,
        facility,
        transport_mode: text(obj, &["transportMode"]),
        distance_to_next: non_negative(index, obj, &["distanceToNext"], "distanceToNext")?,
    })
}

fn parse_metrics(index: usize, m: &Map<String, Value>) -> Result<StageMetrics, ValidationError> {
    let field = |keys: &[&str], name: &str| -> Result<f64, ValidationError> {
        Ok(non_negative(index, m, keys, &format!("metrics.{}", name))?.unwrap_or(0.0))
    };

    Ok(StageMetrics {
        carbon_emissions: field(&["carbonEmissions", "carbon"], "carbonEmissions")?,
        energy_consumption: field(&["energyConsumption", "energy"], "energyConsumption")?,
        water_usage: field(&["waterUsage", "water"], "waterUsage")?,
        waste_generated: field(&["wasteGenerated", "waste"], "wasteGenerated")?,
    })
}

fn parse_loop(
    index: usize,
    loop_index: usize,
    raw: &Value,
    warnings: &mut Vec<ValidationWarning>,
) -> Result<CircularLoop, ValidationError> {
    let path = |name: &str| format!("circularLoops[{}].{}", loop_index, name);

    let obj = raw.as_object().ok_or_else(|| {
        ValidationError::invalid_field(index, format!("circularLoops[{}]", loop_index), "expected an object")
    })?;

    let target_stage = identifier(obj, &["targetStage", "targetStageId"])
        .ok_or_else(|| ValidationError::invalid_field(index, path("targetStage"), "missing target stage"))?;

    let mut recovery_rate =
        non_negative(index, obj, &["recoveryRate"], &path("recoveryRate"))?.unwrap_or(0.0);
    if recovery_rate > MAX_PERCENT {
        warn!(target_stage = %target_stage, recovery_rate, "recovery rate above 100%, clamping");
        warnings.push(ValidationWarning::Clamped {
            stage_index: Some(index),
            field: path("recoveryRate"),
            original: recovery_rate,
            clamped: MAX_PERCENT,
        });
        recovery_rate = MAX_PERCENT;
    }

    Ok(CircularLoop {
        target_stage,
        material: text(obj, &["material", "materialFlow", "materialName"]).unwrap_or_default(),
        recovery_rate,
        carbon_savings: non_negative(index, obj, &["carbonSavings"], &path("carbonSavings"))?
            .unwrap_or(0.0),
    })
}

fn parse_authoritative_score(
    obj: &Map<String, Value>,
    warnings: &mut Vec<ValidationWarning>,
) -> Result<Option<f64>, ValidationError> {
    let Some(score) = route_number(obj, "circularityScore")? else {
        return Ok(None);
    };

    let clamped = score.clamp(0.0, MAX_PERCENT);
    if clamped != score {
        warn!(score, "authoritative circularity score out of range, clamping");
        warnings.push(ValidationWarning::Clamped {
            stage_index: None,
            field: "circularityScore".to_string(),
            original: score,
            clamped,
        });
    }
    Ok(Some(clamped))
}

fn parse_weights(obj: &Map<String, Value>) -> Result<Option<ScoreWeights>, ValidationError> {
    let weights = match obj.get("scoreWeights") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(w)) => w,
        Some(_) => {
            return Err(ValidationError::invalid_route_field(
                "scoreWeights",
                "expected an object",
            ));
        }
    };

    let weight = |key: &str| -> Result<f64, ValidationError> {
        match weights.get(key) {
            None | Some(Value::Null) => Ok(0.0),
            Some(v) => number(v)
                .filter(|w| w.is_finite())
                .ok_or_else(|| {
                    ValidationError::invalid_route_field(
                        format!("scoreWeights.{}", key),
                        "expected a number",
                    )
                }),
        }
    };

    Ok(Some(ScoreWeights {
        recycled_content: weight("recycledContent")?,
        recovery: weight("recovery")?,
        carbon_savings: weight("carbonSavings")?,
    }))
}

fn parse_descriptive<T: serde::de::DeserializeOwned>(raw: Option<&Value>) -> Result<Option<T>, String> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| e.to_string()),
    }
}

/// Accepts JSON numbers and numeric strings.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn non_negative(
    index: usize,
    obj: &Map<String, Value>,
    keys: &[&str],
    field: &str,
) -> Result<Option<f64>, ValidationError> {
    let Some(raw) = keys.iter().find_map(|k| obj.get(*k).filter(|v| !v.is_null())) else {
        return Ok(None);
    };

    let value = number(raw)
        .ok_or_else(|| ValidationError::invalid_field(index, field, format!("expected a number, got {}", raw)))?;

    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::invalid_field(
            index,
            field,
            format!("expected a finite non-negative number, got {}", value),
        ));
    }

    Ok(Some(value))
}

fn route_number(obj: &Map<String, Value>, key: &str) -> Result<Option<f64>, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => number(raw)
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| {
                ValidationError::invalid_route_field(key, format!("expected a number, got {}", raw))
            }),
    }
}

fn text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Identifiers may be strings or integers in generator output.
fn identifier(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn string_list(
    index: usize,
    obj: &Map<String, Value>,
    key: &str,
) -> Result<Vec<String>, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(ValidationError::invalid_field(
                    index,
                    key,
                    format!("expected a list of names, found {}", other),
                )),
            })
            .collect(),
        Some(_) => Err(ValidationError::invalid_field(
            index,
            key,
            "expected a list of names",
        )),
    }
}
