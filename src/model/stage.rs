use super::types::StageType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::iter::Sum;
use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageMetrics {
    pub carbon_emissions: f64,
    pub energy_consumption: f64,
    pub water_usage: f64,
    pub waste_generated: f64,
}

impl StageMetrics {
    pub const ZERO: StageMetrics = StageMetrics {
        carbon_emissions: 0.0,
        energy_consumption: 0.0,
        water_usage: 0.0,
        waste_generated: 0.0,
    };

    pub fn new(carbon: f64, energy: f64, water: f64, waste: f64) -> Self {
        Self {
            carbon_emissions: carbon,
            energy_consumption: energy,
            water_usage: water,
            waste_generated: waste,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for StageMetrics {
    type Output = StageMetrics;

    fn add(self, rhs: StageMetrics) -> StageMetrics {
        StageMetrics {
            carbon_emissions: self.carbon_emissions + rhs.carbon_emissions,
            energy_consumption: self.energy_consumption + rhs.energy_consumption,
            water_usage: self.water_usage + rhs.water_usage,
            waste_generated: self.waste_generated + rhs.waste_generated,
        }
    }
}

impl<'a> Sum<&'a StageMetrics> for StageMetrics {
    fn sum<I: Iterator<Item = &'a StageMetrics>>(iter: I) -> Self {
        iter.fold(StageMetrics::ZERO, |acc, m| acc + *m)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputMass {
    pub recycled: f64,
    pub total: f64,
}

impl InputMass {
    /// Recycled share of the input, or `None` when no total is declared.
    pub fn recycled_ratio(&self) -> Option<f64> {
        if self.total > 0.0 {
            Some((self.recycled / self.total).clamp(0.0, 1.0))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircularLoop {
    pub target_stage: String,
    #[serde(default)]
    pub material: String,
    pub recovery_rate: f64,
    pub carbon_savings: f64,
}

impl CircularLoop {
    pub fn new(
        target_stage: impl Into<String>,
        material: impl Into<String>,
        recovery_rate: f64,
        carbon_savings: f64,
    ) -> Self {
        Self {
            target_stage: target_stage.into(),
            material: material.into(),
            recovery_rate,
            carbon_savings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByproductFlow {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub stage_type: StageType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub metrics: StageMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mass: Option<InputMass>,
    #[serde(default)]
    pub circular_loops: Vec<CircularLoop>,
    #[serde(default)]
    pub byproduct_flows: Vec<ByproductFlow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility: Option<Facility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_next: Option<f64>,
}

impl Stage {
    pub fn new(id: impl Into<String>, name: impl Into<String>, stage_type: StageType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stage_type,
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            metrics: StageMetrics::ZERO,
            input_mass: None,
            circular_loops: Vec::new(),
            byproduct_flows: Vec::new(),
            facility: None,
            transport_mode: None,
            distance_to_next: None,
        }
    }

    pub fn with_metrics(mut self, metrics: StageMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_loop(mut self, circular_loop: CircularLoop) -> Self {
        self.circular_loops.push(circular_loop);
        self
    }

    pub fn with_input_mass(mut self, recycled: f64, total: f64) -> Self {
        self.input_mass = Some(InputMass { recycled, total });
        self
    }

    #[inline]
    pub fn loop_count(&self) -> usize {
        self.circular_loops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metrics_add_field_by_field() {
        let a = StageMetrics::new(1.0, 2.0, 3.0, 4.0);
        let b = StageMetrics::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(a + b, StageMetrics::new(11.0, 22.0, 33.0, 44.0));
    }

    #[test]
    fn metrics_sum_of_empty_is_zero() {
        let empty: Vec<StageMetrics> = Vec::new();
        let total: StageMetrics = empty.iter().sum();
        assert!(total.is_zero());
    }

    #[test]
    fn input_mass_ratio() {
        assert_eq!(
            InputMass {
                recycled: 25.0,
                total: 100.0
            }
            .recycled_ratio(),
            Some(0.25)
        );
        assert_eq!(
            InputMass {
                recycled: 5.0,
                total: 0.0
            }
            .recycled_ratio(),
            None
        );
        assert_eq!(
            InputMass {
                recycled: 150.0,
                total: 100.0
            }
            .recycled_ratio(),
            Some(1.0)
        );
    }

    #[test]
    fn stage_builder_defaults() {
        let stage = Stage::new("s1", "Mining", StageType::Extraction);
        assert!(stage.metrics.is_zero());
        assert!(stage.circular_loops.is_empty());
        assert!(stage.byproduct_flows.is_empty());
        assert!(stage.facility.is_none());
        assert_eq!(stage.loop_count(), 0);
    }

    #[test]
    fn byproduct_flow_keeps_unknown_keys() {
        let raw = json!({
            "name": "Red mud",
            "management": "Dry stacking",
            "classification": "hazardous",
            "volume": "1.5 t/t",
            "destination": "Tailings facility",
            "phLevel": 13
        });
        let flow: ByproductFlow = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(flow.name, "Red mud");
        assert_eq!(flow.extra.get("phLevel"), Some(&json!(13)));
        assert_eq!(serde_json::to_value(&flow).unwrap(), raw);
    }
}
