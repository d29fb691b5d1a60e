//! Vertical stresses from unit weights and the water table.

use serde::Serialize;

use super::profile::{DEPTH_TOLERANCE, SoilProfile};
use crate::error::{GroundhogError, Result};

/// Stress state at the top and bottom of one layer.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LayerStress {
    pub depth_from: f64,
    pub depth_to: f64,
    /// [kN/m3]
    pub total_unit_weight: f64,
    /// Total above the water table, submerged below [kN/m3]
    pub effective_unit_weight: f64,
    /// [kPa]
    pub total_stress_from: f64,
    pub total_stress_to: f64,
    pub pore_pressure_from: f64,
    pub pore_pressure_to: f64,
    pub effective_stress_from: f64,
    pub effective_stress_to: f64,
}

/// Stress state at a single depth.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NodalStress {
    pub depth: f64,
    pub total_unit_weight: f64,
    pub effective_unit_weight: f64,
    pub total_stress: f64,
    pub pore_pressure: f64,
    pub effective_stress: f64,
}

/// Overburden stresses for a whole profile.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Overburden {
    pub water_level: f64,
    pub unitweight_water: f64,
    pub layers: Vec<LayerStress>,
}

impl SoilProfile {
    /// Integrate unit weights downwards to obtain vertical stresses.
    ///
    /// Hydrostatic pore pressure starts at `water_level`. Every layer needs a
    /// total unit weight, see [`SoilProfile::fill_unit_weights`].
    pub fn calculate_overburden(&self, water_level: f64, unitweight_water: f64) -> Result<Overburden> {
        if water_level < 0.0 {
            return Err(GroundhogError::validation(
                "water_level",
                "Specified water level should be greater than or equal to zero",
            ));
        }

        let pore_pressure = |z: f64| unitweight_water * (z - water_level).max(0.0);
        let mut total_stress = 0.0;
        let mut layers = Vec::with_capacity(self.len());

        for (i, layer) in self.layers().iter().enumerate() {
            let gamma = layer.total_unit_weight.ok_or_else(|| {
                GroundhogError::InvalidInput(format!("Layer {} has no total unit weight", i + 1))
            })?;
            let effective_unit_weight = if layer.midpoint() < water_level {
                gamma
            } else {
                gamma - unitweight_water
            };

            let total_stress_from = total_stress;
            total_stress += gamma * layer.thickness();

            let pore_pressure_from = pore_pressure(layer.depth_from);
            let pore_pressure_to = pore_pressure(layer.depth_to);

            layers.push(LayerStress {
                depth_from: layer.depth_from,
                depth_to: layer.depth_to,
                total_unit_weight: gamma,
                effective_unit_weight,
                total_stress_from,
                total_stress_to: total_stress,
                pore_pressure_from,
                pore_pressure_to,
                effective_stress_from: total_stress_from - pore_pressure_from,
                effective_stress_to: total_stress - pore_pressure_to,
            });
        }

        Ok(Overburden {
            water_level,
            unitweight_water,
            layers,
        })
    }
}

impl Overburden {
    /// Layer containing `depth`, with the same tolerance on the profile
    /// edges as [`SoilProfile::layer_index_at`].
    fn layer_at(&self, depth: f64) -> Option<&LayerStress> {
        self.layers
            .iter()
            .find(|l| depth >= l.depth_from - DEPTH_TOLERANCE && depth < l.depth_to)
            .or_else(|| {
                self.layers
                    .last()
                    .filter(|l| (depth - l.depth_to).abs() <= DEPTH_TOLERANCE)
            })
    }

    /// Stresses at `depth`, interpolated linearly inside the containing layer.
    pub fn at_depth(&self, depth: f64) -> Result<NodalStress> {
        let layer = self.layer_at(depth).ok_or_else(|| {
            GroundhogError::InvalidInput(format!("Depth {} is outside the soil profile", depth))
        })?;
        // Depths within the tolerance of an edge take the edge value
        let ratio =
            ((depth - layer.depth_from) / (layer.depth_to - layer.depth_from)).clamp(0.0, 1.0);
        let lerp = |from: f64, to: f64| from + ratio * (to - from);

        Ok(NodalStress {
            depth,
            total_unit_weight: layer.total_unit_weight,
            effective_unit_weight: layer.effective_unit_weight,
            total_stress: lerp(layer.total_stress_from, layer.total_stress_to),
            pore_pressure: lerp(layer.pore_pressure_from, layer.pore_pressure_to),
            effective_stress: lerp(layer.effective_stress_from, layer.effective_stress_to),
        })
    }

    pub fn map_to_depths(&self, depths: &[f64]) -> Result<Vec<NodalStress>> {
        depths.iter().map(|&z| self.at_depth(z)).collect()
    }
}
