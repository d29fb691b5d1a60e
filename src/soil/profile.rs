//! Layered soil profile.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GroundhogError, Result};

/// Tolerance used when comparing depths [m].
pub(crate) const DEPTH_TOLERANCE: f64 = 1e-9;

/// Soil types distinguished by Belgian pile design practice.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoilType {
    #[serde(rename = "Clay")]
    Clay,
    #[serde(rename = "Loam (silt)")]
    Loam,
    #[serde(rename = "Sandy clay / loam (silt)")]
    SandyClayLoam,
    #[serde(rename = "Clayey sand / loam (silt)")]
    ClayeySandLoam,
    #[serde(rename = "Sand")]
    Sand,
}

impl SoilType {
    pub const ALL: [SoilType; 5] = [
        SoilType::Clay,
        SoilType::Loam,
        SoilType::SandyClayLoam,
        SoilType::ClayeySandLoam,
        SoilType::Sand,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SoilType::Clay => "Clay",
            SoilType::Loam => "Loam (silt)",
            SoilType::SandyClayLoam => "Sandy clay / loam (silt)",
            SoilType::ClayeySandLoam => "Clayey sand / loam (silt)",
            SoilType::Sand => "Sand",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SoilType {
    type Err = GroundhogError;

    fn from_str(s: &str) -> Result<Self> {
        SoilType::ALL
            .iter()
            .find(|t| t.label() == s)
            .copied()
            .ok_or_else(|| {
                GroundhogError::validation(
                    "soil_type",
                    format!(
                        "Soil type '{}' not recognised. Needs to be one of {:?}",
                        s,
                        SoilType::ALL.map(|t| t.label())
                    ),
                )
            })
    }
}

/// A single soil layer between two depths.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SoilLayer {
    /// Top of the layer [m]
    pub depth_from: f64,
    /// Bottom of the layer [m]
    pub depth_to: f64,
    pub soil_type: SoilType,
    /// Stiff overconsolidated tertiary clay
    #[serde(default)]
    pub tertiary_clay: bool,
    /// Total unit weight [kN/m3]; filled with defaults when absent
    #[serde(default)]
    pub total_unit_weight: Option<f64>,
}

impl SoilLayer {
    pub fn new(depth_from: f64, depth_to: f64, soil_type: SoilType) -> Self {
        Self {
            depth_from,
            depth_to,
            soil_type,
            tertiary_clay: false,
            total_unit_weight: None,
        }
    }

    pub fn with_tertiary_clay(mut self, tertiary_clay: bool) -> Self {
        self.tertiary_clay = tertiary_clay;
        self
    }

    pub fn with_unit_weight(mut self, total_unit_weight: f64) -> Self {
        self.total_unit_weight = Some(total_unit_weight);
        self
    }

    pub fn thickness(&self) -> f64 {
        self.depth_to - self.depth_from
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.depth_from + self.depth_to)
    }

    pub fn contains(&self, depth: f64) -> bool {
        depth >= self.depth_from && depth <= self.depth_to
    }
}

/// Contiguous, ordered stack of soil layers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "Vec<SoilLayer>", into = "Vec<SoilLayer>")]
pub struct SoilProfile {
    layers: Vec<SoilLayer>,
}

impl TryFrom<Vec<SoilLayer>> for SoilProfile {
    type Error = GroundhogError;

    fn try_from(layers: Vec<SoilLayer>) -> Result<Self> {
        SoilProfile::new(layers)
    }
}

impl From<SoilProfile> for Vec<SoilLayer> {
    fn from(profile: SoilProfile) -> Self {
        profile.layers
    }
}

impl SoilProfile {
    /// Build a profile; layers must be non-empty, have positive thickness
    /// and follow each other without gaps or overlaps.
    pub fn new(layers: Vec<SoilLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(GroundhogError::InvalidInput(
                "A soil profile needs at least one layer".into(),
            ));
        }
        for (i, layer) in layers.iter().enumerate() {
            if layer.depth_to <= layer.depth_from {
                return Err(GroundhogError::InvalidInput(format!(
                    "Layer {} has a bottom depth ({}) not below its top depth ({})",
                    i + 1,
                    layer.depth_to,
                    layer.depth_from
                )));
            }
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if (pair[0].depth_to - pair[1].depth_from).abs() > DEPTH_TOLERANCE {
                return Err(GroundhogError::InvalidInput(format!(
                    "Layers {} and {} are not contiguous ({} vs {})",
                    i + 1,
                    i + 2,
                    pair[0].depth_to,
                    pair[1].depth_from
                )));
            }
        }
        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[SoilLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn min_depth(&self) -> f64 {
        self.layers.first().map_or(0.0, |l| l.depth_from)
    }

    pub fn max_depth(&self) -> f64 {
        self.layers.last().map_or(0.0, |l| l.depth_to)
    }

    /// Depths at which one layer ends and the next begins.
    pub fn layer_transitions(&self) -> Vec<f64> {
        self.layers
            .iter()
            .take(self.layers.len().saturating_sub(1))
            .map(|l| l.depth_to)
            .collect()
    }

    fn is_boundary(&self, depth: f64) -> bool {
        (depth - self.min_depth()).abs() <= DEPTH_TOLERANCE
            || (depth - self.max_depth()).abs() <= DEPTH_TOLERANCE
            || self
                .layer_transitions()
                .iter()
                .any(|t| (t - depth).abs() <= DEPTH_TOLERANCE)
    }

    /// Split the layer containing `depth` into two layers with the same
    /// properties. Depths outside the profile or on a boundary are ignored.
    pub fn insert_layer_transition(&mut self, depth: f64) {
        if depth <= self.min_depth() || depth >= self.max_depth() || self.is_boundary(depth) {
            return;
        }
        if let Some(index) = self.layer_index_at(depth) {
            let mut lower = self.layers[index].clone();
            lower.depth_from = depth;
            self.layers[index].depth_to = depth;
            self.layers.insert(index + 1, lower);
        }
    }

    /// Index of the layer containing `depth`. A depth on a transition belongs
    /// to the layer below it, except at the bottom of the profile.
    pub fn layer_index_at(&self, depth: f64) -> Option<usize> {
        if depth < self.min_depth() - DEPTH_TOLERANCE || depth > self.max_depth() + DEPTH_TOLERANCE
        {
            return None;
        }
        self.layers
            .iter()
            .position(|l| depth >= l.depth_from - DEPTH_TOLERANCE && depth < l.depth_to)
            .or(Some(self.layers.len() - 1))
    }

    pub fn layer_at(&self, depth: f64) -> Option<&SoilLayer> {
        self.layer_index_at(depth).map(|i| &self.layers[i])
    }

    /// Assign `dry` to layers above the water table and `wet` below, judged
    /// at the layer midpoint. Layers with a unit weight keep it.
    pub fn fill_unit_weights(&mut self, water_level: f64, dry: f64, wet: f64) {
        for layer in self.layers.iter_mut() {
            if layer.total_unit_weight.is_none() {
                let weight = if layer.midpoint() < water_level { dry } else { wet };
                layer.total_unit_weight = Some(weight);
            }
        }
    }

    pub fn has_tertiary_clay(&self) -> bool {
        self.layers.iter().any(|l| l.tertiary_clay)
    }
}
