//! Soil stratigraphy and overburden stresses.
//!
//! This module provides the layered soil model used by the pile and CPT
//! calculations, including the vertical stress state derived from the unit
//! weights and the water table.

mod profile;
mod stress;

pub use profile::{SoilLayer, SoilProfile, SoilType};
pub use stress::{LayerStress, NodalStress, Overburden};

/// Unit weight of fresh water used for onshore stress calculations [kN/m3].
pub const UNITWEIGHT_WATER_FRESH: f64 = 10.0;
