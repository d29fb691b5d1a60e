//! Foundation capacity calculations.
//!
//! - `debeer` - axial pile resistance from CPT data following De Beer's method

pub mod debeer;

pub use debeer::{ConeType, DeBeerCalculation, DeBeerInput, DeBeerSummary, ShaftBaseFactors};
