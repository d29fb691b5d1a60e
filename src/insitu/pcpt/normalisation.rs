//! Corrections and normalisations of raw PCPT measurements.

use serde::{Deserialize, Serialize};

use super::{Correlation, ErrorReturn, default_unitweight_water};
use crate::error::Result;
use crate::validation::validate_float;

/// Settings for downhole tests.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NormalisationSettings {
    /// Start depth of a downhole test; zero for a test from the surface [m]
    pub start_depth: f64,
    /// [kN/m3], seawater by default
    #[serde(default = "default_unitweight_water")]
    pub unitweight_water: f64,
}

impl Default for NormalisationSettings {
    fn default() -> Self {
        Self {
            start_depth: 0.0,
            unitweight_water: default_unitweight_water(),
        }
    }
}

/// Correct cone resistance for the unequal area effect and normalise the
/// measurements (Lunne et al, 1997).
///
/// Pore pressure is assumed to be measured at the cone shoulder (u2).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PcptNormalisation {
    /// Measured cone resistance [MPa]
    pub measured_qc: f64,
    /// Measured sleeve friction [MPa]
    pub measured_fs: f64,
    /// Measured shoulder pore pressure [MPa]
    pub measured_u2: f64,
    /// Total vertical stress [kPa]
    pub sigma_vo_tot: f64,
    /// Effective vertical stress [kPa]
    pub sigma_vo_eff: f64,
    /// Depth below the water table [m]
    pub depth: f64,
    /// Ratio of cone rod area to cone area [-]
    pub cone_area_ratio: f64,
    #[serde(flatten)]
    pub settings: NormalisationSettings,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PcptNormalisationOutput {
    #[serde(rename = "qt [MPa]")]
    pub qt: f64,
    #[serde(rename = "qc [MPa]")]
    pub qc: f64,
    #[serde(rename = "u2 [MPa]")]
    pub u2: f64,
    #[serde(rename = "Delta u2 [MPa]")]
    pub delta_u2: f64,
    #[serde(rename = "Rf [pct]")]
    pub rf: f64,
    #[serde(rename = "Bq [-]")]
    pub bq: f64,
    #[serde(rename = "Qt [-]")]
    pub qt_normalised: f64,
    #[serde(rename = "Fr [-]")]
    pub fr: f64,
    #[serde(rename = "qnet [MPa]")]
    pub qnet: f64,
}

impl ErrorReturn for PcptNormalisationOutput {
    fn error_return() -> Self {
        Self {
            qt: f64::NAN,
            qc: f64::NAN,
            u2: f64::NAN,
            delta_u2: f64::NAN,
            rf: f64::NAN,
            bq: f64::NAN,
            qt_normalised: f64::NAN,
            fr: f64::NAN,
            qnet: f64::NAN,
        }
    }
}

impl Correlation for PcptNormalisation {
    const NAME: &'static str = "PCPT normalisation Lunne et al (1997)";
    type Output = PcptNormalisationOutput;

    fn validate(&self) -> Result<()> {
        validate_float("measured_qc", self.measured_qc, Some(0.0), Some(150.0))?;
        validate_float("measured_fs", self.measured_fs, Some(0.0), Some(10.0))?;
        validate_float("measured_u2", self.measured_u2, Some(-10.0), Some(10.0))?;
        validate_float("sigma_vo_tot", self.sigma_vo_tot, Some(0.0), None)?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(0.0), None)?;
        validate_float("depth", self.depth, Some(0.0), None)?;
        validate_float("cone_area_ratio", self.cone_area_ratio, Some(0.0), Some(1.0))?;
        validate_float("start_depth", self.settings.start_depth, Some(0.0), None)?;
        validate_float(
            "unitweight_water",
            self.settings.unitweight_water,
            Some(9.0),
            Some(11.0),
        )
    }

    fn calculate(&self) -> Result<Self::Output> {
        let gamma_w = self.settings.unitweight_water;
        let start_depth = self.settings.start_depth;
        let a = self.cone_area_ratio;
        let sigma_vo = 0.001 * self.sigma_vo_tot;

        let qc = self.measured_qc + 0.001 * start_depth * a * gamma_w;
        let u2 = self.measured_u2 + 0.001 * gamma_w * start_depth;
        let qt = qc + u2 * (1.0 - a);
        let delta_u2 = u2 - 0.001 * self.depth * gamma_w;
        let qnet = qt - sigma_vo;

        Ok(PcptNormalisationOutput {
            qt,
            qc,
            u2,
            delta_u2,
            rf: 100.0 * self.measured_fs / qt,
            bq: delta_u2 / qnet,
            qt_normalised: qnet / (0.001 * self.sigma_vo_eff),
            fr: self.measured_fs / qnet,
            qnet,
        })
    }
}
