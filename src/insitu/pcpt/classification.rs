//! Soil behaviour type index and the Robertson chart classes.

use serde::{Deserialize, Serialize};

use super::{Correlation, ErrorReturn, default_atmospheric_pressure};
use crate::error::Result;
use crate::numerics::brentq;
use crate::validation::validate_float;

/// Zone of the Robertson chart.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoilBehaviourClass {
    #[serde(rename = "Soil type number [-]")]
    pub number: Option<u8>,
    #[serde(rename = "Soil type")]
    pub description: Option<&'static str>,
}

/// Robertson chart zone for a soil behaviour type index. NaN has no class.
pub fn soil_behaviour_class(ic: f64) -> SoilBehaviourClass {
    let (number, description) = match ic {
        ic if ic.is_nan() => return SoilBehaviourClass::error_return(),
        ic if ic < 1.31 => (7, "Gravelly sand to sand"),
        ic if ic < 2.05 => (6, "Sands: clean sands to silty sands"),
        ic if ic < 2.6 => (5, "Sand mixtures: silty sand to sand silty"),
        ic if ic < 2.95 => (4, "Silt mixtures: clayey silt to silty clay"),
        ic if ic < 3.6 => (3, "Clays: clay to silty clay"),
        _ => (2, "Organic soils-peats"),
    };
    SoilBehaviourClass {
        number: Some(number),
        description: Some(description),
    }
}

impl ErrorReturn for SoilBehaviourClass {
    fn error_return() -> Self {
        Self {
            number: None,
            description: None,
        }
    }
}

/// Soil type from the soil behaviour type index.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct IcSoilClassRobertson {
    pub ic: f64,
}

impl Correlation for IcSoilClassRobertson {
    const NAME: &'static str = "Ic soil class Robertson";
    type Output = SoilBehaviourClass;

    fn validate(&self) -> Result<()> {
        validate_float("ic", self.ic, Some(1.0), Some(5.0))
    }

    fn calculate(&self) -> Result<Self::Output> {
        Ok(soil_behaviour_class(self.ic))
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RobertsonWrideCoefficients {
    #[serde(default = "default_atmospheric_pressure")]
    pub atmospheric_pressure: f64,
    /// Search interval for the index
    pub ic_min: f64,
    pub ic_max: f64,
    pub zhang_multiplier_1: f64,
    pub zhang_multiplier_2: f64,
    pub zhang_subtraction: f64,
    pub robertsonwride_coefficient1: f64,
    pub robertsonwride_coefficient2: f64,
}

impl Default for RobertsonWrideCoefficients {
    fn default() -> Self {
        Self {
            atmospheric_pressure: default_atmospheric_pressure(),
            ic_min: 1.0,
            ic_max: 4.0,
            zhang_multiplier_1: 0.381,
            zhang_multiplier_2: 0.05,
            zhang_subtraction: 0.15,
            robertsonwride_coefficient1: 3.47,
            robertsonwride_coefficient2: 1.22,
        }
    }
}

/// Soil behaviour type index according to Robertson and Wride (1998).
///
/// The stress exponent n depends on the index itself (Zhang et al, 2002), so
/// the index is found as the root of `Ic - f(Qtn(n(Ic)), Fr)`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BehaviourIndexRobertsonWride {
    /// Corrected cone resistance [MPa]
    pub qt: f64,
    /// Sleeve friction [MPa]
    pub fs: f64,
    /// Total vertical stress [kPa]
    pub sigma_vo: f64,
    /// Effective vertical stress [kPa]
    pub sigma_vo_eff: f64,
    #[serde(flatten)]
    pub coefficients: RobertsonWrideCoefficients,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BehaviourIndexRobertsonWrideOutput {
    #[serde(rename = "exponent_zhang [-]")]
    pub exponent_zhang: f64,
    #[serde(rename = "Qtn [-]")]
    pub qtn: f64,
    #[serde(rename = "Fr [%]")]
    pub fr: f64,
    #[serde(rename = "Ic [-]")]
    pub ic: f64,
    #[serde(rename = "Ic class number [-]")]
    pub ic_class_number: Option<u8>,
    #[serde(rename = "Ic class")]
    pub ic_class: Option<&'static str>,
}

impl ErrorReturn for BehaviourIndexRobertsonWrideOutput {
    fn error_return() -> Self {
        Self {
            exponent_zhang: f64::NAN,
            qtn: f64::NAN,
            fr: f64::NAN,
            ic: f64::NAN,
            ic_class_number: None,
            ic_class: None,
        }
    }
}

impl BehaviourIndexRobertsonWride {
    fn exponent(&self, ic: f64) -> f64 {
        let c = &self.coefficients;
        let n = c.zhang_multiplier_1 * ic
            + c.zhang_multiplier_2 * (self.sigma_vo_eff / c.atmospheric_pressure)
            - c.zhang_subtraction;
        n.min(1.0)
    }

    fn qtn(&self, n: f64) -> f64 {
        let pa = 0.001 * self.coefficients.atmospheric_pressure;
        ((self.qt - 0.001 * self.sigma_vo) / pa) * (pa / (0.001 * self.sigma_vo_eff)).powf(n)
    }

    fn friction_ratio(&self) -> f64 {
        100.0 * self.fs / (self.qt - 0.001 * self.sigma_vo)
    }

    fn index(&self, qtn: f64, fr: f64) -> f64 {
        let c = &self.coefficients;
        ((c.robertsonwride_coefficient1 - qtn.log10()).powi(2)
            + (fr.log10() + c.robertsonwride_coefficient2).powi(2))
        .sqrt()
    }
}

impl Correlation for BehaviourIndexRobertsonWride {
    const NAME: &'static str = "Ic Robertson and Wride (1998)";
    type Output = BehaviourIndexRobertsonWrideOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qt", self.qt, Some(0.0), Some(120.0))?;
        validate_float("fs", self.fs, Some(0.0), None)?;
        validate_float("sigma_vo", self.sigma_vo, Some(0.0), None)?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(0.0), None)?;
        let c = &self.coefficients;
        validate_float("atmospheric_pressure", c.atmospheric_pressure, None, None)?;
        validate_float("ic_min", c.ic_min, None, None)?;
        validate_float("ic_max", c.ic_max, None, None)
    }

    fn calculate(&self) -> Result<Self::Output> {
        let fr = self.friction_ratio();
        let ic = brentq(
            |ic| ic - self.index(self.qtn(self.exponent(ic)), fr),
            self.coefficients.ic_min,
            self.coefficients.ic_max,
        )?;
        let exponent_zhang = self.exponent(ic);
        let class = soil_behaviour_class(ic);

        Ok(BehaviourIndexRobertsonWrideOutput {
            exponent_zhang,
            qtn: self.qtn(exponent_zhang),
            fr,
            ic,
            ic_class_number: class.number,
            ic_class: class.description,
        })
    }
}

/// Non-normalised soil behaviour type index. Close to the normalised index
/// for effective stresses between 50 and 150 kPa.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BehaviourIndexNonNormalised {
    /// Cone resistance [MPa]
    pub qc: f64,
    /// Friction ratio [%]
    #[serde(rename = "Rf")]
    pub rf: f64,
    #[serde(default = "default_atmospheric_pressure")]
    pub atmospheric_pressure: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BehaviourIndexNonNormalisedOutput {
    #[serde(rename = "Isbt [-]")]
    pub isbt: f64,
    #[serde(rename = "Isbt class number [-]")]
    pub isbt_class_number: Option<u8>,
    #[serde(rename = "Isbt class")]
    pub isbt_class: Option<&'static str>,
}

impl ErrorReturn for BehaviourIndexNonNormalisedOutput {
    fn error_return() -> Self {
        Self {
            isbt: f64::NAN,
            isbt_class_number: None,
            isbt_class: None,
        }
    }
}

impl Correlation for BehaviourIndexNonNormalised {
    const NAME: &'static str = "Isbt Robertson (2010)";
    type Output = BehaviourIndexNonNormalisedOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qc", self.qc, Some(0.0), Some(100.0))?;
        validate_float("Rf", self.rf, Some(0.1), Some(10.0))?;
        validate_float(
            "atmospheric_pressure",
            self.atmospheric_pressure,
            Some(90.0),
            Some(110.0),
        )
    }

    fn calculate(&self) -> Result<Self::Output> {
        let isbt = ((3.47 - (1000.0 * self.qc / self.atmospheric_pressure).log10()).powi(2)
            + (self.rf.log10() + 1.22).powi(2))
        .sqrt();
        let class = soil_behaviour_class(isbt);
        Ok(BehaviourIndexNonNormalisedOutput {
            isbt,
            isbt_class_number: class.number,
            isbt_class: class.description,
        })
    }
}
