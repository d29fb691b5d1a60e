//! Relative density, friction angle and undrained shear strength.

use serde::{Deserialize, Serialize};

use super::{Correlation, ErrorReturn, default_atmospheric_pressure};
use crate::error::Result;
use crate::numerics::interp;
use crate::validation::validate_float;

/// Mean effective stress from vertical effective stress and K0 [kPa].
fn mean_effective_stress(sigma_vo_eff: f64, k0: f64) -> f64 {
    (sigma_vo_eff + 2.0 * k0 * sigma_vo_eff) / 3.0
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RelativeDensityOutput {
    #[serde(rename = "Dr [-]")]
    pub relative_density: f64,
}

impl ErrorReturn for RelativeDensityOutput {
    fn error_return() -> Self {
        Self {
            relative_density: f64::NAN,
        }
    }
}

/// Relative density of normally consolidated silica sand from calibration
/// chamber tests (Baldi et al, 1986).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RelativeDensityNcSandBaldi {
    /// Cone resistance [MPa]
    pub qc: f64,
    /// [kPa]
    pub sigma_vo_eff: f64,
    #[serde(flatten)]
    pub coefficients: BaldiNcCoefficients,
}

impl Correlation for RelativeDensityNcSandBaldi {
    const NAME: &'static str = "Dr Baldi et al (1986) - NC sand";
    type Output = RelativeDensityOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qc", self.qc, Some(0.0), Some(120.0))?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(0.0), None)
    }

    fn calculate(&self) -> Result<Self::Output> {
        let c = &self.coefficients;
        let relative_density = (1000.0 * self.qc
            / (c.coefficient_0 * self.sigma_vo_eff.powf(c.coefficient_1)))
        .ln()
            / c.coefficient_2;
        Ok(RelativeDensityOutput { relative_density })
    }
}

/// Coefficients of the Baldi et al (1986) chart for normally consolidated
/// sand, applied to the vertical effective stress.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BaldiNcCoefficients {
    pub coefficient_0: f64,
    pub coefficient_1: f64,
    pub coefficient_2: f64,
}

impl Default for BaldiNcCoefficients {
    fn default() -> Self {
        Self {
            coefficient_0: 157.0,
            coefficient_1: 0.55,
            coefficient_2: 2.41,
        }
    }
}

/// Coefficients of the Baldi et al (1986) chart for overconsolidated sand.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BaldiCoefficients {
    pub coefficient_0: f64,
    pub coefficient_1: f64,
    pub coefficient_2: f64,
}

impl Default for BaldiCoefficients {
    fn default() -> Self {
        Self {
            coefficient_0: 181.0,
            coefficient_1: 0.55,
            coefficient_2: 2.61,
        }
    }
}

impl BaldiCoefficients {
    fn stress_term(&self, sigma_m_eff: f64) -> f64 {
        self.coefficient_0 * sigma_m_eff.powf(self.coefficient_1)
    }
}

/// Relative density of overconsolidated sand (Baldi et al, 1986). Requires an
/// estimate of K0.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RelativeDensityOcSandBaldi {
    pub qc: f64,
    pub sigma_vo_eff: f64,
    pub k0: f64,
    #[serde(flatten)]
    pub coefficients: BaldiCoefficients,
}

impl Correlation for RelativeDensityOcSandBaldi {
    const NAME: &'static str = "Dr Baldi et al (1986) - OC sand";
    type Output = RelativeDensityOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qc", self.qc, Some(0.0), Some(120.0))?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(0.0), None)?;
        validate_float("k0", self.k0, Some(0.3), Some(5.0))
    }

    fn calculate(&self) -> Result<Self::Output> {
        let sigma_m_eff = mean_effective_stress(self.sigma_vo_eff, self.k0);
        let c = &self.coefficients;
        Ok(RelativeDensityOutput {
            relative_density: (1000.0 * self.qc / c.stress_term(sigma_m_eff)).ln() / c.coefficient_2,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ConeResistanceOutput {
    #[serde(rename = "qc [MPa]")]
    pub qc: f64,
}

impl ErrorReturn for ConeResistanceOutput {
    fn error_return() -> Self {
        Self { qc: f64::NAN }
    }
}

/// Cone resistance expected for a given relative density in overconsolidated
/// sand; the inverse of [`RelativeDensityOcSandBaldi`].
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ConeResistanceOcSandBaldi {
    /// Relative density [-]
    pub dr: f64,
    pub sigma_vo_eff: f64,
    pub k0: f64,
    #[serde(flatten)]
    pub coefficients: BaldiCoefficients,
}

impl Correlation for ConeResistanceOcSandBaldi {
    const NAME: &'static str = "qc Baldi et al (1986) - OC sand";
    type Output = ConeResistanceOutput;

    fn validate(&self) -> Result<()> {
        validate_float("dr", self.dr, Some(0.0), Some(1.0))?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(0.0), None)?;
        validate_float("k0", self.k0, Some(0.3), Some(5.0))
    }

    fn calculate(&self) -> Result<Self::Output> {
        let sigma_m_eff = mean_effective_stress(self.sigma_vo_eff, self.k0);
        let c = &self.coefficients;
        Ok(ConeResistanceOutput {
            qc: 0.001 * (self.dr * c.coefficient_2).exp() * c.stress_term(sigma_m_eff),
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct JamiolkowskiCoefficients {
    #[serde(default = "default_atmospheric_pressure")]
    pub atmospheric_pressure: f64,
    pub coefficient_1: f64,
    pub coefficient_2: f64,
    pub coefficient_3: f64,
    pub coefficient_4: f64,
    pub coefficient_5: f64,
}

impl Default for JamiolkowskiCoefficients {
    fn default() -> Self {
        Self {
            atmospheric_pressure: default_atmospheric_pressure(),
            coefficient_1: 2.96,
            coefficient_2: 24.94,
            coefficient_3: 0.46,
            coefficient_4: -1.87,
            coefficient_5: 2.32,
        }
    }
}

/// Relative density of dry and saturated sand (Jamiolkowski et al, 2003).
///
/// Calibrated for vertical effective stresses between 50 and 400 kPa and K0
/// between 0.4 and 1.5. The saturated value can be up to 10% higher.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RelativeDensitySandJamiolkowski {
    pub qc: f64,
    pub sigma_vo_eff: f64,
    pub k0: f64,
    #[serde(flatten)]
    pub coefficients: JamiolkowskiCoefficients,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RelativeDensityJamiolkowskiOutput {
    #[serde(rename = "Dr dry [-]")]
    pub relative_density_dry: f64,
    #[serde(rename = "Dr sat [-]")]
    pub relative_density_saturated: f64,
}

impl ErrorReturn for RelativeDensityJamiolkowskiOutput {
    fn error_return() -> Self {
        Self {
            relative_density_dry: f64::NAN,
            relative_density_saturated: f64::NAN,
        }
    }
}

impl Correlation for RelativeDensitySandJamiolkowski {
    const NAME: &'static str = "Dr Jamiolkowski et al (2003)";
    type Output = RelativeDensityJamiolkowskiOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qc", self.qc, Some(0.0), Some(120.0))?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(50.0), Some(400.0))?;
        validate_float("k0", self.k0, Some(0.4), Some(1.5))
    }

    fn calculate(&self) -> Result<Self::Output> {
        let c = &self.coefficients;
        let pa = c.atmospheric_pressure;
        let sigma_m_eff = mean_effective_stress(self.sigma_vo_eff, self.k0);

        let dry = ((1000.0 * self.qc / pa) / (c.coefficient_2 * (sigma_m_eff / pa).powf(c.coefficient_3)))
            .ln()
            / c.coefficient_1;
        let saturation_factor = (c.coefficient_4
            + c.coefficient_5 * (1000.0 * self.qc / (pa + self.sigma_vo_eff).sqrt()).ln())
            / 100.0
            + 1.0;

        Ok(RelativeDensityJamiolkowskiOutput {
            relative_density_dry: dry,
            relative_density_saturated: saturation_factor * dry,
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FrictionAngleKulhawyMayneCoefficients {
    #[serde(default = "default_atmospheric_pressure")]
    pub atmospheric_pressure: f64,
    pub coefficient_1: f64,
    pub coefficient_2: f64,
}

impl Default for FrictionAngleKulhawyMayneCoefficients {
    fn default() -> Self {
        Self {
            atmospheric_pressure: default_atmospheric_pressure(),
            coefficient_1: 17.6,
            coefficient_2: 11.0,
        }
    }
}

/// Friction angle of sand from calibration chamber tests (Kulhawy and Mayne, 1990).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FrictionAngleKulhawyMayne {
    /// Corrected cone resistance [MPa]
    pub qt: f64,
    pub sigma_vo_eff: f64,
    #[serde(flatten)]
    pub coefficients: FrictionAngleKulhawyMayneCoefficients,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FrictionAngleOutput {
    #[serde(rename = "Phi [deg]")]
    pub phi: f64,
}

impl ErrorReturn for FrictionAngleOutput {
    fn error_return() -> Self {
        Self { phi: f64::NAN }
    }
}

impl Correlation for FrictionAngleKulhawyMayne {
    const NAME: &'static str = "Friction angle Kulhawy and Mayne (1990)";
    type Output = FrictionAngleOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qt", self.qt, Some(0.0), Some(120.0))?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(0.0), None)
    }

    fn calculate(&self) -> Result<Self::Output> {
        let c = &self.coefficients;
        let pa = c.atmospheric_pressure;
        let ratio = (1000.0 * self.qt / pa) / (self.sigma_vo_eff / pa).sqrt();
        Ok(FrictionAngleOutput {
            phi: c.coefficient_1 + c.coefficient_2 * ratio.log10(),
        })
    }
}

/// Undrained shear strength of clay from net cone resistance (Rad and Lunne, 1988).
///
/// The cone factor should be calibrated against high-quality laboratory tests.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UndrainedShearStrengthRadLunne {
    /// Net cone resistance [MPa]
    pub qnet: f64,
    /// Empirical cone factor [-]
    #[serde(rename = "Nk")]
    pub nk: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UndrainedShearStrengthOutput {
    #[serde(rename = "Su [kPa]")]
    pub su: f64,
}

impl ErrorReturn for UndrainedShearStrengthOutput {
    fn error_return() -> Self {
        Self { su: f64::NAN }
    }
}

impl Correlation for UndrainedShearStrengthRadLunne {
    const NAME: &'static str = "Su Rad and Lunne (1988)";
    type Output = UndrainedShearStrengthOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qnet", self.qnet, Some(0.0), Some(120.0))?;
        validate_float("Nk", self.nk, Some(8.0), Some(30.0))
    }

    fn calculate(&self) -> Result<Self::Output> {
        Ok(UndrainedShearStrengthOutput {
            su: 1000.0 * self.qnet / self.nk,
        })
    }
}

/// Mean effective stresses of the Kleven chart lines [kPa].
const KLEVEN_STRESSES: [f64; 7] = [10.0, 25.0, 50.0, 100.0, 200.0, 400.0, 800.0];
/// Slope and intercept of phi against relative density [%] for each chart line.
const KLEVEN_LINES: [(f64, f64); 7] = [
    (0.2183, 25.667),
    (0.2175, 24.75),
    (0.22, 23.5),
    (0.2175, 22.75),
    (0.2, 23.0),
    (0.1925, 22.75),
    (0.195, 21.3),
];

fn default_kleven_k0() -> f64 {
    0.5
}

fn default_max_friction_angle() -> f64 {
    45.0
}

/// Peak drained friction angle from the Kleven (1986) chart for North Sea
/// sands, as a function of mean effective stress and relative density.
///
/// Stresses below 10 kPa use the 10 kPa line, stresses above 800 kPa the
/// 800 kPa line.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FrictionAngleKleven {
    pub sigma_vo_eff: f64,
    /// Relative density in percent [%]
    pub relative_density: f64,
    #[serde(rename = "Ko", default = "default_kleven_k0")]
    pub k0: f64,
    #[serde(default = "default_max_friction_angle")]
    pub max_friction_angle: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FrictionAngleKlevenOutput {
    #[serde(rename = "phi [deg]")]
    pub phi: f64,
    #[serde(rename = "sigma_m [kPa]")]
    pub sigma_m: f64,
}

impl ErrorReturn for FrictionAngleKlevenOutput {
    fn error_return() -> Self {
        Self {
            phi: f64::NAN,
            sigma_m: f64::NAN,
        }
    }
}

impl Correlation for FrictionAngleKleven {
    const NAME: &'static str = "Friction angle Kleven (1986)";
    type Output = FrictionAngleKlevenOutput;

    fn validate(&self) -> Result<()> {
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(10.0), Some(800.0))?;
        validate_float("relative_density", self.relative_density, Some(40.0), Some(100.0))?;
        validate_float("Ko", self.k0, Some(0.3), Some(2.0))
    }

    fn calculate(&self) -> Result<Self::Output> {
        let sigma_m = mean_effective_stress(self.sigma_vo_eff, self.k0);
        let dr = self.relative_density.min(100.0);
        let phis: Vec<f64> = KLEVEN_LINES
            .iter()
            .map(|(slope, intercept)| slope * dr + intercept)
            .collect();
        let phi = interp(sigma_m, &KLEVEN_STRESSES, &phis).min(self.max_friction_angle);
        Ok(FrictionAngleKlevenOutput { phi, sigma_m })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insitu::pcpt::test_support::assert_close;
    use crate::validation::ErrorPolicy;

    #[test]
    fn test_relative_density_nc_baldi() {
        let input: RelativeDensityNcSandBaldi =
            serde_json::from_str(r#"{"qc": 10.0, "sigma_vo_eff": 100.0}"#).unwrap();
        let result = input.evaluate(ErrorPolicy::Raise).unwrap();
        assert_close(result.relative_density, 0.672_718_242_462_416_6, 1e-10);
        assert_eq!(input.coefficients, BaldiNcCoefficients::default());
    }

    #[test]
    fn test_relative_density_nc_baldi_coefficient_override() {
        let input: RelativeDensityNcSandBaldi = serde_json::from_str(
            r#"{"qc": 10.0, "sigma_vo_eff": 100.0, "coefficient_0": 181.0, "coefficient_2": 2.61}"#,
        )
        .unwrap();
        assert_eq!(input.coefficients.coefficient_0, 181.0);
        assert_eq!(input.coefficients.coefficient_1, 0.55);
        assert_eq!(input.coefficients.coefficient_2, 2.61);

        let expected = (1000.0_f64 * 10.0 / (181.0 * 100.0_f64.powf(0.55))).ln() / 2.61;
        let result = input.evaluate(ErrorPolicy::Raise).unwrap();
        assert_close(result.relative_density, expected, 1e-12);
    }

    #[test]
    fn test_baldi_oc_and_inverse_agree() {
        let dr = RelativeDensityOcSandBaldi {
            qc: 10.0,
            sigma_vo_eff: 100.0,
            k0: 1.0,
            coefficients: BaldiCoefficients::default(),
        }
        .evaluate(ErrorPolicy::Raise)
        .unwrap()
        .relative_density;
        assert_close(dr, 0.566_666_566_443_259_2, 1e-10);

        let qc = ConeResistanceOcSandBaldi {
            dr,
            sigma_vo_eff: 100.0,
            k0: 1.0,
            coefficients: BaldiCoefficients::default(),
        }
        .evaluate(ErrorPolicy::Raise)
        .unwrap()
        .qc;
        assert_close(qc, 10.0, 1e-10);
    }

    #[test]
    fn test_relative_density_jamiolkowski() {
        let input = RelativeDensitySandJamiolkowski {
            qc: 10.0,
            sigma_vo_eff: 100.0,
            k0: 0.5,
            coefficients: JamiolkowskiCoefficients::default(),
        };
        let result = input.evaluate(ErrorPolicy::Raise).unwrap();
        assert_close(result.relative_density_dry, 0.532_165_944_414_174_5, 1e-10);
        assert_close(result.relative_density_saturated, 0.603_220_430_089_944_7, 1e-10);
    }

    #[test]
    fn test_jamiolkowski_shallow_stress_fails_silently() {
        let input = RelativeDensitySandJamiolkowski {
            qc: 10.0,
            sigma_vo_eff: 20.0,
            k0: 0.5,
            coefficients: JamiolkowskiCoefficients::default(),
        };
        let result = input.evaluate(ErrorPolicy::FailSilently).unwrap();
        assert!(result.relative_density_dry.is_nan());
        assert!(result.relative_density_saturated.is_nan());
    }

    #[test]
    fn test_friction_angle_kulhawy_mayne() {
        let input: FrictionAngleKulhawyMayne =
            serde_json::from_str(r#"{"qt": 10.0, "sigma_vo_eff": 100.0}"#).unwrap();
        assert_close(input.calculate().unwrap().phi, 39.6, 1e-12);
    }

    #[test]
    fn test_undrained_shear_strength() {
        let input: UndrainedShearStrengthRadLunne =
            serde_json::from_str(r#"{"qnet": 1.0, "Nk": 20.0}"#).unwrap();
        assert_close(input.calculate().unwrap().su, 50.0, 1e-12);

        let out_of_range = UndrainedShearStrengthRadLunne { qnet: 1.0, nk: 40.0 };
        assert!(out_of_range.evaluate(ErrorPolicy::Raise).is_err());
    }

    #[test]
    fn test_kleven_chart_line() {
        let input: FrictionAngleKleven = serde_json::from_str(
            r#"{"sigma_vo_eff": 100.0, "relative_density": 60.0, "Ko": 1.0}"#,
        )
        .unwrap();
        let result = input.evaluate(ErrorPolicy::Raise).unwrap();
        assert_close(result.sigma_m, 100.0, 1e-12);
        assert_close(result.phi, 35.8, 1e-10);
    }

    #[test]
    fn test_kleven_interpolates_between_lines() {
        let input = FrictionAngleKleven {
            sigma_vo_eff: 75.0,
            relative_density: 60.0,
            k0: 1.0,
            max_friction_angle: 45.0,
        };
        let result = input.calculate().unwrap();
        // Halfway between the 50 kPa (36.7) and 100 kPa (35.8) lines
        assert_close(result.phi, 36.25, 1e-10);
    }

    #[test]
    fn test_kleven_caps_at_max_angle_and_beyond_chart() {
        let capped = FrictionAngleKleven {
            sigma_vo_eff: 10.0,
            relative_density: 100.0,
            k0: 1.0,
            max_friction_angle: 45.0,
        }
        .calculate()
        .unwrap();
        assert_close(capped.phi, 45.0, 1e-12);

        let deep = FrictionAngleKleven {
            sigma_vo_eff: 800.0,
            relative_density: 60.0,
            k0: 2.0,
            max_friction_angle: 45.0,
        }
        .calculate()
        .unwrap();
        assert_close(deep.sigma_m, 1333.333_333_333_333_3, 1e-10);
        assert_close(deep.phi, 0.195 * 60.0 + 21.3, 1e-10);
    }
}
