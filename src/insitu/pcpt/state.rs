//! Stress history, sensitivity, unit weight and lateral earth pressure.

use serde::{Deserialize, Serialize};

use super::{Correlation, ErrorReturn, default_atmospheric_pressure, default_unitweight_water};
use crate::error::Result;
use crate::numerics::interp;
use crate::validation::validate_float;

/// Digitised chart curve: abscissae and ordinates.
type Curve = (&'static [f64], &'static [f64]);

const OCR_QT_HE: Curve = (
    &[
        2.118188717, 2.955763555, 4.261775866, 5.212142676, 6.987132136, 9.588363268, 13.01367738,
        18.08607808, 23.27342946, 27.27943334, 31.99025213, 33.87371616,
    ],
    &[
        0.00599007, 0.161314993, 0.292855171, 0.394488883, 0.508212442, 0.651930234, 0.801769746,
        0.95191644, 1.072244436, 1.138639862, 1.193230681, 1.205518004,
    ],
);

const OCR_QT_BE: Curve = (
    &[
        3.294139472, 4.721578548, 6.379458639, 8.389746184, 11.22465638, 14.29432499, 17.36237457,
        20.19404672, 24.08456025, 27.62050763, 31.15537566, 33.86508137,
    ],
    &[
        0.000241358, 0.173580374, 0.29325012, 0.407017563, 0.532874854, 0.6528079, 0.754836561,
        0.844885083, 0.93513108, 1.007406867, 1.067746398, 1.110027953,
    ],
);

const OCR_QT_LE: Curve = (
    &[
        4.705927987, 6.483615819, 8.494443039, 10.50580993, 13.10272367, 16.05258453, 19.4725019,
        22.77369087, 26.42620794, 29.60758917, 34.08526857,
    ],
    &[
        0.000504658, 0.144068858, 0.263804429, 0.389508129, 0.485480895, 0.581519487, 0.671677717,
        0.749877749, 0.810239222, 0.8645448, 0.942964248,
    ],
);

const OCR_BQ_LE: Curve = (
    &[
        0.075352962, 0.188834333, 0.276555837, 0.379904518, 0.46248832, 0.586554308, 0.715805569,
        0.855570091,
    ],
    &[
        0.692612411, 0.54389548, 0.436844931, 0.347765081, 0.252628686, 0.157669124, 0.062731666,
        0.00364719,
    ],
);

const OCR_BQ_BE: Curve = (
    &[
        0.102064255, 0.184481558, 0.251580897, 0.354763078, 0.468363377, 0.602728555, 0.726770757,
        0.866392565, 1.00608573,
    ],
    &[
        0.889671185, 0.752757888, 0.675459566, 0.544602814, 0.425726528, 0.312906788, 0.211979097,
        0.117085847, 0.040096985,
    ],
);

const OCR_BQ_HE: Curve = (
    &[
        0.164882176, 0.216425695, 0.293705296, 0.438155592, 0.577587115, 0.717089995, 0.898027489,
        1.037673083,
    ],
    &[
        1.039139658, 0.961775024, 0.83677588, 0.652382801, 0.50974452, 0.385010626, 0.248517308,
        0.159592188,
    ],
);

/// OCR curves are digitised as log10(OCR).
fn ocr_from_curve(x: f64, (xp, fp): Curve) -> f64 {
    10f64.powf(interp(x, xp, fp))
}

/// Overconsolidation ratio of clay from normalised cone resistance and pore
/// pressure ratio, based on NGI tests on high-quality samples (Lunne et al, 1997).
///
/// Low, best and high estimates are returned. Without `Bq` the Bq-based
/// estimates are NaN.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct OcrCptLunne {
    #[serde(rename = "Qt")]
    pub qt: f64,
    #[serde(rename = "Bq", default)]
    pub bq: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OcrCptLunneOutput {
    #[serde(rename = "OCR_Qt_LE [-]")]
    pub ocr_qt_le: f64,
    #[serde(rename = "OCR_Qt_BE [-]")]
    pub ocr_qt_be: f64,
    #[serde(rename = "OCR_Qt_HE [-]")]
    pub ocr_qt_he: f64,
    #[serde(rename = "OCR_Bq_LE [-]")]
    pub ocr_bq_le: f64,
    #[serde(rename = "OCR_Bq_BE [-]")]
    pub ocr_bq_be: f64,
    #[serde(rename = "OCR_Bq_HE [-]")]
    pub ocr_bq_he: f64,
}

impl ErrorReturn for OcrCptLunneOutput {
    fn error_return() -> Self {
        Self {
            ocr_qt_le: f64::NAN,
            ocr_qt_be: f64::NAN,
            ocr_qt_he: f64::NAN,
            ocr_bq_le: f64::NAN,
            ocr_bq_be: f64::NAN,
            ocr_bq_he: f64::NAN,
        }
    }
}

impl Correlation for OcrCptLunne {
    const NAME: &'static str = "OCR Lunne (1989)";
    type Output = OcrCptLunneOutput;

    fn validate(&self) -> Result<()> {
        validate_float("Qt", self.qt, Some(2.0), Some(34.0))?;
        match self.bq {
            Some(bq) => validate_float("Bq", bq, Some(0.0), Some(1.4)),
            None => Ok(()),
        }
    }

    fn calculate(&self) -> Result<Self::Output> {
        let (ocr_bq_le, ocr_bq_be, ocr_bq_he) = match self.bq {
            Some(bq) if !bq.is_nan() => (
                ocr_from_curve(bq, OCR_BQ_LE),
                ocr_from_curve(bq, OCR_BQ_BE),
                ocr_from_curve(bq, OCR_BQ_HE),
            ),
            _ => (f64::NAN, f64::NAN, f64::NAN),
        };
        Ok(OcrCptLunneOutput {
            ocr_qt_le: ocr_from_curve(self.qt, OCR_QT_LE),
            ocr_qt_be: ocr_from_curve(self.qt, OCR_QT_BE),
            ocr_qt_he: ocr_from_curve(self.qt, OCR_QT_HE),
            ocr_bq_le,
            ocr_bq_be,
            ocr_bq_he,
        })
    }
}

const SENSITIVITY_LE: Curve = (
    &[
        0.562740471, 0.611428435, 0.682345206, 0.757699952, 0.850826065, 0.952873546, 1.050502516,
        1.152588927, 1.26358373, 1.36570907, 1.490050241, 1.60551546, 1.747640974, 1.858687683,
        1.929747195,
    ],
    &[
        9.249026219, 8.570904876, 7.91500585, 7.237273803, 6.537903381, 5.948152249, 5.445927855,
        4.987564153, 4.595023931, 4.268047658, 3.919497895, 3.614614175, 3.288221847, 3.070864865,
        2.896719748,
    ],
);

const SENSITIVITY_BE: Curve = (
    &[
        0.714072837, 0.793839606, 0.878044349, 0.993334386, 1.104257818, 1.224063689, 1.339464026,
        1.463779243, 1.605846362, 1.756841338, 1.885626972, 2.045504387,
    ],
    &[
        9.995760998, 9.208604309, 8.399614597, 7.503487444, 6.870070268, 6.214884952, 5.691022183,
        5.2548808, 4.731407327, 4.339451049, 3.990966168, 3.577241751,
    ],
);

const SENSITIVITY_HE: Curve = (
    &[
        0.825586702, 0.896490496, 0.958505363, 1.042755524, 1.140358542, 1.233478166, 1.353297013,
        1.464226934, 1.588516198, 1.72615183, 1.846016095, 1.970344289, 2.099116947, 2.23678502,
    ],
    &[
        11.35505317, 10.65535834, 9.955533736, 9.299829359, 8.710013344, 7.988745018, 7.377355512,
        6.76583624, 6.242103237, 5.762360691, 5.30425652, 4.911910946, 4.519630255, 4.149377234,
    ],
);

/// Sensitivity of Norwegian clays from the friction ratio (Rad and Lunne, 1986).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SensitivityFrictionRatioLunne {
    /// Friction ratio [%]
    #[serde(rename = "Rf")]
    pub rf: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SensitivityOutput {
    #[serde(rename = "St LE [-]")]
    pub st_le: f64,
    #[serde(rename = "St BE [-]")]
    pub st_be: f64,
    #[serde(rename = "St HE [-]")]
    pub st_he: f64,
}

impl ErrorReturn for SensitivityOutput {
    fn error_return() -> Self {
        Self {
            st_le: f64::NAN,
            st_be: f64::NAN,
            st_he: f64::NAN,
        }
    }
}

impl Correlation for SensitivityFrictionRatioLunne {
    const NAME: &'static str = "Sensitivity Rad and Lunne (1986)";
    type Output = SensitivityOutput;

    fn validate(&self) -> Result<()> {
        validate_float("Rf", self.rf, Some(0.5), Some(2.2))
    }

    fn calculate(&self) -> Result<Self::Output> {
        let at = |(xp, fp): Curve| interp(self.rf, xp, fp);
        Ok(SensitivityOutput {
            st_le: at(SENSITIVITY_LE),
            st_be: at(SENSITIVITY_BE),
            st_he: at(SENSITIVITY_HE),
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UnitWeightMayneCoefficients {
    #[serde(default = "default_unitweight_water")]
    pub unitweight_water: f64,
    #[serde(default = "default_atmospheric_pressure")]
    pub atmospheric_pressure: f64,
    pub coefficient_1: f64,
    pub exponent_1: f64,
    pub exponent_2: f64,
}

impl Default for UnitWeightMayneCoefficients {
    fn default() -> Self {
        Self {
            unitweight_water: default_unitweight_water(),
            atmospheric_pressure: default_atmospheric_pressure(),
            coefficient_1: 1.95,
            exponent_1: 0.06,
            exponent_2: 0.06,
        }
    }
}

/// Total unit weight of uncemented sand, silt and clay from corrected sleeve
/// friction (Mayne et al, 2010). The scatter is about +-2 kN/m3.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UnitWeightMayne {
    /// Corrected sleeve friction [MPa]
    pub ft: f64,
    pub sigma_vo_eff: f64,
    #[serde(flatten)]
    pub coefficients: UnitWeightMayneCoefficients,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UnitWeightOutput {
    #[serde(rename = "gamma [kN/m3]")]
    pub gamma: f64,
}

impl ErrorReturn for UnitWeightOutput {
    fn error_return() -> Self {
        Self { gamma: f64::NAN }
    }
}

impl Correlation for UnitWeightMayne {
    const NAME: &'static str = "Unit weight Mayne et al (2010)";
    type Output = UnitWeightOutput;

    fn validate(&self) -> Result<()> {
        validate_float("ft", self.ft, Some(0.0), Some(10.0))?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(0.0), Some(500.0))?;
        validate_float(
            "unitweight_water",
            self.coefficients.unitweight_water,
            Some(9.0),
            Some(11.0),
        )
    }

    fn calculate(&self) -> Result<Self::Output> {
        let c = &self.coefficients;
        let pa = c.atmospheric_pressure;
        Ok(UnitWeightOutput {
            gamma: c.coefficient_1
                * c.unitweight_water
                * (1000.0 * self.ft / pa).powf(c.exponent_1)
                * (self.sigma_vo_eff / pa).powf(c.exponent_2),
        })
    }
}

fn default_friction_angle() -> f64 {
    32.0
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct K0SandMayneCoefficients {
    #[serde(default = "default_atmospheric_pressure")]
    pub atmospheric_pressure: f64,
    pub multiplier: f64,
    pub exponent_1: f64,
    pub exponent_2: f64,
    pub exponent_3: f64,
    /// Used for the conventional K0 and the passive limit [deg]
    #[serde(default = "default_friction_angle")]
    pub friction_angle: f64,
}

impl Default for K0SandMayneCoefficients {
    fn default() -> Self {
        Self {
            atmospheric_pressure: default_atmospheric_pressure(),
            multiplier: 0.192,
            exponent_1: 0.22,
            exponent_2: 0.31,
            exponent_3: 0.27,
            friction_angle: default_friction_angle(),
        }
    }
}

/// Coefficient of lateral earth pressure at rest for clean sand from
/// calibration chamber tests (Mayne, 2007).
///
/// The CPT value should be compared with the conventional estimate from
/// friction angle and OCR, and with the Rankine passive limit.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct K0SandMayne {
    pub qt: f64,
    pub sigma_vo_eff: f64,
    pub ocr: f64,
    #[serde(flatten)]
    pub coefficients: K0SandMayneCoefficients,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct K0SandMayneOutput {
    #[serde(rename = "K0 CPT [-]")]
    pub k0_cpt: f64,
    #[serde(rename = "K0 conventional [-]")]
    pub k0_conventional: f64,
    #[serde(rename = "Kp [-]")]
    pub kp: f64,
}

impl ErrorReturn for K0SandMayneOutput {
    fn error_return() -> Self {
        Self {
            k0_cpt: f64::NAN,
            k0_conventional: f64::NAN,
            kp: f64::NAN,
        }
    }
}

impl Correlation for K0SandMayne {
    const NAME: &'static str = "K0 Mayne (2007) - sand";
    type Output = K0SandMayneOutput;

    fn validate(&self) -> Result<()> {
        let c = &self.coefficients;
        validate_float("qt", self.qt, Some(0.0), Some(100.0))?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(0.0), None)?;
        validate_float("ocr", self.ocr, Some(1.0), Some(20.0))?;
        validate_float("atmospheric_pressure", c.atmospheric_pressure, Some(90.0), Some(110.0))?;
        validate_float("friction_angle", c.friction_angle, Some(25.0), Some(45.0))
    }

    fn calculate(&self) -> Result<Self::Output> {
        let c = &self.coefficients;
        let pa = c.atmospheric_pressure;
        let phi = c.friction_angle.to_radians();

        let k0_cpt = c.multiplier
            * (1000.0 * self.qt / pa).powf(c.exponent_1)
            * (pa / self.sigma_vo_eff).powf(c.exponent_2)
            * self.ocr.powf(c.exponent_3);
        let kp = (std::f64::consts::FRAC_PI_4 + 0.5 * phi).tan().powi(2);
        let k0_conventional = (1.0 - phi.sin()) * self.ocr.powf(phi.sin());

        Ok(K0SandMayneOutput {
            k0_cpt,
            k0_conventional,
            kp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insitu::pcpt::test_support::assert_close;
    use crate::validation::ErrorPolicy;

    #[test]
    fn test_ocr_from_qt_only() {
        let input: OcrCptLunne = serde_json::from_str(r#"{"Qt": 10.0}"#).unwrap();
        let result = input.evaluate(ErrorPolicy::Raise).unwrap();

        assert_close(result.ocr_qt_le, 2.279_799_746_227_529_2, 1e-9);
        assert_close(result.ocr_qt_be, 3.009_578_019_851_138, 1e-9);
        assert_close(result.ocr_qt_he, 4.676_674_892_928_344, 1e-9);
        assert!(result.ocr_bq_be.is_nan());
    }

    #[test]
    fn test_ocr_with_pore_pressure_ratio() {
        let input = OcrCptLunne {
            qt: 10.0,
            bq: Some(0.5),
        };
        let result = input.evaluate(ErrorPolicy::Raise).unwrap();
        assert_close(result.ocr_bq_be, 2.507_049_062_988_774_5, 1e-9);
        assert!(result.ocr_bq_le < result.ocr_bq_be);
        assert!(result.ocr_bq_be < result.ocr_bq_he);
    }

    #[test]
    fn test_ocr_rejects_out_of_range_bq() {
        let input = OcrCptLunne {
            qt: 10.0,
            bq: Some(2.0),
        };
        assert!(input.evaluate(ErrorPolicy::Raise).unwrap_err().is_validation());
    }

    #[test]
    fn test_sensitivity_estimates() {
        let input = SensitivityFrictionRatioLunne { rf: 1.0 };
        let result = input.evaluate(ErrorPolicy::Raise).unwrap();
        assert_close(result.st_be, 7.465_424_121_219_057, 1e-9);
        assert!(result.st_le < result.st_be);
        assert!(result.st_be < result.st_he);
    }

    #[test]
    fn test_unit_weight_mayne() {
        let input: UnitWeightMayne =
            serde_json::from_str(r#"{"ft": 0.05, "sigma_vo_eff": 100.0}"#).unwrap();
        let result = input.evaluate(ErrorPolicy::Raise).unwrap();
        assert_close(result.gamma, 19.173_291_585_013_72, 1e-10);
    }

    #[test]
    fn test_k0_sand_mayne_normally_consolidated() {
        let input: K0SandMayne =
            serde_json::from_str(r#"{"qt": 10.0, "sigma_vo_eff": 100.0, "ocr": 1.0}"#).unwrap();
        let result = input.evaluate(ErrorPolicy::Raise).unwrap();
        assert_close(result.k0_cpt, 0.528_811_911_040_928, 1e-10);
        assert_close(result.kp, 3.254_588_303_299_862, 1e-10);
        assert_close(result.k0_conventional, 0.470_080_735_766_795_1, 1e-10);
    }

    #[test]
    fn test_k0_sand_mayne_overconsolidated() {
        let input = K0SandMayne {
            qt: 10.0,
            sigma_vo_eff: 100.0,
            ocr: 2.0,
            coefficients: K0SandMayneCoefficients::default(),
        };
        let result = input.calculate().unwrap();
        assert_close(result.k0_cpt, 0.637_645_541_709_261, 1e-10);
        assert_close(result.k0_conventional, 0.678_725_314_894_192_1, 1e-10);
    }
}
