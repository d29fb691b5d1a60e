//! Small-strain shear modulus, shear wave velocity and drained secant modulus.

use serde::{Deserialize, Serialize};

use super::{Correlation, ErrorReturn, default_atmospheric_pressure};
use crate::error::{GroundhogError, Result};
use crate::numerics::interp;
use crate::validation::{validate_choice, validate_float};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GmaxOutput {
    #[serde(rename = "Gmax [kPa]")]
    pub gmax: f64,
}

impl ErrorReturn for GmaxOutput {
    fn error_return() -> Self {
        Self { gmax: f64::NAN }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GmaxSandRixStokoeCoefficients {
    pub multiplier: f64,
    pub qc_exponent: f64,
    pub stress_exponent: f64,
}

impl Default for GmaxSandRixStokoeCoefficients {
    fn default() -> Self {
        Self {
            multiplier: 1634.0,
            qc_exponent: 0.25,
            stress_exponent: 0.375,
        }
    }
}

/// Small-strain shear modulus of uncemented silica sand (Rix and Stokoe, 1991).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GmaxSandRixStokoe {
    /// Cone resistance [MPa]
    pub qc: f64,
    /// [kPa]
    pub sigma_vo_eff: f64,
    #[serde(flatten)]
    pub coefficients: GmaxSandRixStokoeCoefficients,
}

impl Correlation for GmaxSandRixStokoe {
    const NAME: &'static str = "Gmax Rix and Stokoe (1991)";
    type Output = GmaxOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qc", self.qc, Some(0.0), Some(120.0))?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(0.0), None)
    }

    fn calculate(&self) -> Result<Self::Output> {
        let c = &self.coefficients;
        Ok(GmaxOutput {
            gmax: c.multiplier
                * (1000.0 * self.qc).powf(c.qc_exponent)
                * self.sigma_vo_eff.powf(c.stress_exponent),
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GmaxClayMayneRixCoefficients {
    pub multiplier: f64,
    pub exponent: f64,
}

impl Default for GmaxClayMayneRixCoefficients {
    fn default() -> Self {
        Self {
            multiplier: 2.78,
            exponent: 1.335,
        }
    }
}

/// Small-strain shear modulus of clay from cone resistance (Mayne and Rix, 1993).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GmaxClayMayneRix {
    pub qc: f64,
    #[serde(flatten)]
    pub coefficients: GmaxClayMayneRixCoefficients,
}

impl Correlation for GmaxClayMayneRix {
    const NAME: &'static str = "Gmax Mayne and Rix (1993)";
    type Output = GmaxOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qc", self.qc, Some(0.0), Some(120.0))
    }

    fn calculate(&self) -> Result<Self::Output> {
        let c = &self.coefficients;
        Ok(GmaxOutput {
            gmax: c.multiplier * (1000.0 * self.qc).powf(c.exponent),
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GmaxCptPuechenCoefficients {
    /// Calibration factor, between 0.5 and 2
    pub coefficient_b: f64,
    #[serde(rename = "coefficient_Bq")]
    pub coefficient_bq: f64,
    pub multiplier_qc: f64,
    pub exponent_1: f64,
    pub exponent_2: f64,
    #[serde(rename = "Bq_min")]
    pub bq_min: f64,
    #[serde(rename = "Bq_max")]
    pub bq_max: f64,
}

impl Default for GmaxCptPuechenCoefficients {
    fn default() -> Self {
        Self {
            coefficient_b: 1.0,
            coefficient_bq: 4.0,
            multiplier_qc: 1.634,
            exponent_1: 0.25,
            exponent_2: 0.375,
            bq_min: 0.0,
            bq_max: 0.5,
        }
    }
}

/// Rix and Stokoe modified for the pore pressure ratio (Puechen et al, 2020).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GmaxCptPuechen {
    pub qc: f64,
    pub sigma_vo_eff: f64,
    #[serde(rename = "Bq")]
    pub bq: f64,
    #[serde(flatten)]
    pub coefficients: GmaxCptPuechenCoefficients,
}

impl Correlation for GmaxCptPuechen {
    const NAME: &'static str = "Gmax Puechen (2020)";
    type Output = GmaxOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qc", self.qc, Some(0.0), Some(70.0))?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(0.0), None)?;
        validate_float("Bq", self.bq, Some(-0.2), Some(0.5))
    }

    fn calculate(&self) -> Result<Self::Output> {
        let c = &self.coefficients;
        let bq = self.bq.max(c.bq_min).min(c.bq_max);
        Ok(GmaxOutput {
            gmax: c.coefficient_b
                * (1.0 + c.coefficient_bq * bq)
                * 1000.0
                * c.multiplier_qc
                * (1000.0 * self.qc).powf(c.exponent_1)
                * self.sigma_vo_eff.powf(c.exponent_2),
        })
    }
}

fn default_bulk_unit_weight() -> f64 {
    19.0
}

fn default_gravity() -> f64 {
    9.81
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VsIcRobertsonCabalCoefficients {
    #[serde(default = "default_atmospheric_pressure")]
    pub atmospheric_pressure: f64,
    /// Bulk unit weight used for the density [kN/m3]
    #[serde(default = "default_bulk_unit_weight")]
    pub gamma: f64,
    #[serde(default = "default_gravity")]
    pub g: f64,
    pub exponent: f64,
    pub calibration_coefficient_1: f64,
    pub calibration_coefficient_2: f64,
}

impl Default for VsIcRobertsonCabalCoefficients {
    fn default() -> Self {
        Self {
            atmospheric_pressure: default_atmospheric_pressure(),
            gamma: default_bulk_unit_weight(),
            g: default_gravity(),
            exponent: 0.5,
            calibration_coefficient_1: 0.55,
            calibration_coefficient_2: 1.68,
        }
    }
}

/// Shear wave velocity from total cone resistance and the soil behaviour type
/// index for uncemented Holocene to Pleistocene soils (Robertson and Cabal, 2015).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct VsIcRobertsonCabal {
    pub qt: f64,
    pub ic: f64,
    /// Total vertical stress [kPa]
    pub sigma_vo: f64,
    #[serde(flatten)]
    pub coefficients: VsIcRobertsonCabalCoefficients,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VsIcRobertsonCabalOutput {
    #[serde(rename = "alpha_vs [-]")]
    pub alpha_vs: f64,
    #[serde(rename = "Vs [m/s]")]
    pub vs: f64,
    #[serde(rename = "Gmax [kPa]")]
    pub gmax: f64,
}

impl ErrorReturn for VsIcRobertsonCabalOutput {
    fn error_return() -> Self {
        Self {
            alpha_vs: f64::NAN,
            vs: f64::NAN,
            gmax: f64::NAN,
        }
    }
}

impl Correlation for VsIcRobertsonCabal {
    const NAME: &'static str = "Shear wave velocity Robertson and Cabal (2015)";
    type Output = VsIcRobertsonCabalOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qt", self.qt, Some(0.0), Some(100.0))?;
        validate_float("ic", self.ic, Some(1.0), Some(4.0))?;
        validate_float("sigma_vo", self.sigma_vo, Some(0.0), Some(800.0))?;
        validate_float("gamma", self.coefficients.gamma, Some(12.0), Some(22.0))?;
        validate_float("g", self.coefficients.g, Some(9.7), Some(10.2))
    }

    fn calculate(&self) -> Result<Self::Output> {
        let c = &self.coefficients;
        let alpha_vs = 10f64.powf(c.calibration_coefficient_1 * self.ic + c.calibration_coefficient_2);
        let vs = (alpha_vs * (1000.0 * self.qt - self.sigma_vo) / c.atmospheric_pressure).powf(c.exponent);
        let density = 1000.0 * c.gamma / c.g;
        Ok(VsIcRobertsonCabalOutput {
            alpha_vs,
            vs,
            gmax: 1e-3 * density * vs.powi(2),
        })
    }
}

/// Digitised Es/qc chart for one sand type at 50 and 300 kPa mean effective stress.
struct BellottiChart {
    qc1_50: &'static [f64],
    ratio_50: &'static [f64],
    qc1_300: &'static [f64],
    ratio_300: &'static [f64],
}

const BELLOTTI_NC: BellottiChart = BellottiChart {
    qc1_50: &[
        36.0, 40.60330415823624, 46.020854882827855, 51.41286865966658, 59.40641474746315,
        68.97423612037261, 83.63131157432191, 97.56959774187784, 114.38054759574864,
        134.08797382678958, 152.71270994765013, 173.92441032542308, 200.0,
    ],
    ratio_50: &[
        3.706708268330736, 3.4820592823712992, 3.2574102964118588, 3.070202808112328,
        2.8455538221528904, 2.62090483619345, 2.3213728549141983, 2.2090483619344816,
        2.0218408736349502, 1.8720748829953209, 1.7971918876755095, 1.7597503900156042,
        1.7597503900156042,
    ],
    qc1_300: &[
        36.0, 40.408183360314055, 45.799699828776, 52.66621257255607, 59.693273152946574,
        67.33279591108146, 75.58504107246422, 86.0837562404445, 95.70757527884192,
        105.38706697485875, 119.44847879561136, 136.0397981668792, 152.71270994765013,
        173.92441032542308, 200.0,
    ],
    ratio_300: &[
        5.017160686427459, 4.717628705148208, 4.418096723868956, 4.081123244929799,
        3.7815912636505473, 3.519500780031205, 3.2574102964118588, 3.032761310452422,
        2.8455538221528904, 2.6957878315132606, 2.5460218408736357, 2.4336973478939186,
        2.358814352574104, 2.283931357254289, 2.1716068642745725,
    ],
};

const BELLOTTI_AGED_NC: BellottiChart = BellottiChart {
    qc1_50: &[
        36.0, 39.828428929006265, 43.43602549287978, 47.82897607010807, 52.161249633588966,
        58.27270013483514, 64.1661742450743, 72.03032118526116, 80.46972295582609,
        90.33201773973744, 103.8750311939775, 117.73469759745085, 137.35677306263798,
        157.94996551160924, 185.16427213057165, 200.0,
    ],
    ratio_50: &[
        9.734789391575667, 9.210608424336977, 8.611544461778474, 7.975039001560062,
        7.375975039001562, 6.70202808112325, 6.102964118564741, 5.503900156006242,
        4.942277691107648, 4.492979719188771, 3.9313572542901767, 3.594383775351016,
        3.2574102964118588, 3.032761310452422, 2.882995319812796, 2.770670826833076,
    ],
    qc1_300: &[
        36.0, 41.79397491103586, 46.46637385138504, 52.920524263063506, 58.27270013483514,
        66.36674192014331, 74.14257284871742, 82.82945568191151, 90.76820798422662,
        102.87907878967758, 114.93286204934958, 134.08797382678958, 154.19109206798834,
        180.75775603565143, 200.0,
    ],
    ratio_300: &[
        11.981279251170047, 11.1201248049922, 10.408736349453976, 9.547581903276138,
        8.911076443057727, 8.049921996879878, 7.3010920436817495, 6.66458658346334,
        6.177847113884558, 5.616224648985963, 5.2418096723869, 4.8299531981279245,
        4.492979719188771, 4.156006240249614, 3.968798751950082,
    ],
};

const BELLOTTI_OC: BellottiChart = BellottiChart {
    qc1_50: &[
        36.0, 38.88059697907535, 41.79397491103586, 46.020854882827855, 49.70813683794835,
        54.47239108201235, 60.27115215047096, 66.68720996800097, 73.43169485579755,
        79.31518754764512, 87.3368169432148, 98.0407364118493, 114.38054759574864,
        138.6864973368832, 165.74484792151944, 189.6782103606226, 200.0,
    ],
    ratio_50: &[
        16.02496099843994, 15.463338533541346, 14.826833073322936, 13.965678627145088,
        13.366614664586587, 12.617784711388456, 11.794071762870518, 10.970358814352577,
        10.146645865834637, 9.547581903276138, 8.836193447737912, 8.049921996879878,
        7.151326053042125, 6.2527301092043714, 5.578783151326057, 5.204368174726991,
        5.054602184087365,
    ],
    qc1_300: &[
        36.0, 38.507810337311405, 40.60330415823624, 43.43602549287978, 46.46637385138504,
        50.91992276530692, 54.999727733004406, 58.83682684054747, 66.36674192014331,
        72.03032118526116, 78.55471459444749, 86.49943271508333, 94.78993233218729,
        102.87907878967758, 114.38054759574864, 126.55672442978188, 144.13537469613595,
        161.80047284520188, 189.6782103606226, 200.0,
    ],
    ratio_300: &[
        24.000000000000004, 23.251170046801878, 22.464898595943843, 21.56630265210609,
        20.705148205928236, 19.544461778471145, 18.645865834633387, 17.784711388455538,
        16.361934477379094, 15.388455538221534, 14.377535101404057, 13.366614664586587,
        12.393135725429019, 11.606864274570984, 10.745709828393137, 9.9219968798752,
        8.985959438377536, 8.274570982839318, 7.48829953198128, 7.2262090483619374,
    ],
};

const BELLOTTI_SAND_TYPES: [&str; 3] = ["NC", "Aged NC", "OC"];

impl BellottiChart {
    fn for_sand_type(sandtype: &str) -> Option<&'static BellottiChart> {
        match sandtype {
            "NC" => Some(&BELLOTTI_NC),
            "Aged NC" => Some(&BELLOTTI_AGED_NC),
            "OC" => Some(&BELLOTTI_OC),
            _ => None,
        }
    }

    /// Es/qc for a normalised cone resistance, interpolated in log10(qc1)
    /// and then linearly in mean effective stress.
    fn modulus_ratio(&self, qc1: f64, sigma_mo_eff: f64) -> f64 {
        let log_qc1 = qc1.log10();
        let log_all = |values: &[f64]| values.iter().map(|v| v.log10()).collect::<Vec<_>>();
        let ratio_50 = interp(log_qc1, &log_all(self.qc1_50), self.ratio_50);
        let ratio_300 = interp(log_qc1, &log_all(self.qc1_300), self.ratio_300);
        interp(sigma_mo_eff, &[50.0, 300.0], &[ratio_50, ratio_300])
    }
}

/// Drained secant modulus of sand at 0.1% average strain (Bellotti et al, 1989).
///
/// Outside the 50 to 300 kPa bands the nearest band is used.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DrainedSecantModulusBellotti {
    pub qc: f64,
    pub sigma_vo_eff: f64,
    #[serde(rename = "K0")]
    pub k0: f64,
    /// One of `NC`, `Aged NC` or `OC`
    pub sandtype: String,
    #[serde(default = "default_atmospheric_pressure")]
    pub atmospheric_pressure: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DrainedSecantModulusOutput {
    #[serde(rename = "qc1 [-]")]
    pub qc1: f64,
    #[serde(rename = "Es_qc [-]")]
    pub es_qc: f64,
    #[serde(rename = "Es [kPa]")]
    pub es: f64,
}

impl ErrorReturn for DrainedSecantModulusOutput {
    fn error_return() -> Self {
        Self {
            qc1: f64::NAN,
            es_qc: f64::NAN,
            es: f64::NAN,
        }
    }
}

impl Correlation for DrainedSecantModulusBellotti {
    const NAME: &'static str = "Es Bellotti (1989) - sand";
    type Output = DrainedSecantModulusOutput;

    fn validate(&self) -> Result<()> {
        validate_float("qc", self.qc, Some(0.0), Some(100.0))?;
        validate_float("sigma_vo_eff", self.sigma_vo_eff, Some(50.0), Some(300.0))?;
        validate_float("K0", self.k0, Some(0.5), Some(2.0))?;
        validate_choice("sandtype", &self.sandtype, &BELLOTTI_SAND_TYPES)?;
        validate_float(
            "atmospheric_pressure",
            self.atmospheric_pressure,
            Some(90.0),
            Some(110.0),
        )
    }

    fn calculate(&self) -> Result<Self::Output> {
        let chart = BellottiChart::for_sand_type(&self.sandtype).ok_or_else(|| {
            GroundhogError::validation(
                "sandtype",
                "Sand type not recognised, select from 'NC', 'Aged NC' or 'OC'",
            )
        })?;
        let pa = self.atmospheric_pressure;
        let sigma_mo_eff = (1.0 + 2.0 * self.k0) * self.sigma_vo_eff / 3.0;
        let qc1 = (1000.0 * self.qc / pa) * (pa / self.sigma_vo_eff).sqrt();
        let es_qc = chart.modulus_ratio(qc1, sigma_mo_eff);

        Ok(DrainedSecantModulusOutput {
            qc1,
            es_qc,
            es: es_qc * self.qc * 1000.0,
        })
    }
}
