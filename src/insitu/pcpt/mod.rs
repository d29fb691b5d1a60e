//! PCPT correlations.
//!
//! Each correlation is an input record implementing [`Correlation`]: the
//! required measurements as plain fields, optional calibration coefficients
//! in a flattened struct with literature defaults. Output records serialise
//! with unit-suffixed keys such as `Gmax [kPa]`.

mod classification;
mod normalisation;
mod state;
mod stiffness;
mod strength;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::validation::{ErrorPolicy, apply_policy};

pub use classification::{
    BehaviourIndexNonNormalised, BehaviourIndexNonNormalisedOutput, BehaviourIndexRobertsonWride,
    BehaviourIndexRobertsonWrideOutput, IcSoilClassRobertson, RobertsonWrideCoefficients,
    SoilBehaviourClass, soil_behaviour_class,
};
pub use normalisation::{NormalisationSettings, PcptNormalisation, PcptNormalisationOutput};
pub use state::{
    K0SandMayne, K0SandMayneCoefficients, K0SandMayneOutput, OcrCptLunne, OcrCptLunneOutput,
    SensitivityFrictionRatioLunne, SensitivityOutput, UnitWeightMayne, UnitWeightMayneCoefficients,
    UnitWeightOutput,
};
pub use stiffness::{
    DrainedSecantModulusBellotti, DrainedSecantModulusOutput, GmaxClayMayneRix,
    GmaxClayMayneRixCoefficients, GmaxCptPuechen, GmaxCptPuechenCoefficients, GmaxOutput,
    GmaxSandRixStokoe, GmaxSandRixStokoeCoefficients, VsIcRobertsonCabal,
    VsIcRobertsonCabalCoefficients, VsIcRobertsonCabalOutput,
};
pub use strength::{
    BaldiCoefficients, BaldiNcCoefficients, ConeResistanceOcSandBaldi, ConeResistanceOutput,
    FrictionAngleKleven, FrictionAngleKlevenOutput, FrictionAngleKulhawyMayne,
    FrictionAngleKulhawyMayneCoefficients, FrictionAngleOutput, JamiolkowskiCoefficients,
    RelativeDensityJamiolkowskiOutput,
    RelativeDensityNcSandBaldi, RelativeDensityOcSandBaldi, RelativeDensityOutput,
    RelativeDensitySandJamiolkowski, UndrainedShearStrengthOutput,
    UndrainedShearStrengthRadLunne,
};

/// Atmospheric pressure used for normalisation [kPa].
pub const ATMOSPHERIC_PRESSURE: f64 = 100.0;
/// Unit weight of seawater [kN/m3].
pub const UNITWEIGHT_SEAWATER: f64 = 10.25;

pub(crate) fn default_atmospheric_pressure() -> f64 {
    ATMOSPHERIC_PRESSURE
}

pub(crate) fn default_unitweight_water() -> f64 {
    UNITWEIGHT_SEAWATER
}

/// Output record returned when validation fails in fail-silently mode.
pub trait ErrorReturn {
    /// Every numeric value NaN, every text value absent.
    fn error_return() -> Self;
}

/// A correlation between PCPT data and a soil parameter.
pub trait Correlation: DeserializeOwned {
    /// Name under which the correlation is registered.
    const NAME: &'static str;

    type Output: Serialize + ErrorReturn;

    /// Check all inputs against their calibrated ranges.
    fn validate(&self) -> Result<()>;

    /// Evaluate the correlation without validation.
    fn calculate(&self) -> Result<Self::Output>;

    /// Validate, then calculate. Under [`ErrorPolicy::FailSilently`] a
    /// validation failure yields the error return instead of an error.
    fn evaluate(&self, policy: ErrorPolicy) -> Result<Self::Output> {
        if apply_policy(self.validate(), policy, Self::NAME)? {
            self.calculate()
        } else {
            Ok(Self::Output::error_return())
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    pub fn assert_close(actual: f64, expected: f64, rel: f64) {
        let tol = rel * expected.abs().max(1e-12);
        assert!(
            (actual - expected).abs() <= tol,
            "expected {} but got {}",
            expected,
            actual
        );
    }
}
