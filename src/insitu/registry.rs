//! Name-based lookup of PCPT correlations and their application to records.

use log::{debug, warn};
use serde_json::{Map, Value};

use super::pcpt::*;
use crate::error::{GroundhogError, Result};
use crate::validation::ErrorPolicy;

/// PCPT record column names and the correlation parameters they feed.
pub const PCPT_KEY_MAPPING: [(&str, &str); 19] = [
    ("qc [MPa]", "qc"),
    ("fs [MPa]", "fs"),
    ("u2 [MPa]", "u2"),
    ("qt [MPa]", "qt"),
    ("ft [MPa]", "ft"),
    ("qnet [MPa]", "qnet"),
    ("Vertical total stress [kPa]", "sigma_vo"),
    ("Vertical effective stress [kPa]", "sigma_vo_eff"),
    ("Ic [-]", "ic"),
    ("Dr [-]", "relative_density"),
    ("Gmax [kPa]", "gmax"),
    ("Qt [-]", "Qt"),
    ("Bq [-]", "Bq"),
    ("Fr [%]", "Fr"),
    ("Rf [%]", "Rf"),
    ("K0 [-]", "K0"),
    ("Vs [m/s]", "Vs"),
    ("gamma [kN/m3]", "gamma"),
    ("OCR [-]", "ocr"),
];

/// Parameter name for a PCPT column, if the column is mapped.
pub fn parameter_for_column(column: &str) -> Option<&'static str> {
    PCPT_KEY_MAPPING
        .iter()
        .find(|(key, _)| *key == column)
        .map(|(_, parameter)| *parameter)
}

struct Entry {
    name: &'static str,
    run: fn(&Value, ErrorPolicy) -> Result<Value>,
    error_return: fn() -> Value,
}

fn run_correlation<C: Correlation>(params: &Value, policy: ErrorPolicy) -> Result<Value> {
    let input: C = serde_json::from_value(params.clone())?;
    let output = input.evaluate(policy)?;
    Ok(serde_json::to_value(output)?)
}

fn error_return_of<C: Correlation>() -> Value {
    serde_json::to_value(C::Output::error_return()).unwrap_or_default()
}

fn entry<C: Correlation>() -> Entry {
    Entry {
        name: C::NAME,
        run: run_correlation::<C>,
        error_return: error_return_of::<C>,
    }
}

/// All PCPT correlations, keyed by the names used in the literature.
pub struct CorrelationRegistry {
    entries: Vec<Entry>,
}

impl Default for CorrelationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationRegistry {
    pub fn new() -> Self {
        Self {
            entries: vec![
                entry::<BehaviourIndexRobertsonWride>(),
                entry::<BehaviourIndexNonNormalised>(),
                entry::<GmaxSandRixStokoe>(),
                entry::<GmaxClayMayneRix>(),
                entry::<GmaxCptPuechen>(),
                entry::<RelativeDensityNcSandBaldi>(),
                entry::<RelativeDensityOcSandBaldi>(),
                entry::<RelativeDensitySandJamiolkowski>(),
                entry::<FrictionAngleKulhawyMayne>(),
                entry::<UndrainedShearStrengthRadLunne>(),
                entry::<FrictionAngleKleven>(),
                entry::<OcrCptLunne>(),
                entry::<SensitivityFrictionRatioLunne>(),
                entry::<UnitWeightMayne>(),
                entry::<VsIcRobertsonCabal>(),
                entry::<K0SandMayne>(),
                entry::<DrainedSecantModulusBellotti>(),
                entry::<PcptNormalisation>(),
                entry::<IcSoilClassRobertson>(),
                entry::<ConeResistanceOcSandBaldi>(),
            ],
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_ok()
    }

    fn lookup(&self, name: &str) -> Result<&Entry> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| GroundhogError::UnknownCorrelation(name.to_string()))
    }

    /// Run correlation `name` on a JSON object of parameters.
    pub fn run(&self, name: &str, params: &Value, policy: ErrorPolicy) -> Result<Value> {
        let entry = self.lookup(name)?;
        debug!("Running correlation '{}' with {}", name, params);
        (entry.run)(params, policy)
    }

    /// Output of correlation `name` with every value NaN or absent.
    pub fn error_return(&self, name: &str) -> Result<Value> {
        Ok((self.lookup(name)?.error_return)())
    }

    /// Apply correlation `name` to every PCPT record.
    ///
    /// Mapped columns become parameters, `extra` parameters are merged on top
    /// and the correlation outputs are merged back into a copy of each record.
    /// Under [`ErrorPolicy::FailSilently`] a record that cannot be evaluated
    /// gets the error return; under [`ErrorPolicy::Raise`] the first failure
    /// aborts.
    pub fn apply_to_records(
        &self,
        name: &str,
        records: &[Map<String, Value>],
        extra: &Map<String, Value>,
        policy: ErrorPolicy,
    ) -> Result<Vec<Map<String, Value>>> {
        let entry = self.lookup(name)?;

        records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let mut params: Map<String, Value> = record
                    .iter()
                    .filter_map(|(column, value)| {
                        parameter_for_column(column).map(|p| (p.to_string(), value.clone()))
                    })
                    .collect();
                params.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));

                let output = match (entry.run)(&Value::Object(params), policy) {
                    Ok(output) => output,
                    Err(e) if policy == ErrorPolicy::FailSilently => {
                        warn!("{}: record {} could not be evaluated: {}", name, row, e);
                        (entry.error_return)()
                    }
                    Err(e) => return Err(e),
                };

                let mut merged = record.clone();
                if let Value::Object(fields) = output {
                    merged.extend(fields);
                }
                Ok(merged)
            })
            .collect()
    }
}
