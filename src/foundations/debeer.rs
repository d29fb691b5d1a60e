//! Axial pile resistance from CPT data with De Beer's method, following
//! Belgian practice (Huybrechts et al, 2016).
//!
//! A [`DeBeerCalculation`] is driven step by step:
//!
//! 1. [`DeBeerCalculation::new`] with the raw CPT trace and the pile diameter
//! 2. [`DeBeerCalculation::resample_data`] onto the calculation grid
//! 3. [`DeBeerCalculation::set_soil_layers`] for stresses and soil types
//! 4. [`DeBeerCalculation::calculate_base_resistance`]
//! 5. [`DeBeerCalculation::correct_shaft_qc`], [`DeBeerCalculation::calculate_average_qc`]
//!    and [`DeBeerCalculation::calculate_unit_shaft_friction`]
//! 6. [`DeBeerCalculation::set_shaft_base_factors`]
//! 7. [`DeBeerCalculation::calculate_pile_resistance`]
//!
//! Calling a step before the steps it depends on returns
//! [`GroundhogError::StepOrder`].

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{GroundhogError, Result};
use crate::numerics::{arange, brentq, interp, linspace, mean};
use crate::soil::{NodalStress, SoilProfile, SoilType, UNITWEIGHT_WATER_FRESH};

/// Diameter of a standard cone [m].
pub const STANDARD_CONE_DIAMETER: f64 = 0.0357;
/// Smallest pile diameter the method applies to [m].
pub const MIN_PILE_DIAMETER: f64 = 0.2;
/// Base resistance is calculated for multiples of this diameter [m].
pub const DIAMETER_STEP: f64 = 0.2;
/// Belgian practice unit weights above and below the water table [kN/m3].
pub const UNIT_WEIGHT_DRY: f64 = 15.696;
pub const UNIT_WEIGHT_WET: f64 = 19.62;

const TOLERANCE: f64 = 1e-9;

/// De Beer's equations 22 and 23: qc/p0 as a function of friction angle.
fn bearing_ratio(phi: f64) -> f64 {
    1.3 * (2.0 * PI * phi.tan()).exp() * (FRAC_PI_4 + 0.5 * phi).tan().powi(2)
}

struct FrictionAngleChart {
    ratios: Vec<f64>,
    angles: Vec<f64>,
}

impl FrictionAngleChart {
    fn new() -> Self {
        let angles = linspace(0.01f64.to_radians(), 50f64.to_radians(), 250);
        let ratios = angles.iter().map(|&phi| bearing_ratio(phi)).collect();
        Self { ratios, angles }
    }

    fn friction_angle(&self, qc_over_p0: f64) -> f64 {
        match (self.ratios.first(), self.ratios.last()) {
            (Some(&low), Some(&high))
                if qc_over_p0.is_finite() && qc_over_p0 >= low && qc_over_p0 <= high =>
            {
                interp(qc_over_p0, &self.ratios, &self.angles).to_degrees()
            }
            _ => 45.0,
        }
    }
}

/// Friction angle [deg] for a ratio of cone resistance to vertical effective
/// stress (both in kPa). Ratios outside the chart give 45 degrees.
pub fn friction_angle(qc_over_p0: f64) -> f64 {
    FrictionAngleChart::new().friction_angle(qc_over_p0)
}

/// Angle beta [rad] of the failure surface for an embedment ratio h/d
/// (De Beer's equation 60). Ratios the mechanism cannot reach give pi/2.
pub fn failure_surface_angle(embedment_ratio: f64, phi: f64) -> f64 {
    let mechanism = |beta: f64| {
        (FRAC_PI_4 + 0.5 * phi).tan()
            * (FRAC_PI_2 * phi.tan()).exp()
            * beta.sin()
            * (beta * phi.tan()).exp()
            / (1.0 + (2.0 * phi).sin())
            - embedment_ratio
    };
    brentq(mechanism, 0.0, FRAC_PI_2).unwrap_or(FRAC_PI_2)
}

/// Scale cone resistance from the stress level around the cone to the stress
/// level around the pile.
///
/// `p0` is the vertical effective stress [kPa] and `gamma` the unit weight
/// (total above the water table, effective below) [kN/m3]. Without
/// overburden the resistance is returned unchanged.
pub fn stress_correction(
    qc: f64,
    p0: f64,
    diameter_pile: f64,
    diameter_cone: f64,
    gamma: f64,
    hcrit: f64,
) -> f64 {
    if !(p0 > 0.0) || !p0.is_finite() {
        return qc;
    }
    let h_prime_crit = hcrit * diameter_pile / diameter_cone;
    qc * (1.0 + gamma * h_prime_crit / (2.0 * p0)) / (1.0 + gamma * hcrit / (2.0 * p0))
}

/// Unit shaft friction [kPa] from the layer-average cone resistance [MPa].
pub fn unit_shaft_friction(soil_type: SoilType, qc_avg: f64) -> f64 {
    match soil_type {
        SoilType::Clay if qc_avg <= 4.5 => 1000.0 * qc_avg / 30.0,
        SoilType::Clay => 150.0,
        SoilType::Loam if qc_avg <= 6.0 => 1000.0 * qc_avg / 60.0,
        SoilType::Loam => 100.0,
        SoilType::SandyClayLoam | SoilType::ClayeySandLoam if qc_avg <= 10.0 => {
            1000.0 * qc_avg / 80.0
        }
        SoilType::SandyClayLoam | SoilType::ClayeySandLoam => 125.0,
        SoilType::Sand if qc_avg <= 10.0 => 1000.0 * qc_avg / 90.0,
        SoilType::Sand if qc_avg <= 20.0 => 110.0 + 4.0 * (qc_avg - 10.0),
        SoilType::Sand => 150.0,
    }
}

/// Cone types distinguished in Belgian practice.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConeType {
    M1,
    M2,
    M4,
    #[default]
    E,
    U,
}

impl ConeType {
    /// Divisor applied to the cone resistance for shaft friction.
    pub fn shaft_correction(&self, tertiary_clay: bool) -> f64 {
        match (self, tertiary_clay) {
            (ConeType::M1 | ConeType::M2, true) => 1.3,
            (ConeType::M4, true) => 1.15,
            _ => 1.0,
        }
    }
}

/// One depth of the base resistance construction for a standard diameter.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BaseResistanceRow {
    #[serde(rename = "z [m]")]
    pub depth: f64,
    #[serde(rename = "qc [MPa]")]
    pub qc: f64,
    #[serde(rename = "phi [deg]")]
    pub phi: f64,
    #[serde(rename = "h/d [-]")]
    pub embedment_cone: f64,
    #[serde(rename = "h/D [-]")]
    pub embedment_pile: f64,
    #[serde(rename = "beta_c [rad]")]
    pub beta_c: f64,
    #[serde(rename = "beta_p [rad]")]
    pub beta_p: f64,
    #[serde(rename = "qp [MPa]")]
    pub qp: f64,
    #[serde(rename = "A qp [MPa]")]
    pub a_qp: f64,
    #[serde(rename = "qp,j+1 [MPa]")]
    pub qp_downward: f64,
    #[serde(rename = "qp,q+1 [MPa]")]
    pub qp_upward: f64,
    #[serde(rename = "qb [MPa]")]
    pub qb: f64,
}

/// Base resistance construction for a diameter that is a multiple of 0.2 m.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StandardDiameterCalculation {
    #[serde(rename = "diameter [m]")]
    pub diameter: f64,
    pub rows: Vec<BaseResistanceRow>,
}

impl StandardDiameterCalculation {
    pub fn qb(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.qb)
    }
}

/// Unit base resistance for the actual pile diameter, interpolated between
/// the two bounding standard diameters.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BaseResistance {
    #[serde(rename = "diameter_1 [m]")]
    pub diameter_1: f64,
    #[serde(rename = "diameter_2 [m]")]
    pub diameter_2: f64,
    #[serde(rename = "z [m]")]
    pub depth: Vec<f64>,
    #[serde(rename = "qb [MPa]")]
    pub qb: Vec<f64>,
    #[serde(skip)]
    pub calc_1: StandardDiameterCalculation,
    #[serde(skip)]
    pub calc_2: StandardDiameterCalculation,
}

impl BaseResistance {
    /// Unit base resistance at `depth` [MPa].
    pub fn qb_at(&self, depth: f64) -> f64 {
        interp(depth, &self.depth, &self.qb)
    }
}

/// Standard diameters bounding `diameter`; equal when it is a multiple of 0.2 m.
pub fn standard_diameters(diameter: f64) -> (f64, f64) {
    let round = |d: f64| (d * 10.0).round() / 10.0;
    let lower = round((diameter / DIAMETER_STEP + TOLERANCE).floor() * DIAMETER_STEP);
    if (diameter - lower).abs() <= TOLERANCE {
        (lower, lower)
    } else {
        (lower, round(lower + DIAMETER_STEP))
    }
}

/// Base and shaft factors fitted on static load tests.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ShaftBaseFactors {
    pub alpha_b_tertiary_clay: f64,
    pub alpha_b_other: f64,
    pub alpha_s_tertiary_clay: f64,
    pub alpha_s_other: f64,
}

/// Shaft friction state of one layer; values appear as steps complete.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ShaftLayer {
    #[serde(rename = "Depth from [m]")]
    pub depth_from: f64,
    #[serde(rename = "Depth to [m]")]
    pub depth_to: f64,
    #[serde(rename = "Soil type")]
    pub soil_type: SoilType,
    #[serde(rename = "Tertiary clay")]
    pub tertiary_clay: bool,
    #[serde(rename = "Total unit weight [kN/m3]")]
    pub total_unit_weight: Option<f64>,
    #[serde(rename = "qc avg [MPa]")]
    pub qc_avg: Option<f64>,
    #[serde(rename = "qs [kPa]")]
    pub qs: Option<f64>,
    pub alpha_s: Option<f64>,
    pub alpha_b: Option<f64>,
}

/// Shaft resistance of one layer above the pile tip.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ShaftContribution {
    #[serde(rename = "Depth from [m]")]
    pub depth_from: f64,
    #[serde(rename = "Depth to [m]")]
    pub depth_to: f64,
    #[serde(rename = "Layer thickness [m]")]
    pub thickness: f64,
    #[serde(rename = "Soil type")]
    pub soil_type: SoilType,
    #[serde(rename = "qs [kPa]")]
    pub qs: f64,
    pub alpha_s: f64,
    #[serde(rename = "Rs,i [kN]")]
    pub rs: f64,
}

/// Calculated pile resistance in Eurocode 7 terms.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PileResistance {
    #[serde(rename = "Pile penetration [m]")]
    pub penetration: f64,
    #[serde(rename = "qb [MPa]")]
    pub qb: f64,
    pub epsilon_b: f64,
    #[serde(rename = "Rb [kN]")]
    pub rb: f64,
    #[serde(rename = "Rs [kN]")]
    pub rs: f64,
    #[serde(rename = "Rc [kN]")]
    pub rc: f64,
    pub layers: Vec<ShaftContribution>,
}

struct Resampled {
    depth: Vec<f64>,
    qc: Vec<f64>,
}

struct Layering {
    profile: SoilProfile,
    stresses: Vec<NodalStress>,
}

pub struct DeBeerCalculation {
    depth_raw: Vec<f64>,
    qc_raw: Vec<f64>,
    diameter_pile: f64,
    diameter_cone: f64,
    resampled: Option<Resampled>,
    layering: Option<Layering>,
    base: Option<BaseResistance>,
    qc_corrected: Option<Vec<f64>>,
    qc_avg: Option<Vec<f64>>,
    qs: Option<Vec<f64>>,
    factors: Option<ShaftBaseFactors>,
}

impl DeBeerCalculation {
    /// Start a calculation from a CPT trace: depths [m] and cone resistance
    /// [MPa] of equal length, on any spacing.
    pub fn new(depth: Vec<f64>, qc: Vec<f64>, diameter_pile: f64, diameter_cone: f64) -> Result<Self> {
        if depth.len() != qc.len() {
            return Err(GroundhogError::InvalidInput(format!(
                "depth and qc need to have the same length ({} vs {})",
                depth.len(),
                qc.len()
            )));
        }
        if depth.len() < 2 {
            return Err(GroundhogError::InvalidInput(
                "At least two CPT readings are required".into(),
            ));
        }
        if !(diameter_pile >= MIN_PILE_DIAMETER) {
            return Err(GroundhogError::validation(
                "diameter_pile",
                format!(
                    "The minimum pile diameter for De Beer's method is {}m",
                    MIN_PILE_DIAMETER
                ),
            ));
        }
        if !(diameter_cone > 0.0) {
            return Err(GroundhogError::validation(
                "diameter_cone",
                "Cone diameter should be positive",
            ));
        }

        Ok(Self {
            depth_raw: depth,
            qc_raw: qc,
            diameter_pile,
            diameter_cone,
            resampled: None,
            layering: None,
            base: None,
            qc_corrected: None,
            qc_avg: None,
            qs: None,
            factors: None,
        })
    }

    pub fn diameter_pile(&self) -> f64 {
        self.diameter_pile
    }

    pub fn diameter_cone(&self) -> f64 {
        self.diameter_cone
    }

    /// Remap the CPT trace onto a regular grid; 0.2 m for the mechanical cone.
    pub fn resample_data(&mut self, spacing: f64) -> Result<()> {
        if !(spacing > 0.0) {
            return Err(GroundhogError::validation("spacing", "Spacing should be positive"));
        }
        let min = self.depth_raw.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.depth_raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let depth = arange(min, max, spacing);
        if depth.is_empty() {
            return Err(GroundhogError::InvalidInput(
                "CPT trace does not span a single calculation interval".into(),
            ));
        }
        let qc = depth
            .iter()
            .map(|&z| interp(z, &self.depth_raw, &self.qc_raw))
            .collect();

        debug!("Resampled CPT onto {} depths at {}m spacing", depth.len(), spacing);
        self.resampled = Some(Resampled { depth, qc });
        self.layering = None;
        self.base = None;
        self.qc_corrected = None;
        self.qc_avg = None;
        self.qs = None;
        self.factors = None;
        Ok(())
    }

    /// Calculation depths after resampling.
    pub fn depth(&self) -> Option<&[f64]> {
        self.resampled.as_ref().map(|r| r.depth.as_slice())
    }

    /// Cone resistance at the calculation depths [MPa].
    pub fn qc_resampled(&self) -> Option<&[f64]> {
        self.resampled.as_ref().map(|r| r.qc.as_slice())
    }

    fn resampled(&self, step: &'static str) -> Result<&Resampled> {
        self.resampled.as_ref().ok_or(GroundhogError::StepOrder {
            step,
            requires: "resample_data",
        })
    }

    fn layering(&self, step: &'static str) -> Result<&Layering> {
        self.layering.as_ref().ok_or(GroundhogError::StepOrder {
            step,
            requires: "set_soil_layers",
        })
    }

    /// Assign the soil profile and compute overburden stresses.
    ///
    /// The profile must start at the surface and reach the deepest
    /// calculation depth. A layer transition is added at the water level and
    /// layers without a unit weight get the Belgian practice defaults.
    pub fn set_soil_layers(
        &mut self,
        mut profile: SoilProfile,
        water_level: f64,
        total_unit_weight_dry: f64,
        total_unit_weight_wet: f64,
    ) -> Result<()> {
        let resampled = self.resampled("set_soil_layers")?;

        if profile.min_depth().abs() > TOLERANCE {
            return Err(GroundhogError::InvalidInput(
                "Layering should start from zero depth".into(),
            ));
        }
        let deepest = resampled.depth.last().copied().unwrap_or(0.0);
        if profile.max_depth() < deepest - TOLERANCE {
            return Err(GroundhogError::InvalidInput(format!(
                "Layering ends at {}m but the CPT reaches {}m",
                profile.max_depth(),
                deepest
            )));
        }
        if water_level < 0.0 {
            return Err(GroundhogError::validation(
                "water_level",
                "Specified water level should be greater than or equal to zero",
            ));
        }

        profile.insert_layer_transition(water_level);
        profile.fill_unit_weights(water_level, total_unit_weight_dry, total_unit_weight_wet);
        let overburden = profile.calculate_overburden(water_level, UNITWEIGHT_WATER_FRESH)?;
        let stresses = overburden.map_to_depths(&resampled.depth)?;

        info!(
            "Soil profile set with {} layers, water level at {}m",
            profile.len(),
            water_level
        );
        self.layering = Some(Layering { profile, stresses });
        self.base = None;
        self.qc_corrected = None;
        self.qc_avg = None;
        self.qs = None;
        self.factors = None;
        Ok(())
    }

    pub fn profile(&self) -> Option<&SoilProfile> {
        self.layering.as_ref().map(|l| &l.profile)
    }

    /// Vertical stresses at the calculation depths.
    pub fn stresses(&self) -> Option<&[NodalStress]> {
        self.layering.as_ref().map(|l| l.stresses.as_slice())
    }

    /// Run the five-step construction of De Beer for a pile diameter that is
    /// a multiple of 0.2 m.
    ///
    /// Van Impe's correction doubles the coefficient of the upward pass.
    /// Negative cone resistance is treated as zero.
    pub fn calculate_base_resistance_standard_diameter(
        &self,
        pile_diameter: f64,
        van_impe: bool,
        hcrit: f64,
    ) -> Result<StandardDiameterCalculation> {
        const STEP: &str = "calculate_base_resistance_standard_diameter";
        let resampled = self.resampled(STEP)?;
        let layering = self.layering(STEP)?;

        let chart = FrictionAngleChart::new();
        let d = self.diameter_cone;
        let diameter_ratio = d / pile_diameter;

        // Steps 1 and 2: failure surface and stress level
        let mut rows: Vec<BaseResistanceRow> = resampled
            .depth
            .iter()
            .zip(&resampled.qc)
            .zip(&layering.stresses)
            .map(|((&z, &qc), stress)| {
                let qc = qc.max(0.0);
                let p0 = stress.effective_stress;
                let phi = chart.friction_angle(1000.0 * qc / p0);
                let phi_rad = phi.to_radians();
                let embedment_cone = z / d;
                let embedment_pile = z / pile_diameter;
                let beta_c = failure_surface_angle(embedment_cone, phi_rad);
                let beta_p = failure_surface_angle(embedment_pile, phi_rad);
                let qp = qc / (2.0 * (beta_c - beta_p) * phi_rad.tan()).exp();
                let a_qp = stress_correction(
                    qp,
                    p0,
                    pile_diameter,
                    d,
                    stress.effective_unit_weight,
                    hcrit,
                )
                .min(qc);

                BaseResistanceRow {
                    depth: z,
                    qc,
                    phi,
                    embedment_cone,
                    embedment_pile,
                    beta_c,
                    beta_p,
                    qp,
                    a_qp,
                    qp_downward: 0.0,
                    qp_upward: 0.0,
                    qb: 0.0,
                }
            })
            .collect();

        // Step 3: weak to strong transitions, downwards
        for j in 1..rows.len() {
            let previous = rows[j - 1].qp_downward;
            let target = rows[j].a_qp;
            rows[j].qp_downward = target.min(previous + (target - previous) * diameter_ratio);
        }

        // Step 4: strong to weak transitions, upwards
        let coefficient = if van_impe { 2.0 } else { 1.0 };
        if let Some(last) = rows.last_mut() {
            last.qp_upward = last.qp_downward;
        }
        for i in (0..rows.len().saturating_sub(1)).rev() {
            let below = rows[i + 1].qp_upward;
            let downward = rows[i].qp_downward;
            rows[i].qp_upward =
                (below + coefficient * (downward - below) * diameter_ratio).min(downward);
        }

        // Step 5: average over one pile diameter below each depth
        let upward: Vec<(f64, f64)> = rows.iter().map(|r| (r.depth, r.qp_upward)).collect();
        for row in rows.iter_mut() {
            let window: Vec<f64> = upward
                .iter()
                .filter(|(z, _)| {
                    *z >= row.depth - TOLERANCE && *z <= row.depth + pile_diameter + TOLERANCE
                })
                .map(|(_, q)| *q)
                .collect();
            row.qb = mean(&window).map_or(row.qp_upward, |avg| avg.min(row.qp_upward));
        }

        Ok(StandardDiameterCalculation {
            diameter: pile_diameter,
            rows,
        })
    }

    /// Unit base resistance for the pile diameter, interpolated linearly
    /// between the bounding multiples of 0.2 m.
    pub fn calculate_base_resistance(&mut self, van_impe: bool, hcrit: f64) -> Result<&BaseResistance> {
        let (diameter_1, diameter_2) = standard_diameters(self.diameter_pile);
        debug!(
            "Base resistance for D={}m from standard diameters {}m and {}m",
            self.diameter_pile, diameter_1, diameter_2
        );

        let calc_1 = self.calculate_base_resistance_standard_diameter(diameter_1, van_impe, hcrit)?;
        let calc_2 = if diameter_2 == diameter_1 {
            calc_1.clone()
        } else {
            self.calculate_base_resistance_standard_diameter(diameter_2, van_impe, hcrit)?
        };

        let qb = calc_1
            .qb()
            .zip(calc_2.qb())
            .map(|(qb_1, qb_2)| {
                if diameter_2 == diameter_1 {
                    qb_1
                } else {
                    interp(self.diameter_pile, &[diameter_1, diameter_2], &[qb_1, qb_2])
                }
            })
            .collect();
        let depth = calc_1.rows.iter().map(|r| r.depth).collect();

        Ok(&*self.base.insert(BaseResistance {
            diameter_1,
            diameter_2,
            depth,
            qb,
            calc_1,
            calc_2,
        }))
    }

    pub fn base_resistance(&self) -> Option<&BaseResistance> {
        self.base.as_ref()
    }

    /// Correct the raw cone resistance for the cone type. In tertiary clay,
    /// mechanical cones M1 and M2 overestimate by 30% and M4 by 15%.
    pub fn correct_shaft_qc(&mut self, cone_type: ConeType) -> Result<&[f64]> {
        let layering = self.layering("correct_shaft_qc")?;
        let corrected = self
            .depth_raw
            .iter()
            .zip(&self.qc_raw)
            .map(|(&z, &qc)| {
                let tertiary = layering
                    .profile
                    .layer_at(z)
                    .is_some_and(|layer| layer.tertiary_clay);
                qc / cone_type.shaft_correction(tertiary)
            })
            .collect();
        self.qc_avg = None;
        self.qs = None;
        Ok(self.qc_corrected.insert(corrected).as_slice())
    }

    /// Average corrected cone resistance [MPa] of the raw readings in each
    /// layer, or the override values, one per layer.
    pub fn calculate_average_qc(&mut self, qc_avg_override: Option<Vec<f64>>) -> Result<&[f64]> {
        const STEP: &str = "calculate_average_qc";
        let layering = self.layering(STEP)?;

        let averages = match qc_avg_override {
            Some(values) => {
                if values.len() != layering.profile.len() {
                    return Err(GroundhogError::InvalidInput(format!(
                        "qc_avg_override has {} values for {} layers",
                        values.len(),
                        layering.profile.len()
                    )));
                }
                values
            }
            None => {
                let corrected = self.qc_corrected.as_ref().ok_or(GroundhogError::StepOrder {
                    step: STEP,
                    requires: "correct_shaft_qc",
                })?;
                layering
                    .profile
                    .layers()
                    .iter()
                    .enumerate()
                    .map(|(i, layer)| {
                        let values: Vec<f64> = self
                            .depth_raw
                            .iter()
                            .zip(corrected)
                            .filter(|(z, _)| layer.contains(**z))
                            .map(|(_, qc)| if qc.is_nan() { 0.0 } else { *qc })
                            .collect();
                        mean(&values).unwrap_or_else(|| {
                            warn!("No CPT readings in layer {}, average qc set to zero", i + 1);
                            0.0
                        })
                    })
                    .collect()
            }
        };

        self.qs = None;
        Ok(self.qc_avg.insert(averages).as_slice())
    }

    /// Unit shaft friction [kPa] per layer from the average cone resistance.
    pub fn calculate_unit_shaft_friction(&mut self) -> Result<&[f64]> {
        const STEP: &str = "calculate_unit_shaft_friction";
        let layering = self.layering(STEP)?;
        let qc_avg = self.qc_avg.as_ref().ok_or(GroundhogError::StepOrder {
            step: STEP,
            requires: "calculate_average_qc",
        })?;

        let qs = layering
            .profile
            .layers()
            .iter()
            .zip(qc_avg)
            .map(|(layer, &qc)| unit_shaft_friction(layer.soil_type, qc))
            .collect();
        Ok(self.qs.insert(qs).as_slice())
    }

    pub fn set_shaft_base_factors(&mut self, factors: ShaftBaseFactors) -> Result<()> {
        self.layering("set_shaft_base_factors")?;
        self.factors = Some(factors);
        Ok(())
    }

    /// Per-layer table with everything calculated so far.
    pub fn shaft_layers(&self) -> Vec<ShaftLayer> {
        let Some(layering) = self.layering.as_ref() else {
            return Vec::new();
        };
        let value_at = |values: &Option<Vec<f64>>, i: usize| values.as_ref().and_then(|v| v.get(i).copied());

        layering
            .profile
            .layers()
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let (alpha_s, alpha_b) = match self.factors {
                    Some(f) if layer.tertiary_clay => {
                        (Some(f.alpha_s_tertiary_clay), Some(f.alpha_b_tertiary_clay))
                    }
                    Some(f) => (Some(f.alpha_s_other), Some(f.alpha_b_other)),
                    None => (None, None),
                };
                ShaftLayer {
                    depth_from: layer.depth_from,
                    depth_to: layer.depth_to,
                    soil_type: layer.soil_type,
                    tertiary_clay: layer.tertiary_clay,
                    total_unit_weight: layer.total_unit_weight,
                    qc_avg: value_at(&self.qc_avg, i),
                    qs: value_at(&self.qs, i),
                    alpha_s,
                    alpha_b,
                }
            })
            .collect()
    }

    /// Calculated pile resistance for a penetration below the surface [m].
    ///
    /// `base_area` [m2] decides whether an open tube acts plugged or coring.
    /// `beta_base` accounts for the base shape and `lambda_base` for an
    /// enlarged base; both are 1 for a uniform circular pile.
    pub fn calculate_pile_resistance(
        &self,
        penetration: f64,
        base_area: f64,
        circumference: f64,
        beta_base: f64,
        lambda_base: f64,
    ) -> Result<PileResistance> {
        const STEP: &str = "calculate_pile_resistance";
        let resampled = self.resampled(STEP)?;
        let base = self.base.as_ref().ok_or(GroundhogError::StepOrder {
            step: STEP,
            requires: "calculate_base_resistance",
        })?;
        let qs = self.qs.as_ref().ok_or(GroundhogError::StepOrder {
            step: STEP,
            requires: "calculate_unit_shaft_friction",
        })?;
        let factors = self.factors.ok_or(GroundhogError::StepOrder {
            step: STEP,
            requires: "set_shaft_base_factors",
        })?;
        let layering = self.layering(STEP)?;

        let deepest = resampled.depth.last().copied().unwrap_or(0.0);
        if penetration > deepest {
            return Err(GroundhogError::InvalidInput(format!(
                "Pile penetration of {:.2}m is greater than maximum CPT depth of {:.2}m",
                penetration, deepest
            )));
        }
        if !(penetration > 0.0) {
            return Err(GroundhogError::validation(
                "penetration",
                "Pile penetration should be positive",
            ));
        }

        let mut layers = Vec::new();
        let mut tip_in_tertiary_clay = false;
        for (layer, &qs) in layering.profile.layers().iter().zip(qs) {
            if layer.depth_from >= penetration {
                break;
            }
            let depth_to = layer.depth_to.min(penetration);
            let thickness = depth_to - layer.depth_from;
            let alpha_s = if layer.tertiary_clay {
                factors.alpha_s_tertiary_clay
            } else {
                factors.alpha_s_other
            };
            tip_in_tertiary_clay = layer.tertiary_clay;
            layers.push(ShaftContribution {
                depth_from: layer.depth_from,
                depth_to,
                thickness,
                soil_type: layer.soil_type,
                qs,
                alpha_s,
                rs: circumference * alpha_s * thickness * qs,
            });
        }

        let (epsilon_b, alpha_b) = if tip_in_tertiary_clay {
            (
                (1.0 - 0.01 * (self.diameter_pile / self.diameter_cone - 1.0)).max(0.476),
                factors.alpha_b_tertiary_clay,
            )
        } else {
            (1.0, factors.alpha_b_other)
        };

        let qb = base.qb_at(penetration);
        let rb = alpha_b * epsilon_b * beta_base * lambda_base * base_area * 1000.0 * qb;
        let rs: f64 = layers.iter().map(|l| l.rs).sum();

        info!(
            "Pile resistance at {}m: Rb={:.1}kN, Rs={:.1}kN",
            penetration, rb, rs
        );
        Ok(PileResistance {
            penetration,
            qb,
            epsilon_b,
            rb,
            rs,
            rc: rs + rb,
            layers,
        })
    }
}

fn default_cone_type() -> ConeType {
    ConeType::E
}

fn default_spacing() -> f64 {
    DIAMETER_STEP
}

fn default_hcrit() -> f64 {
    0.2
}

fn default_unit_weight_dry() -> f64 {
    UNIT_WEIGHT_DRY
}

fn default_unit_weight_wet() -> f64 {
    UNIT_WEIGHT_WET
}

fn default_factor() -> f64 {
    1.0
}

/// Pile geometry and factors for the resistance at one penetration.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PileInput {
    pub penetration: f64,
    pub base_area: f64,
    pub circumference: f64,
    #[serde(default = "default_factor")]
    pub beta_base: f64,
    #[serde(default = "default_factor")]
    pub lambda_base: f64,
    #[serde(flatten)]
    pub factors: ShaftBaseFactors,
}

/// Complete De Beer calculation described in one JSON document.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DeBeerInput {
    /// Raw CPT depths [m]
    pub depth: Vec<f64>,
    /// Raw cone resistance [MPa]
    pub qc: Vec<f64>,
    pub diameter_pile: f64,
    /// Falls back to the configured cone diameter
    #[serde(default)]
    pub diameter_cone: Option<f64>,
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    pub layers: SoilProfile,
    #[serde(default)]
    pub water_level: f64,
    #[serde(default = "default_unit_weight_dry")]
    pub total_unit_weight_dry: f64,
    #[serde(default = "default_unit_weight_wet")]
    pub total_unit_weight_wet: f64,
    #[serde(default)]
    pub van_impe: bool,
    #[serde(default = "default_hcrit")]
    pub hcrit: f64,
    #[serde(default = "default_cone_type")]
    pub cone_type: ConeType,
    #[serde(default)]
    pub qc_avg_override: Option<Vec<f64>>,
    #[serde(default)]
    pub pile: Option<PileInput>,
}

/// Exported results of a complete calculation.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DeBeerSummary {
    #[serde(rename = "diameter_pile [m]")]
    pub diameter_pile: f64,
    pub base_resistance: BaseResistance,
    pub layers: Vec<ShaftLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pile_resistance: Option<PileResistance>,
}

impl DeBeerInput {
    /// Run every step in order.
    pub fn run(self, default_cone_diameter: f64) -> Result<DeBeerSummary> {
        let mut calc = DeBeerCalculation::new(
            self.depth,
            self.qc,
            self.diameter_pile,
            self.diameter_cone.unwrap_or(default_cone_diameter),
        )?;
        calc.resample_data(self.spacing)?;
        calc.set_soil_layers(
            self.layers,
            self.water_level,
            self.total_unit_weight_dry,
            self.total_unit_weight_wet,
        )?;
        calc.calculate_base_resistance(self.van_impe, self.hcrit)?;
        calc.correct_shaft_qc(self.cone_type)?;
        calc.calculate_average_qc(self.qc_avg_override)?;
        calc.calculate_unit_shaft_friction()?;

        let pile_resistance = match &self.pile {
            Some(pile) => {
                calc.set_shaft_base_factors(pile.factors)?;
                Some(calc.calculate_pile_resistance(
                    pile.penetration,
                    pile.base_area,
                    pile.circumference,
                    pile.beta_base,
                    pile.lambda_base,
                )?)
            }
            None => None,
        };

        let base_resistance = calc.base.take().ok_or(GroundhogError::StepOrder {
            step: "run",
            requires: "calculate_base_resistance",
        })?;
        Ok(DeBeerSummary {
            diameter_pile: calc.diameter_pile,
            layers: calc.shaft_layers(),
            base_resistance,
            pile_resistance,
        })
    }
}
