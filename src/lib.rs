//! Geotechnical calculations: PCPT correlations, soil profiles with
//! overburden stresses and De Beer's pile resistance method.

pub mod about;
pub mod commands;
pub mod config;
pub mod error;
pub mod foundations;
pub mod insitu;
pub mod numerics;
pub mod runtime;
pub mod soil;
pub mod validation;

pub use error::{GroundhogError, Result};
