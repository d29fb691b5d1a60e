//! In-situ test interpretation.
//!
//! - `pcpt` - correlations between piezocone (PCPT) measurements and soil parameters
//! - `registry` - name-based lookup of correlations and application to PCPT records

pub mod pcpt;
pub mod registry;

pub use pcpt::{Correlation, ErrorReturn};
pub use registry::{CorrelationRegistry, PCPT_KEY_MAPPING};
