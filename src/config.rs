//! User settings shared by the commands.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

use crate::foundations::debeer::STANDARD_CONE_DIAMETER;
use crate::insitu::pcpt::{ATMOSPHERIC_PRESSURE, UNITWEIGHT_SEAWATER};
use crate::runtime::Runtime;
use crate::validation::ErrorPolicy;

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "GROUNDHOG_CONFIG";

fn default_unitweight_water() -> f64 {
    UNITWEIGHT_SEAWATER
}

fn default_atmospheric_pressure() -> f64 {
    ATMOSPHERIC_PRESSURE
}

fn default_fail_silently() -> bool {
    true
}

fn default_cone_diameter() -> f64 {
    STANDARD_CONE_DIAMETER
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    /// [kN/m3]
    #[serde(default = "default_unitweight_water")]
    pub unitweight_water: f64,
    /// [kPa]
    #[serde(default = "default_atmospheric_pressure")]
    pub atmospheric_pressure: f64,
    #[serde(default = "default_fail_silently")]
    pub fail_silently: bool,
    /// [m]
    #[serde(default = "default_cone_diameter")]
    pub cone_diameter: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unitweight_water: default_unitweight_water(),
            atmospheric_pressure: default_atmospheric_pressure(),
            fail_silently: default_fail_silently(),
            cone_diameter: default_cone_diameter(),
        }
    }
}

impl Settings {
    /// Load settings from `explicit`, the file named by `GROUNDHOG_CONFIG` or
    /// `<config dir>/groundhog/config.json`, in that order.
    ///
    /// An explicitly named file must exist. Without any file the defaults apply.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, explicit: Option<&Path>) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| runtime.env_var(CONFIG_ENV).ok().map(PathBuf::from));

        let path = match named {
            Some(path) => path,
            None => match default_config_path(runtime) {
                Some(path) if runtime.exists(&path) => path,
                _ => {
                    debug!("No settings file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!("Loading settings from {:?}", path);
        let contents = runtime.read_to_string(&path)?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Malformed settings file {}", path.display()))
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::from_fail_silently(self.fail_silently)
    }

    /// Parameters every correlation may take from the settings. Correlations
    /// ignore the ones they do not use.
    pub fn correlation_defaults(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("unitweight_water".into(), json!(self.unitweight_water));
        defaults.insert(
            "atmospheric_pressure".into(),
            json!(self.atmospheric_pressure),
        );
        defaults
    }
}

pub fn default_config_path<R: Runtime>(runtime: &R) -> Option<PathBuf> {
    runtime
        .config_dir()
        .map(|dir| dir.join("groundhog").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn runtime_without_env() -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(CONFIG_ENV))
            .returning(|_| Err(std::env::VarError::NotPresent));
        runtime
    }

    #[test]
    fn test_defaults_without_any_file() {
        let mut runtime = runtime_without_env();
        runtime
            .expect_config_dir()
            .returning(|| Some(PathBuf::from("/home/user/.config")));
        runtime.expect_exists().returning(|_| false);

        let settings = Settings::load(&runtime, None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.unitweight_water, 10.25);
        assert_eq!(settings.cone_diameter, 0.0357);
        assert_eq!(settings.error_policy(), ErrorPolicy::FailSilently);
    }

    #[test]
    fn test_defaults_without_config_dir() {
        let mut runtime = runtime_without_env();
        runtime.expect_config_dir().returning(|| None);

        assert_eq!(Settings::load(&runtime, None).unwrap(), Settings::default());
    }

    #[test]
    fn test_load_from_config_dir_with_partial_file() {
        let mut runtime = runtime_without_env();
        runtime
            .expect_config_dir()
            .returning(|| Some(PathBuf::from("/home/user/.config")));
        let expected = PathBuf::from("/home/user/.config/groundhog/config.json");
        let exists_path = expected.clone();
        runtime
            .expect_exists()
            .withf(move |p| p == exists_path.as_path())
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .withf(move |p| p == expected.as_path())
            .returning(|_| Ok(r#"{"unitweight_water": 10.0, "fail_silently": false}"#.into()));

        let settings = Settings::load(&runtime, None).unwrap();
        assert_eq!(settings.unitweight_water, 10.0);
        assert_eq!(settings.atmospheric_pressure, 100.0);
        assert_eq!(settings.error_policy(), ErrorPolicy::Raise);
    }

    #[test]
    fn test_env_variable_names_file() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(CONFIG_ENV))
            .returning(|_| Ok("/etc/groundhog.json".into()));
        runtime
            .expect_read_to_string()
            .withf(|p| p == Path::new("/etc/groundhog.json"))
            .returning(|_| Ok(r#"{"cone_diameter": 0.0437}"#.into()));

        let settings = Settings::load(&runtime, None).unwrap();
        assert_eq!(settings.cone_diameter, 0.0437);
    }

    #[test]
    fn test_explicit_path_wins_over_env() {
        let mut runtime = MockRuntime::new();
        runtime.expect_env_var().never();
        runtime
            .expect_read_to_string()
            .withf(|p| p == Path::new("/tmp/settings.json"))
            .returning(|_| Ok(r#"{"atmospheric_pressure": 101.3}"#.into()));

        let settings = Settings::load(&runtime, Some(Path::new("/tmp/settings.json"))).unwrap();
        assert_eq!(settings.atmospheric_pressure, 101.3);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("{not json".into()));

        let err = Settings::load(&runtime, Some(Path::new("/tmp/settings.json"))).unwrap_err();
        assert!(err.to_string().contains("Malformed settings file"));
    }

    #[test]
    fn test_correlation_defaults() {
        let defaults = Settings::default().correlation_defaults();
        assert_eq!(defaults["unitweight_water"], json!(10.25));
        assert_eq!(defaults["atmospheric_pressure"], json!(100.0));
    }
}
