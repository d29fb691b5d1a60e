use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::foundations::{DeBeerInput, DeBeerSummary};
use crate::runtime::Runtime;

use super::{emit, read_json};

pub(crate) fn calculate<R: Runtime>(
    runtime: &R,
    config: Option<&Path>,
    input: &Path,
) -> Result<DeBeerSummary> {
    let settings = Settings::load(runtime, config)?;
    let calculation: DeBeerInput = read_json(runtime, input)?;
    calculation
        .run(settings.cone_diameter)
        .with_context(|| format!("De Beer calculation for {} failed", input.display()))
}

/// Run a complete De Beer pile resistance calculation from a JSON input file.
#[tracing::instrument(skip(runtime, config, output))]
pub fn debeer<R: Runtime>(
    runtime: R,
    config: Option<PathBuf>,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    let summary = calculate(&runtime, config.as_deref(), input)?;
    emit(&runtime, &summary, output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    const INPUT: &str = r#"{
        "depth": [0.0, 4.0, 8.0, 12.0],
        "qc": [1.0, 3.0, 12.0, 12.0],
        "diameter_pile": 0.4,
        "layers": [
            {"depth_from": 0.0, "depth_to": 4.0, "soil_type": "Clay", "tertiary_clay": true},
            {"depth_from": 4.0, "depth_to": 12.0, "soil_type": "Sand"}
        ],
        "water_level": 2.0,
        "cone_type": "M1"
    }"#;

    fn runtime_with_input(input: &'static str) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(crate::config::CONFIG_ENV))
            .returning(|_| Err(std::env::VarError::NotPresent));
        runtime.expect_config_dir().returning(|| None);
        runtime
            .expect_read_to_string()
            .withf(|p| p == Path::new("/data/debeer.json"))
            .returning(move |_| Ok(input.into()));
        runtime
    }

    #[test]
    fn test_calculate_without_pile() {
        let runtime = runtime_with_input(INPUT);
        let summary = calculate(&runtime, None, Path::new("/data/debeer.json")).unwrap();

        // Split at the water level
        assert_eq!(summary.layers.len(), 3);
        assert!(summary.layers.iter().all(|l| l.qs.is_some()));
        assert!(summary.pile_resistance.is_none());
        assert_eq!(summary.base_resistance.diameter_1, 0.4);
        assert_eq!(summary.base_resistance.qb.len(), 60);
    }

    #[test]
    fn test_calculate_reports_invalid_input() {
        let runtime = runtime_with_input(
            r#"{"depth": [0.0, 1.0], "qc": [1.0, 2.0], "diameter_pile": 0.1,
                "layers": [{"depth_from": 0.0, "depth_to": 1.0, "soil_type": "Sand"}]}"#,
        );
        let err = calculate(&runtime, None, Path::new("/data/debeer.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("diameter_pile"));
    }
}
