use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::insitu::CorrelationRegistry;
use crate::runtime::Runtime;
use crate::validation::ErrorPolicy;

use super::{emit, parse_param, read_json};

fn policy(settings: &Settings, strict: bool) -> ErrorPolicy {
    if strict {
        ErrorPolicy::Raise
    } else {
        settings.error_policy()
    }
}

/// Settings defaults, then the parameters file, then `--param` values.
fn collect_params<R: Runtime>(
    runtime: &R,
    settings: &Settings,
    params: &[String],
    params_file: Option<&Path>,
) -> Result<Map<String, Value>> {
    let mut merged = settings.correlation_defaults();

    if let Some(path) = params_file {
        match read_json::<_, Value>(runtime, path)? {
            Value::Object(fields) => merged.extend(fields),
            _ => bail!("Parameters file {} should hold a JSON object", path.display()),
        }
    }
    for raw in params {
        let (key, value) = parse_param(raw)?;
        merged.insert(key, value);
    }
    Ok(merged)
}

/// Print the names of all registered correlations.
#[tracing::instrument]
pub fn correlations() -> Result<()> {
    for name in CorrelationRegistry::new().names() {
        println!("{}", name);
    }
    Ok(())
}

pub(crate) fn evaluate<R: Runtime>(
    runtime: &R,
    config: Option<&Path>,
    name: &str,
    params: &[String],
    params_file: Option<&Path>,
    strict: bool,
) -> Result<Value> {
    let settings = Settings::load(runtime, config)?;
    let registry = CorrelationRegistry::new();
    let merged = collect_params(runtime, &settings, params, params_file)?;

    registry
        .run(name, &Value::Object(merged), policy(&settings, strict))
        .with_context(|| format!("Failed to evaluate '{}'", name))
}

/// Run one correlation and print its result as JSON.
#[tracing::instrument(skip(runtime, config))]
pub fn correlate<R: Runtime>(
    runtime: R,
    config: Option<PathBuf>,
    name: &str,
    params: &[String],
    params_file: Option<PathBuf>,
    strict: bool,
) -> Result<()> {
    let result = evaluate(
        &runtime,
        config.as_deref(),
        name,
        params,
        params_file.as_deref(),
        strict,
    )?;
    emit(&runtime, &result, None)
}

pub(crate) fn process_records<R: Runtime>(
    runtime: &R,
    config: Option<&Path>,
    name: &str,
    input: &Path,
    params: &[String],
    strict: bool,
) -> Result<Vec<Map<String, Value>>> {
    let settings = Settings::load(runtime, config)?;
    let registry = CorrelationRegistry::new();
    let extra = collect_params(runtime, &settings, params, None)?;
    let records: Vec<Map<String, Value>> = read_json(runtime, input)?;

    debug!("Applying '{}' to {} records", name, records.len());
    let processed = registry
        .apply_to_records(name, &records, &extra, policy(&settings, strict))
        .with_context(|| format!("Failed to apply '{}' to {}", name, input.display()))?;
    info!("Processed {} records with '{}'", processed.len(), name);
    Ok(processed)
}

/// Apply a correlation to every record of a JSON array of PCPT records.
#[tracing::instrument(skip(runtime, config, output))]
pub fn process<R: Runtime>(
    runtime: R,
    config: Option<PathBuf>,
    name: &str,
    input: &Path,
    params: &[String],
    strict: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let processed = process_records(&runtime, config.as_deref(), name, input, params, strict)?;
    emit(&runtime, &processed, output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use serde_json::json;

    fn runtime_with_defaults() -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(crate::config::CONFIG_ENV))
            .returning(|_| Err(std::env::VarError::NotPresent));
        runtime.expect_config_dir().returning(|| None);
        runtime
    }

    fn params(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_evaluate_with_command_line_params() {
        let runtime = runtime_with_defaults();
        let result = evaluate(
            &runtime,
            None,
            "Su Rad and Lunne (1988)",
            &params(&["qnet=1.0", "Nk=20"]),
            None,
            false,
        )
        .unwrap();
        assert_eq!(result["Su [kPa]"], json!(50.0));
    }

    #[test]
    fn test_evaluate_params_file_overridden_by_params() {
        let mut runtime = runtime_with_defaults();
        runtime
            .expect_read_to_string()
            .withf(|p| p == Path::new("/data/params.json"))
            .returning(|_| Ok(r#"{"qnet": 1.0, "Nk": 10.0}"#.into()));

        let result = evaluate(
            &runtime,
            None,
            "Su Rad and Lunne (1988)",
            &params(&["Nk=20"]),
            Some(Path::new("/data/params.json")),
            false,
        )
        .unwrap();
        assert_eq!(result["Su [kPa]"], json!(50.0));
    }

    #[test]
    fn test_evaluate_params_file_must_be_object() {
        let mut runtime = runtime_with_defaults();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("[1.0]".into()));

        let err = evaluate(
            &runtime,
            None,
            "Su Rad and Lunne (1988)",
            &[],
            Some(Path::new("/data/params.json")),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn test_evaluate_strict_raises_validation_error() {
        let runtime = runtime_with_defaults();
        let silent = evaluate(
            &runtime,
            None,
            "Su Rad and Lunne (1988)",
            &params(&["qnet=1.0", "Nk=50"]),
            None,
            false,
        )
        .unwrap();
        assert!(silent["Su [kPa]"].is_null());

        let runtime = runtime_with_defaults();
        let err = evaluate(
            &runtime,
            None,
            "Su Rad and Lunne (1988)",
            &params(&["qnet=1.0", "Nk=50"]),
            None,
            true,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("Nk"));
    }

    #[test]
    fn test_evaluate_unknown_correlation() {
        let runtime = runtime_with_defaults();
        let err = evaluate(&runtime, None, "Nonsense (2024)", &[], None, false).unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown correlation"));
    }

    #[test]
    fn test_process_records_uses_settings_defaults() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .withf(|p| p == Path::new("/etc/groundhog.json"))
            .returning(|_| Ok(r#"{"atmospheric_pressure": 100.0}"#.into()));
        runtime
            .expect_read_to_string()
            .withf(|p| p == Path::new("/data/cpt.json"))
            .returning(|_| {
                Ok(r#"[
                    {"z [m]": 1.0, "qc [MPa]": 10.0, "Vertical effective stress [kPa]": 100.0},
                    {"z [m]": 2.0, "qc [MPa]": 200.0, "Vertical effective stress [kPa]": 100.0}
                ]"#
                .into())
            });

        let records = process_records(
            &runtime,
            Some(Path::new("/etc/groundhog.json")),
            "Gmax Rix and Stokoe (1991)",
            Path::new("/data/cpt.json"),
            &[],
            false,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["z [m]"], json!(2.0));
        assert!(records[0]["Gmax [kPa]"].as_f64().unwrap() > 0.0);
        assert!(records[1]["Gmax [kPa]"].is_null());
    }

    #[test]
    fn test_process_records_strict_fails_on_bad_record() {
        let mut runtime = runtime_with_defaults();
        runtime.expect_read_to_string().returning(|_| {
            Ok(r#"[{"qc [MPa]": 200.0, "Vertical effective stress [kPa]": 100.0}]"#.into())
        });

        let result = process_records(
            &runtime,
            None,
            "Gmax Rix and Stokoe (1991)",
            Path::new("/data/cpt.json"),
            &[],
            true,
        );
        assert!(result.is_err());
    }
}
