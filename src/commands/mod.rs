use anyhow::{Context, Result, bail};
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::runtime::Runtime;

mod correlate;
mod debeer;
mod info;

pub use correlate::{correlate, correlations, process};
pub use debeer::debeer;
pub use info::info;

/// Parse a `key=value` command line parameter. The value is read as JSON when
/// it parses (numbers, booleans, null) and kept as a string otherwise.
pub(crate) fn parse_param(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Parameter '{}' should have the form key=value", raw);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Parameter '{}' has an empty name", raw);
    }
    let value = value.trim();
    let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), parsed))
}

/// Read and parse a JSON document through the runtime.
pub(crate) fn read_json<R: Runtime, T: serde::de::DeserializeOwned>(
    runtime: &R,
    path: &Path,
) -> Result<T> {
    let contents = runtime.read_to_string(path)?;
    serde_json::from_str(&contents).with_context(|| format!("Malformed JSON in {}", path.display()))
}

/// Write `value` as pretty JSON to `output`, or print it.
pub(crate) fn emit<R: Runtime, T: Serialize>(
    runtime: &R,
    value: &T,
    output: Option<&Path>,
) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            debug!("Writing results to {:?}", path);
            runtime.write(path, rendered.as_bytes())
        }
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use serde_json::json;

    #[test]
    fn test_parse_param_numbers_and_strings() {
        assert_eq!(parse_param("qt=10.5").unwrap(), ("qt".into(), json!(10.5)));
        assert_eq!(parse_param(" Nk = 15 ").unwrap(), ("Nk".into(), json!(15)));
        assert_eq!(
            parse_param("sandtype=NC").unwrap(),
            ("sandtype".into(), json!("NC"))
        );
        assert_eq!(parse_param("Bq=null").unwrap(), ("Bq".into(), Value::Null));
    }

    #[test]
    fn test_parse_param_rejects_malformed() {
        assert!(parse_param("qt").is_err());
        assert!(parse_param("=10").is_err());
    }

    #[test]
    fn test_emit_writes_to_output_file() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_write()
            .withf(|path, contents| {
                path == Path::new("/tmp/out.json")
                    && String::from_utf8_lossy(contents).contains("\"Su [kPa]\": 50.0")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        emit(
            &runtime,
            &json!({"Su [kPa]": 50.0}),
            Some(Path::new("/tmp/out.json")),
        )
        .unwrap();
    }

    #[test]
    fn test_read_json_reports_path() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("[1, 2".into()));

        let err = read_json::<_, Value>(&runtime, Path::new("/data/cpt.json")).unwrap_err();
        assert!(err.to_string().contains("/data/cpt.json"));
    }
}
