//! Environment variables and standard directories.

use std::env;
use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn config_dir_impl(&self) -> Option<PathBuf> {
        dirs::config_dir()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[test]
    fn test_real_runtime_env() {
        let runtime = RealRuntime;

        // PATH exists on all systems
        assert!(runtime.env_var("PATH").is_ok());
        assert!(runtime.env_var("GROUNDHOG_SURELY_UNSET_VARIABLE").is_err());

        // Headless CI may lack a config dir; must not panic either way
        let _ = runtime.config_dir();
    }
}
