use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::Result;
use crate::types::RateConvention;

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// directory holding one `<user>.json` per active user
    pub data_dir: PathBuf,
    /// partition under `data_dir` that deleted users are moved into
    pub deleted_dir: String,
    pub rate_convention: RateConvention,
    /// chrono format for payment timestamps
    pub timestamp_format: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("loan_data"),
            deleted_dir: "deleted".to_string(),
            rate_convention: RateConvention::Monthly,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

impl LedgerConfig {
    /// defaults overridden by `LOAN_LEDGER_*` environment variables,
    /// e.g. `LOAN_LEDGER_DATA_DIR` or `LOAN_LEDGER_RATE_CONVENTION=legacy`
    pub fn from_env() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("LOAN_LEDGER"))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn rate_convention(mut self, convention: RateConvention) -> Self {
        self.rate_convention = convention;
        self
    }

    pub fn deleted_path(&self) -> PathBuf {
        self.data_dir.join(&self.deleted_dir)
    }

    pub fn user_file(&self, user_name: &str) -> PathBuf {
        user_file_in(&self.data_dir, user_name)
    }

    pub fn deleted_user_file(&self, user_name: &str) -> PathBuf {
        user_file_in(&self.deleted_path(), user_name)
    }
}

fn user_file_in(dir: &Path, user_name: &str) -> PathBuf {
    dir.join(format!("{user_name}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = LedgerConfig::default();
        assert_eq!(config.user_file("alice"), PathBuf::from("loan_data/alice.json"));
        assert_eq!(
            config.deleted_user_file("alice"),
            PathBuf::from("loan_data/deleted/alice.json")
        );
        assert_eq!(config.rate_convention, RateConvention::Monthly);
    }

    #[test]
    fn test_builder_overrides() {
        let config = LedgerConfig::with_data_dir("/tmp/ledger").rate_convention(RateConvention::Legacy);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/ledger"));
        assert_eq!(config.rate_convention, RateConvention::Legacy);
        assert_eq!(config.deleted_dir, "deleted");
    }

    #[test]
    fn test_partial_overrides_keep_defaults() {
        let config: LedgerConfig = serde_json::from_str(r#"{"rate_convention":"legacy"}"#).unwrap();
        assert_eq!(config.rate_convention, RateConvention::Legacy);
        assert_eq!(config.timestamp_format, "%Y-%m-%d %H:%M:%S");
    }
}
