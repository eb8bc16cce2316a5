use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::aggregate::{AggregateOptions, LabelOrder, UnmappedPolicy};
use crate::data::histogram::BinConfig;
use crate::error::AggregateError;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "SALARY_SCENES_CONFIG";

/// Viewer settings.  Every field is optional in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Dataset loaded on every scene activation.
    pub data_path: PathBuf,
    /// Explorer histogram bin width in USD.
    pub bin_width: f64,
    /// Explorer histogram upper bound in USD (inclusive).
    pub upper_bound: f64,
    pub label_order: LabelOrder,
    pub unmapped: UnmappedPolicy,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/ds_salaries.csv"),
            bin_width: BinConfig::DEFAULT_WIDTH,
            upper_bound: BinConfig::DEFAULT_UPPER_BOUND,
            label_order: LabelOrder::default(),
            unmapped: UnmappedPolicy::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config from [`CONFIG_ENV`] (or defaults), with the first positional
    /// argument, if any, overriding `data_path`.
    pub fn resolve<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::resolve_with(env_path.as_deref(), args)
    }

    fn resolve_with<I>(config_path: Option<&Path>, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(data) = args.into_iter().next() {
            config.data_path = PathBuf::from(data);
        }
        log::info!(
            "dataset {}, bins of {} up to {}",
            config.data_path.display(),
            config.bin_width,
            config.upper_bound
        );
        Ok(config)
    }

    pub fn bin_config(&self) -> Result<BinConfig, AggregateError> {
        BinConfig::new(self.bin_width, self.upper_bound)
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            unmapped: self.unmapped,
            order: self.label_order,
        }
    }
}
