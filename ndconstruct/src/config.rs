//! Construction policy
//!
//! Loaded from TOML:
//!
//! ```toml
//! default_leaf = "float64"      # leaf used when nothing is observed
//! integer_width = "int32"       # narrowest inferred integer
//! initial_var_capacity = 8      # first capacity of each growable region
//! growth_factor = 2.0           # > 1.0
//! ```

use std::fs;
use std::path::Path;

use ndconstruct_parser::{parse_leaf, LeafType, ScalarKind};
use ndconstruct_storage::GrowthPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{ConstructError, ConstructResult};

/// Environment variable naming a configuration file
pub const CONFIG_ENV: &str = "NDCONSTRUCT_CONFIG";

/// Narrowest integer type inference picks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegerWidth {
    #[default]
    Int32,
    Int64,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    default_leaf: String,
    integer_width: IntegerWidth,
    initial_var_capacity: usize,
    growth_factor: f64,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let growth = GrowthPolicy::default();
        Self {
            default_leaf: ScalarKind::Float64.name().to_string(),
            integer_width: IntegerWidth::default(),
            initial_var_capacity: growth.initial_capacity,
            growth_factor: growth.growth_factor,
        }
    }
}

/// Validated construction policy
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructConfig {
    /// Leaf of arrays whose data has no leaves at all
    pub default_leaf: LeafType,
    pub integer_width: IntegerWidth,
    pub growth: GrowthPolicy,
}

impl Default for ConstructConfig {
    fn default() -> Self {
        Self {
            default_leaf: LeafType::Scalar(ScalarKind::Float64),
            integer_width: IntegerWidth::default(),
            growth: GrowthPolicy::default(),
        }
    }
}

impl ConstructConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> ConstructResult<Self> {
        let file: ConfigFile = toml::from_str(source)
            .map_err(|e| ConstructError::config(format!("invalid configuration: {}", e)))?;
        Self::validate(file)
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConstructResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            ConstructError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }

    /// Load the file named by `NDCONSTRUCT_CONFIG`, or use defaults
    pub fn from_env() -> ConstructResult<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(file: ConfigFile) -> ConstructResult<Self> {
        let default_leaf = parse_leaf(&file.default_leaf).map_err(|e| {
            ConstructError::config(format!("default_leaf '{}': {}", file.default_leaf, e))
        })?;
        if default_leaf.is_struct() {
            return Err(ConstructError::config(
                "default_leaf must be a scalar or string type",
            ));
        }
        if !file.growth_factor.is_finite() || file.growth_factor <= 1.0 {
            return Err(ConstructError::config(format!(
                "growth_factor must be greater than 1.0, got {}",
                file.growth_factor
            )));
        }

        Ok(Self {
            default_leaf,
            integer_width: file.integer_width,
            growth: GrowthPolicy {
                initial_capacity: file.initial_var_capacity,
                growth_factor: file.growth_factor,
            },
        })
    }
}
