//! Demo configuration: defaults, an optional TOML file, CLI overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sa_core::{EngineConfig, GenerationSchedule};

/// Everything the corridor demo needs.  Every section may be omitted from
/// the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub engine:     EngineConfig,
    pub schedule:   GenerationSchedule,
    pub demand:     DemandConfig,
    pub pool:       PoolConfig,
    pub output_dir: PathBuf,
}

/// Bernoulli arrivals on every approach lane.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandConfig {
    /// Chance of an arrival per lane per second.
    pub probability: f64,
    /// No arrivals after this many simulated seconds.
    pub until:       f64,
}

/// Shape of the randomly generated initial populations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub individuals:       usize,
    pub rs_rules:          usize,
    pub rs_int_rules:      usize,
    /// Conditions per generated rule are drawn from `1..=max_conditions`.
    pub max_conditions:    usize,
    pub survivor_fraction: f64,
    pub weight_jitter:     f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            engine:     EngineConfig::default(),
            schedule:   GenerationSchedule {
                total_generations:   5,
                runs_per_individual: 2,
                run_time_steps:      vec![(1, 1_800.0), (4, 1_200.0)],
            },
            demand:     DemandConfig::default(),
            pool:       PoolConfig::default(),
            output_dir: PathBuf::from("output/corridor"),
        }
    }
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self { probability: 0.08, until: 900.0 }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            individuals:       6,
            rs_rules:          12,
            rs_int_rules:      6,
            max_conditions:    2,
            survivor_fraction: 0.5,
            weight_jitter:     0.1,
        }
    }
}

impl DemoConfig {
    /// Load from `path`, or use the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: DemoConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }
}
