use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ledger::Priority, world::FarmSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub farm: FarmSnapshot,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub r#loop: BotLoopConfig,
}

fn default_enabled_true() -> bool {
    true
}

fn default_logging_dir() -> PathBuf {
    PathBuf::from("./logs/wurzel")
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_rotation() -> LoggingRotation {
    LoggingRotation::Daily
}

fn default_logging_retention_days() -> usize {
    14
}

fn default_remove_weed_priority() -> Priority {
    1
}

fn default_big_quest_priority() -> Priority {
    2
}

fn default_farm_money_priority() -> Priority {
    10
}

fn default_provide_plant_quantity() -> i64 {
    4
}

fn default_seed_top_up_quantity() -> i64 {
    4
}

fn default_max_passes_per_round() -> u32 {
    32
}

fn default_round_interval_ms() -> u64 {
    1_000
}

fn default_max_sleep_secs() -> u64 {
    3_600
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default = "default_logging_rotation")]
    pub rotation: LoggingRotation,
    #[serde(default = "default_logging_retention_days")]
    pub retention_days: usize,
    #[serde(default = "default_enabled_true")]
    pub stderr_warn_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logging_dir(),
            filter: default_logging_filter(),
            rotation: default_logging_rotation(),
            retention_days: default_logging_retention_days(),
            stderr_warn_enabled: true,
        }
    }
}

/// Fixed priority per objective class. Lower is served first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriorityConfig {
    #[serde(default = "default_remove_weed_priority")]
    pub remove_weed: Priority,
    #[serde(default = "default_big_quest_priority")]
    pub big_quest: Priority,
    #[serde(default = "default_farm_money_priority")]
    pub farm_money: Priority,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            remove_weed: default_remove_weed_priority(),
            big_quest: default_big_quest_priority(),
            farm_money: default_farm_money_priority(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub priorities: PriorityConfig,
    /// Seeds bought when a product has to be farmed from nothing.
    #[serde(default = "default_provide_plant_quantity")]
    pub provide_plant_quantity: i64,
    /// Seeds bought with spare cash when no money could be reserved at all.
    #[serde(default = "default_seed_top_up_quantity")]
    pub seed_top_up_quantity: i64,
    #[serde(default = "default_max_passes_per_round")]
    pub max_passes_per_round: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            priorities: PriorityConfig::default(),
            provide_plant_quantity: default_provide_plant_quantity(),
            seed_top_up_quantity: default_seed_top_up_quantity(),
            max_passes_per_round: default_max_passes_per_round(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotLoopConfig {
    #[serde(default = "default_round_interval_ms")]
    pub round_interval_ms: u64,
    #[serde(default = "default_max_sleep_secs")]
    pub max_sleep_secs: u64,
    #[serde(default)]
    pub max_rounds: Option<u64>,
}

impl Default for BotLoopConfig {
    fn default() -> Self {
        Self {
            round_interval_ms: default_round_interval_ms(),
            max_sleep_secs: default_max_sleep_secs(),
            max_rounds: None,
        }
    }
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let schema_path = resolve_schema_path(config_base, &config_value)?;
        validate_against_schema(&config_value, &schema_path)?;

        let mut config: Config =
            serde_json::from_value(config_value).context("failed to deserialize wurzel config")?;

        if !config.logging.dir.is_absolute() {
            config.logging.dir = config_base.join(&config.logging.dir);
        }

        Ok(config)
    }
}

fn resolve_schema_path(config_base: &Path, config_value: &Value) -> Result<PathBuf> {
    if let Some(path_text) = config_value.get("$schema").and_then(|value| value.as_str()) {
        let configured = PathBuf::from(path_text);
        if configured.is_absolute() {
            return Ok(configured);
        }
        return Ok(config_base.join(&configured));
    }

    let local_default = config_base.join("wurzel.schema.json");
    if local_default.exists() {
        return Ok(local_default);
    }

    Err(anyhow!(
        "unable to resolve schema path: expected $schema in config or wurzel.schema.json next to it"
    ))
}

fn validate_against_schema(config_value: &Value, schema_path: &Path) -> Result<()> {
    let schema_content = fs::read_to_string(schema_path)
        .with_context(|| format!("failed to read schema {}", schema_path.display()))?;
    let schema: Value = serde_json::from_str(&schema_content)
        .with_context(|| format!("failed to parse schema {}", schema_path.display()))?;

    let compiled =
        JSONSchema::compile(&schema).map_err(|e| anyhow!("failed to compile schema: {e}"))?;

    match compiled.validate(config_value) {
        Ok(()) => Ok(()),
        Err(errors_iter) => {
            let validation_errors: Vec<ValidationError> = errors_iter.collect();
            let messages: Vec<String> = validation_errors
                .into_iter()
                .map(|error| error.to_string())
                .collect();
            Err(anyhow!("config validation failed: {}", messages.join("; ")))
        }
    }
}
