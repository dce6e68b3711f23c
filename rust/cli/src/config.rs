use serde::{Deserialize, Serialize};
use std::fs;

use hitstand_ai::create_advisor;
use hitstand_engine::rules::SplitPolicy;

/// Path of an optional TOML file layered over the defaults.
pub const CONFIG_ENV: &str = "HITSTAND_CONFIG";
pub const SEED_ENV: &str = "HITSTAND_SEED";
pub const BANKROLL_ENV: &str = "HITSTAND_BANKROLL";
pub const ADVISOR_ENV: &str = "HITSTAND_ADVISOR";
pub const SPLIT_POLICY_ENV: &str = "HITSTAND_SPLIT_POLICY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub starting_bankroll: u32,
    pub seed: Option<u64>,
    pub advisor: String,
    pub split_policy: SplitPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub starting_bankroll: ValueSource,
    pub seed: ValueSource,
    pub advisor: ValueSource,
    pub split_policy: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            starting_bankroll: ValueSource::Default,
            seed: ValueSource::Default,
            advisor: ValueSource::Default,
            split_policy: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starting_bankroll: 1000,
            seed: None,
            advisor: "basic".into(),
            split_policy: SplitPolicy::SameRank,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

/// Defaults, then the TOML file named by `HITSTAND_CONFIG`, then `HITSTAND_*` variables.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    load_from(|key| std::env::var(key).ok())
}

/// Same as [`load_with_sources`] with an injectable variable lookup.
pub fn load_from<F>(lookup: F) -> Result<ConfigResolved, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(path) = var(CONFIG_ENV) {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.starting_bankroll {
            cfg.starting_bankroll = v;
            sources.starting_bankroll = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.advisor {
            cfg.advisor = v;
            sources.advisor = ValueSource::File;
        }
        if let Some(v) = f.split_policy {
            cfg.split_policy = v;
            sources.split_policy = ValueSource::File;
        }
    }

    if let Some(seed) = var(SEED_ENV) {
        cfg.seed = Some(
            seed.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid seed '{}'", seed)))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Some(bankroll) = var(BANKROLL_ENV) {
        cfg.starting_bankroll = bankroll
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid bankroll '{}'", bankroll)))?;
        sources.starting_bankroll = ValueSource::Env;
    }
    if let Some(advisor) = var(ADVISOR_ENV) {
        cfg.advisor = advisor.trim().to_string();
        sources.advisor = ValueSource::Env;
    }
    if let Some(policy) = var(SPLIT_POLICY_ENV) {
        cfg.split_policy = policy.parse().map_err(ConfigError::Invalid)?;
        sources.split_policy = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    starting_bankroll: Option<u32>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    advisor: Option<String>,
    #[serde(default)]
    split_policy: Option<SplitPolicy>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.starting_bankroll == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: starting_bankroll must be >0".into(),
        ));
    }
    if create_advisor(&cfg.advisor).is_none() {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: unknown advisor '{}'",
            cfg.advisor
        )));
    }
    Ok(())
}
