use crate::accounts::{MAX_PASSWORD_COST, MIN_PASSWORD_COST};
use hitstand_engine::rules::{SplitPolicy, TableRules, MAX_BET, MAX_TABLE_LIMIT, MIN_BET};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_ENV: &str = "HITSTAND_CONFIG";
pub const STARTING_BANKROLL_ENV: &str = "HITSTAND_STARTING_BANKROLL";
pub const MIN_BET_ENV: &str = "HITSTAND_MIN_BET";
pub const MAX_BET_ENV: &str = "HITSTAND_MAX_BET";
pub const SPLIT_POLICY_ENV: &str = "HITSTAND_SPLIT_POLICY";
pub const SESSION_TIMEOUT_ENV: &str = "HITSTAND_SESSION_TIMEOUT_MINUTES";
pub const DATABASE_ENV: &str = "HITSTAND_DATABASE";
pub const DECK_SEED_ENV: &str = "HITSTAND_DECK_SEED";
pub const PASSWORD_COST_ENV: &str = "HITSTAND_PASSWORD_COST";

/// Server-wide settings: table limits, account defaults and storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    /// Bankroll given to newly registered accounts
    pub starting_bankroll: u32,
    pub min_bet: u32,
    pub max_bet: u32,
    pub split_policy: SplitPolicy,
    /// Bearer tokens idle longer than this are rejected
    pub session_timeout_minutes: u64,
    /// SQLite file; in-memory storage when absent
    pub database: Option<PathBuf>,
    /// Seeds the per-round deck stream for reproducible tables
    pub deck_seed: Option<u64>,
    /// bcrypt work factor for new password hashes
    pub password_cost: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            starting_bankroll: 1000,
            min_bet: MIN_BET,
            max_bet: MAX_BET,
            split_policy: SplitPolicy::default(),
            session_timeout_minutes: 30,
            database: None,
            deck_seed: None,
            password_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AppSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.min_bet == 0 {
            return Err(SettingsError::InvalidValue(
                "min_bet must be at least 1".to_string(),
            ));
        }
        if self.min_bet > self.max_bet {
            return Err(SettingsError::InvalidValue(format!(
                "min_bet ({}) must not exceed max_bet ({})",
                self.min_bet, self.max_bet
            )));
        }
        if self.max_bet > MAX_TABLE_LIMIT {
            return Err(SettingsError::InvalidValue(format!(
                "max_bet ({}) must not exceed {}",
                self.max_bet, MAX_TABLE_LIMIT
            )));
        }
        if self.starting_bankroll == 0 {
            return Err(SettingsError::InvalidValue(
                "starting_bankroll must be greater than 0".to_string(),
            ));
        }
        if !(MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&self.password_cost) {
            return Err(SettingsError::InvalidValue(format!(
                "password_cost must be between {} and {}",
                MIN_PASSWORD_COST, MAX_PASSWORD_COST
            )));
        }
        if self.session_timeout_minutes == 0 {
            return Err(SettingsError::InvalidValue(
                "session_timeout_minutes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn table_rules(&self) -> TableRules {
        TableRules {
            min_bet: self.min_bet,
            max_bet: self.max_bet,
            split_policy: self.split_policy,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_timeout_minutes.saturating_mul(60))
    }

    /// Defaults, then the TOML file (`config_path`, else `HITSTAND_CONFIG`),
    /// then `HITSTAND_*` variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_from(config_path, |key| std::env::var(key).ok())
    }

    /// [`AppSettings::load`] with an injectable variable lookup.
    pub fn load_from<F>(config_path: Option<&Path>, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let file = config_path
            .map(Path::to_path_buf)
            .or_else(|| var(CONFIG_ENV).map(PathBuf::from));
        let mut settings = match file {
            Some(path) => {
                let text = std::fs::read_to_string(&path).map_err(|source| SettingsError::Io {
                    path: path.clone(),
                    source,
                })?;
                toml::from_str(&text)?
            }
            None => AppSettings::default(),
        };

        if let Some(v) = var(STARTING_BANKROLL_ENV) {
            settings.starting_bankroll = parse_var(STARTING_BANKROLL_ENV, &v)?;
        }
        if let Some(v) = var(MIN_BET_ENV) {
            settings.min_bet = parse_var(MIN_BET_ENV, &v)?;
        }
        if let Some(v) = var(MAX_BET_ENV) {
            settings.max_bet = parse_var(MAX_BET_ENV, &v)?;
        }
        if let Some(v) = var(SPLIT_POLICY_ENV) {
            settings.split_policy = v.parse().map_err(SettingsError::InvalidValue)?;
        }
        if let Some(v) = var(SESSION_TIMEOUT_ENV) {
            settings.session_timeout_minutes = parse_var(SESSION_TIMEOUT_ENV, &v)?;
        }
        if let Some(v) = var(DATABASE_ENV) {
            settings.database = Some(PathBuf::from(v.trim()));
        }
        if let Some(v) = var(DECK_SEED_ENV) {
            settings.deck_seed = Some(parse_var(DECK_SEED_ENV, &v)?);
        }
        if let Some(v) = var(PASSWORD_COST_ENV) {
            settings.password_cost = parse_var(PASSWORD_COST_ENV, &v)?;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
    value
        .trim()
        .parse()
        .map_err(|_| SettingsError::InvalidValue(format!("{}: cannot parse '{}'", key, value)))
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    #[error("Cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = AppSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.table_rules(), TableRules::default());
        assert_eq!(settings.session_ttl(), Duration::from_secs(1800));
    }

    #[test]
    fn validates_bet_limits() {
        let zero_min = AppSettings {
            min_bet: 0,
            ..Default::default()
        };
        assert!(zero_min.validate().is_err());

        let inverted = AppSettings {
            min_bet: 50,
            max_bet: 20,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let equal = AppSettings {
            min_bet: 25,
            max_bet: 25,
            ..Default::default()
        };
        assert!(equal.validate().is_ok());

        let at_ceiling = AppSettings {
            max_bet: MAX_TABLE_LIMIT,
            ..Default::default()
        };
        assert!(at_ceiling.validate().is_ok());

        let unbounded = AppSettings {
            min_bet: 1,
            max_bet: u32::MAX,
            ..Default::default()
        };
        let err = unbounded.validate().unwrap_err();
        assert!(err.to_string().contains("max_bet"));
    }

    #[test]
    fn validates_bankroll_and_timeout() {
        let broke = AppSettings {
            starting_bankroll: 0,
            ..Default::default()
        };
        assert!(broke.validate().is_err());

        let no_timeout = AppSettings {
            session_timeout_minutes: 0,
            ..Default::default()
        };
        assert!(no_timeout.validate().is_err());
    }

    #[test]
    fn file_then_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web.toml");
        std::fs::write(
            &path,
            "starting_bankroll = 500\nmax_bet = 200\nsplit_policy = \"same_value\"\n",
        )
        .unwrap();

        let settings =
            AppSettings::load_from(Some(&path), lookup(&[(MAX_BET_ENV, "300")])).unwrap();
        assert_eq!(settings.starting_bankroll, 500);
        assert_eq!(settings.max_bet, 300);
        assert_eq!(settings.min_bet, 10);
        assert_eq!(settings.split_policy, SplitPolicy::SameValue);
    }

    #[test]
    fn config_env_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web.toml");
        std::fs::write(&path, "deck_seed = 42\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let settings = AppSettings::load_from(None, lookup(&[(CONFIG_ENV, path.as_str())])).unwrap();
        assert_eq!(settings.deck_seed, Some(42));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(AppSettings::load_from(None, lookup(&[(MIN_BET_ENV, "ten")])).is_err());
        assert!(AppSettings::load_from(None, lookup(&[(MIN_BET_ENV, "500")])).is_err());
        assert!(AppSettings::load_from(None, lookup(&[(SPLIT_POLICY_ENV, "pairs")])).is_err());
        assert!(AppSettings::load_from(None, lookup(&[(PASSWORD_COST_ENV, "3")])).is_err());
        assert_eq!(
            AppSettings::load_from(None, lookup(&[(PASSWORD_COST_ENV, "5")]))
                .unwrap()
                .password_cost,
            5
        );
        assert!(matches!(
            AppSettings::load_from(Some(Path::new("missing/web.toml")), lookup(&[])),
            Err(SettingsError::Io { .. })
        ));
    }

    #[test]
    fn database_path_from_environment() {
        let settings =
            AppSettings::load_from(None, lookup(&[(DATABASE_ENV, "data/hitstand.db")])).unwrap();
        assert_eq!(settings.database, Some(PathBuf::from("data/hitstand.db")));
    }
}
