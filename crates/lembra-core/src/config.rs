use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{LembraError, Result};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;
/// Env var the bot token has always been read from; used when the config leaves it empty.
pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";

/// Top-level config (lembra.toml + LEMBRA_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LembraConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Telegram users allowed to talk to the bot: `"*"`, `"@username"` or a numeric id.
    #[serde(default = "default_allow_users")]
    pub allow_users: Vec<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            allow_users: default_allow_users(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Reminder polling loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between two due-reminder scans.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Upper bound for a single notification send; a timeout counts as a failed send.
    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            notify_timeout_secs: DEFAULT_NOTIFY_TIMEOUT_SECS,
        }
    }
}

fn default_allow_users() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
fn default_notify_timeout() -> u64 {
    DEFAULT_NOTIFY_TIMEOUT_SECS
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.lembra/lembra.db", home)
}

impl LembraConfig {
    /// Load config from a TOML file with LEMBRA_* env var overrides.
    ///
    /// Nested keys use a double underscore, e.g. `LEMBRA_SCHEDULER__POLL_INTERVAL_SECS=5`.
    /// A missing file is not an error: every section has defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: LembraConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("LEMBRA_").split("__"))
            .extract()
            .map_err(|e| LembraError::Config(e.to_string()))?;

        Ok(config)
    }

    /// The configured bot token, falling back to `$BOT_TOKEN`.
    pub fn bot_token(&self) -> Result<String> {
        let token = self.telegram.bot_token.trim();
        if !token.is_empty() {
            return Ok(token.to_string());
        }
        match std::env::var(BOT_TOKEN_ENV) {
            Ok(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
            _ => Err(LembraError::Config(format!(
                "no bot token configured: set telegram.bot_token or {BOT_TOKEN_ENV}"
            ))),
        }
    }

    /// Create the directory that will hold the database file.
    pub fn ensure_database_dir(&self) -> Result<()> {
        match std::path::Path::new(&self.database.path).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.lembra/lembra.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = LembraConfig::load(Some("does-not-exist.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.scheduler.poll_interval_secs, 30);
            assert_eq!(config.scheduler.notify_timeout_secs, 10);
            assert_eq!(config.telegram.allow_users, vec!["*".to_string()]);
            assert!(config.database.path.ends_with(".lembra/lembra.db"));
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_read() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "lembra.toml",
                r#"
                [telegram]
                bot_token = "123:abc"
                allow_users = ["@alice"]

                [database]
                path = "/tmp/x.db"

                [scheduler]
                poll_interval_secs = 15
                "#,
            )?;
            let config = LembraConfig::load(Some("lembra.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.telegram.bot_token, "123:abc");
            assert_eq!(config.telegram.allow_users, vec!["@alice".to_string()]);
            assert_eq!(config.database.path, "/tmp/x.db");
            assert_eq!(config.scheduler.poll_interval_secs, 15);
            assert_eq!(config.scheduler.notify_timeout_secs, 10);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_nested_keys() {
        Jail::expect_with(|jail| {
            jail.create_file("lembra.toml", "[scheduler]\npoll_interval_secs = 15\n")?;
            jail.set_env("LEMBRA_SCHEDULER__POLL_INTERVAL_SECS", "5");
            jail.set_env("LEMBRA_TELEGRAM__BOT_TOKEN", "from-env");
            let config = LembraConfig::load(Some("lembra.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.scheduler.poll_interval_secs, 5);
            assert_eq!(config.telegram.bot_token, "from-env");
            Ok(())
        });
    }

    #[test]
    fn bot_token_falls_back_to_legacy_env() {
        Jail::expect_with(|jail| {
            jail.set_env(BOT_TOKEN_ENV, "legacy-token");
            let config = LembraConfig::default();
            assert_eq!(config.bot_token().map_err(|e| e.to_string())?, "legacy-token");
            Ok(())
        });
    }

    #[test]
    fn database_dir_is_created() {
        Jail::expect_with(|jail| {
            let mut config = LembraConfig::default();
            let path = jail.directory().join("nested/dir/lembra.db");
            config.database.path = path.to_string_lossy().to_string();
            config.ensure_database_dir().map_err(|e| e.to_string())?;
            assert!(jail.directory().join("nested/dir").is_dir());
            Ok(())
        });
    }

    #[test]
    fn configured_token_wins_over_env() {
        Jail::expect_with(|jail| {
            jail.set_env(BOT_TOKEN_ENV, "legacy-token");
            let mut config = LembraConfig::default();
            config.telegram.bot_token = " 42:xyz ".to_string();
            assert_eq!(config.bot_token().map_err(|e| e.to_string())?, "42:xyz");
            Ok(())
        });
    }
}
