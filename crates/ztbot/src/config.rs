//! Bot configuration loaded from a TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Everything the bot needs at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Telegram bot API token.
    pub bot_token: String,
    /// Long-poll timeout for `getUpdates`, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// ZeroTier Central API token.
    pub zt_token: String,
    /// The 16-hex-digit network this bot administers.
    pub zt_network: String,
    /// The one immutable admin. Fixed for the lifetime of the process.
    pub admin_id: i64,
    /// Path to the JSON role file. Must exist at startup.
    pub roles_file: PathBuf,
}

fn default_poll_timeout() -> u64 {
    30
}

/// Load and parse the config file at `path`.
pub fn load(path: &Path) -> Result<BotConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// A fillable sample config, printed when no config file is given.
pub fn sample() -> String {
    let sample = BotConfig {
        poll_timeout_secs: default_poll_timeout(),
        roles_file: PathBuf::from("roles.json"),
        ..Default::default()
    };
    toml::to_string_pretty(&sample).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_parses_a_full_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ztbot.toml");
        fs::write(
            &path,
            r#"
            bot_token = "123:abc"
            zt_token = "zt-secret"
            zt_network = "8056c2e21c000001"
            admin_id = 42
            roles_file = "/var/lib/ztbot/roles.json"
            "#,
        )
        .unwrap();

        let cfg = load(&path).unwrap();
        assert_eq!(cfg.bot_token, "123:abc");
        assert_eq!(cfg.zt_network, "8056c2e21c000001");
        assert_eq!(cfg.admin_id, 42);
        assert_eq!(cfg.poll_timeout_secs, 30, "default applies when omitted");
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ztbot.toml");
        fs::write(&path, "admin_id = \"not a number\"").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn sample_round_trips() {
        let cfg: BotConfig = toml::from_str(&sample()).unwrap();
        assert_eq!(cfg.poll_timeout_secs, 30);
    }
}
