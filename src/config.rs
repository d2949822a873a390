use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Outgoing mail settings. Notifications are disabled without them.
  pub mail: Option<MailConfig>,
  #[serde(default)]
  pub sync: SyncConfig,
  /// Database path (defaults to $XDG_DATA_HOME/staffwatch/staffwatch.db)
  pub database: Option<PathBuf>,
  /// Also write logs to daily-rolling files at this path
  pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  pub base_url: String,
  pub token_url: String,
  pub client_id: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
  pub smtp_server: String,
  #[serde(default = "default_smtp_port")]
  pub smtp_port: u16,
  pub smtp_user: String,
  pub from_email: String,
  #[serde(default = "default_from_name")]
  pub from_name: String,
  /// Transport encryption: auto, wrapper, starttls or none
  #[serde(default)]
  pub tls: SmtpTls,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
  /// Auto-detect based on port: 465 = wrapper, anything else = starttls
  #[default]
  Auto,
  /// TLS from the first byte (SMTPS, usually port 465)
  Wrapper,
  /// Plain-text greeting upgraded with STARTTLS (submission, usually port 587)
  Starttls,
  /// No encryption. Only for local relays.
  None,
}

impl MailConfig {
  /// Encryption mode to use, with `auto` resolved against the port.
  pub fn tls_mode(&self) -> SmtpTls {
    match self.tls {
      SmtpTls::Auto if self.smtp_port == 465 => SmtpTls::Wrapper,
      SmtpTls::Auto => SmtpTls::Starttls,
      explicit => explicit,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
  /// Seconds between synchronization cycles in watch mode
  #[serde(default = "default_interval_secs")]
  pub interval_secs: u64,
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      interval_secs: default_interval_secs(),
    }
  }
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_smtp_port() -> u16 {
  587
}

fn default_from_name() -> String {
  "Staffwatch".to_string()
}

fn default_interval_secs() -> u64 {
  900
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./staffwatch.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/staffwatch/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/staffwatch/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("staffwatch.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("staffwatch").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Get the API client secret from the environment.
  ///
  /// Checks STAFFWATCH_CLIENT_SECRET.
  pub fn get_client_secret() -> Result<String> {
    std::env::var("STAFFWATCH_CLIENT_SECRET").map_err(|_| {
      eyre!("API client secret not found. Set STAFFWATCH_CLIENT_SECRET environment variable.")
    })
  }

  /// Get the SMTP password from the environment.
  ///
  /// Checks STAFFWATCH_SMTP_PASSWORD.
  pub fn get_smtp_password() -> Result<String> {
    std::env::var("STAFFWATCH_SMTP_PASSWORD").map_err(|_| {
      eyre!("SMTP password not found. Set STAFFWATCH_SMTP_PASSWORD environment variable.")
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = Config::parse(
      r#"
api:
  base_url: https://staffing.example.com/api
  token_url: https://auth.example.com/oauth/token
  client_id: staffwatch
"#,
    )
    .unwrap();

    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.sync.interval_secs, 900);
    assert!(config.mail.is_none());
    assert!(config.database.is_none());
    assert!(config.log_file.is_none());
  }

  #[test]
  fn test_full_config() {
    let config = Config::parse(
      r#"
api:
  base_url: https://staffing.example.com/api
  token_url: https://auth.example.com/oauth/token
  client_id: staffwatch
  timeout_secs: 5
mail:
  smtp_server: smtp.example.com
  smtp_user: bot
  from_email: bot@example.com
sync:
  interval_secs: 60
database: /tmp/staffwatch.db
"#,
    )
    .unwrap();

    let mail = config.mail.unwrap();
    assert_eq!(mail.smtp_port, 587);
    assert_eq!(mail.from_name, "Staffwatch");
    assert_eq!(mail.tls, SmtpTls::Auto);
    assert_eq!(mail.tls_mode(), SmtpTls::Starttls);
    assert_eq!(config.sync.interval_secs, 60);
    assert_eq!(config.database, Some(PathBuf::from("/tmp/staffwatch.db")));
  }

  #[test]
  fn test_missing_api_section_is_error() {
    assert!(Config::parse("sync:\n  interval_secs: 10\n").is_err());
  }

  #[test]
  fn test_explicit_missing_file_is_error() {
    assert!(Config::load(Some(Path::new("/nonexistent/staffwatch.yaml"))).is_err());
  }

  fn mail(port: u16, tls: SmtpTls) -> MailConfig {
    MailConfig {
      smtp_server: "smtp.example.com".to_string(),
      smtp_port: port,
      smtp_user: "bot".to_string(),
      from_email: "bot@example.com".to_string(),
      from_name: default_from_name(),
      tls,
    }
  }

  #[test]
  fn test_auto_tls_follows_port() {
    assert_eq!(mail(465, SmtpTls::Auto).tls_mode(), SmtpTls::Wrapper);
    assert_eq!(mail(587, SmtpTls::Auto).tls_mode(), SmtpTls::Starttls);
    assert_eq!(mail(25, SmtpTls::Auto).tls_mode(), SmtpTls::Starttls);
  }

  #[test]
  fn test_explicit_tls_wins() {
    assert_eq!(mail(587, SmtpTls::Wrapper).tls_mode(), SmtpTls::Wrapper);
    assert_eq!(mail(465, SmtpTls::Starttls).tls_mode(), SmtpTls::Starttls);
    assert_eq!(mail(2525, SmtpTls::None).tls_mode(), SmtpTls::None);
  }

  #[test]
  fn test_tls_parses_lowercase() {
    let config = Config::parse(
      r#"
api:
  base_url: https://staffing.example.com/api
  token_url: https://auth.example.com/oauth/token
  client_id: staffwatch
mail:
  smtp_server: localhost
  smtp_port: 2525
  smtp_user: bot
  from_email: bot@example.com
  tls: none
"#,
    )
    .unwrap();

    assert_eq!(config.mail.unwrap().tls_mode(), SmtpTls::None);
  }
}
