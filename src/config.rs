//! User configuration loading from `~/.review-assistant/config.toml`.

use crate::api::contact::{ContactSettings, EMAILJS_SEND_URL};
use crate::app::state::theme::ThemePreference;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const CONFIG_DIR: &str = ".review-assistant";
const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.toml";
const LOG_FILE: &str = "review-assistant.log";

const TERMINAL_QUERY_TIMEOUT: Duration = Duration::from_millis(100);

const DEFAULT_CONFIG_TOML: &str = r##"# review-assistant configuration
# Durations accept humantime syntax (e.g. "750ms", "1s", "2m").

[api]
base_url = "http://localhost:8080"
request_timeout = "60s"

[appearance]
# light | dark | system
default_theme = "light"

[review]
feedback_focus_delay = "1s"
notification_duration = "4s"

[contact]
# EmailJS credentials for the contact form. Leave empty to disable sending.
service_id = ""
template_id = ""
public_key = ""
"##;

/// Initial theme used when the session has no stored preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeSetting {
    #[default]
    Light,
    Dark,
    System,
}

impl ThemeSetting {
    /// Resolves `system` by asking the desktop, then the terminal background.
    pub fn resolve(self) -> ThemePreference {
        match self {
            Self::Light => ThemePreference::Light,
            Self::Dark => ThemePreference::Dark,
            Self::System => detect_system_preference(),
        }
    }
}

impl FromStr for ThemeSetting {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" | "auto" => Ok(Self::System),
            other => Err(anyhow!(
                "unsupported theme `{other}` (expected light, dark, or system)"
            )),
        }
    }
}

/// Application configuration loaded from disk.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub default_theme: ThemeSetting,
    pub feedback_focus_delay: Duration,
    pub notification_duration: Duration,
    /// `None` when the contact form has no email credentials.
    pub contact: Option<ContactSettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_owned(),
            request_timeout: Duration::from_secs(60),
            default_theme: ThemeSetting::Light,
            feedback_focus_delay: Duration::from_secs(1),
            notification_duration: Duration::from_secs(4),
            contact: None,
        }
    }
}

/// Returns the config file path and creates default config if missing.
pub fn ensure_config_file() -> Result<PathBuf> {
    let path = config_dir()?.join(CONFIG_FILE);
    ensure_default_config(&path)?;
    Ok(path)
}

/// Loads configuration from `~/.review-assistant/config.toml`, creating defaults if missing.
pub fn load_or_create() -> Result<AppConfig> {
    let path = ensure_config_file()?;
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;

    parse_config(&content).with_context(|| format!("invalid config in {}", path.display()))
}

/// Path of the persisted session (token, user id, name, theme).
pub fn session_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(SESSION_FILE))
}

/// Path of the log file written while the TUI owns the terminal.
pub fn log_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(LOG_FILE))
}

fn config_dir() -> Result<PathBuf> {
    let home =
        env::var_os("HOME").ok_or_else(|| anyhow!("HOME environment variable is not set"))?;
    Ok(PathBuf::from(home).join(CONFIG_DIR))
}

fn ensure_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    let dir = path
        .parent()
        .ok_or_else(|| anyhow!("invalid config path: {}", path.display()))?;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    fs::write(path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("failed to write default config file {}", path.display()))?;
    Ok(())
}

fn parse_config(content: &str) -> Result<AppConfig> {
    let raw: RawConfig = toml::from_str(content).context("failed to parse TOML")?;
    let defaults = AppConfig::default();

    let api_base_url = match raw.api.base_url {
        Some(url) if !url.trim().is_empty() => url.trim().to_owned(),
        Some(_) => return Err(anyhow!("`api.base_url` must not be empty")),
        None => defaults.api_base_url,
    };

    let default_theme = match raw.appearance.default_theme {
        Some(value) => value
            .parse()
            .context("invalid value for `appearance.default_theme`")?,
        None => defaults.default_theme,
    };

    Ok(AppConfig {
        api_base_url,
        request_timeout: parse_duration_or_default(
            raw.api.request_timeout,
            defaults.request_timeout,
            "api.request_timeout",
        )?,
        default_theme,
        feedback_focus_delay: parse_duration_or_default(
            raw.review.feedback_focus_delay,
            defaults.feedback_focus_delay,
            "review.feedback_focus_delay",
        )?,
        notification_duration: parse_duration_or_default(
            raw.review.notification_duration,
            defaults.notification_duration,
            "review.notification_duration",
        )?,
        contact: parse_contact(raw.contact)?,
    })
}

fn parse_contact(raw: RawContact) -> Result<Option<ContactSettings>> {
    let field = |value: Option<String>| value.map(|v| v.trim().to_owned()).unwrap_or_default();
    let service_id = field(raw.service_id);
    let template_id = field(raw.template_id);
    let public_key = field(raw.public_key);

    let present = [&service_id, &template_id, &public_key]
        .iter()
        .filter(|value| !value.is_empty())
        .count();
    match present {
        0 => return Ok(None),
        3 => {}
        _ => {
            return Err(anyhow!(
                "`contact` needs service_id, template_id and public_key together"
            ));
        }
    }

    let endpoint = match raw.endpoint {
        Some(url) if !url.trim().is_empty() => url.trim().to_owned(),
        Some(_) => return Err(anyhow!("`contact.endpoint` must not be empty")),
        None => EMAILJS_SEND_URL.to_owned(),
    };

    Ok(Some(ContactSettings {
        endpoint,
        service_id,
        template_id,
        public_key,
    }))
}

fn parse_duration_or_default(
    value: Option<String>,
    default: Duration,
    field: &str,
) -> Result<Duration> {
    match value {
        Some(raw) => humantime::parse_duration(raw.trim())
            .with_context(|| format!("invalid duration for `{field}`: {raw}")),
        None => Ok(default),
    }
}

fn detect_system_preference() -> ThemePreference {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => return ThemePreference::Dark,
        Ok(dark_light::Mode::Light) => return ThemePreference::Light,
        Ok(dark_light::Mode::Unspecified) => {}
        Err(error) => tracing::debug!(%error, "desktop theme detection failed"),
    }

    match termbg::theme(TERMINAL_QUERY_TIMEOUT) {
        Ok(termbg::Theme::Dark) => ThemePreference::Dark,
        Ok(termbg::Theme::Light) => ThemePreference::Light,
        Err(error) => {
            tracing::debug!(?error, "terminal background detection failed");
            ThemePreference::Light
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    api: RawApi,
    appearance: RawAppearance,
    review: RawReview,
    contact: RawContact,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApi {
    base_url: Option<String>,
    request_timeout: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAppearance {
    default_theme: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawReview {
    feedback_focus_delay: Option<String>,
    notification_duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContact {
    endpoint: Option<String>,
    service_id: Option<String>,
    template_id: Option<String>,
    public_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_CONFIG_TOML, ThemeSetting, parse_config};
    use crate::api::contact::EMAILJS_SEND_URL;
    use std::time::Duration;

    #[test]
    fn default_config_parses_to_defaults() {
        let config = parse_config(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.default_theme, ThemeSetting::Light);
        assert_eq!(config.feedback_focus_delay, Duration::from_secs(1));
        assert_eq!(config.notification_duration, Duration::from_secs(4));
        assert_eq!(config.contact, None);
    }

    #[test]
    fn contact_credentials_enable_sending() {
        let config = parse_config(
            "[contact]\nservice_id = \"svc\"\ntemplate_id = \"tpl\"\npublic_key = \"pk\"\n",
        )
        .unwrap();
        let contact = config.contact.unwrap();
        assert_eq!(contact.endpoint, EMAILJS_SEND_URL);
        assert_eq!(contact.service_id, "svc");
        assert_eq!(contact.public_key, "pk");
    }

    #[test]
    fn partial_contact_credentials_are_rejected() {
        assert!(parse_config("[contact]\nservice_id = \"svc\"\n").is_err());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = parse_config("[appearance]\ndefault_theme = \"dark\"\n").unwrap();
        assert_eq!(config.default_theme, ThemeSetting::Dark);
        assert_eq!(config.feedback_focus_delay, Duration::from_secs(1));
    }

    #[test]
    fn durations_use_humantime_syntax() {
        let config = parse_config("[review]\nfeedback_focus_delay = \"750ms\"\n").unwrap();
        assert_eq!(config.feedback_focus_delay, Duration::from_millis(750));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(parse_config("[review]\nnotification_duration = \"soon\"\n").is_err());
        assert!(parse_config("[appearance]\ndefault_theme = \"sepia\"\n").is_err());
        assert!(parse_config("[api]\nbase_url = \"  \"\n").is_err());
    }

    #[test]
    fn theme_setting_accepts_auto_alias() {
        assert_eq!("Auto".parse::<ThemeSetting>().unwrap(), ThemeSetting::System);
    }
}
