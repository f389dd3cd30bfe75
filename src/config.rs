use crate::error::AppError;
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SERVICE_NAME: &str = "cost-analyzer";

/// Topic value shipped in the default config. Publishing is skipped until it is replaced.
pub const TOPIC_ARN_PLACEHOLDER: &str = "YOUR_SNS_TOPIC_ARN_HERE";

const ENV_PREFIX: &str = "COST_ANALYZER";

fn app_home_dir() -> Result<PathBuf, AppError> {
    if let Ok(custom) = std::env::var("COST_ANALYZER_HOME") {
        return Ok(PathBuf::from(custom));
    }

    if let Some(dirs) = ProjectDirs::from("com", "cost-analyzer", SERVICE_NAME) {
        let candidate = dirs.config_dir().to_path_buf();
        if fs::create_dir_all(&candidate).is_ok() {
            return Ok(candidate);
        }
    }

    let cwd = std::env::current_dir()?;
    Ok(cwd.join(".cost-analyzer"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub default_region: String,
    pub server: ServerSettings,
    pub currency: CurrencySettings,
    pub alerts: AlertSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    /// Used where only ASCII / WinAnsi text is accepted (PDF core fonts, SNS subjects).
    pub ascii_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencySettings {
    /// Units of secondary currency per unit of primary currency.
    pub exchange_rate: Decimal,
    pub primary: Currency,
    pub secondary: Currency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// Expressed in the secondary currency.
    pub threshold: Decimal,
    pub topic_arn: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_region: "us-east-1".into(),
            server: ServerSettings::default(),
            currency: CurrencySettings::default(),
            alerts: AlertSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            request_timeout_secs: 60,
        }
    }
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            exchange_rate: Decimal::new(8300, 2),
            primary: Currency {
                code: "USD".into(),
                symbol: "$".into(),
                ascii_symbol: "$".into(),
            },
            secondary: Currency {
                code: "INR".into(),
                symbol: "\u{20b9}".into(),
                ascii_symbol: "Rs.".into(),
            },
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            threshold: Decimal::new(50000, 2),
            topic_arn: TOPIC_ARN_PLACEHOLDER.into(),
        }
    }
}

impl AlertSettings {
    pub fn topic_configured(&self) -> bool {
        let topic = self.topic_arn.trim();
        !topic.is_empty() && !topic.contains(TOPIC_ARN_PLACEHOLDER)
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.currency.exchange_rate <= Decimal::ZERO {
            return Err(AppError::Config(
                "currency.exchange_rate must be greater than zero".into(),
            ));
        }
        if self.alerts.threshold < Decimal::ZERO {
            return Err(AppError::Config(
                "alerts.threshold must not be negative".into(),
            ));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "server.request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    Ok(app_home_dir()?.join("config.toml"))
}

/// Layers `COST_ANALYZER_*` environment variables (`__` between sections) over the file.
pub fn load_config_from(path: &Path) -> Result<AppConfig, AppError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let parsed: AppConfig = settings.try_deserialize()?;
    parsed.validate()?;
    Ok(parsed)
}

pub fn load_config() -> Result<AppConfig, AppError> {
    load_config_from(&config_path()?)
}

pub fn save_config(config: &AppConfig) -> Result<(), AppError> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = toml::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}

pub fn ensure_initialized() -> Result<PathBuf, AppError> {
    let cfg_path = config_path()?;
    if !cfg_path.exists() {
        save_config(&AppConfig::default())?;
    }
    Ok(cfg_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_shipped_rates() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.currency.exchange_rate, dec!(83.00));
        assert_eq!(cfg.alerts.threshold, dec!(500.00));
        assert_eq!(cfg.alerts.topic_arn, TOPIC_ARN_PLACEHOLDER);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn placeholder_topic_is_not_configured() {
        let mut alerts = AlertSettings::default();
        assert!(!alerts.topic_configured());

        alerts.topic_arn = "   ".into();
        assert!(!alerts.topic_configured());

        alerts.topic_arn = "arn:aws:sns:us-east-1:123456789012:cost-alerts".into();
        assert!(alerts.topic_configured());
    }

    #[test]
    fn validate_rejects_non_positive_rate() {
        let mut cfg = AppConfig::default();
        cfg.currency.exchange_rate = Decimal::ZERO;
        let err = cfg.validate().expect_err("expected validation error");
        assert!(err.to_string().contains("exchange_rate"));
    }

    #[test]
    fn load_config_from_missing_file_uses_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let cfg = load_config_from(&dir.path().join("absent.toml")).expect("load defaults");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.default_region, "us-east-1");
    }

    #[test]
    fn load_config_from_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [alerts]
            threshold = "750.00"
            topic_arn = "arn:aws:sns:ap-south-1:123456789012:billing"
            "#,
        )
        .expect("write config");

        let cfg = load_config_from(&path).expect("load config");
        assert_eq!(cfg.alerts.threshold, dec!(750.00));
        assert!(cfg.alerts.topic_configured());
        assert_eq!(cfg.currency.exchange_rate, dec!(83.00));
    }

    #[test]
    fn saved_default_config_round_trips() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        let raw = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        fs::write(&path, raw).expect("write config");

        let cfg = load_config_from(&path).expect("load config");
        assert_eq!(cfg.currency.secondary.code, "INR");
        assert_eq!(cfg.currency.secondary.ascii_symbol, "Rs.");
        assert_eq!(cfg.alerts.threshold, dec!(500.00));
    }
}
