use crate::analytics::{AnomalyDetector, SeverityThresholds, DEFAULT_THRESHOLD};
use crate::error::{Error, Result};
use crate::explain::{ExplainerConfig, DEFAULT_SUBJECT};
use crate::llm::{ProviderConfig, ProviderKind};
use crate::logging::{LogConfig, LogRotation};
use crate::service::DEFAULT_EXPLAIN_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// 設定ファイルの探索順
const CONFIG_PATHS: [&str; 3] = [
    "finops-anomaly.toml",
    "config.toml",
    "config/finops-anomaly.toml",
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub explainer: ExplainerSettings,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionConfig {
    /// 最小 |z|
    pub threshold: f64,
    pub critical: f64,
    pub warning: f64,
    pub info: f64,
    /// 1回の実行で説明する最大件数
    pub explain_limit: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExplainerSettings {
    pub attempt_timeout_secs: u64,
    pub subject: String,
}

/// Providers in priority order: OpenAI first, then Anthropic.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub anthropic: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// ログレベル (trace, debug, info, warn, error)
    pub level: String,
    pub log_dir: Option<PathBuf>,
    pub console: bool,
    pub file: bool,
    /// daily, hourly, never
    pub rotation: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        let severity = SeverityThresholds::default();
        Self {
            threshold: DEFAULT_THRESHOLD,
            critical: severity.critical,
            warning: severity.warning,
            info: severity.info,
            explain_limit: DEFAULT_EXPLAIN_LIMIT,
        }
    }
}

impl Default for ExplainerSettings {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: 30,
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: ProviderConfig::new(ProviderKind::OpenAI, None),
            anthropic: ProviderConfig::new(ProviderKind::Anthropic, None),
        }
    }
}

impl ProvidersConfig {
    /// 優先順位順のプロバイダー設定
    pub fn ordered(&self) -> Vec<ProviderConfig> {
        vec![self.openai.clone(), self.anthropic.clone()]
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            console: true,
            file: false,
            rotation: "daily".to_string(),
        }
    }
}

impl DetectionConfig {
    pub fn severity_thresholds(&self) -> SeverityThresholds {
        SeverityThresholds {
            critical: self.critical,
            warning: self.warning,
            info: self.info,
        }
    }
}

impl AppConfig {
    /// 設定ファイルから読み込み、環境変数で上書き
    ///
    /// Layers: built-in defaults, then `path` (or the first existing file of
    /// the search list), then `FINOPS_*` variables (`__` separates sections),
    /// then `OPENAI_*` / `ANTHROPIC_*` provider variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        settings = settings.add_source(config::Config::try_from(&AppConfig::default())?);

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "設定ファイルが見つかりません: {}",
                        path.display()
                    )));
                }
                info!("📁 設定ファイルを読み込み: {}", path.display());
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                if let Some(found) = CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
                    info!("📁 設定ファイルを読み込み: {}", found);
                    settings = settings.add_source(config::File::with_name(found));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("FINOPS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: AppConfig = settings.build()?.try_deserialize()?;
        config.providers.openai.apply_env_overrides();
        config.providers.anthropic.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// 設定を検証
    pub fn validate(&self) -> Result<()> {
        let detection = &self.detection;
        if !detection.threshold.is_finite() || detection.threshold <= 0.0 {
            return Err(Error::Config(format!(
                "detection.threshold must be a positive number, got {}",
                detection.threshold
            )));
        }

        if !detection.severity_thresholds().is_ordered() {
            return Err(Error::Config(
                "severity breakpoints must satisfy critical >= warning >= info > 0".to_string(),
            ));
        }

        if self.explainer.attempt_timeout_secs == 0 {
            return Err(Error::Config(
                "explainer.attempt_timeout_secs must be greater than 0".to_string(),
            ));
        }

        for provider in self.providers.ordered() {
            provider.validate()?;
        }

        if parse_rotation(&self.logging.rotation).is_none() {
            return Err(Error::Config(format!(
                "logging.rotation must be daily, hourly or never, got {}",
                self.logging.rotation
            )));
        }

        Ok(())
    }

    /// 検知器を構築
    pub fn detector(&self) -> AnomalyDetector {
        AnomalyDetector::new(self.detection.threshold)
            .with_thresholds(self.detection.severity_thresholds())
    }

    /// 説明器の設定を構築
    pub fn explainer_config(&self) -> ExplainerConfig {
        ExplainerConfig {
            attempt_timeout: Duration::from_secs(self.explainer.attempt_timeout_secs),
            subject: self.explainer.subject.clone(),
        }
    }

    /// ログ設定を構築
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig::default()
            .with_level(self.logging.level.clone())
            .with_console(self.logging.console)
            .with_file(self.logging.file)
            .with_rotation(parse_rotation(&self.logging.rotation).unwrap_or(LogRotation::Daily));

        if let Some(ref dir) = self.logging.log_dir {
            config = config.with_log_dir(dir.clone());
        }

        config
    }

    /// サンプル設定ファイルを生成
    pub fn generate_sample_config(path: &Path) -> Result<()> {
        let toml_content = toml::to_string_pretty(&AppConfig::default())?;

        let sample_content = format!(
            r#"# finops-anomaly configuration
#
# 環境変数での上書きも可能です (例: FINOPS_DETECTION__THRESHOLD=2.0)
# API keys are read from OPENAI_API_KEY / ANTHROPIC_API_KEY, or from
# `api_key` under [providers.openai] / [providers.anthropic].
# A provider without a key is skipped.

{}
# [detection]
# threshold = minimum |z-score| reported as an anomaly
# critical / warning / info = severity breakpoints on |z-score|
# explain_limit = how many of the most severe anomalies get an explanation
"#,
            toml_content
        );

        std::fs::write(path, sample_content)?;
        info!("📝 サンプル設定ファイルを生成しました: {}", path.display());
        Ok(())
    }
}

fn parse_rotation(value: &str) -> Option<LogRotation> {
    match value.to_ascii_lowercase().as_str() {
        "daily" => Some(LogRotation::Daily),
        "hourly" => Some(LogRotation::Hourly),
        "never" => Some(LogRotation::Never),
        _ => None,
    }
}
