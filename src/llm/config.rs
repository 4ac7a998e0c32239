//! LLMプロバイダーの設定

use crate::llm::error::{LlmError, LlmResult};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-haiku-20240307";

/// LLMプロバイダー種別
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI (chat completions)
    OpenAI,
    /// Anthropic (messages)
    Anthropic,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => DEFAULT_OPENAI_BASE_URL,
            ProviderKind::Anthropic => DEFAULT_ANTHROPIC_BASE_URL,
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => DEFAULT_OPENAI_MODEL,
            ProviderKind::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        }
    }

    fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    fn model_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_MODEL",
            ProviderKind::Anthropic => "ANTHROPIC_MODEL",
        }
    }
}

/// プロバイダー設定
///
/// A missing `api_key` means the provider is disabled; it is skipped
/// without any network call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// プロバイダー
    pub kind: ProviderKind,
    /// APIキー（セキュア）
    #[serde(skip_serializing, default)]
    pub api_key: Option<SecretString>,
    /// モデル名
    pub model: String,
    /// APIベースURL
    pub base_url: String,
    /// リクエストタイムアウト（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 温度パラメータ
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// 最大出力トークン数
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_timeout() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    200
}

impl ProviderConfig {
    /// 種別ごとの既定値で設定を作成
    pub fn new(kind: ProviderKind, api_key: Option<String>) -> Self {
        Self {
            kind,
            api_key: api_key
                .filter(|key| !key.trim().is_empty())
                .map(|key| SecretString::new(key.into_boxed_str())),
            model: kind.default_model().to_string(),
            base_url: kind.default_base_url().to_string(),
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }

    /// OpenAI設定を作成
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new(ProviderKind::OpenAI, Some(api_key.into()))
    }

    /// Anthropic設定を作成
    pub fn anthropic(api_key: impl Into<String>) -> Self {
        Self::new(ProviderKind::Anthropic, Some(api_key.into()))
    }

    /// 環境変数の値で上書き
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(self.kind.api_key_env()) {
            if !key.trim().is_empty() {
                self.api_key = Some(SecretString::new(key.into_boxed_str()));
            }
        }
        if let Ok(model) = std::env::var(self.kind.model_env()) {
            self.model = model;
        }
    }

    /// ベースURLを設定
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 認証情報が設定済みか
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// タイムアウトを取得
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// APIキーを取得（露出）
    pub fn get_api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret())
    }

    /// 設定を検証
    pub fn validate(&self) -> LlmResult<()> {
        if self.model.trim().is_empty() {
            return Err(LlmError::ConfigError(format!(
                "{} model must not be empty",
                self.kind.name()
            )));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(LlmError::ConfigError(format!(
                "{} base_url must be an http(s) URL: {}",
                self.kind.name(),
                self.base_url
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(LlmError::ConfigError(
                "Temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(LlmError::ConfigError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(LlmError::ConfigError(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
