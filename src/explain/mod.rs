//! Anomaly Explanation
//!
//! 異常の説明文生成。外部LLMを優先順に試し、すべて失敗した場合は
//! ルールベースの説明にフォールバックする。

mod fallback;
mod prompt;

pub use fallback::RuleBasedExplainer;
pub use prompt::{build_prompt, build_request, SYSTEM_PROMPT};

use crate::analytics::Anomaly;
use crate::llm::{
    create_providers, LlmError, LlmProvider, LlmRequest, LlmResult, ProviderConfig, ProviderKind,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_SUBJECT: &str = "AWS costs";

/// 説明文の生成元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationSource {
    OpenAI,
    Anthropic,
    Fallback,
}

impl ExplanationSource {
    /// 画面表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            ExplanationSource::OpenAI => "OpenAI",
            ExplanationSource::Anthropic => "Claude",
            ExplanationSource::Fallback => "Rule-based analysis",
        }
    }
}

impl From<ProviderKind> for ExplanationSource {
    fn from(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::OpenAI => ExplanationSource::OpenAI,
            ProviderKind::Anthropic => ExplanationSource::Anthropic,
        }
    }
}

impl fmt::Display for ExplanationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 説明文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub text: String,
    pub source: ExplanationSource,
}

/// 説明器の設定
#[derive(Debug, Clone)]
pub struct ExplainerConfig {
    /// バックエンド1回あたりのタイムアウト
    pub attempt_timeout: Duration,
    /// 説明対象の呼称（例: "AWS costs"）
    pub subject: String,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(30),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

/// 異常説明器
///
/// Backends are tried in order, one at a time. The first non-empty answer
/// wins; if none answers, the rule-based explainer produces the text.
/// `explain` therefore always returns an [`Explanation`].
pub struct Explainer {
    backends: Vec<Arc<dyn LlmProvider>>,
    fallback: RuleBasedExplainer,
    config: ExplainerConfig,
}

impl Explainer {
    /// 指定したバックエンド列で説明器を作成
    pub fn new(backends: Vec<Arc<dyn LlmProvider>>, config: ExplainerConfig) -> Self {
        let fallback = RuleBasedExplainer::new(config.subject.clone());
        Self {
            backends,
            fallback,
            config,
        }
    }

    /// バックエンドなし（常にルールベース）
    pub fn offline() -> Self {
        Self::new(Vec::new(), ExplainerConfig::default())
    }

    /// プロバイダー設定の順序どおりに説明器を構築
    pub fn from_provider_configs(
        configs: &[ProviderConfig],
        config: ExplainerConfig,
    ) -> LlmResult<Self> {
        Ok(Self::new(create_providers(configs)?, config))
    }

    pub fn backends(&self) -> &[Arc<dyn LlmProvider>] {
        &self.backends
    }

    pub fn config(&self) -> &ExplainerConfig {
        &self.config
    }

    /// 異常を説明（失敗しない）
    pub async fn explain(&self, anomaly: &Anomaly) -> Explanation {
        let request = build_request(anomaly, &self.config.subject);

        for backend in &self.backends {
            if !backend.is_available() {
                debug!(provider = backend.name(), "skipping backend without credentials");
                continue;
            }

            match self.attempt(backend.as_ref(), &request).await {
                Ok(text) => {
                    debug!(provider = backend.name(), date = %anomaly.date, "explanation generated");
                    return Explanation {
                        text,
                        source: backend.kind().into(),
                    };
                }
                Err(e) => {
                    warn!(
                        provider = backend.name(),
                        date = %anomaly.date,
                        error = %e,
                        "explanation backend failed, trying next"
                    );
                }
            }
        }

        info!(date = %anomaly.date, "using rule-based explanation");
        Explanation {
            text: self.fallback.explain(anomaly),
            source: ExplanationSource::Fallback,
        }
    }

    /// 複数の異常を並行して説明（入力順を保持）
    pub async fn explain_all(&self, anomalies: &[Anomaly]) -> Vec<Explanation> {
        join_all(anomalies.iter().map(|anomaly| self.explain(anomaly))).await
    }

    async fn attempt(&self, backend: &dyn LlmProvider, request: &LlmRequest) -> LlmResult<String> {
        let text = tokio::time::timeout(self.config.attempt_timeout, backend.complete(request))
            .await
            .map_err(|_| LlmError::Timeout(self.config.attempt_timeout))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse(backend.name().to_string()));
        }

        Ok(text.to_string())
    }
}

impl Default for Explainer {
    fn default() -> Self {
        Self::offline()
    }
}
