//! LLMプロバイダー実装

pub mod anthropic;
pub mod openai;

use crate::llm::{
    config::{ProviderConfig, ProviderKind},
    error::LlmResult,
    types::LlmRequest,
};
use async_trait::async_trait;
use std::sync::Arc;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAIProvider;

/// LLMプロバイダートレイト
///
/// One request/response round trip per call. No retries at this layer.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// 完了リクエスト（生成テキストを返す）
    async fn complete(&self, request: &LlmRequest) -> LlmResult<String>;

    /// 認証情報が揃っているか。false なら呼び出されない
    fn is_available(&self) -> bool;

    /// プロバイダー種別
    fn kind(&self) -> ProviderKind;

    /// プロバイダー名を取得
    fn name(&self) -> &str {
        self.kind().name()
    }
}

/// プロバイダーファクトリー
pub fn create_provider(config: &ProviderConfig) -> LlmResult<Arc<dyn LlmProvider>> {
    match config.kind {
        ProviderKind::OpenAI => Ok(Arc::new(OpenAIProvider::new(config.clone())?)),
        ProviderKind::Anthropic => Ok(Arc::new(AnthropicProvider::new(config.clone())?)),
    }
}

/// 設定された順序でプロバイダーを構築
pub fn create_providers(configs: &[ProviderConfig]) -> LlmResult<Vec<Arc<dyn LlmProvider>>> {
    configs.iter().map(create_provider).collect()
}

/// HTTPクライアントを構築
pub(crate) fn build_http_client(config: &ProviderConfig) -> LlmResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| {
            crate::llm::error::LlmError::ConfigError(format!(
                "Failed to create HTTP client: {}",
                e
            ))
        })
}

/// エラーレスポンス本文を短縮
pub(crate) fn truncate(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        body.to_string()
    } else {
        let mut out: String = body.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}
