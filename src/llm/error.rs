//! LLM統合のエラー型定義

use std::time::Duration;
use thiserror::Error;

/// LLM統合システムのエラー型
///
/// These never reach callers of the explainer; they are logged and the next
/// backend is tried.
#[derive(Error, Debug)]
pub enum LlmError {
    /// APIが成功以外のステータスを返した
    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// 認証情報が未設定
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// 空のテキストが返された
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// ネットワークエラー
    #[error("Network error: {0}")]
    NetworkError(String),

    /// タイムアウト
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// JSONパースエラー
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::NetworkError(format!("request timed out: {}", err))
        } else {
            LlmError::NetworkError(err.to_string())
        }
    }
}

/// LLM統合システムの結果型
pub type LlmResult<T> = Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LlmError::ApiError {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "API error (429): rate limited");

        let err = LlmError::Timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("30s"));

        let err = LlmError::Timeout(Duration::from_millis(200));
        assert_eq!(err.to_string(), "Request timeout after 200ms");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: LlmError = parse.unwrap_err().into();
        assert!(matches!(err, LlmError::JsonError(_)));
    }
}
