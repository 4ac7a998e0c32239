//! LLM統合システム
//!
//! このモジュールは、説明文生成に使う外部LLMプロバイダー（OpenAI、Anthropic）との
//! 統合機能を提供します。

pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use config::{ProviderConfig, ProviderKind};
pub use error::{LlmError, LlmResult};
pub use providers::{create_provider, create_providers, LlmProvider};
pub use types::{LlmRequest, Message, Role};
