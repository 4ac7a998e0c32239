//! LLM統合の型定義

use serde::{Deserialize, Serialize};

/// メッセージのロール
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// システムメッセージ
    System,
    /// ユーザーメッセージ
    User,
}

/// チャットメッセージ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// メッセージのロール
    pub role: Role,
    /// メッセージ内容
    pub content: String,
}

impl Message {
    /// 新しいシステムメッセージを作成
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// 新しいユーザーメッセージを作成
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// LLMリクエスト
///
/// Unset sampling fields fall back to the provider's configured defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmRequest {
    /// メッセージ履歴
    pub messages: Vec<Message>,
    /// 温度パラメータ（0.0-2.0）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// 最大トークン数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    /// 新しいリクエストを作成
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    /// システム指示とユーザープロンプトからリクエストを作成
    pub fn with_system(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(vec![Message::system(system), Message::user(prompt)])
    }

    /// 温度を設定
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// 最大トークン数を設定
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// システムメッセージを連結して取得
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    /// システム以外のメッセージ
    pub fn conversation(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = LlmRequest::with_system("You are helpful", "Explain")
            .with_temperature(0.2)
            .with_max_tokens(50);

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(50));
    }

    #[test]
    fn test_system_prompt_split() {
        let request = LlmRequest::with_system("sys", "user prompt");
        assert_eq!(request.system_prompt().as_deref(), Some("sys"));

        let conversation: Vec<&Message> = request.conversation().collect();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation[0].content, "user prompt");

        let no_system = LlmRequest::new(vec![Message::user("hi")]);
        assert!(no_system.system_prompt().is_none());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Message::system("x")).unwrap();
        assert!(json.contains("\"role\":\"system\""));

        let json = serde_json::to_string(&Message::user("x")).unwrap();
        assert!(json.contains("\"role\":\"user\""));

        let parsed: Message = serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(parsed.role, Role::User);
    }
}
