//! 会话记录（Transcript）
//!
//! 用户可见的聊天记录：只追加、按时间排序，只有显式 reset 才会清空。评估 Agent 读取的也是这份记录。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 聊天气泡的说话方
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

impl Speaker {
    /// 渲染记录时的行前缀
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Agent => "model",
        }
    }
}

/// 单条聊天消息，创建后不可修改
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Speaker,
    content: String,
    sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Speaker, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Speaker {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }
}

/// 只追加的会话记录
#[derive(Clone, Debug, Default, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Speaker::User, content));
    }

    pub fn push_agent(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Speaker::Agent, content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }

    /// `role: content` 每行一条，按时间顺序
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_role_prefixed_and_ordered() {
        let mut t = Transcript::new();
        t.push_agent("What are you studying?");
        t.push_user("Biology");
        assert_eq!(t.render(), "model: What are you studying?\nuser: Biology");
    }

    #[test]
    fn test_speaker_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::new(Speaker::User, "hi")).unwrap();
        assert!(json.contains(r#""role":"user""#));
    }
}
