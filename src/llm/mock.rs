//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按脚本顺序返回预设回复（或失败），并记录每次收到的消息，便于断言导师 / 评估的调用次数与上下文。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError};
use crate::memory::Message;

/// 脚本化 Mock 客户端
#[derive(Debug, Default)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依次返回给定回复
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for r in replies {
            mock.push_reply(r);
        }
        mock
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Ok(reply.into()));
        }
    }

    /// 下一次调用返回失败
    pub fn push_failure(&self, reason: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(reason.into()));
        }
    }

    /// 已收到的调用次数
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// 每次调用收到的完整消息列表
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }
        let next = self
            .script
            .lock()
            .map_err(|e| LlmError::Request(e.to_string()))?
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(LlmError::Request(reason)),
            None => Err(LlmError::Request("mock script exhausted".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_then_exhausted() {
        let mock = MockLlmClient::with_replies(["one", "two"]);
        mock.push_failure("boom");
        assert_eq!(mock.complete(&[Message::user("a")]).await.unwrap(), "one");
        assert_eq!(mock.complete(&[Message::user("b")]).await.unwrap(), "two");
        assert_eq!(
            mock.complete(&[]).await,
            Err(LlmError::Request("boom".to_string()))
        );
        assert!(mock.complete(&[]).await.is_err());
        assert_eq!(mock.call_count(), 4);
        assert_eq!(mock.requests()[1][0].content, "b");
    }
}
