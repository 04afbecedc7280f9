//! Agent 私有对话历史
//!
//! 保留最近 N 轮对话（user/assistant 对）供 LLM 上下文使用；开场的指令与问候始终保留，超出时剪掉中间最旧的部分。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条 LLM 消息
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 开场交换（指令 + 问候）占用的条数
const PINNED_MESSAGES: usize = 2;

/// 短期记忆：开场交换 + 最近 max_turns 轮（每轮 user + assistant）
#[derive(Clone, Debug)]
pub struct ConversationMemory {
    messages: Vec<Message>,
    max_turns: usize,
}

impl ConversationMemory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_turns: max_turns.max(1),
        }
    }

    /// 追加一轮交换（提示 + 回复），保证两条一起写入
    pub fn push_exchange(&mut self, prompt: Message, reply: Message) {
        self.messages.push(prompt);
        self.messages.push(reply);
        self.prune();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn prune(&mut self) {
        let keep = self.max_turns * 2;
        if self.messages.len() > PINNED_MESSAGES + keep {
            let excess = self.messages.len() - PINNED_MESSAGES - keep;
            self.messages.drain(PINNED_MESSAGES..PINNED_MESSAGES + excess);
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
