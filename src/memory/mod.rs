//! 记忆层：Agent 私有对话历史与用户可见的会话记录

pub mod conversation;
pub mod transcript;

pub use conversation::{ConversationMemory, Message, Role};
pub use transcript::{ChatMessage, Speaker, Transcript};
