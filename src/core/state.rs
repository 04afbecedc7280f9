//! 状态定义：会话阶段与 UI 投影
//!
//! UI 只拿到轻量的 SessionView（阶段 + 聊天记录）；完整状态由 TutorSession 持有。

use serde::Serialize;

use crate::memory::ChatMessage;

/// 对话控制器的阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// 尚未发送人设指令（新建或 reset 之后）
    Uninitialized,
    AwaitingInput,
    ProcessingTutorTurn,
    /// 正在生成成绩单；评估失败后也停在这里，等待再次发送结束指令
    ProcessingHandoff,
    Terminated,
}

/// UI 看到的「投影」状态
#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub phase: Phase,
    pub messages: Vec<ChatMessage>,
}
