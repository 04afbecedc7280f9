//! 错误类型
//!
//! 所有 Agent / 控制器 / 工具调用的失败统一为 CramError；由调用方（CLI、Web）展示给用户，不在本地重试。

use thiserror::Error;

/// 会话运行过程中可能出现的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CramError {
    /// 未提供 API Key：任何 Agent 构建之前即终止
    #[error("Missing API key: set the configured environment variable or enter a key")]
    MissingCredential,

    /// 模型服务不可用（网络、鉴权、超时等）
    #[error("Agent unavailable: {0}")]
    AgentUnavailable(String),

    /// 模型回复格式错误（无法解析的工具调用、工具调用轮数超限）
    #[error("Agent protocol error: {0}")]
    AgentProtocolError(String),

    /// 模型请求了未注册的工具
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// 工具自身执行失败或超时；结果作为 Observation 回传给模型，不直接展示给用户
    #[error("Tool failed: {0}")]
    ToolFailed(String),

    #[error("Session already finished; reset to start again")]
    SessionTerminated,

    /// 评估失败后只接受再次发送结束指令
    #[error("Report card is still pending; send a finish command again or reset")]
    HandoffPending,

    #[error("Empty input")]
    EmptyInput,

    #[error("Config error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for CramError {
    fn from(e: config::ConfigError) -> Self {
        CramError::Config(e.to_string())
    }
}
