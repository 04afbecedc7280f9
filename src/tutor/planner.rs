//! 模型输出解析：最终回复或工具调用
//!
//! 导师模型要么直接回复文本，要么只输出一个 JSON 对象 `{"tool": "...", "args": {...}}` 请求调用工具。

use serde::{Deserialize, Serialize};

use crate::core::CramError;

/// 模型请求的工具调用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// 单次模型输出
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutput {
    /// 直接回复用户
    Reply(String),
    /// 需要执行工具
    ToolCall(ToolCall),
}

/// 解析模型输出：```json 代码块或整段 `{...}` 若是带 `"tool"` 键的 JSON 对象，视为工具调用；其余为文本回复。
/// 有 `"tool"` 键却不符合工具调用格式时返回 AgentProtocolError。
pub fn parse_agent_output(output: &str) -> Result<AgentOutput, CramError> {
    let trimmed = output.trim();
    let reply = || Ok(AgentOutput::Reply(trimmed.to_string()));

    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim())
    } else if trimmed.starts_with('{') && trimmed.ends_with('}') {
        trimmed
    } else {
        return reply();
    };

    let value: serde_json::Value = match serde_json::from_str(json_str) {
        Ok(value) => value,
        // 截断或写坏的工具调用
        Err(e) if json_str.contains("\"tool\"") => {
            return Err(CramError::AgentProtocolError(format!(
                "malformed tool call ({e}): {json_str}"
            )))
        }
        Err(_) => return reply(),
    };
    if !value.as_object().is_some_and(|obj| obj.contains_key("tool")) {
        return reply();
    }

    let parsed: ToolCall = serde_json::from_value(value)
        .map_err(|e| CramError::AgentProtocolError(format!("malformed tool call ({e}): {json_str}")))?;

    if parsed.tool.trim().is_empty() {
        reply()
    } else {
        Ok(AgentOutput::ToolCall(parsed))
    }
}
