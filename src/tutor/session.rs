//! 导师 Agent 会话
//!
//! 维护与导师模型的一段连续对话：start 发送人设指令并拿到开场问候，send 处理后续每条用户输入。
//! 模型请求工具时在本轮内自动执行并回传 Observation，直到模型给出文本回复（有轮数上限）。
//! 工具调用只存在于本轮的临时消息中；私有历史每轮只追加「提示 + 最终回复」两条。

use std::sync::Arc;

use crate::core::CramError;
use crate::llm::LlmClient;
use crate::memory::{ConversationMemory, Message};
use crate::tools::ToolExecutor;
use crate::tutor::planner::{parse_agent_output, AgentOutput};
use crate::tutor::prompts::tool_protocol_prompt;

/// 单轮内默认最多执行的工具调用次数
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

/// 会话参数
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub max_tool_rounds: usize,
    pub max_context_turns: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            max_context_turns: 50,
        }
    }
}

/// 与导师模型的一段对话
pub struct AgentSession {
    llm: Arc<dyn LlmClient>,
    executor: Arc<ToolExecutor>,
    system_prompt: String,
    history: ConversationMemory,
    max_tool_rounds: usize,
}

impl AgentSession {
    pub fn new(llm: Arc<dyn LlmClient>, executor: Arc<ToolExecutor>, options: SessionOptions) -> Self {
        let system_prompt = tool_protocol_prompt(executor.registry());
        Self {
            llm,
            executor,
            system_prompt,
            history: ConversationMemory::new(options.max_context_turns),
            max_tool_rounds: options.max_tool_rounds,
        }
    }

    /// 发送人设指令，返回开场问候
    pub async fn start(&mut self, instructions: &str) -> Result<String, CramError> {
        self.history.clear();
        tracing::debug!(tools = ?self.executor.registry().tool_names(), "tutor starting");
        self.exchange(instructions).await
    }

    /// 发送一条用户输入，返回导师的最终回复
    pub async fn send(&mut self, user_text: &str) -> Result<String, CramError> {
        self.exchange(user_text).await
    }

    /// 私有历史（不含工具调用的中间消息）
    pub fn history(&self) -> &[Message] {
        self.history.messages()
    }

    async fn exchange(&mut self, prompt: &str) -> Result<String, CramError> {
        let mut scratch = vec![Message::user(prompt)];
        let mut tool_rounds = 0;

        loop {
            let mut request = Vec::with_capacity(1 + self.history.len() + scratch.len());
            request.push(Message::system(self.system_prompt.clone()));
            request.extend_from_slice(self.history.messages());
            request.extend_from_slice(&scratch);

            let output = self.llm.complete(&request).await?;

            match parse_agent_output(&output)? {
                AgentOutput::Reply(text) => {
                    if text.is_empty() {
                        return Err(CramError::AgentProtocolError("empty reply".to_string()));
                    }
                    self.history
                        .push_exchange(Message::user(prompt), Message::assistant(text.clone()));
                    return Ok(text);
                }
                AgentOutput::ToolCall(call) => {
                    if tool_rounds >= self.max_tool_rounds {
                        return Err(CramError::AgentProtocolError(format!(
                            "more than {} tool calls in one turn",
                            self.max_tool_rounds
                        )));
                    }
                    tool_rounds += 1;
                    tracing::debug!(tool = %call.tool, round = tool_rounds, "agent requested tool");

                    let observation = match self.executor.execute(&call.tool, call.args.clone()).await {
                        Ok(result) => result,
                        Err(CramError::ToolFailed(reason)) => format!("Error: {reason}"),
                        Err(e) => return Err(e),
                    };
                    let call_json = serde_json::to_string(&call).unwrap_or_else(|_| call.tool.clone());
                    scratch.push(Message::assistant(call_json));
                    scratch.push(Message::user(format!(
                        "Observation from {}: {}",
                        call.tool, observation
                    )));
                }
            }
        }
    }
}
