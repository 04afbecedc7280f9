//! 导师与评估：Agent 会话（含工具调用循环）、输出解析、评估交接、内置 prompt

pub mod evaluator;
pub mod planner;
pub mod prompts;
pub mod session;

pub use evaluator::{Evaluator, Grade, ReportCard};
pub use planner::{parse_agent_output, AgentOutput, ToolCall};
pub use prompts::{load_prompt, tool_protocol_prompt, GRADER_TEMPLATE, TUTOR_INSTRUCTIONS};
pub use session::{AgentSession, SessionOptions, DEFAULT_MAX_TOOL_ROUNDS};
