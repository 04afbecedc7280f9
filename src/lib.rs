//! Cram - Exam Cram Buddy 考前辅导智能体
//!
//! 模块划分：
//! - **agent**: 运行时装配（按配置创建 LLM、工具、prompt，组装 Controller）
//! - **config**: 应用配置加载（TOML + 环境变量）与 API Key 解析
//! - **core**: 错误类型、会话阶段、对话控制器（轮次状态机）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Gemini / Mock）
//! - **memory**: Agent 私有对话历史与用户可见的会话记录
//! - **observability**: 日志初始化
//! - **session**: 按会话 ID 隔离的状态存储
//! - **tools**: 工具注册表（lookup_fact、give_hint）与执行器
//! - **tutor**: 导师 Agent 会话、输出解析、评估交接

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod session;
pub mod tools;
pub mod tutor;
