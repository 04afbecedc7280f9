//! 对话控制器：轮次状态机
//!
//! 新会话先发送导师人设指令拿到问候；之后每条输入先写入记录，
//! 若整句（去空白、忽略大小写）是结束指令则交给评估 Agent 生成成绩单，否则交给导师回复。
//! 失败的一轮只保留用户消息，不写入任何占位回复。

use std::sync::Arc;

use crate::core::{CramError, Phase};
use crate::llm::LlmClient;
use crate::session::TutorSession;
use crate::tools::ToolExecutor;
use crate::tutor::{AgentSession, Evaluator, ReportCard, SessionOptions, TUTOR_INSTRUCTIONS};

/// 默认结束指令
pub const DEFAULT_TERMINATION_TOKENS: [&str; 3] = ["exit", "quit", "finish"];

/// 控制器参数
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// 导师人设与规则
    pub instructions: String,
    pub termination_tokens: Vec<String>,
    pub session: SessionOptions,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            instructions: TUTOR_INSTRUCTIONS.to_string(),
            termination_tokens: DEFAULT_TERMINATION_TOKENS.iter().map(|t| t.to_string()).collect(),
            session: SessionOptions::default(),
        }
    }
}

/// 一轮的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// 导师回复
    Reply(String),
    /// 会话结束，生成了成绩单
    Report(ReportCard),
}

/// 对话控制器：持有导师 LLM、工具执行器与评估 Agent，可被所有会话共享
pub struct Controller {
    tutor_llm: Arc<dyn LlmClient>,
    executor: Arc<ToolExecutor>,
    evaluator: Evaluator,
    settings: ControllerSettings,
}

impl Controller {
    pub fn new(
        tutor_llm: Arc<dyn LlmClient>,
        executor: Arc<ToolExecutor>,
        evaluator: Evaluator,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            tutor_llm,
            executor,
            evaluator,
            settings,
        }
    }

    /// 整句匹配结束指令（去首尾空白、忽略大小写）
    pub fn is_termination(&self, input: &str) -> bool {
        let input = input.trim().to_lowercase();
        self.settings
            .termination_tokens
            .iter()
            .any(|t| t.trim().to_lowercase() == input)
    }

    /// 若会话还没有导师 Agent：新建并发送人设指令，问候写入记录
    pub async fn ensure_started(&self, session: &mut TutorSession) -> Result<(), CramError> {
        if session.agent.is_some() {
            return Ok(());
        }
        let mut agent = AgentSession::new(
            Arc::clone(&self.tutor_llm),
            Arc::clone(&self.executor),
            self.settings.session,
        );
        let greeting = agent.start(&self.settings.instructions).await.map_err(|e| {
            tracing::warn!(session_id = %session.id(), error = %e, "tutor failed to start");
            e
        })?;
        session.transcript.push_agent(greeting);
        session.agent = Some(agent);
        session.phase = Phase::AwaitingInput;
        session.touch();
        tracing::info!(session_id = %session.id(), "tutor session started");
        Ok(())
    }

    /// 处理一条用户输入
    pub async fn submit(&self, session: &mut TutorSession, input: &str) -> Result<TurnOutcome, CramError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CramError::EmptyInput);
        }
        self.ensure_started(session).await?;
        session.touch();

        match session.phase {
            Phase::Terminated => Err(CramError::SessionTerminated),
            Phase::ProcessingHandoff => {
                if self.is_termination(input) {
                    self.handoff(session).await
                } else {
                    Err(CramError::HandoffPending)
                }
            }
            _ => {
                session.transcript.push_user(input);
                if self.is_termination(input) {
                    session.phase = Phase::ProcessingHandoff;
                    self.handoff(session).await
                } else {
                    self.tutor_turn(session, input).await
                }
            }
        }
    }

    /// 清空会话并重新问候
    pub async fn reset(&self, session: &mut TutorSession) -> Result<(), CramError> {
        session.clear();
        self.ensure_started(session).await
    }

    async fn tutor_turn(&self, session: &mut TutorSession, input: &str) -> Result<TurnOutcome, CramError> {
        session.phase = Phase::ProcessingTutorTurn;
        let result = match session.agent.as_mut() {
            Some(agent) => agent.send(input).await,
            None => Err(CramError::AgentProtocolError("tutor session missing".to_string())),
        };
        session.phase = Phase::AwaitingInput;

        match result {
            Ok(reply) => {
                session.transcript.push_agent(reply.clone());
                let (prompt, completion, total) = self.tutor_llm.token_usage();
                tracing::info!(
                    session_id = %session.id(),
                    messages = session.transcript.len(),
                    prompt_tokens = prompt,
                    completion_tokens = completion,
                    total_tokens = total,
                    "tutor turn ok"
                );
                Ok(TurnOutcome::Reply(reply))
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id(), error = %e, "tutor turn failed");
                Err(e)
            }
        }
    }

    async fn handoff(&self, session: &mut TutorSession) -> Result<TurnOutcome, CramError> {
        tracing::info!(session_id = %session.id(), "handing off to evaluator");
        match self.evaluator.evaluate(&session.transcript).await {
            Ok(card) => {
                session.transcript.push_agent(card.text.clone());
                session.phase = Phase::Terminated;
                Ok(TurnOutcome::Report(card))
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id(), error = %e, "evaluation failed");
                Err(e)
            }
        }
    }
}
