//! 评估 Agent（Exam Board Evaluator）
//!
//! 会话结束时对整段记录做一次性、无状态的评估：不与导师共享任何历史，
//! 只发送一条由模板拼出的请求，返回成绩单。

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;

use crate::core::CramError;
use crate::llm::LlmClient;
use crate::memory::{Message, Transcript};

/// 字母等级 A–F
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade(char);

impl Grade {
    pub fn from_letter(c: char) -> Option<Self> {
        let c = c.to_ascii_uppercase();
        ('A'..='F').contains(&c).then_some(Self(c))
    }

    pub fn letter(&self) -> char {
        self.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 成绩单：评估回复原文 + 解析出的等级（回复中没有等级时为 None）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportCard {
    pub text: String,
    pub grade: Option<Grade>,
}

impl ReportCard {
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let grade = extract_grade(&text);
        Self { text, grade }
    }
}

static GRADE_RANGE_RE: OnceLock<Regex> = OnceLock::new();
static GRADE_RE: OnceLock<Regex> = OnceLock::new();

/// 模板里回显的 "(A-F)"
fn grade_range_re() -> &'static Regex {
    GRADE_RANGE_RE.get_or_init(|| Regex::new(r"\(\s*A\s*[-–]\s*F\s*\)").unwrap())
}

fn grade_re() -> &'static Regex {
    GRADE_RE.get_or_init(|| Regex::new(r"(?i:grade)\b[^A-Za-z\n]{0,12}([A-F])(?:[+-]|\b)").unwrap())
}

/// 从回复中取最后一处「Grade: X」；先去掉模板里回显的 "(A-F)"
fn extract_grade(text: &str) -> Option<Grade> {
    let cleaned = grade_range_re().replace_all(text, "");
    grade_re()
        .captures_iter(&cleaned)
        .filter_map(|cap| cap.get(1))
        .last()
        .and_then(|m| m.as_str().chars().next())
        .and_then(Grade::from_letter)
}

/// 评估 Agent：持有 LLM 与 prompt 模板（{transcript} 占位）
pub struct Evaluator {
    llm: Arc<dyn LlmClient>,
    prompt_template: String,
}

impl Evaluator {
    pub fn new(llm: Arc<dyn LlmClient>, prompt_template: impl Into<String>) -> Self {
        Self {
            llm,
            prompt_template: prompt_template.into(),
        }
    }

    pub fn prompt_for(&self, transcript: &Transcript) -> String {
        self.prompt_template.replace("{transcript}", &transcript.render())
    }

    pub async fn evaluate(&self, transcript: &Transcript) -> Result<ReportCard, CramError> {
        let messages = vec![Message::user(self.prompt_for(transcript))];
        let text = self.llm.complete(&messages).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(CramError::AgentProtocolError("empty report card".to_string()));
        }
        let card = ReportCard::from_text(text);
        tracing::info!(grade = ?card.grade, "report card generated");
        Ok(card)
    }
}
