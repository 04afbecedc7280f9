//! Gemini 客户端（OpenAI 兼容格式）
//!
//! Google 提供 OpenAI 兼容端点，直接复用 OpenAiClient。
//! - Base URL: https://generativelanguage.googleapis.com/v1beta/openai/
//! - 模型: gemini-2.5-flash

use crate::llm::OpenAiClient;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
pub const GEMINI_FLASH: &str = "gemini-2.5-flash";

/// 创建 Gemini 客户端；model 为空时使用 gemini-2.5-flash
pub fn create_gemini_client(
    api_key: &str,
    model: Option<&str>,
    request_timeout_secs: u64,
) -> OpenAiClient {
    let model = model.filter(|m| !m.is_empty()).unwrap_or(GEMINI_FLASH);
    OpenAiClient::new(Some(GEMINI_BASE_URL), model, api_key, request_timeout_secs)
}
