//! Headless 运行时装配
//!
//! 供 CLI 与 Web 前端共用：按配置创建 LLM 客户端、注册内置工具、加载 prompt，组装成 Controller。
//! 没有 API Key 时不构建任何 Agent。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{Controller, ControllerSettings, CramError};
use crate::llm::{create_gemini_client, LlmClient, OpenAiClient};
use crate::tools::{builtin_registry, ToolExecutor};
use crate::tutor::{load_prompt, Evaluator, SessionOptions, GRADER_TEMPLATE, TUTOR_INSTRUCTIONS};

/// 根据配置选择后端（Gemini / OpenAI 兼容）
pub fn create_llm_from_config(cfg: &AppConfig, api_key: &str) -> Result<Arc<dyn LlmClient>, CramError> {
    let timeout = cfg.llm.timeouts.request;
    match cfg.llm.provider.to_lowercase().as_str() {
        "gemini" | "google" => {
            tracing::info!("Using Gemini LLM ({})", cfg.llm.model);
            let client = match cfg.llm.base_url.as_deref() {
                Some(base) => OpenAiClient::new(Some(base), &cfg.llm.model, api_key, timeout),
                None => create_gemini_client(api_key, Some(&cfg.llm.model), timeout),
            };
            Ok(Arc::new(client))
        }
        "openai" => {
            tracing::info!("Using OpenAI-compatible LLM ({})", cfg.llm.model);
            Ok(Arc::new(OpenAiClient::new(
                cfg.llm.base_url.as_deref(),
                &cfg.llm.model,
                api_key,
                timeout,
            )))
        }
        other => Err(CramError::Config(format!("unknown llm provider: {other}"))),
    }
}

/// 读取导师指令：配置路径 > config/prompts/tutor.txt > 内置
pub fn tutor_instructions(cfg: &AppConfig) -> String {
    let configured = cfg
        .tutor
        .prompt_path
        .as_ref()
        .map(|p| p.to_string_lossy().to_string());
    let mut paths: Vec<&str> = configured.iter().map(String::as_str).collect();
    paths.extend(["config/prompts/tutor.txt", "../config/prompts/tutor.txt"]);
    load_prompt(&paths, TUTOR_INSTRUCTIONS)
}

/// 读取评估模板：配置路径 > config/prompts/grader.txt > 内置
pub fn grader_template(cfg: &AppConfig) -> String {
    let configured = cfg
        .tutor
        .grader_prompt_path
        .as_ref()
        .map(|p| p.to_string_lossy().to_string());
    let mut paths: Vec<&str> = configured.iter().map(String::as_str).collect();
    paths.extend(["config/prompts/grader.txt", "../config/prompts/grader.txt"]);
    let template = load_prompt(&paths, GRADER_TEMPLATE);
    if template.contains("{transcript}") {
        template
    } else {
        tracing::warn!("grader prompt has no {{transcript}} placeholder, appending transcript");
        format!("{template}\n\nTRANSCRIPT:\n{{transcript}}")
    }
}

/// 用给定的导师 / 评估 LLM 组装控制器（测试与自定义后端用）
pub fn create_controller_with(
    cfg: &AppConfig,
    tutor_llm: Arc<dyn LlmClient>,
    grader_llm: Arc<dyn LlmClient>,
) -> Controller {
    let executor = Arc::new(ToolExecutor::new(builtin_registry(), cfg.tools.timeout_secs));
    let evaluator = Evaluator::new(grader_llm, grader_template(cfg));
    let settings = ControllerSettings {
        instructions: tutor_instructions(cfg),
        termination_tokens: cfg.tutor.termination_tokens.clone(),
        session: SessionOptions {
            max_tool_rounds: cfg.tutor.max_tool_rounds,
            max_context_turns: cfg.tutor.max_context_turns,
        },
    };
    Controller::new(tutor_llm, executor, evaluator, settings)
}

/// 按配置与 API Key 组装控制器；导师与评估各用独立的客户端实例
pub fn create_controller(cfg: &AppConfig, api_key: &str) -> Result<Controller, CramError> {
    if api_key.trim().is_empty() {
        return Err(CramError::MissingCredential);
    }
    let tutor_llm = create_llm_from_config(cfg, api_key)?;
    let grader_llm = create_llm_from_config(cfg, api_key)?;
    Ok(create_controller_with(cfg, tutor_llm, grader_llm))
}
