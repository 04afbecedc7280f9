//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CRAM__*` 覆盖（双下划线表示嵌套，如 `CRAM__LLM__MODEL=gemini-2.5-pro`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::CramError;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub tutor: TutorSection,
    pub tools: ToolsSection,
    pub session: SessionSection,
    pub web: WebSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "Exam Cram Buddy".to_string(),
        }
    }
}

/// [llm] 段：后端、模型、密钥来源与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// gemini / openai（openai 表示任意 OpenAI 兼容端点，配合 base_url）
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    /// 读取 API Key 的环境变量名
    pub api_key_env: String,
    /// 直接写在配置里的 Key（环境变量优先）
    pub api_key: Option<String>,
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: crate::llm::GEMINI_FLASH.to_string(),
            base_url: None,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            api_key: None,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    /// 单次请求超时（秒）
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 60 }
    }
}

/// [tutor] 段：工具轮数上限、历史长度、结束指令、prompt 文件
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TutorSection {
    pub max_tool_rounds: usize,
    pub max_context_turns: usize,
    pub termination_tokens: Vec<String>,
    pub prompt_path: Option<PathBuf>,
    pub grader_prompt_path: Option<PathBuf>,
}

impl Default for TutorSection {
    fn default() -> Self {
        Self {
            max_tool_rounds: crate::tutor::DEFAULT_MAX_TOOL_ROUNDS,
            max_context_turns: 50,
            termination_tokens: crate::core::controller::DEFAULT_TERMINATION_TOKENS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            prompt_path: None,
            grader_prompt_path: None,
        }
    }
}

/// [tools] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub timeout_secs: u64,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// [session] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// 空闲多久后清理（秒），仅 Web 端使用
    pub idle_timeout_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 3600,
        }
    }
}

/// [web] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSection {
    pub port: u16,
}

impl Default for WebSection {
    fn default() -> Self {
        Self { port: 8501 }
    }
}

/// 从 config 目录加载配置，环境变量 CRAM__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 CRAM__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, CramError> {
    let mut builder = config::Config::builder();

    for name in ["config/default", "../config/default"] {
        if std::path::Path::new(&format!("{name}.toml")).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(path) = config_path.filter(|p| p.exists()) {
        builder = builder.add_source(config::File::from(path).required(false));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CRAM")
            .separator("__")
            .try_parsing(true),
    );

    Ok(builder.build()?.try_deserialize()?)
}

/// 解析 API Key：先读 `[llm].api_key_env` 指定的环境变量，再读配置中的 api_key；空字符串视为未设置
pub fn resolve_api_key(cfg: &AppConfig) -> Option<String> {
    let clean = |k: String| Some(k.trim().to_string()).filter(|k| !k.is_empty());
    std::env::var(&cfg.llm.api_key_env)
        .ok()
        .and_then(clean)
        .or_else(|| cfg.llm.api_key.clone().and_then(clean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.provider, "gemini");
        assert_eq!(cfg.llm.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(cfg.tutor.max_tool_rounds, 5);
        assert_eq!(cfg.tutor.termination_tokens, vec!["exit", "quit", "finish"]);
        assert_eq!(cfg.web.port, 8501);
    }

    #[test]
    fn test_load_from_file_keeps_missing_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cram.toml");
        std::fs::write(
            &path,
            "[tutor]\nmax_tool_rounds = 3\n\n[llm]\nmodel = \"gemini-2.5-pro\"\n",
        )
        .unwrap();
        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.tutor.max_tool_rounds, 3);
        assert_eq!(cfg.tutor.max_context_turns, 50);
        assert_eq!(cfg.llm.model, "gemini-2.5-pro");
        assert_eq!(cfg.llm.timeouts.request, 60);
    }

    #[test]
    fn test_resolve_api_key_env_then_config() {
        let mut cfg = AppConfig::default();
        cfg.llm.api_key_env = "CRAM_TEST_API_KEY_RESOLVE".to_string();
        std::env::remove_var("CRAM_TEST_API_KEY_RESOLVE");
        assert!(resolve_api_key(&cfg).is_none());

        cfg.llm.api_key = Some("from-config".to_string());
        assert_eq!(resolve_api_key(&cfg).as_deref(), Some("from-config"));

        std::env::set_var("CRAM_TEST_API_KEY_RESOLVE", "from-env");
        assert_eq!(resolve_api_key(&cfg).as_deref(), Some("from-env"));
        std::env::remove_var("CRAM_TEST_API_KEY_RESOLVE");

        std::env::set_var("CRAM_TEST_API_KEY_RESOLVE", "  ");
        assert_eq!(resolve_api_key(&cfg).as_deref(), Some("from-config"));
        std::env::remove_var("CRAM_TEST_API_KEY_RESOLVE");

        cfg.llm.api_key = Some("   ".to_string());
        assert!(resolve_api_key(&cfg).is_none());
    }
}
