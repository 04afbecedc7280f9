//! 内置 prompt：导师人设、工具协议、评估模板
//!
//! 导师与评估 prompt 可由 config/prompts/*.txt 覆盖，文件缺失时使用这里的内置版本。

use crate::tools::{tool_call_schema_json, ToolRegistry};

/// 导师人设与规则（会话开始时作为第一条消息发送）
pub const TUTOR_INSTRUCTIONS: &str = "\
You are 'Exam Cram Buddy', a strict university tutor.
1. Ask the user what subject they are studying.
2. When they reply, IMMEDIATELY ask a hard quiz question.
3. If they ask for help, use `give_hint`.
4. Verify answers with `lookup_fact`.";

/// 评估 Agent 模板；{transcript} 替换为整段会话记录
pub const GRADER_TEMPLATE: &str = "\
You are the Exam Board Evaluator. Analyze this study session.
1. Subject studied.
2. Correct/Incorrect answers.
3. Final Grade (A-F).

TRANSCRIPT:
{transcript}";

/// 按顺序查找 prompt 文件，找不到则用内置版本
pub fn load_prompt(paths: &[&str], fallback: &str) -> String {
    paths
        .iter()
        .find_map(|p| std::fs::read_to_string(p).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// 导师的 system 消息：可用工具列表 + 调用格式
pub fn tool_protocol_prompt(registry: &ToolRegistry) -> String {
    let tool_list = registry
        .tool_descriptions()
        .iter()
        .map(|(name, desc)| format!("- {name}: {desc}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You can call these tools:\n{tool_list}\n\n\
Tool parameters:\n{params}\n\n\
To call a tool, reply with ONLY one JSON object and nothing else, e.g. \
{{\"tool\": \"give_hint\", \"args\": {{\"concept\": \"photosynthesis\"}}}}.\n\
The call must match this schema:\n{schema}\n\n\
The tool result comes back as an `Observation from <tool>` message. \
When you answer the student, reply in plain text without JSON.",
        params = registry.to_schema_json(),
        schema = tool_call_schema_json(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin_registry;

    #[test]
    fn test_protocol_lists_builtin_tools() {
        let prompt = tool_protocol_prompt(&builtin_registry());
        assert!(prompt.contains("- give_hint:"));
        assert!(prompt.contains("- lookup_fact:"));
        assert!(prompt.contains("\"tool\""));
    }

    #[test]
    fn test_load_prompt_falls_back() {
        let p = load_prompt(&["/nonexistent/prompt.txt"], TUTOR_INSTRUCTIONS);
        assert!(p.starts_with("You are 'Exam Cram Buddy'"));
    }

    #[test]
    fn test_load_prompt_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tutor.txt");
        std::fs::write(&path, "  Be gentle.\n").unwrap();
        let path = path.to_string_lossy().to_string();
        assert_eq!(load_prompt(&[path.as_str()], TUTOR_INSTRUCTIONS), "Be gentle.");
    }
}
