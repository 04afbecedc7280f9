//! give_hint：不给答案的提示（确定性占位实现）

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::registry::string_arg;
use crate::tools::Tool;

pub struct GiveHintTool;

#[async_trait]
impl Tool for GiveHintTool {
    fn name(&self) -> &str {
        "give_hint"
    }

    fn description(&self) -> &str {
        "Give the student a hint about a concept without revealing the answer. Args: {\"concept\": \"...\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "concept": { "type": "string", "description": "Concept the student is stuck on" }
            },
            "required": ["concept"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let concept = string_arg(&args, "concept")?;
        Ok(format!(
            "Hint: Think about how {concept} relates to the core principles."
        ))
    }
}
