//! lookup_fact：核对答案用的「教科书」查询（确定性占位实现）

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::registry::string_arg;
use crate::tools::Tool;

pub struct LookupFactTool;

#[async_trait]
impl Tool for LookupFactTool {
    fn name(&self) -> &str {
        "lookup_fact"
    }

    fn description(&self) -> &str {
        "Verify a fact about a topic against the textbook. Args: {\"topic\": \"...\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "topic": { "type": "string", "description": "Topic or claim to verify" }
            },
            "required": ["topic"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let topic = string_arg(&args, "topic")?;
        Ok(format!(
            "Textbook Definition: {topic} is a fundamental concept in the study material."
        ))
    }
}
