pub mod executor;
pub mod hint;
pub mod registry;
pub mod schema;
pub mod textbook;

pub use executor::ToolExecutor;
pub use hint::GiveHintTool;
pub use registry::{builtin_registry, Tool, ToolRegistry};
pub use schema::tool_call_schema_json;
pub use textbook::LookupFactTool;
