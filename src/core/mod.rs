//! 核心层：错误、会话阶段、对话控制器

pub mod controller;
pub mod error;
pub mod state;

pub use controller::{Controller, ControllerSettings, TurnOutcome};
pub use error::CramError;
pub use state::{Phase, SessionView};
