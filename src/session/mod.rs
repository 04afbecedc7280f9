//! 会话层：按会话 ID 隔离的状态存储

pub mod store;

pub use store::{SessionId, SessionStore, TutorSession};
