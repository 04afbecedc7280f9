//! 会话状态存储
//!
//! 按会话 ID 保存聊天记录与导师 Agent 会话，使其跨越单次请求 / 界面重绘存活。
//! 同一 ID 重复读取返回同一实例；每个会话自带一把 Mutex，同一会话的轮次串行执行，不同会话互不共享任何状态。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

use crate::core::{Phase, SessionView};
use crate::memory::Transcript;
use crate::tutor::AgentSession;

/// 会话 ID（Web 端为 UUID v4，CLI 为固定值）
pub type SessionId = String;

/// 单个辅导会话：记录、导师 Agent、当前阶段
pub struct TutorSession {
    id: SessionId,
    pub(crate) transcript: Transcript,
    pub(crate) agent: Option<AgentSession>,
    pub(crate) phase: Phase,
    last_active: Instant,
}

impl TutorSession {
    pub fn new(id: impl Into<SessionId>) -> Self {
        Self {
            id: id.into(),
            transcript: Transcript::new(),
            agent: None,
            phase: Phase::Uninitialized,
            last_active: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn agent(&self) -> Option<&AgentSession> {
        self.agent.as_ref()
    }

    /// 清空记录并丢弃导师 Agent，回到未初始化
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.agent = None;
        self.phase = Phase::Uninitialized;
        self.touch();
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            phase: self.phase,
            messages: self.transcript.messages().to_vec(),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_active.elapsed() >= timeout
    }
}

/// 会话存储：session_id -> Arc<Mutex<TutorSession>>
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<TutorSession>>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        }
    }

    /// 获取或创建会话；同一 ID 总是返回同一实例
    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<TutorSession>> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return Arc::clone(session);
        }
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id.to_string()).or_insert_with(|| {
            tracing::info!(session_id = %id, "session created");
            Arc::new(Mutex::new(TutorSession::new(id)))
        });
        Arc::clone(session)
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<TutorSession>>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// 清空会话的记录与导师 Agent；会话不存在时返回 false
    pub async fn reset(&self, id: &str) -> bool {
        let Some(session) = self.get(id).await else {
            return false;
        };
        session.lock().await.clear();
        tracing::info!(session_id = %id, "session reset");
        true
    }

    /// 移除会话；之后同一 ID 会得到全新实例
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "session removed");
        }
        removed
    }

    /// 清理过期会话；正在处理中的会话（锁被占用）跳过
    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let timeout = self.idle_timeout;
        let before = sessions.len();
        sessions.retain(|_, s| match s.try_lock() {
            Ok(guard) => !guard.is_expired(timeout),
            Err(_) => true,
        });
        before - sessions.len()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(3600)
    }
}
