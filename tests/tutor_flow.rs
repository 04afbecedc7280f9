//! 端到端辅导流程测试（Mock LLM，无需 API）

use std::sync::Arc;

use async_trait::async_trait;
use cram::agent::create_controller_with;
use cram::config::AppConfig;
use cram::core::{Phase, TurnOutcome};
use cram::llm::{LlmClient, LlmError, MockLlmClient};
use cram::memory::{Message, Role, Speaker};
use cram::session::SessionStore;

/// 确定性导师：复述最后一条用户消息，便于在并发下判断消息归属
struct ParrotTutor;

#[async_trait]
impl LlmClient for ParrotTutor {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let last = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        tokio::task::yield_now().await;
        Ok(format!("You said: {last}"))
    }
}

#[tokio::test]
async fn test_biology_session_to_report_card() {
    let tutor = Arc::new(MockLlmClient::with_replies([
        "Welcome! What subject are you studying?",
        "Hard question: which organelle produces most of the cell's ATP?",
        r#"{"tool": "lookup_fact", "args": {"topic": "mitochondria"}}"#,
        "Correct! The mitochondria is the powerhouse of the cell.",
    ]));
    let grader = Arc::new(MockLlmClient::with_replies([
        "1. Subject studied: Biology\n2. Answer 'mitochondria': Correct\n3. Final Grade (A-F): A",
    ]));
    let controller = create_controller_with(&AppConfig::default(), tutor.clone(), grader.clone());
    let store = SessionStore::default();
    let session = store.get_or_create("student").await;
    let mut s = session.lock().await;

    controller.ensure_started(&mut s).await.unwrap();
    assert_eq!(s.transcript().len(), 1);

    let outcome = controller.submit(&mut s, "Biology").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Reply(ref r) if r.starts_with("Hard question")));

    let outcome = controller.submit(&mut s, "mitochondria").await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Reply(ref r) if r.starts_with("Correct!")));
    // 工具调用不出现在记录里
    assert_eq!(s.transcript().len(), 5);
    assert!(s
        .transcript()
        .messages()
        .iter()
        .all(|m| !m.content().contains("lookup_fact")));
    assert_eq!(grader.call_count(), 0);

    let outcome = controller.submit(&mut s, "finish").await.unwrap();
    let card = match outcome {
        TurnOutcome::Report(card) => card,
        other => panic!("expected report card, got {other:?}"),
    };
    assert!(card.text.contains("Biology"));
    assert_eq!(card.grade.map(|g| g.letter()), Some('A'));
    assert_eq!(s.phase(), Phase::Terminated);
    assert_eq!(s.transcript().len(), 7);
    assert_eq!(s.transcript().last().map(|m| m.role()), Some(Speaker::Agent));

    // 评估看到的是完整记录
    let grader_prompt = &grader.requests()[0][0].content;
    assert!(grader_prompt.contains("user: Biology"));
    assert!(grader_prompt.contains("user: mitochondria"));
    assert!(grader_prompt.contains("user: finish"));
    assert_eq!(tutor.call_count(), 4);
}

#[tokio::test]
async fn test_reset_through_store_then_regreet() {
    let tutor = Arc::new(MockLlmClient::with_replies(["Hi! Subject?", "Q1", "Hi again! Subject?"]));
    let grader = Arc::new(MockLlmClient::new());
    let controller = create_controller_with(&AppConfig::default(), tutor, grader);
    let store = SessionStore::default();

    {
        let session = store.get_or_create("student").await;
        let mut s = session.lock().await;
        controller.submit(&mut s, "History").await.unwrap();
        assert_eq!(s.transcript().len(), 3);
    }

    assert!(store.reset("student").await);

    let session = store.get_or_create("student").await;
    let mut s = session.lock().await;
    assert!(s.transcript().is_empty());
    controller.ensure_started(&mut s).await.unwrap();
    assert_eq!(s.transcript().len(), 1);
    assert_eq!(s.transcript().messages()[0].content(), "Hi again! Subject?");
}

#[tokio::test]
async fn test_concurrent_sessions_are_isolated() {
    let grader = Arc::new(MockLlmClient::new());
    let controller = Arc::new(create_controller_with(
        &AppConfig::default(),
        Arc::new(ParrotTutor),
        grader,
    ));
    let store = Arc::new(SessionStore::default());

    let mut handles = Vec::new();
    for name in ["alice", "bob"] {
        let controller = Arc::clone(&controller);
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let session = store.get_or_create(name).await;
            for i in 0..5 {
                let mut s = session.lock().await;
                controller
                    .submit(&mut s, &format!("{name}-{i}"))
                    .await
                    .unwrap();
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    for (name, other) in [("alice", "bob"), ("bob", "alice")] {
        let session = store.get_or_create(name).await;
        let s = session.lock().await;
        assert_eq!(s.transcript().len(), 11);
        assert!(s
            .transcript()
            .messages()
            .iter()
            .all(|m| !m.content().contains(other)));
        for (i, pair) in s.transcript().messages()[1..].chunks(2).enumerate() {
            assert_eq!(pair[0].content(), format!("{name}-{i}"));
            assert_eq!(pair[1].content(), format!("You said: {name}-{i}"));
        }
        assert_eq!(s.agent().map(|a| a.history().len()), Some(12));
    }
}
