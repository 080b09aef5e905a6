//! End-to-end turns against a real `SQLite` store.

use std::sync::Arc;

use murmur_core::testing::{RecordingEmitter, Script, ScriptedModel};
use murmur_core::{
    ChatOrchestrator, ConversationService, GenerationError, MessageRole, NoopEmitter, ReplyPart,
    ReplyOutcome, SummaryOutcome,
};
use murmur_db::{CoreFactory, SqliteConversationStore, setup_test_database};

#[tokio::test]
async fn completed_turn_is_persisted_whole() {
    let repos = CoreFactory::in_memory().await.unwrap();
    let model = Arc::new(
        ScriptedModel::new()
            .with_reply_parts(&["Par", "Paris is", "Paris is the capital."])
            .with_summary_parts(&["Capital", "Capital of France"]),
    );
    let conversations = ConversationService::new(repos.conversations.clone());
    let orchestrator = ChatOrchestrator::new(
        model,
        repos.conversations.clone(),
        Arc::new(RecordingEmitter::new()),
    );

    let mut conv = conversations.create_conversation().await.unwrap();
    let outcome = orchestrator
        .run_turn(&mut conv, "What is the capital of France?")
        .await
        .unwrap();

    assert!(matches!(outcome.reply, ReplyOutcome::Completed { .. }));
    assert_eq!(outcome.summary, SummaryOutcome::Completed);

    let stored = conversations.require_conversation(conv.id).await.unwrap();
    assert_eq!(stored, conv);
    assert_eq!(stored.messages.len(), 2);
    assert_eq!(stored.messages[0].role, MessageRole::User);
    assert_eq!(stored.messages[1].content, "Paris is the capital.");
    assert_eq!(stored.summary, "Capital of France");
}

#[tokio::test]
async fn failed_reply_marker_survives_reload() {
    let store = Arc::new(SqliteConversationStore::new(
        setup_test_database().await.unwrap(),
    ));
    let model = Arc::new(
        ScriptedModel::new()
            .with_reply(Script::Parts(vec![
                Ok(ReplyPart::new("Half an ans")),
                Err(GenerationError::Transport("connection reset".into())),
            ]))
            .with_summary_parts(&["Interrupted answer"]),
    );
    let orchestrator = ChatOrchestrator::new(model, store.clone(), Arc::new(NoopEmitter::new()));
    let service = ConversationService::new(store);

    let mut conv = service.create_conversation().await.unwrap();
    orchestrator.run_turn(&mut conv, "Explain").await.unwrap();

    let stored = service.require_conversation(conv.id).await.unwrap();
    assert!(stored.messages[1].content.starts_with("Error: "));
    assert!(stored.messages[1].content.contains("connection reset"));
    assert_eq!(stored.summary, "Interrupted answer");
}

#[tokio::test]
async fn list_follows_latest_activity() {
    let repos = CoreFactory::in_memory().await.unwrap();
    let model = Arc::new(
        ScriptedModel::new()
            .with_reply_parts(&["one"])
            .with_reply_parts(&["two"]),
    );
    let service = ConversationService::new(repos.conversations.clone());
    let orchestrator =
        ChatOrchestrator::new(model, repos.conversations.clone(), Arc::new(NoopEmitter::new()));

    let mut first = service.create_conversation().await.unwrap();
    let mut second = service.create_conversation().await.unwrap();
    orchestrator.run_turn(&mut second, "earlier").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    orchestrator.run_turn(&mut first, "later").await.unwrap();

    let ids: Vec<_> = service
        .list_conversations()
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn deleted_conversation_is_gone() {
    let repos = CoreFactory::in_memory().await.unwrap();
    let service = ConversationService::new(repos.conversations);

    let conv = service.create_conversation().await.unwrap();
    service.delete_conversation(conv.id).await.unwrap();

    assert!(service.get_conversation(conv.id).await.unwrap().is_none());
    assert!(service.list_conversations().await.unwrap().is_empty());
}

#[tokio::test]
async fn turn_after_delete_does_not_restore_conversation() {
    let repos = CoreFactory::in_memory().await.unwrap();
    let model = Arc::new(
        ScriptedModel::new()
            .with_reply_parts(&["An answer nobody will keep"])
            .with_summary_parts(&["Gone"]),
    );
    let service = ConversationService::new(repos.conversations.clone());
    let orchestrator =
        ChatOrchestrator::new(model, repos.conversations.clone(), Arc::new(NoopEmitter::new()));

    let mut conv = service.create_conversation().await.unwrap();
    service.delete_conversation(conv.id).await.unwrap();

    let outcome = orchestrator.run_turn(&mut conv, "hello").await.unwrap();

    assert!(matches!(outcome.reply, ReplyOutcome::Completed { .. }));
    assert_eq!(conv.messages.len(), 2);
    assert!(service.get_conversation(conv.id).await.unwrap().is_none());
    assert!(service.list_conversations().await.unwrap().is_empty());
}
