//! Integration tests for the session controller lifecycle.
//!
//! Drives the controller through whole training attempts with a fake voice
//! platform, covering the end-trigger races, the duration cap, and history
//! persistence through the SQLite store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use vishing_trainer::config::{DatabaseConfig, SessionConfig};
use vishing_trainer::error::ProviderResult;
use vishing_trainer::provider::{CallSetup, VoiceConnector, VoiceEvent, VoiceSession};
use vishing_trainer::scenario::{ScenarioType, UserContext};
use vishing_trainer::session::{
    EndReason, SessionController, Speaker, TrainingStatus,
};
use vishing_trainer::storage::{HistoryStore, MemoryHistory, SqliteHistory};

struct FakeVoice;

#[async_trait]
impl VoiceSession for FakeVoice {
    async fn end(&self) -> ProviderResult<()> {
        Ok(())
    }
}

/// Connects immediately and emits a `Connected` event.
struct FakeConnector;

#[async_trait]
impl VoiceConnector for FakeConnector {
    async fn connect(
        &self,
        _setup: CallSetup,
        events: mpsc::Sender<VoiceEvent>,
    ) -> ProviderResult<Arc<dyn VoiceSession>> {
        events.send(VoiceEvent::Connected).await.ok();
        Ok(Arc::new(FakeVoice))
    }
}

fn call_setup() -> CallSetup {
    CallSetup {
        signed_url: "wss://example.invalid/call".to_string(),
        dynamic_variables: Default::default(),
    }
}

async fn start_session(controller: &SessionController) {
    controller
        .prepare(ScenarioType::Prosecutor, UserContext::default())
        .expect("prepare from idle");
    controller
        .start_call(&FakeConnector, call_setup())
        .await
        .expect("fake platform connects");
    // Let the event pump deliver Connected.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert_eq!(controller.status(), TrainingStatus::InCall);
}

#[tokio::test(start_paused = true)]
async fn test_classified_end_to_end_flow() {
    let history: Arc<dyn HistoryStore> = Arc::new(MemoryHistory::new());
    let controller = SessionController::new(SessionConfig::default(), Arc::clone(&history));
    start_session(&controller).await;

    controller
        .handle_event(VoiceEvent::Message {
            speaker: Speaker::Persona,
            text: "여보세요. 서울중앙지방검찰청입니다.".to_string(),
        })
        .await;
    controller
        .handle_event(VoiceEvent::Message {
            speaker: Speaker::Trainee,
            text: "끊겠습니다.".to_string(),
        })
        .await;
    controller
        .handle_event(VoiceEvent::Message {
            speaker: Speaker::Persona,
            text: r#"네, 알겠습니다. [END_SCENARIO:{"reached_stage":1,"termination_reason":"user_rejected"}]"#.to_string(),
        })
        .await;

    // Classified end fires after the grace delay.
    tokio::time::sleep(std::time::Duration::from_millis(2100)).await;
    assert_eq!(controller.status(), TrainingStatus::Debriefing);

    let session = controller.session().unwrap();
    assert_eq!(session.termination_reason, Some(EndReason::UserRejected));
    assert_eq!(session.reached_stage, 1);
    assert_eq!(controller.transcript().len(), 3);

    let record = controller.complete().await.unwrap();
    assert_eq!(record.reached_stage, 1);
    assert_eq!(history.load().await.unwrap(), vec![record]);
}

#[tokio::test(start_paused = true)]
async fn test_tag_and_disconnect_race_yields_one_end() {
    let controller =
        SessionController::new(SessionConfig::default(), Arc::new(MemoryHistory::new()));
    start_session(&controller).await;

    controller
        .handle_event(VoiceEvent::Message {
            speaker: Speaker::Persona,
            text: "[END_SCENARIO]".to_string(),
        })
        .await;
    // The platform disconnect lands while the grace delay is still pending.
    controller.handle_event(VoiceEvent::Disconnected).await;

    tokio::time::sleep(std::time::Duration::from_millis(2100)).await;

    // Disconnect won the latch; the delayed tag end was a no-op.
    let session = controller.session().unwrap();
    assert_eq!(session.termination_reason, Some(EndReason::CallEnded));
    assert!(session.ended_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_duration_cap_is_the_backstop() {
    let config = SessionConfig {
        max_call_duration_seconds: 10,
        ..Default::default()
    };
    let controller = SessionController::new(config, Arc::new(MemoryHistory::new()));
    start_session(&controller).await;

    // No tag, no disconnect, no hangup: only the wall clock moves.
    tokio::time::sleep(std::time::Duration::from_secs(11)).await;

    assert_eq!(controller.status(), TrainingStatus::Debriefing);
    let session = controller.session().unwrap();
    assert_eq!(
        session.termination_reason,
        Some(EndReason::MaxDurationReached)
    );
    assert_eq!(session.duration_seconds, Some(10));
}

#[tokio::test(start_paused = true)]
async fn test_user_hangup_wins_over_later_cap() {
    let config = SessionConfig {
        max_call_duration_seconds: 10,
        ..Default::default()
    };
    let controller = SessionController::new(config, Arc::new(MemoryHistory::new()));
    start_session(&controller).await;

    tokio::time::sleep(std::time::Duration::from_millis(3500)).await;
    controller.end_call().await;
    tokio::time::sleep(std::time::Duration::from_secs(20)).await;

    let session = controller.session().unwrap();
    assert_eq!(session.termination_reason, Some(EndReason::UserEnded));
    assert_eq!(session.duration_seconds, Some(3));
}

#[tokio::test]
async fn test_mid_call_disconnect_keeps_partial_session() {
    let controller =
        SessionController::new(SessionConfig::default(), Arc::new(MemoryHistory::new()));
    start_session(&controller).await;

    controller
        .handle_event(VoiceEvent::Message {
            speaker: Speaker::Persona,
            text: "여보세요".to_string(),
        })
        .await;
    controller.handle_event(VoiceEvent::Disconnected).await;

    // Partial sessions are recorded, never dropped.
    let record = controller.complete().await.unwrap();
    assert_eq!(record.reached_stage, 0);
    assert_eq!(controller.status(), TrainingStatus::Completed);
}

#[tokio::test]
async fn test_history_survives_store_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_config = DatabaseConfig {
        path: dir.path().join("training.db"),
        max_connections: 2,
    };
    // Real clock here (SQLite does real I/O), so keep the grace delay short.
    let session_config = SessionConfig {
        end_scenario_delay_ms: 10,
        ..Default::default()
    };

    {
        let history = Arc::new(SqliteHistory::new(&db_config).await.unwrap());
        let controller = SessionController::new(session_config, history);
        start_session(&controller).await;
        controller
            .handle_event(VoiceEvent::Message {
                speaker: Speaker::Persona,
                text: r#"[END_SCENARIO:{"reached_stage":5,"termination_reason":"user_fooled"}]"#
                    .to_string(),
            })
            .await;
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        controller.complete().await.unwrap();
    }

    // Fresh pool over the same file sees the record.
    let reopened = SqliteHistory::new(&db_config).await.unwrap();
    let records = reopened.load().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].scenario_type, ScenarioType::Prosecutor);
    assert_eq!(records[0].reached_stage, 5);
}

#[tokio::test]
async fn test_next_attempt_starts_clean_after_completion() {
    let controller =
        SessionController::new(SessionConfig::default(), Arc::new(MemoryHistory::new()));
    start_session(&controller).await;
    controller
        .handle_event(VoiceEvent::Message {
            speaker: Speaker::Persona,
            text: "첫 번째 통화".to_string(),
        })
        .await;
    controller.handle_event(VoiceEvent::Disconnected).await;
    let first = controller.complete().await.unwrap();

    // prepare from completed resets transcript, timer, and the end latch.
    start_session(&controller).await;
    let second = controller.session().unwrap();
    assert_ne!(first.id, second.id);
    assert!(controller.transcript().is_empty());
    assert_eq!(controller.elapsed_seconds(), 0);

    controller.handle_event(VoiceEvent::Disconnected).await;
    assert_eq!(controller.status(), TrainingStatus::Debriefing);
}
