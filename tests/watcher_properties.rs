//! Behavioral tests for the watch loop: de-duplication, cooldown episodes,
//! error-notification coalescing and `/status` access control.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mintwatch::anyhow;
use mintwatch::config::TelegramConfig;
use mintwatch::config::WatcherConfig;
use mintwatch::handler::telegram::commands::dispatch_update;
use mintwatch::handler::telegram::Notification;
use mintwatch::handler::telegram::Notify;
use mintwatch::model::ParsedInstruction;
use mintwatch::model::TokenCreationEvent;
use mintwatch::rpc::ChainRpc;
use mintwatch::watcher::TickOutcome;
use mintwatch::watcher::Watcher;
use mockall::mock;
use mockall::Sequence;
use pretty_assertions::assert_eq;
use serde_json::json;
use solana_pubkey::Pubkey;
use tokio::sync::Mutex;

mock! {
    pub Chain {}

    #[async_trait]
    impl ChainRpc for Chain {
        async fn recent_signatures(&self, account: &Pubkey, limit: usize) -> mintwatch::Result<Vec<String>>;
        async fn parsed_transaction(&self, signature: &str) -> mintwatch::Result<Option<Vec<ParsedInstruction>>>;
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<std::sync::Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    fn count_of(&self, predicate: impl Fn(&Notification) -> bool) -> usize {
        self.sent().iter().filter(|n| predicate(n)).count()
    }
}

#[async_trait]
impl Notify for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> mintwatch::Result<()> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

fn test_config() -> WatcherConfig {
    WatcherConfig {
        signature_limit: 5,
        cooldown_secs: 120,
        error_notify_secs: 60,
        ..Default::default()
    }
}

fn watcher_with(rpc: MockChain, notifier: &RecordingNotifier) -> Watcher {
    Watcher::new(
        &test_config(),
        Pubkey::new_unique(),
        Arc::new(rpc),
        Arc::new(notifier.clone()),
        None,
    )
}

fn transfer_instruction() -> ParsedInstruction {
    ParsedInstruction {
        program: "system".to_string(),
        parsed_type: Some("transfer".to_string()),
        info: json!({"lamports": 100}),
    }
}

fn init_mint_instruction(mint: &str) -> ParsedInstruction {
    ParsedInstruction {
        program: "spl-token".to_string(),
        parsed_type: Some("initializeMint".to_string()),
        info: json!({"mint": mint, "decimals": 6}),
    }
}

#[tokio::test]
async fn seen_signatures_are_never_refetched() {
    let mut rpc = MockChain::new();
    rpc.expect_recent_signatures()
        .times(2)
        .returning(|_, _| Ok(vec!["A".to_string()]));
    // Enforced by mockall: a second fetch for "A" fails the test.
    rpc.expect_parsed_transaction()
        .times(1)
        .returning(|_| Ok(Some(vec![transfer_instruction()])));

    let notifier = RecordingNotifier::default();
    let mut watcher = watcher_with(rpc, &notifier);

    assert_eq!(
        watcher.tick().await,
        TickOutcome::Completed { new_signatures: 1, events: vec![] }
    );
    assert_eq!(
        watcher.tick().await,
        TickOutcome::Completed { new_signatures: 0, events: vec![] }
    );
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn invisible_transaction_is_marked_seen_and_not_retried() {
    let mut rpc = MockChain::new();
    rpc.expect_recent_signatures()
        .times(2)
        .returning(|_, _| Ok(vec!["A".to_string()]));
    rpc.expect_parsed_transaction().times(1).returning(|_| Ok(None));

    let notifier = RecordingNotifier::default();
    let mut watcher = watcher_with(rpc, &notifier);

    assert_eq!(
        watcher.tick().await,
        TickOutcome::Completed { new_signatures: 1, events: vec![] }
    );
    // Already seen: the missing transaction is not fetched again.
    assert_eq!(
        watcher.tick().await,
        TickOutcome::Completed { new_signatures: 0, events: vec![] }
    );
}

#[tokio::test]
async fn two_signature_scenario_emits_one_notification() {
    let mut rpc = MockChain::new();
    rpc.expect_recent_signatures()
        .times(2)
        .returning(|_, _| Ok(vec!["A".to_string(), "B".to_string()]));
    rpc.expect_parsed_transaction().times(2).returning(|signature| {
        match signature {
            "A" => Ok(Some(vec![transfer_instruction()])),
            "B" => Ok(Some(vec![init_mint_instruction("Mx1")])),
            other => panic!("unexpected signature {other}"),
        }
    });

    let notifier = RecordingNotifier::default();
    let mut watcher = watcher_with(rpc, &notifier);

    assert_eq!(watcher.tick().await, TickOutcome::Completed {
        new_signatures: 2,
        events: vec![TokenCreationEvent { mint: "Mx1".to_string() }],
    });

    let sent = notifier.sent();
    assert_eq!(sent, vec![Notification::TokenCreated { mint: "Mx1".to_string() }]);
    let rendered = sent[0].render();
    assert!(rendered.contains("https://pump.fun/Mx1"));
    assert!(rendered.contains("https://solscan.io/token/Mx1"));

    // Second tick: both signatures in the seen set, nothing re-notified.
    assert_eq!(
        watcher.tick().await,
        TickOutcome::Completed { new_signatures: 0, events: vec![] }
    );
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_enters_cooldown_with_a_single_notification() {
    let mut seq = Sequence::new();
    let mut rpc = MockChain::new();
    rpc.expect_recent_signatures()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Err(anyhow!("HTTP status client error (429 Too Many Requests)")));
    // Only reachable after the cooldown window has elapsed.
    rpc.expect_recent_signatures()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(vec![]));

    let notifier = RecordingNotifier::default();
    let mut watcher = watcher_with(rpc, &notifier);

    assert_eq!(watcher.tick().await, TickOutcome::Failed { rate_limited: true });

    // Suppressed ticks make no upstream call and send nothing further.
    assert!(matches!(watcher.tick().await, TickOutcome::CoolingDown { .. }));
    assert!(matches!(watcher.tick().await, TickOutcome::CoolingDown { .. }));
    assert_eq!(notifier.count_of(|n| matches!(n, Notification::RateLimited { .. })), 1);

    tokio::time::advance(Duration::from_secs(121)).await;
    assert_eq!(
        watcher.tick().await,
        TickOutcome::Completed { new_signatures: 0, events: vec![] }
    );
    assert_eq!(notifier.count_of(|n| matches!(n, Notification::RateLimited { .. })), 1);
}

#[tokio::test(start_paused = true)]
async fn generic_failures_within_window_send_one_error_notification() {
    let mut rpc = MockChain::new();
    rpc.expect_recent_signatures()
        .times(3)
        .returning(|_, _| Err(anyhow!("connection reset by peer")));

    let notifier = RecordingNotifier::default();
    let mut watcher = watcher_with(rpc, &notifier);

    assert_eq!(watcher.tick().await, TickOutcome::Failed { rate_limited: false });
    assert_eq!(watcher.tick().await, TickOutcome::Failed { rate_limited: false });
    assert_eq!(notifier.count_of(|n| matches!(n, Notification::Error { .. })), 1);

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(watcher.tick().await, TickOutcome::Failed { rate_limited: false });
    assert_eq!(notifier.count_of(|n| matches!(n, Notification::Error { .. })), 2);
}

fn status_update(chat_id: i64) -> mintwatch::handler::telegram::api::TgUpdate {
    serde_json::from_value(json!({
        "update_id": 1,
        "message": {"chat": {"id": chat_id}, "text": "/status"}
    }))
    .unwrap()
}

#[tokio::test]
async fn status_from_unknown_chat_is_ignored() {
    let notifier = RecordingNotifier::default();
    let notify: Arc<dyn Notify> = Arc::new(notifier.clone());
    let watcher = Arc::new(Mutex::new(watcher_with(MockChain::new(), &notifier)));
    let telegram_config = TelegramConfig {
        chat_id: "42".to_string(),
        ..Default::default()
    };

    dispatch_update(&status_update(99), &telegram_config, &watcher, &notify).await;

    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn status_from_configured_chat_reports_uptime_and_wallet() {
    let notifier = RecordingNotifier::default();
    let notify: Arc<dyn Notify> = Arc::new(notifier.clone());

    let wallet = Pubkey::new_unique();
    let watcher = Arc::new(Mutex::new(Watcher::new(
        &test_config(),
        wallet,
        Arc::new(MockChain::new()),
        notify.clone(),
        None,
    )));
    let telegram_config = TelegramConfig {
        chat_id: "42".to_string(),
        ..Default::default()
    };

    dispatch_update(&status_update(42), &telegram_config, &watcher, &notify).await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        Notification::Status(status) => {
            assert!(status.online);
            assert_eq!(status.wallet, wallet.to_string());
        },
        other => panic!("expected status reply, got {other:?}"),
    }
    assert!(sent[0].render().contains(&wallet.to_string()));
}
