//! End-to-end executor tests
//!
//! `cargo test -p aries-task --test execute_test`

use aries_foundation::{Error, Result};
use aries_task::{
    Envelope, ExecutionDate, HandlerFactory, HandlerModule, HandlerRegistry, ModuleLoader,
    TaskExecutor, TaskHandler, TunnelConnector, TunnelHandle,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

// ============================================================================
// Fixtures
// ============================================================================

type Journal = Arc<Mutex<Vec<String>>>;

/// Echoes its arguments back and records that it ran
struct Recorder {
    journal: Journal,
}

#[async_trait]
impl TaskHandler for Recorder {
    async fn run(
        &self,
        task: Value,
        config: Value,
        execution_date: ExecutionDate,
    ) -> anyhow::Result<Value> {
        self.journal.lock().unwrap().push("run".to_string());
        Ok(json!({
            "task": task,
            "config": config,
            "executionDate": execution_date,
        }))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("quota exceeded for {account}")]
struct QuotaExceeded {
    account: String,
}

#[derive(Default)]
struct OverQuota;

#[async_trait]
impl TaskHandler for OverQuota {
    async fn run(&self, _: Value, _: Value, _: ExecutionDate) -> anyhow::Result<Value> {
        Err(QuotaExceeded {
            account: "acme".to_string(),
        }
        .into())
    }
}

struct JournalTunnel {
    journal: Journal,
    fail: bool,
    opened: AtomicUsize,
}

#[async_trait]
impl TunnelConnector for JournalTunnel {
    async fn open(&self, vpn_connection: &Value) -> Result<TunnelHandle> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.journal
            .lock()
            .unwrap()
            .push(format!("tunnel {}", vpn_connection));
        if self.fail {
            Err(Error::Tunnel("handshake failed".to_string()))
        } else {
            Ok(TunnelHandle::detached())
        }
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}

/// Counts error-level events and completion lines
#[derive(Clone, Default)]
struct LogCounter {
    errors: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
}

impl LogCounter {
    fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        let mut message = MessageVisitor::default();
        event.record(&mut message);
        if message.0 == "Finished executing task." {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `execute` with a counting subscriber installed for this thread
async fn execute_counted(
    h: &Harness,
    repo: &str,
    args: &[&str],
) -> (Result<Envelope>, LogCounter) {
    let counter = LogCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let result = h.executor.execute(Some(Path::new(repo)), args).await;
    (result, counter)
}

struct Harness {
    executor: TaskExecutor,
    journal: Journal,
    tunnel: Arc<JournalTunnel>,
}

fn harness(tunnel_fails: bool) -> Harness {
    let journal: Journal = Arc::default();

    let mut registry = HandlerRegistry::new();
    let recorder_journal = Arc::clone(&journal);
    registry.register(
        "export-users",
        HandlerFactory::new(move || Recorder {
            journal: Arc::clone(&recorder_journal),
        })
        .with_name("Export users"),
    );
    registry.register(
        "billing",
        HandlerModule::new(HandlerFactory::of::<OverQuota>()),
    );

    let tunnel = Arc::new(JournalTunnel {
        journal: Arc::clone(&journal),
        fail: tunnel_fails,
        opened: AtomicUsize::new(0),
    });

    let executor = TaskExecutor::new(ModuleLoader::new(registry))
        .with_tunnel(Arc::clone(&tunnel) as Arc<dyn TunnelConnector>);

    Harness {
        executor,
        journal,
        tunnel,
    }
}

fn journal(h: &Harness) -> Vec<String> {
    h.journal.lock().unwrap().clone()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_execute_returns_envelope() {
    let h = harness(false);

    let envelope = h
        .executor
        .execute(
            Some(Path::new("repos/export-users")),
            &["\"hi\"", "{\"a\":1}", "2024-01-01"],
        )
        .await
        .unwrap();

    assert_eq!(
        envelope.input,
        json!({
            "task": "hi",
            "config": {"a": 1},
            "executionDate": "2024-01-01T00:00:00.000Z",
        })
    );
    assert_eq!(h.tunnel.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_date_reaches_handler() {
    let h = harness(false);

    let envelope = h
        .executor
        .execute(Some(Path::new("export-users")), &["plain", "plain", "not-a-date"])
        .await
        .unwrap();

    assert_eq!(envelope.input["task"], json!("plain"));
    assert_eq!(envelope.input["config"], json!("plain"));
    assert_eq!(envelope.input["executionDate"], Value::Null);
}

#[tokio::test]
async fn test_tunnel_opens_before_handler() {
    let h = harness(false);
    let config = r#"{"connection": {"vpnConnection": "office"}}"#;

    h.executor
        .execute(Some(Path::new("export-users")), &["t", config, "2024-01-01"])
        .await
        .unwrap();

    assert_eq!(journal(&h), vec!["tunnel \"office\"", "run"]);
}

#[tokio::test]
async fn test_tunnel_failure_skips_handler() {
    let h = harness(true);
    let config = r#"{"connection": {"vpnConnection": {"host": "10.0.0.1"}}}"#;

    let err = h
        .executor
        .execute(Some(Path::new("export-users")), &["t", config, "2024-01-01"])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Tunnel(msg) if msg == "handshake failed"));
    assert_eq!(h.tunnel.opened.load(Ordering::SeqCst), 1);
    assert!(!journal(&h).contains(&"run".to_string()));
}

#[tokio::test]
async fn test_handler_error_is_returned_unchanged_and_logged_once() {
    let h = harness(false);

    let (result, logs) = execute_counted(&h, "billing", &["t", "{}", "2024-01-01"]).await;
    let err = result.unwrap_err();

    assert_eq!(err.to_string(), "quota exceeded for acme");
    let original = err
        .as_task_error()
        .and_then(|e| e.downcast_ref::<QuotaExceeded>())
        .expect("handler error should pass through");
    assert_eq!(original.account, "acme");
    assert_eq!(logs.errors(), 1);
    assert_eq!(logs.finished(), 1);
}

#[tokio::test]
async fn test_success_logs_completion_without_errors() {
    let h = harness(false);

    let (result, logs) = execute_counted(&h, "export-users", &["t", "{}", "2024-01-01"]).await;

    assert!(result.is_ok());
    assert_eq!(logs.errors(), 0);
    assert_eq!(logs.finished(), 1);
}

#[tokio::test]
async fn test_tunnel_failure_logged_once_with_completion() {
    let h = harness(true);
    let config = r#"{"connection": {"vpnConnection": "office"}}"#;

    let (result, logs) = execute_counted(&h, "export-users", &["t", config, "2024-01-01"]).await;

    assert!(matches!(result, Err(Error::Tunnel(_))));
    assert_eq!(logs.errors(), 1);
    assert_eq!(logs.finished(), 1);
}

#[tokio::test]
async fn test_unknown_module_logged_once_with_completion() {
    let h = harness(false);

    let (result, logs) = execute_counted(&h, "does-not-exist", &["t", "{}", "2024-01-01"]).await;

    assert!(matches!(result, Err(Error::ModuleNotFound(_))));
    assert_eq!(logs.errors(), 1);
    assert_eq!(logs.finished(), 1);
}

#[tokio::test]
async fn test_wrong_arity_fails_before_handler() {
    let h = harness(false);

    let err = h
        .executor
        .execute(Some(Path::new("export-users")), &["t", "{}"])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidArity {
            expected: 3,
            actual: 2
        }
    ));
    assert!(journal(&h).is_empty());
}

#[tokio::test]
async fn test_unknown_module() {
    let h = harness(false);

    let err = h
        .executor
        .execute(Some(Path::new("does-not-exist")), &["t", "{}", "2024-01-01"])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ModuleNotFound(_)));
}
