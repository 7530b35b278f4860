//! End-to-end delivery against an in-process collection endpoint.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::put;
use axum::Router;
use lazybug_core::transport::{decompress_payload, WireMessage};
use lazybug_core::{
    AppMetadata, Error, FeedbackClient, FeedbackOutbox, FeedbackStore, HttpFeedbackClient,
    JobQueue, LazyBugConfig, NewFeedback, SqliteStore,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[derive(Clone, Default)]
struct Collector {
    received: Arc<Mutex<Vec<WireMessage>>>,
    content_types: Arc<Mutex<Vec<String>>>,
    scripted: Arc<Mutex<VecDeque<StatusCode>>>,
}

impl Collector {
    fn respond_with(&self, statuses: &[StatusCode]) {
        self.scripted.lock().unwrap().extend(statuses.iter().copied());
    }

    fn received(&self) -> Vec<WireMessage> {
        self.received.lock().unwrap().clone()
    }
}

async fn collect(State(collector): State<Collector>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let status = collector
        .scripted
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or(StatusCode::CREATED);

    if let Some(content_type) = headers.get("content-type").and_then(|v| v.to_str().ok()) {
        collector
            .content_types
            .lock()
            .unwrap()
            .push(content_type.to_string());
    }

    let Ok(message) = decompress_payload(&body).and_then(|raw| WireMessage::decode(&raw)) else {
        return StatusCode::BAD_REQUEST;
    };
    if status.is_success() {
        collector.received.lock().unwrap().push(message);
    }
    status
}

async fn start_collector() -> (String, Collector) {
    let collector = Collector::default();
    let router = Router::new()
        .route("/feedbacks", put(collect))
        .with_state(collector.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), collector)
}

#[tokio::test]
async fn send_feedback_puts_compressed_wire_message() {
    let (base_url, collector) = start_collector().await;
    let client = HttpFeedbackClient::new(format!("{base_url}/")).unwrap();

    let meta = AppMetadata::for_app("Demo", "2.0").to_meta_bytes().unwrap();
    let record = NewFeedback::new("Button is misaligned", vec![0x89, 0x50, 0x4E, 0x47])
        .with_meta(meta.clone())
        .into_record()
        .unwrap();

    client.send_feedback(&record).await.unwrap();

    let received = collector.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].identifier, record.id.to_string());
    assert_eq!(received[0].content, "Button is misaligned");
    assert_eq!(received[0].snapshot, vec![0x89, 0x50, 0x4E, 0x47]);
    assert_eq!(received[0].meta.as_deref(), Some(meta.as_slice()));
    assert!(received[0].creation_date.ends_with('Z'));
    assert_eq!(
        collector.content_types.lock().unwrap().as_slice(),
        ["application/octet-stream"]
    );
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let (base_url, collector) = start_collector().await;
    collector.respond_with(&[StatusCode::SERVICE_UNAVAILABLE]);
    let client = HttpFeedbackClient::new(base_url).unwrap();
    let record = NewFeedback::new("Rejected", vec![1]).into_record().unwrap();

    let error = client.send_feedback(&record).await.unwrap_err();

    assert!(matches!(error, Error::Api { status: 503 }));
    assert!(error.is_retryable());
}

#[tokio::test]
async fn oversized_payload_never_reaches_the_network() {
    let (base_url, collector) = start_collector().await;
    let client = HttpFeedbackClient::new(base_url)
        .unwrap()
        .with_max_payload_bytes(Some(16));

    let record = NewFeedback::new("Large screenshot", vec![1; 512])
        .into_record()
        .unwrap();

    let error = client.send_feedback(&record).await.unwrap_err();

    assert!(matches!(error, Error::Compression(_)));
    assert!(collector.received().is_empty());
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpFeedbackClient::new(format!("http://{addr}")).unwrap();
    let record = NewFeedback::new("Offline", vec![1]).into_record().unwrap();

    assert!(matches!(
        client.send_feedback(&record).await,
        Err(Error::Network(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn outbox_delivers_and_keeps_rejected_records() {
    let (base_url, collector) = start_collector().await;
    let tmp = tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(tmp.path().join("outbox.db")).unwrap());

    let first = store
        .insert(NewFeedback::new("first", vec![1]))
        .await
        .unwrap();
    let second = store
        .insert(NewFeedback::new("second", vec![2]))
        .await
        .unwrap();

    collector.respond_with(&[StatusCode::INTERNAL_SERVER_ERROR]);
    let outbox = FeedbackOutbox::new(
        store.clone(),
        Arc::new(HttpFeedbackClient::new(base_url).unwrap()),
        JobQueue::new("feedback-sync", 1),
    );

    let report = outbox.sync_now().await.unwrap();
    assert_eq!(report.synced_count(), 1);
    assert_eq!(report.failed_count(), 1);
    assert!(matches!(
        report.first_error(),
        Some(Error::Api { status: 500 })
    ));

    let pending: Vec<_> = outbox
        .pending()
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(pending.len(), 1);
    assert!(pending[0] == first.id || pending[0] == second.id);

    let report = outbox.sync_now().await.unwrap();
    assert_eq!(report.synced_count(), 1);
    assert_eq!(outbox.pending_count().await.unwrap(), 0);

    let mut delivered: Vec<_> = collector
        .received()
        .into_iter()
        .map(|message| message.content)
        .collect();
    delivered.sort();
    assert_eq!(delivered, vec!["first".to_string(), "second".to_string()]);
}

#[tokio::test]
async fn outbox_open_reads_config() {
    let (base_url, collector) = start_collector().await;
    let tmp = tempdir().unwrap();
    let config = LazyBugConfig {
        base_url: Some(base_url),
        database_path: Some(tmp.path().join("lazybug.db")),
        ..LazyBugConfig::default()
    };

    let outbox = FeedbackOutbox::open(&config).unwrap();
    outbox
        .submit_feedback("From config", vec![7, 7])
        .await
        .unwrap();
    let report = outbox.sync_now().await.unwrap();
    while outbox.coordinator().is_running() {
        tokio::task::yield_now().await;
    }

    assert!(report.is_success());
    assert_eq!(outbox.pending_count().await.unwrap(), 0);
    assert_eq!(collector.received().len(), 1);
}
