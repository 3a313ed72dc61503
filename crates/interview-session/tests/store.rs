use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use interview_fields::{FormValue, FormValues};
use interview_session::{
    InterviewStateRecord, InterviewStateResponse, InterviewStateStore, InterviewTransport,
    MemoryStorage, SessionConfig, SessionError, SessionStorage, UpdateRequest,
};

#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<InterviewStateResponse, SessionError>>>,
    requests: Mutex<Vec<(String, UpdateRequest)>>,
}

impl ScriptedTransport {
    fn with_replies(replies: Vec<Value>) -> Arc<Self> {
        let transport = Self::default();
        transport
            .replies
            .lock()
            .expect("lock")
            .extend(replies.into_iter().map(|reply| Ok(response(reply))));
        Arc::new(transport)
    }

    fn push_error(&self, error: SessionError) {
        self.replies.lock().expect("lock").push_back(Err(error));
    }

    fn requests(&self) -> Vec<(String, UpdateRequest)> {
        self.requests.lock().expect("lock").clone()
    }
}

#[async_trait]
impl InterviewTransport for ScriptedTransport {
    async fn post_update(
        &self,
        update_url: &str,
        request: &UpdateRequest,
    ) -> Result<InterviewStateResponse, SessionError> {
        self.requests
            .lock()
            .expect("lock")
            .push((update_url.to_string(), request.clone()));
        self.replies
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(SessionError::Protocol("script exhausted".into())))
    }
}

fn response(value: Value) -> InterviewStateResponse {
    serde_json::from_value(value).expect("fixture should deserialize")
}

fn pending(state: &str, update_url: &str) -> Value {
    json!({ "state": state, "update_url": update_url, "content": null })
}

fn question(state: &str) -> Value {
    json!({
        "state": state,
        "update_url": "/update",
        "content": {
            "type": "question",
            "title": "Name",
            "fields": { "name": { "type": "text" } }
        }
    })
}

fn complete_record(state: &str) -> InterviewStateRecord {
    InterviewStateRecord::new(
        response(json!({ "state": state, "target_url": "https://example.com", "complete": true })),
        FormValues::new(),
        Map::new(),
    )
}

fn store(storage: &MemoryStorage, transport: Arc<ScriptedTransport>) -> InterviewStateStore {
    InterviewStateStore::new(Arc::new(storage.clone()), transport)
}

#[test]
fn capacity_evicts_the_oldest_record() {
    let storage = MemoryStorage::new();
    let mut store = store(&storage, ScriptedTransport::with_replies(vec![]));
    for i in 0..101 {
        store.save_record(complete_record(&format!("state-{i}")));
    }
    assert_eq!(store.len(), 100);
    assert!(store.get_record("state-0").is_none());
    assert!(store.get_record("state-1").is_some());
    assert!(store.get_record("state-100").is_some());
    assert_eq!(
        store.records().next().map(|record| record.response.state()),
        Some("state-1")
    );
}

#[test]
fn overwrite_keeps_position() {
    let storage = MemoryStorage::new();
    let mut store = store(&storage, ScriptedTransport::with_replies(vec![]));
    store.save_record(complete_record("a"));
    store.save_record(complete_record("b"));
    let mut replacement = complete_record("a");
    replacement
        .metadata
        .insert("updated".into(), Value::Bool(true));
    store.save_record(replacement);

    let states: Vec<_> = store.records().map(|r| r.response.state().to_string()).collect();
    assert_eq!(states, vec!["a", "b"]);
    assert_eq!(store.get_record("a").expect("a").metadata["updated"], true);
}

#[test]
fn reload_restores_every_record() {
    let storage = MemoryStorage::new();
    let mut first = store(&storage, ScriptedTransport::with_replies(vec![]));
    let mut ids = Vec::new();
    for i in 0..5 {
        let mut record = complete_record(&format!("{i}{}", "s".repeat(70)));
        record
            .field_values
            .insert("n".into(), FormValue::from(i as i64));
        ids.push(first.save_record(record));
    }

    let second = store(&storage, ScriptedTransport::with_replies(vec![]));
    assert_eq!(second.len(), first.len());
    for id in &ids {
        assert_eq!(second.get_record(id), first.get_record(id));
    }
}

#[test]
fn corrupt_slot_starts_empty() {
    let storage = MemoryStorage::new();
    storage
        .set_item("interview-state-v1", "{not json")
        .expect("memory write");
    let store = store(&storage, ScriptedTransport::with_replies(vec![]));
    assert!(store.is_empty());
}

#[test]
fn configured_prefix_length_keys_records() {
    let storage = MemoryStorage::new();
    let config = SessionConfig {
        id_prefix_len: 8,
        ..SessionConfig::default()
    };
    let mut store = InterviewStateStore::with_config(
        &config,
        Arc::new(storage.clone()),
        ScriptedTransport::with_replies(vec![]),
    );
    let record = complete_record("abcdefgh-first");
    let id = store.save_record(record.clone());
    assert_eq!(id, "abcdefgh");
    assert_eq!(store.record_id(&record), id);
    assert_eq!(store.get_record(&id), Some(&record));
    assert!(store.get_record("abcdefgh-first").is_none());

    store.save_record(complete_record("abcdefgh-second"));
    assert_eq!(store.len(), 1);
    assert_eq!(
        store.get_record(&id).map(|r| r.response.state()),
        Some("abcdefgh-second")
    );
}

#[test]
fn configured_capacity_and_key_apply() {
    let storage = MemoryStorage::new();
    let config = SessionConfig {
        storage_key: "custom".into(),
        max_records: 2,
        ..SessionConfig::default()
    };
    let mut store = InterviewStateStore::with_config(
        &config,
        Arc::new(storage.clone()),
        ScriptedTransport::with_replies(vec![]),
    );
    for state in ["a", "b", "c"] {
        store.save_record(complete_record(state));
    }
    assert_eq!(store.len(), 2);
    assert!(storage.get_item("custom").expect("read").is_some());
    assert!(storage.get_item("interview-state-v1").expect("read").is_none());
}

#[test]
fn persisted_layout() {
    let storage = MemoryStorage::new();
    let mut store = store(&storage, ScriptedTransport::with_replies(vec![]));
    let mut values = FormValues::new();
    values.insert("name".into(), FormValue::from("Ada"));
    let mut metadata = Map::new();
    metadata.insert("source".into(), json!("test"));
    store.save_record(InterviewStateRecord::new(
        response(pending("s1", "/update")),
        values,
        metadata,
    ));

    let raw = storage
        .get_item("interview-state-v1")
        .expect("read")
        .expect("slot written");
    insta::assert_snapshot!(raw, @r#"[{"r":{"state":"s1","update_url":"/update","content":null},"v":{"name":"Ada"},"m":{"source":"test"}}]"#);
}

#[tokio::test]
async fn start_skips_steps_without_content() {
    let storage = MemoryStorage::new();
    let transport = ScriptedTransport::with_replies(vec![
        pending("hop-1", "/hop/2"),
        question("hop-2"),
    ]);
    let mut store = store(&storage, transport.clone());

    let mut metadata = Map::new();
    metadata.insert("origin".into(), json!("cli"));
    let record = store
        .start_interview(response(pending("hop-0", "/hop/1")), Some(metadata))
        .await
        .expect("interview should start");

    assert_eq!(record.response.state(), "hop-2");
    assert!(record.response.question().is_some());
    assert_eq!(record.metadata["origin"], "cli");

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0, "/hop/1");
    assert_eq!(requests[0].1.state, "hop-0");
    assert_eq!(requests[1].0, "/hop/2");
    assert!(requests.iter().all(|(_, req)| req.responses.is_none() && req.button.is_none()));
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn start_with_content_makes_no_requests() {
    let storage = MemoryStorage::new();
    let transport = ScriptedTransport::with_replies(vec![]);
    let mut store = store(&storage, transport.clone());
    let record = store
        .start_interview(response(question("ready")), None)
        .await
        .expect("interview should start");
    assert_eq!(record.response.state(), "ready");
    assert!(transport.requests().is_empty());
    assert!(store.get_record("ready").is_some());
}

#[tokio::test]
async fn update_posts_answers_and_drops_them_from_the_new_record() {
    let storage = MemoryStorage::new();
    let transport = ScriptedTransport::with_replies(vec![
        pending("after", "/next"),
        json!({ "state": "done", "target_url": "https://example.com/end", "complete": true }),
    ]);
    let mut store = store(&storage, transport.clone());
    let mut current =
        InterviewStateRecord::new(response(question("q1")), FormValues::new(), Map::new());
    current.metadata.insert("k".into(), json!(1));
    store.save_record(current.clone());

    let mut answers = FormValues::new();
    answers.insert("name".into(), FormValue::from("Ada"));
    let finished = store
        .update_interview(&current, Some(answers.clone()), Some(0))
        .await
        .expect("update should succeed");

    assert_eq!(finished.response.target_url(), Some("https://example.com/end"));
    assert!(finished.field_values.is_empty());
    assert_eq!(finished.metadata["k"], 1);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0, "/update");
    assert_eq!(requests[0].1.responses.as_ref(), Some(&answers));
    assert_eq!(requests[0].1.button, Some(0));
    assert_eq!(requests[1].0, "/next");
    assert_eq!(requests[1].1.responses, None);
}

#[tokio::test]
async fn rejection_is_recoverable_and_keeps_the_store() {
    let storage = MemoryStorage::new();
    let transport = ScriptedTransport::with_replies(vec![]);
    transport.push_error(SessionError::Rejected {
        status: 422,
        body: "{}".into(),
    });
    let mut store = store(&storage, transport.clone());
    let current =
        InterviewStateRecord::new(response(question("q1")), FormValues::new(), Map::new());
    store.save_record(current.clone());

    let err = store
        .update_interview(&current, Some(FormValues::new()), None)
        .await
        .expect_err("server rejects");
    assert!(err.is_recoverable());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn missing_update_url_is_a_protocol_error() {
    let storage = MemoryStorage::new();
    let transport = ScriptedTransport::with_replies(vec![]);
    let mut store = store(&storage, transport.clone());
    let err = store
        .start_interview(response(json!({ "state": "stuck", "content": null })), None)
        .await
        .expect_err("no update_url");
    assert!(matches!(err, SessionError::Protocol(_)));
    assert!(!err.is_recoverable());
    assert!(transport.requests().is_empty());
}
