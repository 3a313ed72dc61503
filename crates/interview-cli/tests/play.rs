use std::io::Cursor;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use interview_cli::cmd::run::play;
use interview_cli::render::{RendererRegistry, Terminal};
use interview_fields::{FieldRegistry, FormValue};
use interview_session::{
    HttpTransport, InterviewStateResponse, InterviewStateStore, MemoryStorage, SessionConfig,
};

fn store_for(server: &MockServer) -> InterviewStateStore {
    let config = SessionConfig {
        base_url: Some(format!("{}/", server.uri())),
        request_timeout_secs: 5,
        ..SessionConfig::default()
    };
    let transport = HttpTransport::new(&config).expect("transport should build");
    InterviewStateStore::with_config(&config, Arc::new(MemoryStorage::new()), Arc::new(transport))
}

fn question() -> InterviewStateResponse {
    serde_json::from_value(json!({
        "state": "s1",
        "update_url": "update",
        "content": {
            "type": "question",
            "title": "About you",
            "fields": { "name": { "type": "text", "label": "Name" } }
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn rejected_answers_redisplay_the_step() {
    let server = MockServer::start().await;
    let body = json!({ "state": "s1", "responses": { "name": "Ada" } });
    Mock::given(method("POST"))
        .and(path("/update"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(422).set_body_string("try again"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/update"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "s2",
            "target_url": "https://example.com/done",
            "complete": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = store_for(&server);
    let record = store.start_interview(question(), None).await.unwrap();
    let renderers = RendererRegistry::with_defaults();
    let fields = FieldRegistry::with_defaults();

    let mut output = Vec::new();
    let last = {
        let mut terminal = Terminal::new(Cursor::new("\nAda\n\n"), &mut output);
        play(&mut store, record, &mut terminal, &renderers, &fields)
            .await
            .expect("interview should complete")
    };

    assert_eq!(last.response.target_url(), Some("https://example.com/done"));
    let answered = store.get_record("s1").expect("answered record is kept");
    assert_eq!(answered.field_values["name"], FormValue::from("Ada"));

    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains("Name is a required field"));
    assert!(printed.contains("Name [Ada]: "));
    assert!(printed.contains("https://example.com/done"));
    assert_eq!(printed.matches("About you").count(), 2);
}

#[tokio::test]
async fn exit_step_stops_without_prompting() {
    let server = MockServer::start().await;
    let mut store = store_for(&server);
    let exit: InterviewStateResponse = serde_json::from_value(json!({
        "state": "e1",
        "content": { "type": "exit", "title": "Not eligible", "description": "Sorry." }
    }))
    .unwrap();
    let record = store.start_interview(exit, None).await.unwrap();

    let mut output = Vec::new();
    {
        let mut terminal = Terminal::new(Cursor::new(""), &mut output);
        play(
            &mut store,
            record,
            &mut terminal,
            &RendererRegistry::with_defaults(),
            &FieldRegistry::with_defaults(),
        )
        .await
        .expect("exit step ends the interview");
    }
    let printed = String::from_utf8(output).unwrap();
    assert_eq!(printed, "Not eligible\nSorry.\n");
}

#[tokio::test]
async fn closed_input_aborts_the_step() {
    let server = MockServer::start().await;
    let mut store = store_for(&server);
    let record = store.start_interview(question(), None).await.unwrap();

    let mut output = Vec::new();
    let mut terminal = Terminal::new(Cursor::new(""), &mut output);
    let err = play(
        &mut store,
        record,
        &mut terminal,
        &RendererRegistry::with_defaults(),
        &FieldRegistry::with_defaults(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Input closed"));
}
