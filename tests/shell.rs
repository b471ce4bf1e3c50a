//! Presentation shell tests against stub relays served on ephemeral ports.

use axum::{ routing::post, Json, Router, http::StatusCode };
use groqsage::models::chat::Role;
use groqsage::shell::{ self, ChatForm, RelayClient, Session, ShellError, SubmitOutcome };
use serde_json::{ json, Value };
use std::sync::{ Arc, Mutex };
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::time::Duration;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/chat", addr)
}

fn client(url: &str) -> RelayClient {
    RelayClient::new(url, Duration::from_secs(5)).unwrap()
}

fn reply_with(status: StatusCode, body: Value) -> (Router, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/chat",
        post(move || {
            let counter = counter.clone();
            let body = body.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (status, Json(body))
            }
        })
    );
    (app, hits)
}

#[tokio::test]
async fn blank_query_makes_no_call_and_changes_nothing() {
    let (app, hits) = reply_with(StatusCode::OK, json!({ "response": "unused" }));
    let relay = client(&serve(app).await);
    let mut session = Session::new();

    for query in ["", "   ", "\n\t"] {
        let outcome = shell::submit(&mut session, &relay, &ChatForm::default(), query).await;
        assert!(matches!(outcome, SubmitOutcome::Skipped));
    }

    assert!(session.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn response_appends_one_assistant_message_after_the_user_message() {
    let (app, hits) = reply_with(StatusCode::OK, json!({ "response": "hello" }));
    let relay = client(&serve(app).await);
    let mut session = Session::new();

    let outcome = shell::submit(&mut session, &relay, &ChatForm::default(), "hi there").await;

    assert!(matches!(outcome, SubmitOutcome::Answered(ref text) if text == "hello"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!((messages[0].role, messages[0].content.as_str()), (Role::User, "hi there"));
    assert_eq!((messages[1].role, messages[1].content.as_str()), (Role::Assistant, "hello"));
}

#[tokio::test]
async fn form_values_are_sent_as_chat_request() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let captured = seen.clone();
    let app = Router::new().route(
        "/chat",
        post(move |Json(body): Json<Value>| {
            let captured = captured.clone();
            async move {
                *captured.lock().unwrap() = Some(body);
                Json(json!({ "response": "ok" }))
            }
        })
    );
    let relay = client(&serve(app).await);
    let mut session = Session::new();
    let form = ChatForm { system_prompt: "Be brief.".into(), ..ChatForm::default() };

    shell::submit(&mut session, &relay, &form, "explain async").await;

    let body = seen.lock().unwrap().clone().unwrap();
    assert_eq!(
        body,
        json!({
            "messages": ["explain async"],
            "model_name": "llama3-70b-8192",
            "model_provider": "Groq",
            "allow_search": false,
            "system_prompt": "Be brief."
        })
    );
}

#[tokio::test]
async fn missing_response_field_is_surfaced_without_assistant_message() {
    let (app, _) = reply_with(StatusCode::OK, json!({ "answer": "hello" }));
    let relay = client(&serve(app).await);
    let mut session = Session::new();

    let outcome = shell::submit(&mut session, &relay, &ChatForm::default(), "hi").await;

    match outcome {
        SubmitOutcome::Failed(ShellError::UnexpectedFormat(payload)) => {
            assert_eq!(payload, json!({ "answer": "hello" }));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(session.len(), 1);
    assert_eq!(session.messages()[0].role, Role::User);
}

#[tokio::test]
async fn non_string_response_is_recorded_as_json_text() {
    for (payload, expected) in [(json!(42), "42"), (json!(null), "null"), (json!(["a"]), "[\"a\"]")] {
        let (app, _) = reply_with(StatusCode::OK, json!({ "response": payload }));
        let relay = client(&serve(app).await);
        let mut session = Session::new();

        let outcome = shell::submit(&mut session, &relay, &ChatForm::default(), "hi").await;

        assert!(matches!(outcome, SubmitOutcome::Answered(ref text) if text == expected));
        assert_eq!(session.len(), 2);
        assert_eq!(session.messages()[1].content, expected);
    }
}

#[tokio::test]
async fn non_json_success_body_is_a_request_failure() {
    let app = Router::new().route("/chat", post(|| async { "<html>proxy page</html>" }));
    let relay = client(&serve(app).await);
    let mut session = Session::new();
    let mut screen = Vec::new();

    let outcome = shell
        ::submit_and_render(&mut session, &relay, &ChatForm::default(), "hi", &mut screen).await
        .unwrap();

    match outcome {
        SubmitOutcome::Failed(e @ ShellError::Decode(_)) => {
            assert!(e.to_string().starts_with("Request failed:"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(session.len(), 1);
    assert!(String::from_utf8(screen).unwrap().contains("❌ Request failed:"));
}

#[tokio::test]
async fn server_error_status_is_a_request_failure() {
    let (app, _) = reply_with(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Failed to process request", "details": "boom" })
    );
    let relay = client(&serve(app).await);
    let mut session = Session::new();

    let outcome = shell::submit(&mut session, &relay, &ChatForm::default(), "hi").await;

    match outcome {
        SubmitOutcome::Failed(e @ ShellError::Request(_)) => {
            assert!(e.to_string().starts_with("Request failed:"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(session.len(), 1);
}

#[tokio::test]
async fn timeout_keeps_user_message_and_shows_error() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "response": "too late" }))
        })
    );
    let url = serve(app).await;
    let relay = RelayClient::new(&url, Duration::from_millis(200)).unwrap();
    let mut session = Session::new();
    let mut screen = Vec::new();

    let outcome = shell
        ::submit_and_render(&mut session, &relay, &ChatForm::default(), "slow one", &mut screen).await
        .unwrap();

    match outcome {
        SubmitOutcome::Failed(ShellError::Request(e)) => assert!(e.is_timeout()),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(session.len(), 1);
    assert_eq!(session.messages()[0].role, Role::User);

    let text = String::from_utf8(screen).unwrap();
    assert!(text.contains(shell::LOADING_MESSAGE));
    assert!(text.contains("Request failed:"));
    assert!(text.contains("User: slow one"));
    assert!(!text.contains("Assistant:"));
}

#[tokio::test]
async fn every_attempt_rerenders_the_whole_log_in_order() {
    let (app, _) = reply_with(StatusCode::OK, json!({ "response": "pong" }));
    let relay = client(&serve(app).await);
    let mut session = Session::new();
    let form = ChatForm::default();

    let mut first = Vec::new();
    shell::submit_and_render(&mut session, &relay, &form, "ping 1", &mut first).await.unwrap();
    let mut second = Vec::new();
    shell::submit_and_render(&mut session, &relay, &form, "ping 2", &mut second).await.unwrap();
    let mut skipped = Vec::new();
    shell::submit_and_render(&mut session, &relay, &form, "  ", &mut skipped).await.unwrap();

    let second = String::from_utf8(second).unwrap();
    let order: Vec<usize> = ["User: ping 1", "Assistant: pong", "User: ping 2"]
        .iter()
        .map(|needle| second.find(needle).unwrap())
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]));

    let skipped = String::from_utf8(skipped).unwrap();
    assert!(!skipped.contains(shell::LOADING_MESSAGE));
    assert_eq!(skipped.lines().count(), 4);
}

#[test]
fn rejects_invalid_relay_url() {
    let err = RelayClient::new("not a url", Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, ShellError::InvalidUrl(_)));
}
