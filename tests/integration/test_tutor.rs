//! Integration tests for the tutor channel against a stub tutor service.
//!
//! A small axum app stands in for the tutor backend so the HTTP client,
//! timeout and fallback paths run over real sockets.

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use sortviz_engine::StepState;
use sortviz_orchestrator::{
    create_router, AppState, Config, Driver, OverrideOutcome, PlaybackSnapshot, TutorConfig,
    TutorExchange, TutorRequest, TutorSession,
};
use tokio::sync::Mutex;

/// Helper to find an available port for testing.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Serves `router` on a fresh port and returns its base URL.
async fn serve(router: Router) -> String {
    let port = find_available_port();
    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://{addr}")
}

/// How the stub tutor answers.
#[derive(Clone, Copy)]
enum Stub {
    /// Valid JSON wrapped in prose and a code fence.
    Fenced,
    /// HTTP 500.
    ServerError,
    /// A body with no JSON object.
    Garbage,
    /// Answers after the client has given up.
    Slow,
}

/// Starts a stub tutor and returns its base URL plus the requests it saw.
async fn spawn_tutor(stub: Stub) -> (String, Arc<Mutex<Vec<TutorRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&seen);

    let router = Router::new().route(
        "/api/v1/chat",
        post(move |Json(request): Json<TutorRequest>| {
            let recorded = Arc::clone(&recorded);
            async move {
                recorded.lock().await.push(request);
                match stub {
                    Stub::Fenced => (
                        StatusCode::OK,
                        concat!(
                            "Here is my answer:\n```json\n",
                            r#"{"socraticQuestion":"Which two bars are highlighted?","#,
                            r#""analysisOfUserAnswer":"partially_correct","#,
                            r#""learnerMasteryUpdate":{"comparisons":0.6},"#,
                            r#""visualizerStateUpdate":{"focusIndices":[0,2],"state":"comparing"},"#,
                            r#""xpAwarded":5}"#,
                            "\n```"
                        )
                        .to_string(),
                    ),
                    Stub::ServerError => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string())
                    }
                    Stub::Garbage => (StatusCode::OK, "I am not JSON".to_string()),
                    Stub::Slow => {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        (StatusCode::OK, "{}".to_string())
                    }
                }
            }
        }),
    );

    (serve(router).await, seen)
}

/// Starts sortviz with a tutor at `tutor_url` and returns its base URL.
async fn spawn_app(tutor_url: &str, data: &[f64]) -> (String, Driver) {
    let config = Config {
        seed_array: data.to_vec(),
        animation_speed_ms: 1000,
        tutor: TutorConfig {
            enabled: true,
            base_url: tutor_url.to_string(),
            timeout_secs: 1,
            ..TutorConfig::default()
        },
        ..Config::default()
    };
    let driver = Driver::new(&config);
    let session = TutorSession::from_config(driver.clone(), &config.tutor)
        .expect("Failed to build tutor")
        .expect("Tutor should be enabled");
    let router = create_router(AppState::new(driver.clone()).with_tutor(session));
    (serve(router).await, driver)
}

async fn send_message(base: &str, message: &str) -> TutorExchange {
    let response = reqwest::Client::new()
        .post(format!("{base}/api/tutor/message"))
        .json(&serde_json::json!({ "message": message }))
        .send()
        .await
        .expect("Failed to send HTTP request");
    assert!(response.status().is_success(), "{}", response.status());
    response.json().await.expect("Failed to parse exchange")
}

async fn get_state(base: &str) -> PlaybackSnapshot {
    reqwest::get(format!("{base}/api/state"))
        .await
        .expect("Failed to get state")
        .json()
        .await
        .expect("Failed to parse snapshot")
}

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn test_tutor_update_applied_to_visualizer() {
    let (tutor_url, seen) = spawn_tutor(Stub::Fenced).await;
    let (base, _driver) = spawn_app(&tutor_url, &[4.0, 2.0, 3.0]).await;

    let exchange = send_message(&base, "The first two bars swap").await;
    assert!(!exchange.fallback);
    assert_eq!(exchange.outcome, OverrideOutcome::Applied);
    assert_eq!(
        exchange.response.socratic_question,
        "Which two bars are highlighted?"
    );
    assert_eq!(exchange.response.xp_awarded, 5);

    let state = get_state(&base).await.visualizer;
    assert_eq!(state.focus_indices, vec![0, 2]);
    assert_eq!(state.state, StepState::Comparing);
    assert_eq!(state.data, vec![4.0, 2.0, 3.0]);

    // The second request carries the merged mastery and the history so far.
    send_message(&base, "Bars 0 and 2").await;
    let requests = seen.lock().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].current_array, vec![4.0, 2.0, 3.0]);
    assert!(requests[0].learner_mastery.is_empty());
    assert_eq!(requests[1].learner_mastery.get("comparisons"), Some(&0.6));
    assert_eq!(requests[1].chat_history.len(), 3);
}

#[tokio::test]
async fn test_tutor_update_suppressed_while_running() {
    let (tutor_url, _seen) = spawn_tutor(Stub::Fenced).await;
    let (base, driver) = spawn_app(&tutor_url, &[9.0, 8.0, 7.0, 6.0]).await;

    driver.play().await.expect("Failed to play");
    let exchange = send_message(&base, "What happens next?").await;
    assert!(!exchange.fallback);
    assert_eq!(exchange.outcome, OverrideOutcome::Suppressed);

    driver.stop().await;
}

// ============================================================================
// Fallback Paths
// ============================================================================

#[tokio::test]
async fn test_server_error_yields_fallback() {
    let (tutor_url, _seen) = spawn_tutor(Stub::ServerError).await;
    let (base, _driver) = spawn_app(&tutor_url, &[2.0, 1.0]).await;

    let exchange = send_message(&base, "hello").await;
    assert!(exchange.fallback);
    assert_eq!(exchange.response.analysis_of_user_answer, "continuing");
    assert_eq!(exchange.response.xp_awarded, 0);
    assert_eq!(exchange.outcome, OverrideOutcome::Applied);

    let state = get_state(&base).await.visualizer;
    assert!(state.focus_indices.is_empty());
    assert_eq!(state.state, StepState::Idle);
}

#[tokio::test]
async fn test_garbage_body_yields_fallback() {
    let (tutor_url, _seen) = spawn_tutor(Stub::Garbage).await;
    let (base, _driver) = spawn_app(&tutor_url, &[2.0, 1.0]).await;

    let exchange = send_message(&base, "hello").await;
    assert!(exchange.fallback);
}

#[tokio::test]
async fn test_timeout_yields_fallback() {
    let (tutor_url, _seen) = spawn_tutor(Stub::Slow).await;
    let (base, _driver) = spawn_app(&tutor_url, &[2.0, 1.0]).await;

    let started = std::time::Instant::now();
    let exchange = send_message(&base, "hello?").await;
    assert!(exchange.fallback);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_unreachable_tutor_yields_fallback() {
    let unused = format!("http://127.0.0.1:{}", find_available_port());
    let (base, _driver) = spawn_app(&unused, &[2.0, 1.0]).await;

    let exchange = send_message(&base, "anyone there?").await;
    assert!(exchange.fallback);
    assert!(exchange
        .response
        .socratic_question
        .contains("Bubble Sort"));
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let (tutor_url, seen) = spawn_tutor(Stub::Fenced).await;
    let (base, _driver) = spawn_app(&tutor_url, &[2.0, 1.0]).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/tutor/message"))
        .json(&serde_json::json!({ "message": "   " }))
        .send()
        .await
        .expect("Failed to send HTTP request");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(seen.lock().await.is_empty());
}
