// tests/api_tests.rs

use prep_backend::{config::Config, routes, services::question_bank::QuestionBank, state::AppState};
use serde_json::{Value, json};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // 1. Test configuration: no judge latency, unrecognized code always "passes"
    let config = Config {
        rust_log: "error".to_string(),
        judge_case_delay_ms: 0,
        judge_accept_probability: 1.0,
        ..Config::default()
    };

    // 2. Create the router with the bundled question pool
    let bank = QuestionBank::bundled().expect("Bundled question bank should load");
    let app = routes::create_router(AppState::new(config, bank));

    // 3. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 4. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn execute_rejects_missing_fields() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/execute", address))
        .json(&json!({ "language": "python", "mode": "run" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn execute_rejects_unsupported_language() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/execute", address))
        .json(&json!({
            "code": "puts 4",
            "language": "ruby",
            "mode": "submit",
            "testCases": [{ "input": "2+2", "expectedOutput": "4", "isHidden": false }],
            "problemId": "sum"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Unsupported language: ruby");
}

#[tokio::test]
async fn execute_accepts_matching_output() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/execute", address))
        .json(&json!({
            "code": "def add(expr):\n    left, right = expr.split('+')\n    return int(left) + int(right)\n",
            "language": "python",
            "mode": "submit",
            "testCases": [{ "input": "2+2", "expectedOutput": "4", "isHidden": false }],
            "problemId": "sum"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["verdict"], "Accepted");
    assert_eq!(body["passedCount"], 1);
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["results"][0]["passed"], true);
    assert_eq!(body["results"][0]["actualOutput"], "4");
}

#[tokio::test]
async fn execute_syntax_error_is_a_judged_response() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/execute", address))
        .json(&json!({
            "code": "print('unterminated",
            "language": "python",
            "mode": "submit",
            "testCases": [
                { "input": "1", "expectedOutput": "1" },
                { "input": "2", "expectedOutput": "2", "isHidden": true }
            ],
            "problemId": "echo"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // The program failed, not the judge.
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["verdict"], "Runtime Error");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["totalCount"], 2);
    assert_eq!(body["passedCount"], 0);
    assert_eq!(
        body["results"][0]["error"],
        "SyntaxError: EOL while scanning string literal"
    );
}

#[tokio::test]
async fn execute_run_mode_has_no_verdict() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let cases: Vec<Value> = (1..=5)
        .map(|i| json!({ "input": i.to_string(), "expectedOutput": i.to_string() }))
        .collect();

    let body: Value = client
        .post(&format!("{}/api/execute", address))
        .json(&json!({
            "code": "int main() { int a; std::cin >> a; std::cout << a; return 0; }",
            "language": "cpp",
            "mode": "run",
            "testCases": cases,
            "problemId": "echo"
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    assert!(body.get("verdict").is_none());
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
    assert_eq!(body["totalCount"], 3);
}

#[tokio::test]
async fn question_library_lists_companies() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let companies: Vec<String> = client
        .get(&format!("{}/api/questions/companies", address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert!(companies.contains(&"Google".to_string()));

    let questions: Vec<Value> = client
        .get(&format!("{}/api/questions?company=google&difficulty=Hard", address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert!(!questions.is_empty());
    for q in &questions {
        assert_eq!(q["difficulty"], "Hard");
        assert!(q.get("correctAnswerIndex").is_none());
    }

    let bad = client
        .get(&format!("{}/api/questions?difficulty=impossible", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(bad.status().as_u16(), 400);
}

#[tokio::test]
async fn test_quiz_flow() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // 1. Start a quiz filtered to Google questions
    let created = client
        .post(&format!("{}/api/quiz/sessions", address))
        .json(&json!({ "companies": ["Google"] }))
        .send()
        .await
        .expect("Create session failed");
    assert_eq!(created.status().as_u16(), 201);

    let view: Value = created.json().await.unwrap();
    let id = view["sessionId"].as_str().expect("Session id not found").to_string();
    let total = view["totalQuestions"].as_u64().unwrap() as usize;
    assert_eq!(view["phase"], "in_progress");
    assert!(total > 0);
    assert_eq!(view["answers"].as_array().unwrap().len(), total);
    assert!(view["currentQuestion"].get("correctAnswerIndex").is_none());

    let session_url = format!("{}/api/quiz/sessions/{}", address, id);

    // 2. Answer the first question, flag it, then try to go back from the start
    let view: Value = client
        .post(&format!("{}/answer", session_url))
        .json(&json!({ "optionIndex": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["answers"][0], 1);

    let out_of_range = client
        .post(&format!("{}/answer", session_url))
        .json(&json!({ "optionIndex": 9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(out_of_range.status().as_u16(), 400);

    client.post(&format!("{}/flag", session_url)).send().await.unwrap();

    let view: Value = client
        .post(&format!("{}/previous", session_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["currentIndex"], 0);
    assert_eq!(view["flagged"], json!([0]));

    // 3. Jumping past the end is clamped
    let view: Value = client
        .post(&format!("{}/navigate", session_url))
        .json(&json!({ "index": 999 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["currentIndex"].as_u64().unwrap() as usize, total - 1);

    // 4. Confirming without submitting first is refused
    let premature = client
        .post(&format!("{}/submit/confirm", session_url))
        .send()
        .await
        .unwrap();
    assert_eq!(premature.status().as_u16(), 409);

    // 5. Submit, then confirm
    let confirmation: Value = client
        .post(&format!("{}/submit", session_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(confirmation["answered"], 1);
    assert_eq!(confirmation["flagged"], 1);
    assert_eq!(confirmation["total"].as_u64().unwrap() as usize, total);

    let result_resp = client
        .post(&format!("{}/submit/confirm", session_url))
        .send()
        .await
        .unwrap();
    assert_eq!(result_resp.status().as_u16(), 200);
    let result: Value = result_resp.json().await.unwrap();
    assert_eq!(result["endedBy"], "submitted");
    assert_eq!(result["summary"]["total"].as_u64().unwrap() as usize, total);
    assert_eq!(result["summary"]["unanswered"].as_u64().unwrap() as usize, total - 1);
    assert_eq!(result["review"].as_array().unwrap().len(), total);
    assert!(result["review"][0]["explanation"].is_string());

    // 6. The finished session is frozen
    let frozen = client
        .post(&format!("{}/answer", session_url))
        .json(&json!({ "optionIndex": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(frozen.status().as_u16(), 409);

    let again: Value = client
        .get(&format!("{}/result", session_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["summary"], result["summary"]);

    // 7. Retry keeps the filter and a fresh start gets a clean answer sheet
    let view: Value = client
        .post(&format!("{}/retry", session_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["phase"], "setup");
    assert_eq!(view["companies"], json!(["Google"]));

    let view: Value = client
        .post(&format!("{}/start", session_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["phase"], "in_progress");
    assert_eq!(view["attempt"], 2);
    assert_eq!(view["answeredCount"], 0);

    // 8. Leave
    let deleted = client.delete(&session_url).send().await.unwrap();
    assert_eq!(deleted.status().as_u16(), 204);
    let gone = client.get(&session_url).send().await.unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
async fn unmatched_filter_still_starts_a_quiz() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let view: Value = client
        .post(&format!("{}/api/quiz/sessions", address))
        .json(&json!({ "companies": ["No Such Company"] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view["totalQuestions"], 15);
}
