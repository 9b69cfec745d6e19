// tests/examination_tests.rs
//
// Submission pipeline integration tests. These run against the Postgres at
// DATABASE_URL (as the app does) and skip with a notice when it is unset.

use examio::{config::Config, routes, state::AppState};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL and a pool, or None when no database is configured.
async fn spawn_app() -> Option<(String, PgPool)> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
        guest_cleanup_interval_secs: 86_400,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Some((address, pool))
}

/// Registers a fresh user and returns (token, user_id).
async fn register_and_login(address: &str, client: &reqwest::Client) -> (String, i64) {
    let email = format!("u_{}@test.example", &uuid::Uuid::new_v4().to_string()[..8]);
    let password = "password123";

    let register = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "username": "tester",
            "password": password
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(register.status().as_u16(), 201);
    let user: serde_json::Value = register.json().await.unwrap();
    let user_id = user["id"].as_i64().expect("User id missing");

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    (login["token"].as_str().expect("Token missing").to_string(), user_id)
}

struct SeededQuestion {
    correct_choice: i64,
    wrong_choice: i64,
}

struct SeededTest {
    test_id: i64,
    questions: Vec<SeededQuestion>,
}

/// Seeds a test with `question_count` questions, each with one correct and
/// one wrong choice, at a 60% pass mark.
async fn seed_test(pool: &PgPool, question_count: i32) -> SeededTest {
    let title = format!("t_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let (test_id,): (i64,) =
        sqlx::query_as("INSERT INTO tests (title, pass_mark) VALUES ($1, 60) RETURNING id")
            .bind(&title)
            .fetch_one(pool)
            .await
            .unwrap();

    let (session_id,): (i64,) =
        sqlx::query_as("INSERT INTO test_sessions (test_id) VALUES ($1) RETURNING id")
            .bind(test_id)
            .fetch_one(pool)
            .await
            .unwrap();

    let mut questions = Vec::new();
    for number in 1..=question_count {
        let (question_id,): (i64,) = sqlx::query_as(
            "INSERT INTO questions (test_session_id, question_number, content)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(session_id)
        .bind(number)
        .bind(format!("Question {}", number))
        .fetch_one(pool)
        .await
        .unwrap();

        let (correct_choice,): (i64,) = sqlx::query_as(
            "INSERT INTO choices (question_id, content, is_correct)
             VALUES ($1, 'right', TRUE) RETURNING id",
        )
        .bind(question_id)
        .fetch_one(pool)
        .await
        .unwrap();

        let (wrong_choice,): (i64,) = sqlx::query_as(
            "INSERT INTO choices (question_id, content, is_correct)
             VALUES ($1, 'wrong', FALSE) RETURNING id",
        )
        .bind(question_id)
        .fetch_one(pool)
        .await
        .unwrap();

        questions.push(SeededQuestion {
            correct_choice,
            wrong_choice,
        });
    }

    SeededTest { test_id, questions }
}

/// Net persisted rows for one user: (examinations, user_responses, scores).
async fn rows_for_user(pool: &PgPool, user_id: i64) -> (i64, i64, i64) {
    let (examinations,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM examinations WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap();
    let (responses,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM user_responses ur
         JOIN examinations e ON ur.examination_id = e.id WHERE e.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap();
    let (scores,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM scores s
         JOIN examinations e ON s.examination_id = e.id WHERE e.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap();
    (examinations, responses, scores)
}

#[tokio::test]
async fn valid_submission_round_trip() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let (token, user_id) = register_and_login(&address, &client).await;
    let seeded = seed_test(&pool, 3).await;

    // Two correct answers, one wrong: 2/3 at a 60% pass mark is a pass.
    let choice_ids = vec![
        seeded.questions[0].correct_choice,
        seeded.questions[1].correct_choice,
        seeded.questions[2].wrong_choice,
    ];

    let response = client
        .post(format!("{}/api/user_responses", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "test_id": seeded.test_id, "choice_ids": choice_ids }))
        .send()
        .await
        .expect("Submit failed");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["examination_id"].as_i64().is_some());
    assert_eq!(body["score"]["correct_count"], 2);
    assert_eq!(body["score"]["total_questions"], 3);
    assert_eq!(body["score"]["passed"], true);

    // Exactly one response per answered question and exactly one score.
    assert_eq!(rows_for_user(&pool, user_id).await, (1, 3, 1));
}

#[tokio::test]
async fn submission_sanitizes_malformed_choice_tokens() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let (token, user_id) = register_and_login(&address, &client).await;
    let seeded = seed_test(&pool, 3).await;

    // Digit strings survive sanitization; garbage tokens are dropped.
    let choice_ids = serde_json::json!([
        seeded.questions[0].correct_choice.to_string(),
        "invalid",
        seeded.questions[1].correct_choice.to_string(),
        "3abc",
        seeded.questions[2].correct_choice.to_string(),
    ]);

    let response = client
        .post(format!("{}/api/user_responses", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "test_id": seeded.test_id.to_string(),
            "choice_ids": choice_ids
        }))
        .send()
        .await
        .expect("Submit failed");

    assert_eq!(response.status().as_u16(), 201);
    let (_, responses, _) = rows_for_user(&pool, user_id).await;
    assert_eq!(responses, 3);
}

#[tokio::test]
async fn submission_with_unknown_choice_persists_nothing() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let (token, user_id) = register_and_login(&address, &client).await;
    let seeded = seed_test(&pool, 2).await;

    let choice_ids = vec![seeded.questions[0].correct_choice, 999_999_999];

    let response = client
        .post(format!("{}/api/user_responses", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "test_id": seeded.test_id, "choice_ids": choice_ids }))
        .send()
        .await
        .expect("Submit failed");

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    // The sanitized answers are echoed back for redisplay, nothing persisted.
    assert_eq!(body["user_responses"].as_array().unwrap().len(), 2);
    assert_eq!(rows_for_user(&pool, user_id).await, (0, 0, 0));
}

#[tokio::test]
async fn submission_with_empty_answer_set_persists_nothing() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let (token, user_id) = register_and_login(&address, &client).await;
    let seeded = seed_test(&pool, 2).await;

    let response = client
        .post(format!("{}/api/user_responses", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "test_id": seeded.test_id,
            "choice_ids": ["bogus", "-1", ""]
        }))
        .send()
        .await
        .expect("Submit failed");

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(rows_for_user(&pool, user_id).await, (0, 0, 0));
}

#[tokio::test]
async fn submission_with_duplicate_choices_persists_nothing() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let (token, user_id) = register_and_login(&address, &client).await;
    let seeded = seed_test(&pool, 2).await;

    let duplicated = seeded.questions[0].correct_choice;
    let response = client
        .post(format!("{}/api/user_responses", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "test_id": seeded.test_id, "choice_ids": [duplicated, duplicated] }))
        .send()
        .await
        .expect("Submit failed");

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(rows_for_user(&pool, user_id).await, (0, 0, 0));
}

#[tokio::test]
async fn submission_with_oversized_answer_set_persists_nothing() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let (token, user_id) = register_and_login(&address, &client).await;
    let seeded = seed_test(&pool, 1).await;

    // 251 distinct ids clear the digit filter but exceed the bulk maximum.
    let choice_ids: Vec<i64> = (1..=251).collect();

    let response = client
        .post(format!("{}/api/user_responses", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "test_id": seeded.test_id, "choice_ids": choice_ids }))
        .send()
        .await
        .expect("Submit failed");

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(rows_for_user(&pool, user_id).await, (0, 0, 0));
}

#[tokio::test]
async fn submission_against_unknown_test_is_not_found() {
    let Some((address, _pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let (token, _) = register_and_login(&address, &client).await;

    let response = client
        .post(format!("{}/api/user_responses", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "test_id": 999_999_999, "choice_ids": [1] }))
        .send()
        .await
        .expect("Submit failed");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn foreign_examination_reads_as_not_found() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let (owner_token, _) = register_and_login(&address, &client).await;
    let (other_token, _) = register_and_login(&address, &client).await;
    let seeded = seed_test(&pool, 1).await;

    let body: serde_json::Value = client
        .post(format!("{}/api/user_responses", address))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({
            "test_id": seeded.test_id,
            "choice_ids": [seeded.questions[0].correct_choice]
        }))
        .send()
        .await
        .expect("Submit failed")
        .json()
        .await
        .unwrap();
    let examination_id = body["examination_id"].as_i64().unwrap();

    // The owner sees the attempt; anyone else gets not-found, never 403.
    let owner_view = client
        .get(format!("{}/api/examinations/{}", address, examination_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .unwrap();
    assert_eq!(owner_view.status().as_u16(), 200);

    let foreign_view = client
        .get(format!("{}/api/examinations/{}", address, examination_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .unwrap();
    assert_eq!(foreign_view.status().as_u16(), 404);

    let foreign_score = client
        .get(format!("{}/api/examinations/{}/score", address, examination_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .unwrap();
    assert_eq!(foreign_score.status().as_u16(), 404);

    let foreign_delete = client
        .delete(format!("{}/api/examinations/{}", address, examination_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .unwrap();
    assert_eq!(foreign_delete.status().as_u16(), 404);
}

#[tokio::test]
async fn destroying_an_examination_cascades() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let (token, user_id) = register_and_login(&address, &client).await;
    let seeded = seed_test(&pool, 2).await;

    let body: serde_json::Value = client
        .post(format!("{}/api/user_responses", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "test_id": seeded.test_id,
            "choice_ids": [
                seeded.questions[0].correct_choice,
                seeded.questions[1].wrong_choice
            ]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let examination_id = body["examination_id"].as_i64().unwrap();
    assert_eq!(rows_for_user(&pool, user_id).await, (1, 2, 1));

    let response = client
        .delete(format!("{}/api/examinations/{}", address, examination_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(rows_for_user(&pool, user_id).await, (0, 0, 0));
}

#[tokio::test]
async fn examination_index_is_scoped_to_the_current_user() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let (token_a, user_a) = register_and_login(&address, &client).await;
    let (token_b, _) = register_and_login(&address, &client).await;
    let seeded = seed_test(&pool, 1).await;

    client
        .post(format!("{}/api/user_responses", address))
        .header("Authorization", format!("Bearer {}", token_a))
        .json(&serde_json::json!({
            "test_id": seeded.test_id,
            "choice_ids": [seeded.questions[0].correct_choice]
        }))
        .send()
        .await
        .unwrap();

    let list_a: Vec<serde_json::Value> = client
        .get(format!("{}/api/examinations", address))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list_a.len(), 1);
    assert_eq!(list_a[0]["user_id"].as_i64().unwrap(), user_a);

    let list_b: Vec<serde_json::Value> = client
        .get(format!("{}/api/examinations", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(list_b.is_empty());
}
