// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, examinations, guest, mini_tests, scores, tests, user_responses},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, tests, mini tests, examinations).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/guest", post(guest::guest_sign_in))
        // Session management needs the resolved current user
        .merge(
            Router::new()
                .route("/account", put(auth::update_account))
                .route("/sign_out", post(guest::sign_out))
                .route("/guest_sign_out", post(guest::guest_sign_out))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let test_routes = Router::new()
        .route("/", get(tests::list_tests))
        .route("/{id}", get(tests::get_test));

    let mini_test_routes = Router::new()
        .route("/", post(mini_tests::create))
        .route("/search", post(mini_tests::search));

    let examination_routes = Router::new()
        .route("/", get(examinations::index))
        .route(
            "/{id}",
            get(examinations::show).delete(examinations::destroy),
        )
        .route("/{id}/score", get(scores::show))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let user_response_routes = Router::new()
        .route("/", post(user_responses::create))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/tests", test_routes)
        .nest("/api/mini_tests", mini_test_routes)
        .nest("/api/examinations", examination_routes)
        .nest("/api/user_responses", user_response_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
