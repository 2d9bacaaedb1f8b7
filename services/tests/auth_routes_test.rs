mod common;

use axum::http::{Method, StatusCode};
use cabinet_services::users::UserStorage;
use common::{TEST_PASSWORD, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_sign_up_returns_session() {
    let app = TestApp::new();

    let session = app.sign_up("Alice@Example.com").await;

    assert_eq!(session.email, "alice@example.com");
    assert!(!session.token.is_empty());
    assert_eq!(app.users.len(), 1);

    let response = app
        .send_empty(Method::GET, "/auth/session", Some(&session.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["user_id"], session.user_id.as_str());
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn test_sign_up_rejects_duplicate_email() {
    let app = TestApp::new();
    app.sign_up("alice@example.com").await;

    let response = app
        .send_json(
            Method::POST,
            "/auth/sign-up",
            None,
            json!({ "email": "alice@example.com", "password": "another-pass" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.json()["error"], "email_in_use");
}

#[tokio::test]
async fn test_sign_up_validates_input() {
    let app = TestApp::new();

    let bad_email = app
        .send_json(
            Method::POST,
            "/auth/sign-up",
            None,
            json!({ "email": "not-an-email", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let short_password = app
        .send_json(
            Method::POST,
            "/auth/sign-up",
            None,
            json!({ "email": "bob@example.com", "password": "12345" }),
        )
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
    assert!(app.users.is_empty());
}

#[tokio::test]
async fn test_sign_in() {
    let app = TestApp::new();
    let created = app.sign_up("alice@example.com").await;

    let ok = app
        .send_json(
            Method::POST,
            "/auth/sign-in",
            None,
            json!({ "email": "alice@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.json()["user_id"], created.user_id.as_str());

    let wrong_password = app
        .send_json(
            Method::POST,
            "/auth/sign-in",
            None,
            json!({ "email": "alice@example.com", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);

    let unknown = app
        .send_json(
            Method::POST,
            "/auth/sign-in",
            None,
            json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.json()["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_session_requires_token() {
    let app = TestApp::new();

    let response = app.send_empty(Method::GET, "/auth/session", None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "missing_token");
}

#[tokio::test]
async fn test_sign_out_revokes_token() {
    let app = TestApp::new();
    let session = app.sign_up("alice@example.com").await;

    let response = app
        .send_empty(Method::POST, "/auth/sign-out", Some(&session.token))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let after = app
        .send_empty(Method::GET, "/auth/session", Some(&session.token))
        .await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.json()["error"], "token_revoked");

    let again = app
        .send_empty(Method::POST, "/auth/sign-out", Some(&session.token))
        .await;
    assert_eq!(again.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new();
    let session = app.sign_up("alice@example.com").await;

    let response = app
        .send_json(
            Method::POST,
            "/auth/password-reset",
            None,
            json!({ "email": "alice@example.com" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let token = app
        .mailer
        .last_token_for("alice@example.com")
        .expect("reset mail sent");

    let too_short = app
        .send_json(
            Method::POST,
            "/auth/password-reset/confirm",
            None,
            json!({ "token": token, "new_password": "123" }),
        )
        .await;
    assert_eq!(too_short.status, StatusCode::BAD_REQUEST);

    let confirmed = app
        .send_json(
            Method::POST,
            "/auth/password-reset/confirm",
            None,
            json!({ "token": token, "new_password": "brand-new-pass" }),
        )
        .await;
    assert_eq!(confirmed.status, StatusCode::NO_CONTENT);

    let old = app
        .send_json(
            Method::POST,
            "/auth/sign-in",
            None,
            json!({ "email": "alice@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    let new = app
        .send_json(
            Method::POST,
            "/auth/sign-in",
            None,
            json!({ "email": "alice@example.com", "password": "brand-new-pass" }),
        )
        .await;
    assert_eq!(new.status, StatusCode::OK);

    let user_id = session.user_id.parse().unwrap();
    assert!(app.users.get_user(user_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_password_reset_unknown_email() {
    let app = TestApp::new();

    let response = app
        .send_json(
            Method::POST,
            "/auth/password-reset",
            None,
            json!({ "email": "nobody@example.com" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_password_reset_rejects_session_token() {
    let app = TestApp::new();
    let session = app.sign_up("alice@example.com").await;

    let response = app
        .send_json(
            Method::POST,
            "/auth/password-reset/confirm",
            None,
            json!({ "token": session.token, "new_password": "brand-new-pass" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
