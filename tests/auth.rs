mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::{
    Flow, login_action, register_action, seed_country, setup_server, setup_test_db,
};

#[tokio::test]
async fn route_register_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    let pais_id = seed_country(&db, "Colombia").await;

    Flow::new()
        .step(
            register_action("Ana", "ana@x.com", "secret1", Some(pais_id))
                .assert_body(|body| {
                    let v: Value = serde_json::from_str(body).expect("Invalid body format");
                    assert!(v["token"].as_str().is_some_and(|t| !t.is_empty()));
                })
                .with_expect(StatusCode::OK),
        )
        // same email twice is a conflict
        .step(
            register_action("Ana", "ana@x.com", "secret1", Some(pais_id))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        // unknown country is a missing reference
        .step(
            register_action("Beto", "beto@x.com", "secret1", Some(9999))
                .with_expect(StatusCode::NOT_FOUND),
        )
        // short password never reaches the store
        .step(
            register_action("Caro", "caro@x.com", "abc", None)
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, &db)
        .await;
}

#[tokio::test]
async fn route_register_login_roundtrip_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;

    server
        .post("/api/auth/register")
        .json(&json!({
            "nombre": "Ana",
            "email": "ana@x.com",
            "password": "secret1",
        }))
        .await
        .assert_status_ok();

    let resp = server
        .post("/api/auth/login")
        .json(&json!({"email": "ana@x.com", "password": "secret1"}))
        .await;
    resp.assert_status_ok();

    let body = resp.json::<Value>();
    assert_eq!(body["user"]["rol"], "estudiante");

    // the credential itself carries the role, lowercased at issuance
    let token = body["token"].as_str().unwrap();
    let jwt_key = aula::Config::get_or_init(true).await.app().jwt();
    let claims = aula::auth::process_token(token, jwt_key).unwrap().claims;
    assert_eq!(claims.rol, "estudiante");
    assert_eq!(claims.sub, body["user"]["id"].as_i64().unwrap().to_string());
}

#[tokio::test]
async fn route_login_uniform_failure_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(register_action("Ana", "ana@x.com", "secret1", None))
        // wrong password and unknown email read exactly the same
        .step(
            login_action("ana@x.com", "wrongpass")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| {
                    assert!(body.contains("email or password is invalid"));
                }),
        )
        .step(
            login_action("nobody@x.com", "secret1")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| {
                    assert!(body.contains("email or password is invalid"));
                }),
        )
        .run(&mut server, &db)
        .await;
}

#[tokio::test]
async fn route_password_reset_flow_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;

    server
        .post("/api/auth/register")
        .json(&json!({
            "nombre": "Ana",
            "email": "ana@x.com",
            "password": "secret1",
        }))
        .await
        .assert_status_ok();

    // unknown email is a 404, per the original contract
    server
        .post("/api/auth/forgot-password")
        .json(&json!({"email": "nobody@x.com"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post("/api/auth/forgot-password")
        .json(&json!({"email": "ana@x.com"}))
        .await
        .assert_status_ok();

    // the mail goes out of band; read the stored token directly
    let token: String =
        sqlx::query_scalar("SELECT reset_token FROM usuarios WHERE email = 'ana@x.com'")
            .fetch_one(&db.pool)
            .await
            .unwrap();

    // garbage token does not pass
    server
        .post("/api/auth/reset-password")
        .json(&json!({"token": "not-a-token", "newPassword": "secret2"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/auth/reset-password")
        .json(&json!({"token": token, "newPassword": "secret2"}))
        .await
        .assert_status_ok();

    // single use: the same token is burned now
    server
        .post("/api/auth/reset-password")
        .json(&json!({"token": token, "newPassword": "secret3"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // old password out, new password in
    server
        .post("/api/auth/login")
        .json(&json!({"email": "ana@x.com", "password": "secret1"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/auth/login")
        .json(&json!({"email": "ana@x.com", "password": "secret2"}))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn route_password_reset_expired_token_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;

    server
        .post("/api/auth/register")
        .json(&json!({
            "nombre": "Ana",
            "email": "ana@x.com",
            "password": "secret1",
        }))
        .await
        .assert_status_ok();

    server
        .post("/api/auth/forgot-password")
        .json(&json!({"email": "ana@x.com"}))
        .await
        .assert_status_ok();

    let token: String =
        sqlx::query_scalar("SELECT reset_token FROM usuarios WHERE email = 'ana@x.com'")
            .fetch_one(&db.pool)
            .await
            .unwrap();

    sqlx::query(
        "UPDATE usuarios SET reset_token_expires = now() - interval '1 minute' \
         WHERE email = 'ana@x.com'",
    )
    .execute(&db.pool)
    .await
    .unwrap();

    server
        .post("/api/auth/reset-password")
        .json(&json!({"token": token, "newPassword": "secret2"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn route_protected_requires_token_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;

    server
        .get("/api/modulos")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let resp = server
        .get("/api/modulos")
        .add_header(axum::http::header::AUTHORIZATION, "Bearer not-a-jwt")
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}
