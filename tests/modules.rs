mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::{Action, Flow, login_admin_action, seed_admin, setup_server, setup_test_db};

#[tokio::test]
async fn route_module_delete_guard_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    seed_admin(&db).await;

    Flow::new()
        .step(login_admin_action().with_save_as("admin"))
        .step(
            Action::new("create_module", "POST", "/api/modulos")
                .with_auth("admin")
                .with_body(json!({"nombre": "Rust básico", "descripcion": "intro"}))
                .with_save_as("modulo"),
        )
        .step(
            Action::new("create_lesson", "POST", "/api/lecciones")
                .with_auth("admin")
                .with_dyn_body(|ctx| {
                    json!({
                        "modulo_id": ctx.get("modulo")["modulo_id"],
                        "titulo_leccion": "Lección 0",
                    })
                })
                .with_save_as("leccion"),
        )
        // a module with lessons stays put
        .step(
            Action::new("delete_guarded", "DELETE", "dynamic")
                .with_auth("admin")
                .with_dyn_path(|ctx| format!("/api/modulos/{}", ctx.get("modulo")["modulo_id"]))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("lessons"))),
        )
        // remove the lesson, then the module goes
        .step(
            Action::new("delete_lesson", "DELETE", "dynamic")
                .with_auth("admin")
                .with_dyn_path(|ctx| format!("/api/lecciones/{}", ctx.get("leccion")["leccion_id"])),
        )
        .step(
            Action::new("delete_ok", "DELETE", "dynamic")
                .with_auth("admin")
                .with_dyn_path(|ctx| format!("/api/modulos/{}", ctx.get("modulo")["modulo_id"])),
        )
        .step(
            Action::new("delete_missing", "DELETE", "dynamic")
                .with_auth("admin")
                .with_dyn_path(|ctx| format!("/api/modulos/{}", ctx.get("modulo")["modulo_id"]))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, &db)
        .await;
}

#[tokio::test]
async fn route_modules_with_lessons_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    seed_admin(&db).await;

    Flow::new()
        .step(login_admin_action().with_save_as("admin"))
        .step(
            Action::new("create_module", "POST", "/api/modulos")
                .with_auth("admin")
                .with_body(json!({"nombre": "Rust básico"}))
                .with_save_as("modulo"),
        )
        .step(
            Action::new("create_empty_module", "POST", "/api/modulos")
                .with_auth("admin")
                .with_body(json!({"nombre": "Rust avanzado"})),
        )
        .step(
            Action::new("create_lesson_b", "POST", "/api/lecciones")
                .with_auth("admin")
                .with_dyn_body(|ctx| {
                    json!({
                        "modulo_id": ctx.get("modulo")["modulo_id"],
                        "titulo_leccion": "Segunda",
                        "orden": 2,
                    })
                }),
        )
        .step(
            Action::new("create_lesson_a", "POST", "/api/lecciones")
                .with_auth("admin")
                .with_dyn_body(|ctx| {
                    json!({
                        "modulo_id": ctx.get("modulo")["modulo_id"],
                        "titulo_leccion": "Primera",
                        "orden": 1,
                    })
                }),
        )
        .step(
            Action::new("with_lessons", "GET", "/api/modulos/con-lecciones")
                .with_auth("admin")
                .assert_body(|body| {
                    let rows: Vec<Value> = serde_json::from_str(body).unwrap();
                    assert_eq!(rows.len(), 2);

                    let basico = rows
                        .iter()
                        .find(|r| r["nombre"] == "Rust básico")
                        .expect("module missing");
                    let lecciones = basico["lecciones"].as_array().unwrap();
                    assert_eq!(lecciones.len(), 2);
                    // aggregated in lesson order
                    assert_eq!(lecciones[0]["titulo_leccion"], "Primera");
                    assert_eq!(lecciones[1]["titulo_leccion"], "Segunda");

                    let avanzado = rows
                        .iter()
                        .find(|r| r["nombre"] == "Rust avanzado")
                        .expect("module missing");
                    assert!(avanzado["lecciones"].as_array().unwrap().is_empty());
                }),
        )
        .run(&mut server, &db)
        .await;
}

#[tokio::test]
async fn route_lesson_create_requires_module_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    seed_admin(&db).await;

    Flow::new()
        .step(login_admin_action().with_save_as("admin"))
        .step(
            Action::new("create_orphan_lesson", "POST", "/api/lecciones")
                .with_auth("admin")
                .with_body(json!({
                    "modulo_id": 99999,
                    "titulo_leccion": "Huérfana",
                }))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, &db)
        .await;
}
