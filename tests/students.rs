mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::{
    Action, Flow, login_admin_action, register_action, seed_admin, seed_country, setup_server,
    setup_test_db,
};

#[tokio::test]
async fn route_register_then_profile_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    let pais_id = seed_country(&db, "Colombia").await;

    Flow::new()
        .step(register_action("Ana", "ana@x.com", "secret1", Some(pais_id)))
        .step(
            Action::new("login", "POST", "/api/auth/login")
                .with_body(json!({"email": "ana@x.com", "password": "secret1"}))
                .with_save_as("student"),
        )
        // the registration transaction produced the linked student record
        .step(
            Action::new("profile", "GET", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/alumnos/perfil/{}", ctx.get("student")["user"]["id"])
                })
                .assert_body(|body| {
                    let v: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(v["nombre"], "Ana");
                    assert_eq!(v["nombre_pais"], "Colombia");
                    assert_eq!(v["estado"], "ACTIVO");
                }),
        )
        // someone else's profile is off limits for a student
        .step(register_action("Beto", "beto@x.com", "secret1", None))
        .step(
            Action::new("login_beto", "POST", "/api/auth/login")
                .with_body(json!({"email": "beto@x.com", "password": "secret1"}))
                .with_save_as("beto"),
        )
        .step(
            Action::new("beto_reads_ana", "GET", "dynamic")
                .with_auth("beto")
                .with_dyn_path(|ctx| {
                    format!("/api/alumnos/perfil/{}", ctx.get("student")["user"]["id"])
                })
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, &db)
        .await;
}

#[tokio::test]
async fn route_students_stats_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    seed_admin(&db).await;
    let pais_id = seed_country(&db, "Colombia").await;

    Flow::new()
        .step(login_admin_action().with_save_as("admin"))
        // empty table still reports zeros, not nulls
        .step(
            Action::new("stats_empty", "GET", "/api/alumnos/total")
                .with_auth("admin")
                .assert_body(|body| {
                    let v: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(v["total"], 0);
                    assert_eq!(v["activos"], 0);
                    assert_eq!(v["inactivos"], 0);
                    assert_eq!(v["total_paises"], 0);
                }),
        )
        .step(register_action("Ana", "ana@x.com", "secret1", Some(pais_id)))
        .step(register_action("Beto", "beto@x.com", "secret1", Some(pais_id)))
        .step(
            Action::new("list", "GET", "/api/alumnos")
                .with_auth("admin")
                .with_save_as("alumnos")
                .assert_body(|body| {
                    let rows: Vec<Value> = serde_json::from_str(body).unwrap();
                    assert_eq!(rows.len(), 2);
                    assert!(rows.iter().all(|r| r["nombre_pais"] == "Colombia"));
                }),
        )
        // deactivate one and watch the counters move
        .step(
            Action::new("toggle", "PUT", "dynamic")
                .with_auth("admin")
                .with_dyn_path(|ctx| {
                    let alumnos = ctx.get("alumnos").as_array().unwrap();
                    format!("/api/alumnos/{}/toggle-estado", alumnos[0]["alumno_id"])
                }),
        )
        .step(
            Action::new("stats", "GET", "/api/alumnos/total")
                .with_auth("admin")
                .assert_body(|body| {
                    let v: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(v["total"], 2);
                    assert_eq!(v["activos"], 1);
                    assert_eq!(v["inactivos"], 1);
                    assert_eq!(v["total_paises"], 1);
                }),
        )
        .step(
            Action::new("by_country", "GET", "/api/alumnos/por-pais")
                .with_auth("admin")
                .assert_body(|body| {
                    let rows: Vec<Value> = serde_json::from_str(body).unwrap();
                    assert_eq!(rows.len(), 1);
                    assert_eq!(rows[0]["pais"], "Colombia");
                    assert_eq!(rows[0]["cantidad"], 2);
                }),
        )
        // role gate: students cannot create student records
        .step(
            Action::new("login_ana", "POST", "/api/auth/login")
                .with_body(json!({"email": "ana@x.com", "password": "secret1"}))
                .with_save_as("ana"),
        )
        .step(
            Action::new("ana_creates_student", "POST", "/api/alumnos")
                .with_auth("ana")
                .with_body(json!({"nombre": "X", "email": "x@x.com"}))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, &db)
        .await;
}

#[tokio::test]
async fn route_student_delete_guard_test() {
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
        .step(
            Action::new("create_student", "POST", "/api/alumnos")
                .with_auth("admin")
                .with_body(json!({"nombre": "Caro", "email": "caro@x.com"}))
                .with_save_as("caro"),
        )
        .step(
            Action::new("start_lesson", "POST", "/api/progreso-alumnos")
                .with_auth("admin")
                .with_dyn_body(|ctx| {
                    json!({
                        "alumno_id": ctx.get("caro")["alumno_id"],
                        "leccion_id": ctx.get("leccion")["leccion_id"],
                        "total_preguntas": 1,
                    })
                }),
        )
        // a student with progress rows stays
        .step(
            Action::new("delete_guarded", "DELETE", "dynamic")
                .with_auth("admin")
                .with_dyn_path(|ctx| format!("/api/alumnos/{}", ctx.get("caro")["alumno_id"]))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("progress"))),
        )
        // one without any goes away
        .step(
            Action::new("create_student2", "POST", "/api/alumnos")
                .with_auth("admin")
                .with_body(json!({"nombre": "Dani", "email": "dani@x.com"}))
                .with_save_as("dani"),
        )
        .step(
            Action::new("delete_ok", "DELETE", "dynamic")
                .with_auth("admin")
                .with_dyn_path(|ctx| format!("/api/alumnos/{}", ctx.get("dani")["alumno_id"])),
        )
        .run(&mut server, &db)
        .await;
}
