mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::{
    Action, Flow, login_admin_action, register_action, seed_admin, setup_server, setup_test_db,
};

fn alumno_id_of(ctx: &common::FlowContext, key: &str) -> i64 {
    ctx.get(key)["alumno_id"].as_i64().expect("no alumno_id")
}

/// Admin builds a module with `lessons` lessons and saves them as l1..lN;
/// student "Ana" registers and her profile (with alumno_id) lands in "perfil".
fn setup_course_flow(lessons: usize) -> Flow {
    let mut flow = Flow::new()
        .step(login_admin_action().with_save_as("admin"))
        .step(
            Action::new("create_module", "POST", "/api/modulos")
                .with_auth("admin")
                .with_body(json!({"nombre": "Rust básico", "descripcion": "intro"}))
                .with_save_as("modulo"),
        );

    let keys: [&'static str; 3] = ["l1", "l2", "l3"];
    for (i, key) in keys.into_iter().enumerate().take(lessons) {
        let orden = i as i64;
        flow = flow.step(
            Action::new("create_lesson", "POST", "/api/lecciones")
                .with_auth("admin")
                .with_dyn_body(move |ctx| {
                    json!({
                        "modulo_id": ctx.get("modulo")["modulo_id"],
                        "titulo_leccion": format!("Lección {orden}"),
                        "orden": orden,
                    })
                })
                .with_save_as(key),
        );
    }

    flow.step(register_action("Ana", "ana@x.com", "secret1", None).with_save_as("register"))
        .step(
            Action::new("login_student", "POST", "/api/auth/login")
                .with_body(json!({"email": "ana@x.com", "password": "secret1"}))
                .with_save_as("student"),
        )
        .step(
            Action::new("get_profile", "GET", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/alumnos/perfil/{}", ctx.get("student")["user"]["id"])
                })
                .with_save_as("perfil"),
        )
}

#[tokio::test]
async fn progress_start_lesson_conflict_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    seed_admin(&db).await;

    setup_course_flow(1)
        .step(
            Action::new("start_lesson", "POST", "/api/progreso-alumnos")
                .with_auth("student")
                .with_dyn_body(|ctx| {
                    json!({
                        "alumno_id": alumno_id_of(ctx, "perfil"),
                        "leccion_id": ctx.get("l1")["leccion_id"],
                        "total_preguntas": 2,
                    })
                })
                .assert_body(|body| {
                    let v: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(v["estado"], "EN_PROGRESO");
                    assert_eq!(v["total_preguntas_respondidas"], 0);
                    assert!(v["fecha_completado"].is_null());
                })
                .with_save_as("p1"),
        )
        // one row per (alumno, leccion): the second start is refused
        .step(
            Action::new("start_lesson_again", "POST", "/api/progreso-alumnos")
                .with_auth("student")
                .with_dyn_body(|ctx| {
                    json!({
                        "alumno_id": alumno_id_of(ctx, "perfil"),
                        "leccion_id": ctx.get("l1")["leccion_id"],
                        "total_preguntas": 2,
                    })
                })
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("already exists"))),
        )
        // unknown lesson is a missing reference
        .step(
            Action::new("start_unknown_lesson", "POST", "/api/progreso-alumnos")
                .with_auth("student")
                .with_dyn_body(|ctx| {
                    json!({
                        "alumno_id": alumno_id_of(ctx, "perfil"),
                        "leccion_id": 99999,
                        "total_preguntas": 2,
                    })
                })
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, &db)
        .await;
}

#[tokio::test]
async fn progress_completion_is_recomputed_server_side_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    seed_admin(&db).await;

    setup_course_flow(1)
        .step(
            Action::new("start_lesson", "POST", "/api/progreso-alumnos")
                .with_auth("student")
                .with_dyn_body(|ctx| {
                    json!({
                        "alumno_id": alumno_id_of(ctx, "perfil"),
                        "leccion_id": ctx.get("l1")["leccion_id"],
                        "total_preguntas": 3,
                    })
                })
                .with_save_as("p1"),
        )
        // a client-declared COMPLETADA with 1/3 answered does not stick
        .step(
            Action::new("lie_about_completion", "PUT", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/progreso-alumnos/{}", ctx.get("p1")["progreso_leccion_id"])
                })
                .with_body(json!({
                    "total_preguntas_respondidas": 1,
                    "estado": "COMPLETADA",
                }))
                .assert_body(|body| {
                    let v: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(v["estado"], "EN_PROGRESO");
                    assert!(v["fecha_completado"].is_null());
                }),
        )
        // answering everything completes it, whatever the client declares
        .step(
            Action::new("complete", "PUT", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/progreso-alumnos/{}", ctx.get("p1")["progreso_leccion_id"])
                })
                .with_body(json!({
                    "total_preguntas_respondidas": 3,
                    "estado": "EN_PROGRESO",
                }))
                .assert_body(|body| {
                    let v: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(v["estado"], "COMPLETADA");
                    assert!(!v["fecha_completado"].is_null());
                }),
        )
        .run(&mut server, &db)
        .await;
}

#[tokio::test]
async fn progress_module_rollup_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    seed_admin(&db).await;

    let mut flow = setup_course_flow(3);

    // start all three lessons, 5 questions each
    for (lesson_key, progress_key) in [("l1", "p1"), ("l2", "p2"), ("l3", "p3")] {
        flow = flow.step(
            Action::new("start_lesson", "POST", "/api/progreso-alumnos")
                .with_auth("student")
                .with_dyn_body(move |ctx| {
                    json!({
                        "alumno_id": alumno_id_of(ctx, "perfil"),
                        "leccion_id": ctx.get(lesson_key)["leccion_id"],
                        "total_preguntas": 5,
                    })
                })
                .with_save_as(progress_key),
        );
    }

    flow
        // nothing completed yet: no aggregate row, null module fields
        .step(
            Action::new("detail_before", "GET", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/progreso-alumnos/{}", alumno_id_of(ctx, "perfil"))
                })
                .assert_body(|body| {
                    let rows: Vec<Value> = serde_json::from_str(body).unwrap();
                    assert_eq!(rows.len(), 3);
                    assert!(rows.iter().all(|r| r["estado_modulo"].is_null()));
                }),
        )
        // complete lesson 1 of 3
        .step(
            Action::new("complete_l1", "PUT", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/progreso-alumnos/{}", ctx.get("p1")["progreso_leccion_id"])
                })
                .with_body(json!({"total_preguntas_respondidas": 5})),
        )
        .step(
            Action::new("detail_one_done", "GET", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/progreso-alumnos/{}", alumno_id_of(ctx, "perfil"))
                })
                .assert_body(|body| {
                    let rows: Vec<Value> = serde_json::from_str(body).unwrap();
                    assert!(rows.iter().all(|r| {
                        r["estado_modulo"] == "EN_PROGRESO"
                            && r["lecciones_completadas_modulo"] == 1
                            && r["total_lecciones_modulo"] == 3
                    }));
                }),
        )
        // complete lesson 2 of 3
        .step(
            Action::new("complete_l2", "PUT", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/progreso-alumnos/{}", ctx.get("p2")["progreso_leccion_id"])
                })
                .with_body(json!({"total_preguntas_respondidas": 5})),
        )
        // complete lesson 3 of 3: estado declared, ignored, and the module
        // aggregate flips to COMPLETADO
        .step(
            Action::new("complete_l3", "PUT", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/progreso-alumnos/{}", ctx.get("p3")["progreso_leccion_id"])
                })
                .with_body(json!({
                    "total_preguntas_respondidas": 5,
                    "estado": "COMPLETADA",
                })),
        )
        .step(
            Action::new("detail_all_done", "GET", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/progreso-alumnos/{}", alumno_id_of(ctx, "perfil"))
                })
                .assert_body(|body| {
                    let rows: Vec<Value> = serde_json::from_str(body).unwrap();
                    assert_eq!(rows.len(), 3);
                    assert!(rows.iter().all(|r| {
                        r["estado_modulo"] == "COMPLETADO"
                            && r["lecciones_completadas_modulo"] == 3
                            && r["estado"] == "COMPLETADA"
                    }));
                }),
        )
        .run(&mut server, &db)
        .await;
}

#[tokio::test]
async fn progress_roles_and_ownership_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    seed_admin(&db).await;

    setup_course_flow(1)
        // a second student has no business reading Ana's progress
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
                    format!("/api/progreso-alumnos/{}", alumno_id_of(ctx, "perfil"))
                })
                .with_expect(StatusCode::FORBIDDEN),
        )
        // the all-students overview is dashboard territory
        .step(
            Action::new("student_overview", "GET", "/api/progreso-alumnos")
                .with_auth("student")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("admin_overview", "GET", "/api/progreso-alumnos")
                .with_auth("admin")
                .assert_body(|body| {
                    let rows: Vec<Value> = serde_json::from_str(body).unwrap();
                    assert!(rows.is_empty());
                }),
        )
        .run(&mut server, &db)
        .await;
}

#[tokio::test]
async fn progress_read_reflects_last_write_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;
    seed_admin(&db).await;

    setup_course_flow(1)
        .step(
            Action::new("start_lesson", "POST", "/api/progreso-alumnos")
                .with_auth("student")
                .with_dyn_body(|ctx| {
                    json!({
                        "alumno_id": alumno_id_of(ctx, "perfil"),
                        "leccion_id": ctx.get("l1")["leccion_id"],
                        "total_preguntas": 10,
                    })
                })
                .with_save_as("p1"),
        )
        .step(
            Action::new("answer_3", "PUT", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/progreso-alumnos/{}", ctx.get("p1")["progreso_leccion_id"])
                })
                .with_body(json!({"total_preguntas_respondidas": 3})),
        )
        .step(
            Action::new("answer_7", "PUT", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/progreso-alumnos/{}", ctx.get("p1")["progreso_leccion_id"])
                })
                .with_body(json!({"total_preguntas_respondidas": 7})),
        )
        // exactly one row, exactly the last write
        .step(
            Action::new("detail", "GET", "dynamic")
                .with_auth("student")
                .with_dyn_path(|ctx| {
                    format!("/api/progreso-alumnos/{}", alumno_id_of(ctx, "perfil"))
                })
                .assert_body(|body| {
                    let rows: Vec<Value> = serde_json::from_str(body).unwrap();
                    assert_eq!(rows.len(), 1);
                    assert_eq!(rows[0]["total_preguntas_respondidas"], 7);
                    assert_eq!(rows[0]["estado"], "EN_PROGRESO");
                }),
        )
        .run(&mut server, &db)
        .await;
}
