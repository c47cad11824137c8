use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::access::HasOwner;
use crate::model::entity::{ModuleProgress, ModuleProgressStatus};
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "estado_progreso_leccion", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonProgressStatus {
    EnProgreso,
    Completada,
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonProgress {
    progreso_leccion_id: i64,
    alumno_id: i64,
    leccion_id: i64,
    total_preguntas: i32,
    total_preguntas_respondidas: i32,
    ultima_pregunta_respondida: Option<i64>,
    estado: LessonProgressStatus,
    fecha_inicio: DateTime<Utc>,
    fecha_completado: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonProgressCreate {
    pub alumno_id: i64,
    pub leccion_id: i64,
    pub total_preguntas: i32,
}

/// Answer submission. The original implementation also took an `estado`
/// declared by the client; completion is derived from the counters here, so
/// the field is gone from the model layer.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AnswerUpdate {
    pub total_preguntas_respondidas: i32,
    pub ultima_pregunta_respondida: Option<i64>,
}

impl ResourceTyped for LessonProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonProgress
    }
}

impl LessonProgress {
    pub fn id(&self) -> i64 {
        self.progreso_leccion_id
    }

    pub fn alumno_id(&self) -> i64 {
        self.alumno_id
    }

    pub fn leccion_id(&self) -> i64 {
        self.leccion_id
    }

    pub fn total_preguntas(&self) -> i32 {
        self.total_preguntas
    }

    pub fn total_preguntas_respondidas(&self) -> i32 {
        self.total_preguntas_respondidas
    }

    pub fn estado(&self) -> LessonProgressStatus {
        self.estado
    }

    pub fn fecha_completado(&self) -> Option<DateTime<Utc>> {
        self.fecha_completado
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM progreso_lecciones WHERE progreso_leccion_id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// The idempotency boundary: one row per (alumno, leccion), no upsert.
    pub async fn find_by_pair(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        alumno_id: i64,
        leccion_id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM progreso_lecciones WHERE alumno_id = $1 AND leccion_id = $2",
        )
        .bind(alumno_id)
        .bind(leccion_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    /// startLesson: fresh row in EN_PROGRESO with nothing answered yet.
    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonProgressCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO progreso_lecciones (alumno_id, leccion_id, total_preguntas) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.alumno_id)
        .bind(data.leccion_id)
        .bind(data.total_preguntas)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    /// recordAnswer: updates the counters and derives the status server-side
    /// (`COMPLETADA` iff everything is answered; COMPLETADA is terminal).
    /// When the row is complete, the owning module's aggregate is recomputed
    /// in the same transaction. The `FOR UPDATE` lock serializes concurrent
    /// submissions for the same row.
    ///
    /// Returns `None` when no such progress row exists.
    pub async fn record_answer(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        progreso_leccion_id: i64,
        data: AnswerUpdate,
    ) -> DatabaseResult<Option<Self>> {
        let mut tx = mm.begin().await?;

        let current: Option<LessonProgress> = sqlx::query_as(
            "SELECT * FROM progreso_lecciones WHERE progreso_leccion_id = $1 FOR UPDATE",
        )
        .bind(progreso_leccion_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let completed = current.estado == LessonProgressStatus::Completada
            || data.total_preguntas_respondidas >= current.total_preguntas;
        let estado = if completed {
            LessonProgressStatus::Completada
        } else {
            LessonProgressStatus::EnProgreso
        };

        let updated: LessonProgress = sqlx::query_as(
            "UPDATE progreso_lecciones SET \
               total_preguntas_respondidas = $1, \
               ultima_pregunta_respondida = $2, \
               estado = $3, \
               fecha_completado = CASE WHEN $4 \
                 THEN COALESCE(fecha_completado, now()) END \
             WHERE progreso_leccion_id = $5 RETURNING *",
        )
        .bind(data.total_preguntas_respondidas)
        .bind(data.ultima_pregunta_respondida)
        .bind(estado)
        .bind(completed)
        .bind(progreso_leccion_id)
        .fetch_one(&mut *tx)
        .await?;

        if completed {
            let modulo_id: i64 =
                sqlx::query_scalar("SELECT modulo_id FROM lecciones WHERE leccion_id = $1")
                    .bind(current.leccion_id)
                    .fetch_one(&mut *tx)
                    .await?;

            ModuleProgress::recompute_in(&mut tx, current.alumno_id, modulo_id).await?;
        }

        tx.commit().await?;
        Ok(Some(updated))
    }
}

#[async_trait]
impl HasOwner for LessonProgress {
    type OwnerId = i64;

    /// A progress row belongs to the user account behind its student.
    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        let usuario_id: Option<i64> =
            sqlx::query_scalar("SELECT usuario_id FROM alumnos WHERE alumno_id = $1")
                .bind(self.alumno_id)
                .fetch_one(mm.executor())
                .await?;
        Ok(usuario_id.unwrap_or(-1))
    }
}

// Read projections

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ProgressOverviewRow {
    pub progreso_leccion_id: i64,
    pub alumno_id: i64,
    pub nombre_alumno: String,
    pub modulo_id: i64,
    pub nombre_modulo: String,
    pub leccion_id: i64,
    pub titulo_leccion: String,
    pub total_preguntas_respondidas: i32,
    pub total_preguntas: i32,
    pub estado: LessonProgressStatus,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_completado: Option<DateTime<Utc>>,
}

impl ProgressOverviewRow {
    pub async fn fetch_all(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT pa.progreso_leccion_id, a.alumno_id, a.nombre AS nombre_alumno, \
                    m.modulo_id, m.nombre AS nombre_modulo, \
                    l.leccion_id, l.titulo_leccion, \
                    pa.total_preguntas_respondidas, pa.total_preguntas, \
                    pa.estado, pa.fecha_inicio, pa.fecha_completado \
             FROM progreso_lecciones pa \
             JOIN alumnos a ON pa.alumno_id = a.alumno_id \
             JOIN lecciones l ON pa.leccion_id = l.leccion_id \
             JOIN modulos m ON l.modulo_id = m.modulo_id \
             ORDER BY a.nombre, m.nombre, l.orden",
        )
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}

/// Per-student projection, left-joined with the module aggregate: a module
/// the student has not finished a lesson in yet shows null aggregate fields.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ProgressDetailRow {
    pub progreso_leccion_id: i64,
    pub modulo_id: i64,
    pub nombre_modulo: String,
    pub leccion_id: i64,
    pub titulo_leccion: String,
    pub total_preguntas_respondidas: i32,
    pub total_preguntas: i32,
    pub estado: LessonProgressStatus,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_completado: Option<DateTime<Utc>>,
    pub lecciones_completadas_modulo: Option<i32>,
    pub total_lecciones_modulo: Option<i32>,
    pub estado_modulo: Option<ModuleProgressStatus>,
}

impl ProgressDetailRow {
    pub async fn fetch_by_student(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        alumno_id: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT pa.progreso_leccion_id, m.modulo_id, m.nombre AS nombre_modulo, \
                    l.leccion_id, l.titulo_leccion, \
                    pa.total_preguntas_respondidas, pa.total_preguntas, \
                    pa.estado, pa.fecha_inicio, pa.fecha_completado, \
                    pm.lecciones_completadas AS lecciones_completadas_modulo, \
                    pm.total_lecciones AS total_lecciones_modulo, \
                    pm.estado AS estado_modulo \
             FROM progreso_lecciones pa \
             JOIN lecciones l ON pa.leccion_id = l.leccion_id \
             JOIN modulos m ON l.modulo_id = m.modulo_id \
             LEFT JOIN progreso_modulos pm \
               ON pm.alumno_id = pa.alumno_id AND pm.modulo_id = m.modulo_id \
             WHERE pa.alumno_id = $1 \
             ORDER BY m.nombre, l.orden",
        )
        .bind(alumno_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}
