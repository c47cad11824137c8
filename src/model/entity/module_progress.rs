use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::{Postgres, Transaction};

use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "estado_progreso_modulo", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleProgressStatus {
    EnProgreso,
    Completado,
}

/// Derived aggregate over a student's lesson progress within one module.
/// Never authored by a client; [`ModuleProgress::recompute_in`] is the only
/// writer.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ModuleProgress {
    progreso_modulo_id: i64,
    alumno_id: i64,
    modulo_id: i64,
    lecciones_completadas: i32,
    total_lecciones: i32,
    estado: ModuleProgressStatus,
    fecha_completado: Option<DateTime<Utc>>,
}

impl ResourceTyped for ModuleProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::ModuleProgress
    }
}

impl ModuleProgress {
    pub fn alumno_id(&self) -> i64 {
        self.alumno_id
    }

    pub fn modulo_id(&self) -> i64 {
        self.modulo_id
    }

    pub fn lecciones_completadas(&self) -> i32 {
        self.lecciones_completadas
    }

    pub fn total_lecciones(&self) -> i32 {
        self.total_lecciones
    }

    pub fn estado(&self) -> ModuleProgressStatus {
        self.estado
    }

    pub fn fecha_completado(&self) -> Option<DateTime<Utc>> {
        self.fecha_completado
    }

    /// Recounts the student's completed lessons under the module and upserts
    /// the aggregate row. Runs on the caller's transaction so the aggregate
    /// can never drift from the lesson row that triggered it: both commit or
    /// neither does.
    pub async fn recompute_in(
        tx: &mut Transaction<'static, Postgres>,
        alumno_id: i64,
        modulo_id: i64,
    ) -> DatabaseResult<()> {
        let completadas: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM progreso_lecciones pl \
             JOIN lecciones l ON pl.leccion_id = l.leccion_id \
             WHERE l.modulo_id = $1 AND pl.alumno_id = $2 AND pl.estado = 'COMPLETADA'",
        )
        .bind(modulo_id)
        .bind(alumno_id)
        .fetch_one(&mut **tx)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lecciones WHERE modulo_id = $1")
            .bind(modulo_id)
            .fetch_one(&mut **tx)
            .await?;

        let done = total > 0 && completadas >= total;
        let estado = if done {
            ModuleProgressStatus::Completado
        } else {
            ModuleProgressStatus::EnProgreso
        };

        sqlx::query(
            "INSERT INTO progreso_modulos \
               (alumno_id, modulo_id, lecciones_completadas, total_lecciones, estado, fecha_completado) \
             VALUES ($1, $2, $3, $4, $5, CASE WHEN $6 THEN now() END) \
             ON CONFLICT (alumno_id, modulo_id) DO UPDATE SET \
               lecciones_completadas = EXCLUDED.lecciones_completadas, \
               total_lecciones = EXCLUDED.total_lecciones, \
               estado = EXCLUDED.estado, \
               fecha_completado = CASE WHEN $6 \
                 THEN COALESCE(progreso_modulos.fecha_completado, now()) END",
        )
        .bind(alumno_id)
        .bind(modulo_id)
        .bind(completadas as i32)
        .bind(total as i32)
        .bind(estado)
        .bind(done)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn find_by_pair(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        alumno_id: i64,
        modulo_id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM progreso_modulos WHERE alumno_id = $1 AND modulo_id = $2",
        )
        .bind(alumno_id)
        .bind(modulo_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }
}
