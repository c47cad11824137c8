use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::entity::RecordStatus;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    leccion_id: i64,
    modulo_id: i64,
    titulo_leccion: String,
    contenido: String,
    orden: i32,
    estado: RecordStatus,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    pub modulo_id: i64,
    pub titulo_leccion: String,
    #[serde(default)]
    pub contenido: String,
    #[serde(default)]
    pub orden: i32,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> i64 {
        self.leccion_id
    }

    pub fn modulo_id(&self) -> i64 {
        self.modulo_id
    }

    pub fn titulo(&self) -> &str {
        &self.titulo_leccion
    }

    pub fn orden(&self) -> i32 {
        self.orden
    }
}

#[async_trait]
impl CrudRepository<Lesson, LessonCreate, i64> for Lesson {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO lecciones (modulo_id, titulo_leccion, contenido, orden) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.modulo_id)
        .bind(&data.titulo_leccion)
        .bind(&data.contenido)
        .bind(data.orden)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            "UPDATE lecciones SET modulo_id = $1, titulo_leccion = $2, contenido = $3, \
             orden = $4 WHERE leccion_id = $5",
        )
        .bind(data.modulo_id)
        .bind(&data.titulo_leccion)
        .bind(&data.contenido)
        .bind(data.orden)
        .bind(self.leccion_id)
        .execute(mm.executor())
        .await?;

        self.modulo_id = data.modulo_id;
        self.titulo_leccion = data.titulo_leccion;
        self.contenido = data.contenido;
        self.orden = data.orden;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM lecciones WHERE leccion_id = $1")
            .bind(self.leccion_id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM lecciones WHERE leccion_id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM lecciones ORDER BY modulo_id, orden")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lecciones")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Lesson {
    pub async fn all_by_module(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        modulo_id: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM lecciones WHERE modulo_id = $1 ORDER BY orden")
            .bind(modulo_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn toggle_estado(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        leccion_id: i64,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE lecciones SET estado = CASE WHEN estado = 'ACTIVO' \
             THEN 'INACTIVO'::estado_registro ELSE 'ACTIVO'::estado_registro END \
             WHERE leccion_id = $1",
        )
        .bind(leccion_id)
        .execute(mm.executor())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete guard: lessons referenced by progress or question rows stay.
    /// Enforced here rather than by FK cascade so the caller gets a clean
    /// conflict instead of a store error.
    pub async fn dependents_count(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        leccion_id: i64,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM progreso_lecciones WHERE leccion_id = $1) \
                  + (SELECT COUNT(*) FROM preguntas WHERE leccion_id = $1)",
        )
        .bind(leccion_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}

// Utils

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct LessonListRow {
    pub leccion_id: i64,
    pub titulo_leccion: String,
    pub contenido: String,
    pub modulo_id: i64,
    pub nombre_modulo: String,
    pub nombre_instructor: Option<String>,
    pub orden: i32,
    pub estado: RecordStatus,
}

impl LessonListRow {
    pub async fn fetch_all(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT l.leccion_id, l.titulo_leccion, l.contenido, m.modulo_id, \
                    m.nombre AS nombre_modulo, i.nombre AS nombre_instructor, \
                    l.orden, l.estado \
             FROM lecciones l \
             JOIN modulos m ON l.modulo_id = m.modulo_id \
             LEFT JOIN instructores i ON m.instructor_id = i.instructor_id \
             ORDER BY m.nombre, l.orden",
        )
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        leccion_id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            "SELECT l.leccion_id, l.titulo_leccion, l.contenido, m.modulo_id, \
                    m.nombre AS nombre_modulo, i.nombre AS nombre_instructor, \
                    l.orden, l.estado \
             FROM lecciones l \
             JOIN modulos m ON l.modulo_id = m.modulo_id \
             LEFT JOIN instructores i ON m.instructor_id = i.instructor_id \
             WHERE l.leccion_id = $1",
        )
        .bind(leccion_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(row)
    }
}
