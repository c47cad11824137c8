use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::entity::RecordStatus;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Question {
    pregunta_id: i64,
    leccion_id: i64,
    contenido_previo: String,
    pregunta: String,
    orden: i32,
    estado: RecordStatus,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuestionCreate {
    pub leccion_id: i64,
    #[serde(default)]
    pub contenido_previo: String,
    pub pregunta: String,
    #[serde(default)]
    pub orden: i32,
}

impl ResourceTyped for Question {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Question
    }
}

impl Question {
    pub fn id(&self) -> i64 {
        self.pregunta_id
    }

    pub fn leccion_id(&self) -> i64 {
        self.leccion_id
    }
}

#[async_trait]
impl CrudRepository<Question, QuestionCreate, i64> for Question {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuestionCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO preguntas (leccion_id, contenido_previo, pregunta, orden) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.leccion_id)
        .bind(&data.contenido_previo)
        .bind(&data.pregunta)
        .bind(data.orden)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuestionCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            "UPDATE preguntas SET contenido_previo = $1, pregunta = $2, orden = $3 \
             WHERE pregunta_id = $4",
        )
        .bind(&data.contenido_previo)
        .bind(&data.pregunta)
        .bind(data.orden)
        .bind(self.pregunta_id)
        .execute(mm.executor())
        .await?;

        self.contenido_previo = data.contenido_previo;
        self.pregunta = data.pregunta;
        self.orden = data.orden;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM preguntas WHERE pregunta_id = $1")
            .bind(self.pregunta_id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM preguntas WHERE pregunta_id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM preguntas ORDER BY leccion_id, orden")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM preguntas")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Question {
    pub async fn toggle_estado(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        pregunta_id: i64,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE preguntas SET estado = CASE WHEN estado = 'ACTIVO' \
             THEN 'INACTIVO'::estado_registro ELSE 'ACTIVO'::estado_registro END \
             WHERE pregunta_id = $1",
        )
        .bind(pregunta_id)
        .execute(mm.executor())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

// Utils

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuestionListRow {
    pub pregunta_id: i64,
    pub contenido_previo: String,
    pub pregunta: String,
    pub orden: i32,
    pub estado: RecordStatus,
    pub leccion_id: i64,
    pub titulo_leccion: String,
    pub modulo_id: i64,
    pub nombre_modulo: String,
}

impl QuestionListRow {
    pub async fn fetch_all(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT p.pregunta_id, p.contenido_previo, p.pregunta, p.orden, p.estado, \
                    l.leccion_id, l.titulo_leccion, m.modulo_id, m.nombre AS nombre_modulo \
             FROM preguntas p \
             JOIN lecciones l ON p.leccion_id = l.leccion_id \
             JOIN modulos m ON l.modulo_id = m.modulo_id \
             ORDER BY m.nombre, l.orden, p.orden",
        )
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    pub async fn fetch_by_lesson(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        leccion_id: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT p.pregunta_id, p.contenido_previo, p.pregunta, p.orden, p.estado, \
                    l.leccion_id, l.titulo_leccion, m.modulo_id, m.nombre AS nombre_modulo \
             FROM preguntas p \
             JOIN lecciones l ON p.leccion_id = l.leccion_id \
             JOIN modulos m ON l.modulo_id = m.modulo_id \
             WHERE p.leccion_id = $1 \
             ORDER BY p.orden",
        )
        .bind(leccion_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}
