use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::entity::RecordStatus;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Instructor {
    instructor_id: i64,
    usuario_id: Option<i64>,
    nombre: String,
    email: String,
    especialidad: Option<String>,
    estado: RecordStatus,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct InstructorCreate {
    pub nombre: String,
    pub email: String,
    pub especialidad: Option<String>,
    pub usuario_id: Option<i64>,
}

impl ResourceTyped for Instructor {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Instructor
    }
}

impl Instructor {
    pub fn id(&self) -> i64 {
        self.instructor_id
    }

    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: InstructorCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO instructores (usuario_id, nombre, email, especialidad) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.usuario_id)
        .bind(&data.nombre)
        .bind(&data.email)
        .bind(&data.especialidad)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM instructores WHERE instructor_id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn list(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM instructores ORDER BY nombre")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }
}
