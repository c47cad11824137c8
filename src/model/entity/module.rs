use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::entity::RecordStatus;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Module {
    modulo_id: i64,
    nombre: String,
    descripcion: String,
    instructor_id: Option<i64>,
    duracion: i32,
    fecha_inicio: Option<NaiveDate>,
    fecha_fin: Option<NaiveDate>,
    estado: RecordStatus,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ModuleCreate {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    pub instructor_id: Option<i64>,
    #[serde(default)]
    pub duracion: i32,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
}

impl ResourceTyped for Module {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Module
    }
}

impl Module {
    pub fn id(&self) -> i64 {
        self.modulo_id
    }

    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    pub fn estado(&self) -> RecordStatus {
        self.estado
    }
}

#[async_trait]
impl CrudRepository<Module, ModuleCreate, i64> for Module {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO modulos (nombre, descripcion, instructor_id, duracion, fecha_inicio, fecha_fin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&data.nombre)
        .bind(&data.descripcion)
        .bind(data.instructor_id)
        .bind(data.duracion)
        .bind(data.fecha_inicio)
        .bind(data.fecha_fin)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            "UPDATE modulos SET nombre = $1, descripcion = $2, duracion = $3, \
             fecha_inicio = $4, fecha_fin = $5 WHERE modulo_id = $6",
        )
        .bind(&data.nombre)
        .bind(&data.descripcion)
        .bind(data.duracion)
        .bind(data.fecha_inicio)
        .bind(data.fecha_fin)
        .bind(self.modulo_id)
        .execute(mm.executor())
        .await?;

        self.nombre = data.nombre;
        self.descripcion = data.descripcion;
        self.duracion = data.duracion;
        self.fecha_inicio = data.fecha_inicio;
        self.fecha_fin = data.fecha_fin;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM modulos WHERE modulo_id = $1")
            .bind(self.modulo_id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM modulos WHERE modulo_id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM modulos ORDER BY fecha_inicio DESC")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM modulos")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Module {
    /// Delete guard: a module keeps its lessons, so it only goes away empty.
    pub async fn lessons_count(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        modulo_id: i64,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lecciones WHERE modulo_id = $1")
            .bind(modulo_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn toggle_estado(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        modulo_id: i64,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE modulos SET estado = CASE WHEN estado = 'ACTIVO' \
             THEN 'INACTIVO'::estado_registro ELSE 'ACTIVO'::estado_registro END \
             WHERE modulo_id = $1",
        )
        .bind(modulo_id)
        .execute(mm.executor())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

// Utils

#[derive(FromRow)]
pub struct ModuleWithLessonsRow {
    pub modulo_id: i64,
    pub nombre: String,
    pub descripcion: String,
    pub estado: RecordStatus,
    pub lecciones: serde_json::Value,
}

impl ModuleWithLessonsRow {
    pub async fn fetch_all(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<ModuleWithLessonsRow> = sqlx::query_as(
            r#"
            SELECT
            m.modulo_id,
            m.nombre,
            m.descripcion,
            m.estado,
            COALESCE(
                json_agg(
                    json_build_object(
                        'leccion_id', l.leccion_id,
                        'titulo_leccion', l.titulo_leccion,
                        'orden', l.orden,
                        'estado', l.estado
                    ) ORDER BY l.orden
                ) FILTER (WHERE l.leccion_id IS NOT NULL),
                '[]'
            ) AS lecciones
            FROM modulos m
            LEFT JOIN lecciones l ON l.modulo_id = m.modulo_id
            GROUP BY m.modulo_id
            ORDER BY m.nombre;
        "#,
        )
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
