use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::model::access::HasOwner;
use crate::model::entity::RecordStatus;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Student {
    alumno_id: i64,
    usuario_id: Option<i64>,
    nombre: String,
    email: String,
    telefono: Option<String>,
    pais_id: Option<i64>,
    estado: RecordStatus,
    fecha_registro: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StudentCreate {
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub pais_id: Option<i64>,
}

impl ResourceTyped for Student {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Student
    }
}

impl Student {
    pub fn id(&self) -> i64 {
        self.alumno_id
    }

    pub fn usuario_id(&self) -> Option<i64> {
        self.usuario_id
    }

    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn estado(&self) -> RecordStatus {
        self.estado
    }
}

#[async_trait]
impl CrudRepository<Student, StudentCreate, i64> for Student {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: StudentCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO alumnos (nombre, email, telefono, pais_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.nombre)
        .bind(&data.email)
        .bind(&data.telefono)
        .bind(data.pais_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    /// Profile edits mirror nombre/email/pais onto the linked usuario row,
    /// both updates inside one transaction.
    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: StudentCreate,
    ) -> DatabaseResult<Self> {
        let mut tx = mm.begin().await?;

        sqlx::query(
            "UPDATE alumnos SET nombre = $1, email = $2, telefono = $3, pais_id = $4 \
             WHERE alumno_id = $5",
        )
        .bind(&data.nombre)
        .bind(&data.email)
        .bind(&data.telefono)
        .bind(data.pais_id)
        .bind(self.alumno_id)
        .execute(&mut *tx)
        .await?;

        if let Some(usuario_id) = self.usuario_id {
            sqlx::query(
                "UPDATE usuarios SET nombre = $1, email = $2, pais_id = $3 WHERE usuario_id = $4",
            )
            .bind(&data.nombre)
            .bind(&data.email)
            .bind(data.pais_id)
            .bind(usuario_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.nombre = data.nombre;
        self.email = data.email;
        self.telefono = data.telefono;
        self.pais_id = data.pais_id;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM alumnos WHERE alumno_id = $1")
            .bind(self.alumno_id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM alumnos WHERE alumno_id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM alumnos ORDER BY nombre")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alumnos")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Student {
    type OwnerId = i64;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        // unlinked students belong to nobody but the admin
        Ok(self.usuario_id.unwrap_or(-1))
    }
}

impl Student {
    pub async fn find_by_usuario_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        usuario_id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM alumnos WHERE usuario_id = $1")
            .bind(usuario_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn toggle_estado(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        alumno_id: i64,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE alumnos SET estado = CASE WHEN estado = 'ACTIVO' \
             THEN 'INACTIVO'::estado_registro ELSE 'ACTIVO'::estado_registro END \
             WHERE alumno_id = $1",
        )
        .bind(alumno_id)
        .execute(mm.executor())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete guard: a student with progress rows cannot be removed.
    pub async fn progress_count(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        alumno_id: i64,
    ) -> DatabaseResult<i64> {
        let result: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM progreso_lecciones WHERE alumno_id = $1")
                .bind(alumno_id)
                .fetch_one(mm.executor())
                .await?;
        Ok(result)
    }
}

// Read-model rows

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct StudentListRow {
    pub alumno_id: i64,
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub pais_id: Option<i64>,
    pub nombre_pais: Option<String>,
    pub fecha_registro: DateTime<Utc>,
    pub estado: RecordStatus,
}

impl StudentListRow {
    pub async fn fetch_all(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT a.alumno_id, a.nombre, a.email, a.telefono, a.pais_id, \
                    p.nombre_pais, a.fecha_registro, a.estado \
             FROM alumnos a \
             LEFT JOIN paises p ON a.pais_id = p.pais_id \
             ORDER BY a.nombre",
        )
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct StudentStats {
    pub total: i64,
    pub activos: i64,
    pub inactivos: i64,
    pub total_paises: i64,
}

impl StudentStats {
    pub async fn fetch(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Self> {
        // COUNT yields 0 rather than NULL on an empty table, which is
        // exactly the zero-default the dashboard wants
        let row = sqlx::query_as(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE estado = 'ACTIVO') AS activos, \
                    COUNT(*) FILTER (WHERE estado = 'INACTIVO') AS inactivos, \
                    COUNT(DISTINCT pais_id) AS total_paises \
             FROM alumnos",
        )
        .fetch_one(mm.executor())
        .await?;
        Ok(row)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct StudentsByCountryRow {
    pub pais: String,
    pub cantidad: i64,
}

impl StudentsByCountryRow {
    pub async fn fetch_all(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            "SELECT p.nombre_pais AS pais, COUNT(a.alumno_id) AS cantidad \
             FROM alumnos a \
             JOIN paises p ON a.pais_id = p.pais_id \
             GROUP BY p.pais_id, p.nombre_pais \
             ORDER BY cantidad DESC",
        )
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct StudentProfileRow {
    pub alumno_id: i64,
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub pais_id: Option<i64>,
    pub nombre_pais: Option<String>,
    pub fecha_registro: DateTime<Utc>,
    pub estado: RecordStatus,
}

impl StudentProfileRow {
    /// Profile keyed by the *user* id, the way the dashboard asks for it.
    pub async fn find_by_usuario_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        usuario_id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            "SELECT a.alumno_id, a.nombre, u.email, a.telefono, p.pais_id, \
                    p.nombre_pais, a.fecha_registro, a.estado \
             FROM alumnos a \
             JOIN usuarios u ON a.usuario_id = u.usuario_id \
             LEFT JOIN paises p ON a.pais_id = p.pais_id \
             WHERE a.usuario_id = $1",
        )
        .bind(usuario_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(row)
    }
}
