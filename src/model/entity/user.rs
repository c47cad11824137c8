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
pub struct UserEntity {
    usuario_id: i64,
    nombre: String,
    email: String,
    #[serde(skip)]
    password_hash: String,
    rol_id: i64,
    pais_id: Option<i64>,
    estado: RecordStatus,
    #[serde(skip)]
    reset_token: Option<String>,
    #[serde(skip)]
    reset_token_expires: Option<DateTime<Utc>>,
    fecha_registro: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserEntityCreate {
    pub nombre: String,
    pub email: String,
    pub password_hash: String,
    pub rol_id: i64,
    pub pais_id: Option<i64>,
}

/// Input for the self-registration transaction. The role is not a caller
/// choice; it always resolves to `estudiante`.
#[derive(Debug)]
pub struct RegisterStudent {
    pub nombre: String,
    pub email: String,
    pub password_hash: String,
    pub telefono: Option<String>,
    pub pais_id: Option<i64>,
}

/// Login projection: user row joined with its role name.
#[derive(Debug, FromRow)]
pub struct UserWithRole {
    usuario_id: i64,
    nombre: String,
    email: String,
    password_hash: String,
    nombre_rol: String,
    estado: RecordStatus,
}

impl ResourceTyped for UserEntity {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::User
    }
}

impl UserEntity {
    pub fn id(&self) -> i64 {
        self.usuario_id
    }

    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn hash(&self) -> &str {
        &self.password_hash
    }

    pub fn rol_id(&self) -> i64 {
        self.rol_id
    }

    pub fn estado(&self) -> RecordStatus {
        self.estado
    }
}

impl UserWithRole {
    pub fn id(&self) -> i64 {
        self.usuario_id
    }

    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn hash(&self) -> &str {
        &self.password_hash
    }

    pub fn nombre_rol(&self) -> &str {
        &self.nombre_rol
    }

    pub fn estado(&self) -> RecordStatus {
        self.estado
    }
}

#[async_trait]
impl CrudRepository<UserEntity, UserEntityCreate, i64> for UserEntity {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO usuarios (nombre, email, password_hash, rol_id, pais_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.nombre)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.rol_id)
        .bind(data.pais_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: UserEntityCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE usuarios SET nombre = $1, email = $2, pais_id = $3 WHERE usuario_id = $4")
            .bind(&data.nombre)
            .bind(&data.email)
            .bind(data.pais_id)
            .bind(self.usuario_id)
            .execute(mm.executor())
            .await?;

        self.nombre = data.nombre;
        self.email = data.email;
        self.pais_id = data.pais_id;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM usuarios WHERE usuario_id = $1")
            .bind(self.usuario_id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM usuarios WHERE usuario_id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM usuarios ORDER BY nombre")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for UserEntity {
    type OwnerId = i64;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.usuario_id) // owners of users are themselves
    }
}

impl UserEntity {
    pub async fn find_by_email(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        email: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM usuarios WHERE email = $1")
            .bind(email)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_with_role_by_email(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        email: &str,
    ) -> DatabaseResult<Option<UserWithRole>> {
        let result = sqlx::query_as(
            "SELECT u.usuario_id, u.nombre, u.email, u.password_hash, u.estado, r.nombre_rol \
             FROM usuarios u JOIN roles r ON u.rol_id = r.rol_id WHERE u.email = $1",
        )
        .bind(email)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    /// Self-registration: one usuario row plus its linked alumno row, as a
    /// single unit. Any failure mid-way drops the transaction and nothing
    /// persists; in particular no user-without-student state can survive.
    pub async fn register_student(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: RegisterStudent,
    ) -> DatabaseResult<(i64, i64)> {
        let mut tx = mm.begin().await?;

        let rol_id: i64 = sqlx::query_scalar("SELECT rol_id FROM roles WHERE nombre_rol = $1")
            .bind("estudiante")
            .fetch_one(&mut *tx)
            .await?;

        let usuario_id: i64 = sqlx::query_scalar(
            "INSERT INTO usuarios (nombre, email, password_hash, rol_id, pais_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING usuario_id",
        )
        .bind(&data.nombre)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(rol_id)
        .bind(data.pais_id)
        .fetch_one(&mut *tx)
        .await?;

        let alumno_id: i64 = sqlx::query_scalar(
            "INSERT INTO alumnos (usuario_id, nombre, email, telefono, pais_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING alumno_id",
        )
        .bind(usuario_id)
        .bind(&data.nombre)
        .bind(&data.email)
        .bind(&data.telefono)
        .bind(data.pais_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((usuario_id, alumno_id))
    }

    pub async fn set_reset_token(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        usuario_id: i64,
        token: &str,
        expires: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        sqlx::query(
            "UPDATE usuarios SET reset_token = $1, reset_token_expires = $2 WHERE usuario_id = $3",
        )
        .bind(token)
        .bind(expires)
        .bind(usuario_id)
        .execute(mm.executor())
        .await?;
        Ok(())
    }

    /// Exact stored-token match, still unexpired, on an active account.
    pub async fn find_by_valid_reset_token(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        token: &str,
    ) -> DatabaseResult<Option<i64>> {
        let result = sqlx::query_scalar(
            "SELECT usuario_id FROM usuarios \
             WHERE reset_token = $1 AND reset_token_expires > now() AND estado = 'ACTIVO'",
        )
        .bind(token)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    /// Replaces the hash and burns the token in one statement (single use).
    pub async fn replace_password(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        usuario_id: i64,
        password_hash: &str,
    ) -> DatabaseResult<()> {
        sqlx::query(
            "UPDATE usuarios SET password_hash = $1, reset_token = NULL, \
             reset_token_expires = NULL WHERE usuario_id = $2",
        )
        .bind(password_hash)
        .bind(usuario_id)
        .execute(mm.executor())
        .await?;
        Ok(())
    }

    pub async fn toggle_estado(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        usuario_id: i64,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE usuarios SET estado = CASE WHEN estado = 'ACTIVO' \
             THEN 'INACTIVO'::estado_registro ELSE 'ACTIVO'::estado_registro END \
             WHERE usuario_id = $1",
        )
        .bind(usuario_id)
        .execute(mm.executor())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
