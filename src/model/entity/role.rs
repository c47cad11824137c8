use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::{
    model::{ModelManager, ResourceTyped, error::DatabaseResult},
    web::AuthenticatedUser,
};

/// Immutable reference data; seeded by migration, read-only everywhere else.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Role {
    rol_id: i64,
    nombre_rol: String,
}

impl ResourceTyped for Role {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Role
    }
}

impl Role {
    pub fn id(&self) -> i64 {
        self.rol_id
    }

    pub fn nombre(&self) -> &str {
        &self.nombre_rol
    }

    pub async fn list(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT rol_id, nombre_rol FROM roles ORDER BY nombre_rol")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_by_name(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        nombre_rol: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT rol_id, nombre_rol FROM roles WHERE nombre_rol = $1")
            .bind(nombre_rol)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}
