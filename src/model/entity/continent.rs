use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;

use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::model::repo::ResourceTyped;
use crate::web::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Continent {
    continente_id: i64,
    nombre_continente: String,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ContinentCreate {
    pub nombre_continente: String,
}

impl ResourceTyped for Continent {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Continent
    }
}

impl Continent {
    pub fn id(&self) -> i64 {
        self.continente_id
    }

    pub fn nombre(&self) -> &str {
        &self.nombre_continente
    }
}

#[async_trait]
impl CrudRepository<Continent, ContinentCreate, i64> for Continent {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ContinentCreate,
    ) -> DatabaseResult<Self> {
        let result =
            sqlx::query("INSERT INTO continentes (nombre_continente) VALUES ($1) RETURNING continente_id")
                .bind(&data.nombre_continente)
                .fetch_one(mm.executor())
                .await?;

        let continente_id = result.try_get("continente_id")?;
        Ok(Continent {
            continente_id,
            nombre_continente: data.nombre_continente,
        })
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ContinentCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE continentes SET nombre_continente = $1 WHERE continente_id = $2")
            .bind(&data.nombre_continente)
            .bind(self.continente_id)
            .execute(mm.executor())
            .await?;

        self.nombre_continente = data.nombre_continente;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM continentes WHERE continente_id = $1")
            .bind(self.continente_id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM continentes WHERE continente_id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM continentes ORDER BY nombre_continente")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM continentes")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}
