use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;

use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Country {
    pais_id: i64,
    nombre_pais: String,
    continente_id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CountryCreate {
    pub nombre_pais: String,
    pub continente_id: i64,
}

impl ResourceTyped for Country {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Country
    }
}

impl Country {
    pub fn id(&self) -> i64 {
        self.pais_id
    }

    pub fn nombre(&self) -> &str {
        &self.nombre_pais
    }

    pub fn continente_id(&self) -> i64 {
        self.continente_id
    }
}

#[async_trait]
impl CrudRepository<Country, CountryCreate, i64> for Country {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CountryCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query(
            "INSERT INTO paises (nombre_pais, continente_id) VALUES ($1, $2) RETURNING pais_id",
        )
        .bind(&data.nombre_pais)
        .bind(data.continente_id)
        .fetch_one(mm.executor())
        .await?;

        let pais_id = result.try_get("pais_id")?;
        Ok(Country {
            pais_id,
            nombre_pais: data.nombre_pais,
            continente_id: data.continente_id,
        })
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CountryCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE paises SET nombre_pais = $1, continente_id = $2 WHERE pais_id = $3")
            .bind(&data.nombre_pais)
            .bind(data.continente_id)
            .bind(self.pais_id)
            .execute(mm.executor())
            .await?;

        self.nombre_pais = data.nombre_pais;
        self.continente_id = data.continente_id;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM paises WHERE pais_id = $1")
            .bind(self.pais_id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: i64,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM paises WHERE pais_id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM paises ORDER BY nombre_pais")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM paises")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}
