use sqlx::Row;

use wasteflow_core::domain::partner::{Partner, PartnerId};

use super::{PartnerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPartnerRepository {
    pool: DbPool,
}

impl SqlPartnerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PartnerRepository for SqlPartnerRepository {
    async fn find_by_id(&self, id: &PartnerId) -> Result<Option<Partner>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, street, street2, city, state, zip, country
             FROM partners WHERE id = ?1",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Partner {
            id: PartnerId(row.get("id")),
            name: row.get("name"),
            street: row.get("street"),
            street2: row.get("street2"),
            city: row.get("city"),
            state: row.get("state"),
            zip: row.get("zip"),
            country: row.get("country"),
        }))
    }
}
