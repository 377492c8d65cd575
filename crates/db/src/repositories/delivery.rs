use sqlx::Row;

use wasteflow_core::domain::delivery::{Delivery, DeliveryId};
use wasteflow_core::domain::quotation::QuotationId;

use super::codec::{delivery_state_from_str, delivery_state_to_str};
use super::{DeliveryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlDeliveryRepository {
    pool: DbPool,
}

impl SqlDeliveryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DeliveryRepository for SqlDeliveryRepository {
    async fn list_for_quotation(
        &self,
        id: &QuotationId,
    ) -> Result<Vec<Delivery>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, quotation_id, name, state
             FROM deliveries WHERE quotation_id = ?1 ORDER BY id",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let state: String = row.get("state");
                Ok(Delivery {
                    id: DeliveryId(row.get("id")),
                    quotation_id: QuotationId(row.get("quotation_id")),
                    name: row.get("name"),
                    state: delivery_state_from_str(&state)?,
                })
            })
            .collect()
    }

    async fn save(&self, delivery: Delivery) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO deliveries (id, quotation_id, name, state)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (id) DO UPDATE SET
                 quotation_id = excluded.quotation_id,
                 name = excluded.name,
                 state = excluded.state",
        )
        .bind(&delivery.id.0)
        .bind(&delivery.quotation_id.0)
        .bind(&delivery.name)
        .bind(delivery_state_to_str(delivery.state))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
