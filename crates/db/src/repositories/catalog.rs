use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use wasteflow_core::domain::catalog::{
    Product, ProductCategory, ProductCategoryId, ProductId, Uom, UomId,
};

use super::codec::{
    product_kind_from_str, product_kind_to_str, uom_class_from_str, uom_class_to_str,
};
use super::{CatalogRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn product_from_row(row: SqliteRow) -> Result<Product, RepositoryError> {
    let kind: String = row.get("kind");
    Ok(Product {
        id: ProductId(row.get("id")),
        name: row.get("name"),
        kind: product_kind_from_str(&kind)?,
        category_id: row.get::<Option<String>, _>("category_id").map(ProductCategoryId),
        uom_id: row.get::<Option<String>, _>("uom_id").map(UomId),
    })
}

fn uom_from_row(row: SqliteRow) -> Result<Uom, RepositoryError> {
    let class: String = row.get("class");
    Ok(Uom {
        id: UomId(row.get("id")),
        name: row.get("name"),
        class: uom_class_from_str(&class)?,
        factor: row.get("factor"),
        rounding: row.get("rounding"),
    })
}

/// Escape the characters `LIKE` treats specially so a packaging name such
/// as `20% solvent` matches literally.
fn like_contains_pattern(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait::async_trait]
impl CatalogRepository for SqlCatalogRepository {
    async fn find_product_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, kind, category_id, uom_id FROM products WHERE id = ?1",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(product_from_row).transpose()
    }

    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, kind, category_id, uom_id
             FROM products WHERE name = ?1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(product_from_row).transpose()
    }

    async fn find_product_by_name_ci(
        &self,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, kind, category_id, uom_id
             FROM products WHERE name LIKE ?1 ESCAPE '\\' ORDER BY id LIMIT 1",
        )
        .bind(like_contains_pattern(name))
        .fetch_optional(&self.pool)
        .await?;

        row.map(product_from_row).transpose()
    }

    async fn create_product(&self, product: Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO products (id, name, kind, category_id, uom_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&product.id.0)
        .bind(&product.name)
        .bind(product_kind_to_str(product.kind))
        .bind(product.category_id.as_ref().map(|id| id.0.clone()))
        .bind(product.uom_id.as_ref().map(|id| id.0.clone()))
        .execute(&self.pool)
        .await
        .map_err(constraint_aware)?;

        Ok(())
    }

    async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ProductCategory>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name FROM product_categories WHERE name = ?1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ProductCategory {
            id: ProductCategoryId(row.get("id")),
            name: row.get("name"),
        }))
    }

    async fn find_category_by_name_ci(
        &self,
        name: &str,
    ) -> Result<Option<ProductCategory>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name FROM product_categories
             WHERE name LIKE ?1 ESCAPE '\\' ORDER BY id LIMIT 1",
        )
        .bind(like_contains_pattern(name))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ProductCategory {
            id: ProductCategoryId(row.get("id")),
            name: row.get("name"),
        }))
    }

    async fn create_category(&self, category: ProductCategory) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO product_categories (id, name) VALUES (?1, ?2)")
            .bind(&category.id.0)
            .bind(&category.name)
            .execute(&self.pool)
            .await
            .map_err(constraint_aware)?;

        Ok(())
    }

    async fn find_uom_by_name(&self, name: &str) -> Result<Option<Uom>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, class, factor, rounding
             FROM uoms WHERE name = ?1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(uom_from_row).transpose()
    }

    async fn find_uom_by_name_ci(&self, name: &str) -> Result<Option<Uom>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, class, factor, rounding
             FROM uoms WHERE name LIKE ?1 ESCAPE '\\' ORDER BY id LIMIT 1",
        )
        .bind(like_contains_pattern(name))
        .fetch_optional(&self.pool)
        .await?;

        row.map(uom_from_row).transpose()
    }

    async fn create_uom(&self, uom: Uom) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO uoms (id, name, class, factor, rounding)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&uom.id.0)
        .bind(&uom.name)
        .bind(uom_class_to_str(uom.class))
        .bind(uom.factor)
        .bind(uom.rounding)
        .execute(&self.pool)
        .await
        .map_err(constraint_aware)?;

        Ok(())
    }
}

/// Surface unique/foreign-key violations as `Constraint` so provisioning
/// can log-and-continue instead of treating them as infrastructure
/// failures.
fn constraint_aware(error: sqlx::Error) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            RepositoryError::Constraint(db_error.to_string())
        }
        sqlx::Error::Database(db_error) if db_error.is_foreign_key_violation() => {
            RepositoryError::Constraint(db_error.to_string())
        }
        _ => RepositoryError::Database(error),
    }
}
