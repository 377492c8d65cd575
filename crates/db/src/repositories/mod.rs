use async_trait::async_trait;
use thiserror::Error;

use wasteflow_core::domain::catalog::{Product, ProductCategory, ProductId, Uom};
use wasteflow_core::domain::delivery::Delivery;
use wasteflow_core::domain::lead::{Lead, LeadId};
use wasteflow_core::domain::partner::{Partner, PartnerId};
use wasteflow_core::domain::quotation::{Quotation, QuotationId};

pub(crate) mod codec;
pub mod catalog;
pub mod delivery;
pub mod lead;
pub mod memory;
pub mod partner;
pub mod quotation;

pub use catalog::SqlCatalogRepository;
pub use delivery::SqlDeliveryRepository;
pub use lead::SqlLeadRepository;
pub use memory::{
    InMemoryCatalogRepository, InMemoryDeliveryRepository, InMemoryLeadRepository,
    InMemoryPartnerRepository, InMemoryQuotationRepository,
};
pub use partner::SqlPartnerRepository;
pub use quotation::SqlQuotationRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
}

/// Read-only access to leads: the propagation logic copies from them and
/// never writes back.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError>;
}

#[async_trait]
pub trait PartnerRepository: Send + Sync {
    async fn find_by_id(&self, id: &PartnerId) -> Result<Option<Partner>, RepositoryError>;
}

#[async_trait]
pub trait QuotationRepository: Send + Sync {
    async fn find_by_id(&self, id: &QuotationId) -> Result<Option<Quotation>, RepositoryError>;
    async fn save(&self, quotation: Quotation) -> Result<(), RepositoryError>;
    async fn list_derived(&self, id: &QuotationId) -> Result<Vec<Quotation>, RepositoryError>;
    async fn count_derived(&self, id: &QuotationId) -> Result<u64, RepositoryError>;
}

/// Name-based search and lazy creation over the shared product/category/
/// unit catalog. `*_by_name` is an exact match; `*_by_name_ci` is a
/// case-insensitive contains-search used as the fallback before creating.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_product_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError>;
    async fn find_product_by_name_ci(&self, name: &str)
        -> Result<Option<Product>, RepositoryError>;
    async fn create_product(&self, product: Product) -> Result<(), RepositoryError>;

    async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ProductCategory>, RepositoryError>;
    async fn find_category_by_name_ci(
        &self,
        name: &str,
    ) -> Result<Option<ProductCategory>, RepositoryError>;
    async fn create_category(&self, category: ProductCategory) -> Result<(), RepositoryError>;

    async fn find_uom_by_name(&self, name: &str) -> Result<Option<Uom>, RepositoryError>;
    async fn find_uom_by_name_ci(&self, name: &str) -> Result<Option<Uom>, RepositoryError>;
    async fn create_uom(&self, uom: Uom) -> Result<(), RepositoryError>;
}

/// The slice of the delivery subsystem this extension touches: enumerate
/// the shipments linked to a quotation and persist a cancellation.
#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    async fn list_for_quotation(
        &self,
        id: &QuotationId,
    ) -> Result<Vec<Delivery>, RepositoryError>;
    async fn save(&self, delivery: Delivery) -> Result<(), RepositoryError>;
}
