use std::collections::HashMap;

use tokio::sync::RwLock;

use wasteflow_core::domain::catalog::{Product, ProductCategory, ProductId, Uom};
use wasteflow_core::domain::delivery::Delivery;
use wasteflow_core::domain::lead::{Lead, LeadId};
use wasteflow_core::domain::partner::{Partner, PartnerId};
use wasteflow_core::domain::quotation::{Quotation, QuotationId};

use super::{
    CatalogRepository, DeliveryRepository, LeadRepository, PartnerRepository, QuotationRepository,
    RepositoryError,
};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Default)]
pub struct InMemoryLeadRepository {
    leads: RwLock<HashMap<String, Lead>>,
}

impl InMemoryLeadRepository {
    pub async fn insert(&self, lead: Lead) {
        let mut leads = self.leads.write().await;
        leads.insert(lead.id.0.clone(), lead);
    }
}

#[async_trait::async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        let leads = self.leads.read().await;
        Ok(leads.get(&id.0).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryPartnerRepository {
    partners: RwLock<HashMap<String, Partner>>,
}

impl InMemoryPartnerRepository {
    pub async fn insert(&self, partner: Partner) {
        let mut partners = self.partners.write().await;
        partners.insert(partner.id.0.clone(), partner);
    }
}

#[async_trait::async_trait]
impl PartnerRepository for InMemoryPartnerRepository {
    async fn find_by_id(&self, id: &PartnerId) -> Result<Option<Partner>, RepositoryError> {
        let partners = self.partners.read().await;
        Ok(partners.get(&id.0).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryQuotationRepository {
    quotations: RwLock<HashMap<String, Quotation>>,
}

#[async_trait::async_trait]
impl QuotationRepository for InMemoryQuotationRepository {
    async fn find_by_id(&self, id: &QuotationId) -> Result<Option<Quotation>, RepositoryError> {
        let quotations = self.quotations.read().await;
        Ok(quotations.get(&id.0).cloned())
    }

    async fn save(&self, quotation: Quotation) -> Result<(), RepositoryError> {
        let mut quotations = self.quotations.write().await;
        quotations.insert(quotation.id.0.clone(), quotation);
        Ok(())
    }

    async fn list_derived(&self, id: &QuotationId) -> Result<Vec<Quotation>, RepositoryError> {
        let quotations = self.quotations.read().await;
        let mut derived: Vec<Quotation> = quotations
            .values()
            .filter(|quotation| quotation.related_quotation_id.as_ref() == Some(id))
            .cloned()
            .collect();
        derived.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(derived)
    }

    async fn count_derived(&self, id: &QuotationId) -> Result<u64, RepositoryError> {
        Ok(self.list_derived(id).await?.len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryCatalogRepository {
    products: RwLock<HashMap<String, Product>>,
    categories: RwLock<HashMap<String, ProductCategory>>,
    uoms: RwLock<HashMap<String, Uom>>,
}

impl InMemoryCatalogRepository {
    pub async fn insert_product(&self, product: Product) {
        let mut products = self.products.write().await;
        products.insert(product.id.0.clone(), product);
    }

    pub async fn insert_category(&self, category: ProductCategory) {
        let mut categories = self.categories.write().await;
        categories.insert(category.id.0.clone(), category);
    }

    pub async fn insert_uom(&self, uom: Uom) {
        let mut uoms = self.uoms.write().await;
        uoms.insert(uom.id.0.clone(), uom);
    }

    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn uom_count(&self) -> usize {
        self.uoms.read().await.len()
    }
}

fn first_by_name<T: Clone>(
    records: &HashMap<String, T>,
    name: &str,
    name_of: impl Fn(&T) -> &str,
    ci: bool,
) -> Option<T> {
    // Deterministic pick: lowest id wins, like the SQL `ORDER BY id LIMIT 1`.
    let mut candidates: Vec<(&String, &T)> = records
        .iter()
        .filter(|(_, record)| {
            if ci {
                contains_ci(name_of(record), name)
            } else {
                name_of(record) == name
            }
        })
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(b.0));
    candidates.first().map(|(_, record)| (*record).clone())
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_product_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).cloned())
    }

    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(first_by_name(&products, name, |product| &product.name, false))
    }

    async fn find_product_by_name_ci(
        &self,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(first_by_name(&products, name, |product| &product.name, true))
    }

    async fn create_product(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id.0) {
            return Err(RepositoryError::Constraint(format!(
                "product id `{}` already exists",
                product.id.0
            )));
        }
        products.insert(product.id.0.clone(), product);
        Ok(())
    }

    async fn find_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ProductCategory>, RepositoryError> {
        let categories = self.categories.read().await;
        Ok(first_by_name(&categories, name, |category| &category.name, false))
    }

    async fn find_category_by_name_ci(
        &self,
        name: &str,
    ) -> Result<Option<ProductCategory>, RepositoryError> {
        let categories = self.categories.read().await;
        Ok(first_by_name(&categories, name, |category| &category.name, true))
    }

    async fn create_category(&self, category: ProductCategory) -> Result<(), RepositoryError> {
        let mut categories = self.categories.write().await;
        if categories.contains_key(&category.id.0) {
            return Err(RepositoryError::Constraint(format!(
                "category id `{}` already exists",
                category.id.0
            )));
        }
        categories.insert(category.id.0.clone(), category);
        Ok(())
    }

    async fn find_uom_by_name(&self, name: &str) -> Result<Option<Uom>, RepositoryError> {
        let uoms = self.uoms.read().await;
        Ok(first_by_name(&uoms, name, |uom| &uom.name, false))
    }

    async fn find_uom_by_name_ci(&self, name: &str) -> Result<Option<Uom>, RepositoryError> {
        let uoms = self.uoms.read().await;
        Ok(first_by_name(&uoms, name, |uom| &uom.name, true))
    }

    async fn create_uom(&self, uom: Uom) -> Result<(), RepositoryError> {
        let mut uoms = self.uoms.write().await;
        if uoms.contains_key(&uom.id.0) {
            return Err(RepositoryError::Constraint(format!(
                "uom id `{}` already exists",
                uom.id.0
            )));
        }
        uoms.insert(uom.id.0.clone(), uom);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryDeliveryRepository {
    deliveries: RwLock<HashMap<String, Delivery>>,
}

impl InMemoryDeliveryRepository {
    pub async fn insert(&self, delivery: Delivery) {
        let mut deliveries = self.deliveries.write().await;
        deliveries.insert(delivery.id.0.clone(), delivery);
    }
}

#[async_trait::async_trait]
impl DeliveryRepository for InMemoryDeliveryRepository {
    async fn list_for_quotation(
        &self,
        id: &QuotationId,
    ) -> Result<Vec<Delivery>, RepositoryError> {
        let deliveries = self.deliveries.read().await;
        let mut linked: Vec<Delivery> = deliveries
            .values()
            .filter(|delivery| &delivery.quotation_id == id)
            .cloned()
            .collect();
        linked.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(linked)
    }

    async fn save(&self, delivery: Delivery) -> Result<(), RepositoryError> {
        let mut deliveries = self.deliveries.write().await;
        deliveries.insert(delivery.id.0.clone(), delivery);
        Ok(())
    }
}
