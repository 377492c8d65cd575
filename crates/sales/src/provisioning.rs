//! Line auto-provisioning: resolve (or lazily create) the service product
//! and packaging unit a quotation line refers to by free text.
//!
//! All catalog access follows search-before-create: exact name match,
//! then case-insensitive contains, then create. A concurrent creator can
//! still slip a duplicate in between the search and the create; that is
//! accepted and surfaces as two catalog rows, never as a failed write.

use std::future::Future;

use tracing::{info, warn};
use uuid::Uuid;

use wasteflow_core::config::CatalogConfig;
use wasteflow_core::domain::catalog::{
    Product, ProductCategory, ProductCategoryId, ProductId, ProductKind, Uom, UomClass, UomId,
};
use wasteflow_core::domain::quotation::{QuotationId, QuotationLine};
use wasteflow_db::repositories::{CatalogRepository, RepositoryError};

/// Idempotent search-or-create over one catalog entity kind. `exact` and
/// `contains` are consulted in that order; only when both miss does
/// `create` run.
pub async fn resolve_or_create<E, Exact, Contains, Create>(
    exact: Exact,
    contains: Contains,
    create: Create,
) -> Result<E, RepositoryError>
where
    Exact: Future<Output = Result<Option<E>, RepositoryError>>,
    Contains: Future<Output = Result<Option<E>, RepositoryError>>,
    Create: Future<Output = Result<E, RepositoryError>>,
{
    if let Some(found) = exact.await? {
        return Ok(found);
    }
    if let Some(found) = contains.await? {
        return Ok(found);
    }
    create.await
}

/// Conversion factor for a packaging unit derived from a residue's
/// declared volume. Degenerate volumes (zero, negative, NaN, infinite)
/// fall back to 1.0.
pub fn packaging_factor(volume: f64) -> f64 {
    if volume.is_finite() && volume > 0.0 {
        1.0 / volume
    } else {
        1.0
    }
}

pub struct Provisioner<'a, C: CatalogRepository + ?Sized> {
    catalog: &'a C,
    defaults: &'a CatalogConfig,
}

impl<'a, C: CatalogRepository + ?Sized> Provisioner<'a, C> {
    pub fn new(catalog: &'a C, defaults: &'a CatalogConfig) -> Self {
        Self { catalog, defaults }
    }

    /// Run the resolution state machine over one line. Returns whether the
    /// line changed. Catalog failures are logged with identifying context
    /// and leave the line unresolved; they never propagate, so one bad
    /// line cannot abort a batch.
    ///
    /// Resolution order when both selection flags are set: the new-service
    /// branch wins, and the existing-service branch is skipped entirely
    /// while `create_new_service` is true.
    pub async fn provision_line(
        &self,
        quotation_id: &QuotationId,
        line_no: usize,
        line: &mut QuotationLine,
    ) -> bool {
        let mut changed = false;

        if line.create_new_service {
            if line.product_id.is_none() {
                if let Some(residue_name) = nonempty(line.residue_name.as_deref()) {
                    match self.resolve_service_product(&residue_name).await {
                        Ok(product) => {
                            adopt_product(line, &product);
                            changed = true;
                        }
                        Err(error) => {
                            warn!(
                                event_name = "sales.provisioning.service_unresolved",
                                quotation_id = %quotation_id.0,
                                line_no,
                                residue_name = %residue_name,
                                error = %error,
                                "service product resolution failed, line left unresolved"
                            );
                        }
                    }
                }
            }
        } else if line.product_id.is_none() {
            if let Some(existing_id) = line.existing_service_id.clone() {
                match self.catalog.find_product_by_id(&existing_id).await {
                    Ok(Some(product)) => {
                        adopt_product(line, &product);
                        changed = true;
                    }
                    Ok(None) => {
                        warn!(
                            event_name = "sales.provisioning.existing_service_missing",
                            quotation_id = %quotation_id.0,
                            line_no,
                            product_id = %existing_id.0,
                            "existing service reference points at a missing product"
                        );
                    }
                    Err(error) => {
                        warn!(
                            event_name = "sales.provisioning.existing_service_lookup_failed",
                            quotation_id = %quotation_id.0,
                            line_no,
                            product_id = %existing_id.0,
                            error = %error,
                            "existing service lookup failed, line left unresolved"
                        );
                    }
                }
            }
        }

        if line.create_new_packaging && line.packaging_id.is_none() {
            if let Some(packaging_name) = nonempty(line.packaging_name.as_deref()) {
                match self.resolve_packaging_uom(&packaging_name, line.residue_volume).await {
                    Ok(uom) => {
                        line.packaging_id = Some(uom.id);
                        changed = true;
                    }
                    Err(error) => {
                        warn!(
                            event_name = "sales.provisioning.packaging_unresolved",
                            quotation_id = %quotation_id.0,
                            line_no,
                            packaging_name = %packaging_name,
                            error = %error,
                            "packaging unit resolution failed, line left unresolved"
                        );
                    }
                }
            }
        }

        changed
    }

    /// Resolve a service product by residue name, creating it under the
    /// configured category and service unit when the catalog has no match.
    pub async fn resolve_service_product(&self, name: &str) -> Result<Product, RepositoryError> {
        resolve_or_create(
            self.catalog.find_product_by_name(name),
            self.catalog.find_product_by_name_ci(name),
            async {
                let category = self.resolve_service_category().await?;
                let uom = self.resolve_service_uom().await?;

                let product = Product {
                    id: ProductId(format!("prod-{}", Uuid::new_v4())),
                    name: name.to_string(),
                    kind: ProductKind::Service,
                    category_id: Some(category.id),
                    uom_id: Some(uom.id),
                };
                self.catalog.create_product(product.clone()).await?;
                info!(
                    event_name = "sales.provisioning.service_created",
                    product_id = %product.id.0,
                    name = %product.name,
                    "created service product from residue name"
                );
                Ok(product)
            },
        )
        .await
    }

    async fn resolve_service_category(&self) -> Result<ProductCategory, RepositoryError> {
        let name = self.defaults.service_category.as_str();
        resolve_or_create(
            self.catalog.find_category_by_name(name),
            self.catalog.find_category_by_name_ci(name),
            async {
                let category = ProductCategory {
                    id: ProductCategoryId(format!("cat-{}", Uuid::new_v4())),
                    name: name.to_string(),
                };
                self.catalog.create_category(category.clone()).await?;
                info!(
                    event_name = "sales.provisioning.category_created",
                    category_id = %category.id.0,
                    name = %category.name,
                    "created service category"
                );
                Ok(category)
            },
        )
        .await
    }

    /// The service unit copies its attributes from the count reference
    /// unit; when even that is missing, plain defaults apply.
    async fn resolve_service_uom(&self) -> Result<Uom, RepositoryError> {
        let name = self.defaults.service_uom.as_str();
        resolve_or_create(
            self.catalog.find_uom_by_name(name),
            self.catalog.find_uom_by_name_ci(name),
            async {
                let id = UomId(format!("uom-{}", Uuid::new_v4()));
                let uom = match self.reference_uom().await? {
                    Some(reference) => reference.derive(id, name, UomClass::Unit, 1.0),
                    None => Uom {
                        id,
                        name: name.to_string(),
                        class: UomClass::Unit,
                        factor: 1.0,
                        rounding: 0.01,
                    },
                };
                self.catalog.create_uom(uom.clone()).await?;
                info!(
                    event_name = "sales.provisioning.uom_created",
                    uom_id = %uom.id.0,
                    name = %uom.name,
                    "created service unit from count reference"
                );
                Ok(uom)
            },
        )
        .await
    }

    /// Resolve a packaging unit by its user-supplied name, creating one
    /// with a volume-derived conversion factor when missing.
    pub async fn resolve_packaging_uom(
        &self,
        name: &str,
        residue_volume: f64,
    ) -> Result<Uom, RepositoryError> {
        resolve_or_create(
            self.catalog.find_uom_by_name(name),
            self.catalog.find_uom_by_name_ci(name),
            async {
                let id = UomId(format!("uom-{}", Uuid::new_v4()));
                let factor = packaging_factor(residue_volume);
                let uom = match self.reference_uom().await? {
                    Some(reference) => reference.derive(id, name, UomClass::Packaging, factor),
                    None => Uom {
                        id,
                        name: name.to_string(),
                        class: UomClass::Packaging,
                        factor,
                        rounding: 0.01,
                    },
                };
                self.catalog.create_uom(uom.clone()).await?;
                info!(
                    event_name = "sales.provisioning.packaging_created",
                    uom_id = %uom.id.0,
                    name = %uom.name,
                    factor = uom.factor,
                    "created packaging unit from free text"
                );
                Ok(uom)
            },
        )
        .await
    }

    async fn reference_uom(&self) -> Result<Option<Uom>, RepositoryError> {
        self.catalog.find_uom_by_name(self.defaults.reference_uom.as_str()).await
    }
}

fn adopt_product(line: &mut QuotationLine, product: &Product) {
    line.product_id = Some(product.id.clone());
    line.description = product.name.clone();
    if line.product_uom_id.is_none() {
        line.product_uom_id = product.uom_id.clone();
    }
}

fn nonempty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use wasteflow_core::config::AppConfig;
    use wasteflow_core::domain::catalog::{Product, ProductId, ProductKind, Uom, UomClass, UomId};
    use wasteflow_core::domain::quotation::{QuotationId, QuotationLine};
    use wasteflow_db::repositories::{CatalogRepository, InMemoryCatalogRepository};

    use super::{packaging_factor, Provisioner};

    fn quotation_id() -> QuotationId {
        QuotationId("Q-1".to_string())
    }

    async fn catalog_with_reference() -> InMemoryCatalogRepository {
        let catalog = InMemoryCatalogRepository::default();
        catalog
            .insert_uom(Uom {
                id: UomId("uom-units".to_string()),
                name: "Units".to_string(),
                class: UomClass::Unit,
                factor: 1.0,
                rounding: 0.01,
            })
            .await;
        catalog
    }

    #[tokio::test]
    async fn service_resolution_is_idempotent_per_name() {
        let catalog = InMemoryCatalogRepository::default();
        let config = AppConfig::default();
        let provisioner = Provisioner::new(&catalog, &config.catalog);

        let first = provisioner.resolve_service_product("Used Oil").await.expect("first");
        let second = provisioner.resolve_service_product("Used Oil").await.expect("second");

        assert_eq!(first.id, second.id, "second resolution must reuse the first product");
        assert_eq!(catalog.product_count().await, 1);
    }

    #[tokio::test]
    async fn created_service_gets_category_and_service_unit() {
        let catalog = InMemoryCatalogRepository::default();
        let config = AppConfig::default();
        let provisioner = Provisioner::new(&catalog, &config.catalog);

        let product = provisioner.resolve_service_product("Used Oil").await.expect("resolve");

        assert_eq!(product.kind, ProductKind::Service);
        let category = catalog
            .find_category_by_name("Waste Services")
            .await
            .expect("category search")
            .expect("category created");
        assert_eq!(product.category_id, Some(category.id));

        let service_uom = catalog
            .find_uom_by_name("Service Unit")
            .await
            .expect("uom search")
            .expect("service unit created");
        assert_eq!(product.uom_id, Some(service_uom.id));
    }

    #[tokio::test]
    async fn case_insensitive_match_reuses_existing_product() {
        let catalog = InMemoryCatalogRepository::default();
        catalog
            .insert_product(Product {
                id: ProductId("prod-oil".to_string()),
                name: "USED OIL".to_string(),
                kind: ProductKind::Service,
                category_id: None,
                uom_id: None,
            })
            .await;
        let config = AppConfig::default();
        let provisioner = Provisioner::new(&catalog, &config.catalog);

        let resolved = provisioner.resolve_service_product("used oil").await.expect("resolve");

        assert_eq!(resolved.id, ProductId("prod-oil".to_string()));
        assert_eq!(catalog.product_count().await, 1);
    }

    #[tokio::test]
    async fn packaging_unit_derives_factor_from_volume() {
        let catalog = catalog_with_reference().await;
        let config = AppConfig::default();
        let provisioner = Provisioner::new(&catalog, &config.catalog);

        let drum = provisioner.resolve_packaging_uom("200L Drum", 10.0).await.expect("resolve");

        assert_eq!(drum.class, UomClass::Packaging);
        assert_eq!(drum.factor, 0.1);
        assert_eq!(drum.rounding, 0.01, "precision copied from the count reference");
    }

    #[tokio::test]
    async fn existing_service_branch_skipped_while_new_flag_set() {
        let catalog = InMemoryCatalogRepository::default();
        catalog
            .insert_product(Product {
                id: ProductId("prod-existing".to_string()),
                name: "Existing Service".to_string(),
                kind: ProductKind::Service,
                category_id: None,
                uom_id: None,
            })
            .await;
        let config = AppConfig::default();
        let provisioner = Provisioner::new(&catalog, &config.catalog);

        // Malformed state: both the new-service flag and an existing
        // reference are set. The new-service branch wins.
        let mut line = QuotationLine {
            create_new_service: true,
            residue_name: Some("Used Oil".to_string()),
            existing_service_id: Some(ProductId("prod-existing".to_string())),
            ..QuotationLine::default()
        };

        provisioner.provision_line(&quotation_id(), 0, &mut line).await;

        let resolved = line.product_id.expect("line resolved");
        assert_ne!(resolved, ProductId("prod-existing".to_string()));
        assert_eq!(line.description, "Used Oil");
    }

    #[tokio::test]
    async fn blank_residue_name_leaves_line_unresolved() {
        let catalog = InMemoryCatalogRepository::default();
        let config = AppConfig::default();
        let provisioner = Provisioner::new(&catalog, &config.catalog);

        let mut line = QuotationLine {
            create_new_service: true,
            residue_name: Some("   ".to_string()),
            ..QuotationLine::default()
        };

        let changed = provisioner.provision_line(&quotation_id(), 0, &mut line).await;

        assert!(!changed);
        assert!(line.product_id.is_none());
        assert_eq!(catalog.product_count().await, 0);
    }

    #[test]
    fn packaging_factor_guards_degenerate_volumes() {
        assert_eq!(packaging_factor(10.0), 0.1);
        assert_eq!(packaging_factor(0.0), 1.0);
        assert_eq!(packaging_factor(-2.0), 1.0);
        assert_eq!(packaging_factor(f64::NAN), 1.0);
        assert_eq!(packaging_factor(f64::INFINITY), 1.0);
    }
}
