use std::sync::Arc;

use tracing::{debug, info};

use wasteflow_core::config::CatalogConfig;
use wasteflow_core::domain::delivery::DeliveryState;
use wasteflow_core::domain::quotation::{
    LinePatch, Patch, Quotation, QuotationId, QuotationLine, QuotationPatch, SyncMode,
};
use wasteflow_core::rules::pickup::pickup_autofill;
use wasteflow_core::rules::propagation::apply_lead;
use wasteflow_db::repositories::{
    CatalogRepository, DeliveryRepository, LeadRepository, QuotationRepository,
};

use crate::context::{CreateContext, WriteContext};
use crate::errors::LifecycleError;
use crate::provisioning::Provisioner;

/// Lifecycle hooks for quotations. The host action layer funnels record
/// creation, updates, and confirmation through here; everything else
/// (persistence, validation, UI) stays with the collaborators.
pub struct QuotationLifecycle<L, Q, C, D> {
    leads: Arc<L>,
    quotations: Arc<Q>,
    catalog: Arc<C>,
    deliveries: Arc<D>,
    catalog_defaults: CatalogConfig,
}

impl<L, Q, C, D> QuotationLifecycle<L, Q, C, D>
where
    L: LeadRepository,
    Q: QuotationRepository,
    C: CatalogRepository,
    D: DeliveryRepository,
{
    pub fn new(
        leads: Arc<L>,
        quotations: Arc<Q>,
        catalog: Arc<C>,
        deliveries: Arc<D>,
        catalog_defaults: CatalogConfig,
    ) -> Self {
        Self { leads, quotations, catalog, deliveries, catalog_defaults }
    }

    fn provisioner(&self) -> Provisioner<'_, C> {
        Provisioner::new(self.catalog.as_ref(), &self.catalog_defaults)
    }

    async fn load(&self, id: &QuotationId) -> Result<Quotation, LifecycleError> {
        self.quotations
            .find_by_id(id)
            .await?
            .ok_or_else(|| LifecycleError::QuotationNotFound(id.0.clone()))
    }

    /// Creation hook. Each draft is processed independently against its
    /// own lead reference (explicit `opportunity_id`, or the ambient
    /// default from the creation context); a missing or unresolvable lead
    /// is a no-op that keeps the caller-supplied values.
    pub async fn create_batch(
        &self,
        drafts: Vec<Quotation>,
        ctx: &CreateContext,
    ) -> Result<Vec<Quotation>, LifecycleError> {
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            created.push(self.create_one(draft, ctx).await?);
        }
        Ok(created)
    }

    async fn create_one(
        &self,
        mut quotation: Quotation,
        ctx: &CreateContext,
    ) -> Result<Quotation, LifecycleError> {
        let opportunity =
            quotation.opportunity_id.clone().or_else(|| ctx.default_opportunity_id.clone());

        if let Some(lead_id) = opportunity {
            match self.leads.find_by_id(&lead_id).await? {
                Some(lead) => {
                    apply_lead(&mut quotation, &lead);
                    info!(
                        event_name = "sales.quotation.lead_propagated",
                        quotation_id = %quotation.id.0,
                        lead_id = %lead_id.0,
                        lines = quotation.lines.len(),
                        "copied lead qualification data onto quotation"
                    );
                }
                None => {
                    debug!(
                        event_name = "sales.quotation.lead_missing",
                        quotation_id = %quotation.id.0,
                        lead_id = %lead_id.0,
                        "lead reference did not resolve, keeping caller-supplied values"
                    );
                }
            }
        }

        self.provision_lines(&mut quotation).await;
        self.quotations.save(quotation.clone()).await?;

        // Quotations created without any lead still default their pickup
        // location; non-forcing, so copied values are kept.
        self.autofill_pickup(quotation, false).await
    }

    /// Write hook. Setting a tracked reference directly forces its sync
    /// marker (`Manual` for a value, `Auto` for a clear); a customer
    /// change without an explicit pickup triggers a forced refresh, any
    /// other write a non-forcing one. Writes carrying the suppress guard
    /// are applied verbatim.
    pub async fn write(
        &self,
        id: &QuotationId,
        mut patch: QuotationPatch,
        ctx: &WriteContext,
    ) -> Result<Quotation, LifecycleError> {
        if ctx.suppress_pickup_autofill {
            return self.write_suppressed(id, patch).await;
        }

        let mut quotation = self.load(id).await?;

        if let Some(value) = patch.pickup_location_id.as_set() {
            patch.pickup_location_sync = Patch::Set(if value.is_some() {
                SyncMode::Manual
            } else {
                SyncMode::Auto
            });
        }
        if let Some(value) = patch.final_destination_id.as_set() {
            patch.final_destination_sync = Patch::Set(if value.is_some() {
                SyncMode::Manual
            } else {
                SyncMode::Auto
            });
        }

        let partner_changed = patch.partner_id.is_set() || patch.partner_shipping_id.is_set();
        let pickup_set = patch.pickup_location_id.is_set();

        patch.apply(&mut quotation);
        self.quotations.save(quotation.clone()).await?;

        let force = partner_changed && !pickup_set;
        self.autofill_pickup(quotation, force).await
    }

    /// Apply a patch verbatim, bypassing the consistency rules. This is
    /// the guarded write: both the external suppress-cascade path and the
    /// autofill's own write land here, so a refresh can never recurse.
    async fn write_suppressed(
        &self,
        id: &QuotationId,
        patch: QuotationPatch,
    ) -> Result<Quotation, LifecycleError> {
        let mut quotation = self.load(id).await?;
        patch.apply(&mut quotation);
        self.quotations.save(quotation.clone()).await?;
        Ok(quotation)
    }

    /// Consult the pure autofill rule and, when it proposes a partner,
    /// apply it through the guarded write path.
    async fn autofill_pickup(
        &self,
        quotation: Quotation,
        force: bool,
    ) -> Result<Quotation, LifecycleError> {
        let Some(partner) = pickup_autofill(&quotation, force) else {
            return Ok(quotation);
        };

        info!(
            event_name = "sales.quotation.pickup_autofilled",
            quotation_id = %quotation.id.0,
            partner_id = %partner.0,
            force,
            "pickup location refreshed from customer references"
        );

        let patch = QuotationPatch {
            pickup_location_id: Patch::Set(Some(partner)),
            pickup_location_sync: Patch::Set(SyncMode::Auto),
            ..QuotationPatch::default()
        };
        self.write_suppressed(&quotation.id, patch).await
    }

    async fn provision_lines(&self, quotation: &mut Quotation) {
        let provisioner = self.provisioner();
        let id = quotation.id.clone();
        for (line_no, line) in quotation.lines.iter_mut().enumerate() {
            provisioner.provision_line(&id, line_no, line).await;
        }
    }

    /// Append a user-created line, running auto-provisioning on it first.
    pub async fn add_line(
        &self,
        id: &QuotationId,
        mut line: QuotationLine,
    ) -> Result<Quotation, LifecycleError> {
        let mut quotation = self.load(id).await?;
        let line_no = quotation.lines.len();
        self.provisioner().provision_line(id, line_no, &mut line).await;
        quotation.lines.push(line);
        self.quotations.save(quotation.clone()).await?;
        Ok(quotation)
    }

    /// Update one line and re-run auto-provisioning on it.
    pub async fn update_line(
        &self,
        id: &QuotationId,
        line_no: usize,
        patch: LinePatch,
    ) -> Result<Quotation, LifecycleError> {
        let mut quotation = self.load(id).await?;
        let provisioner = self.provisioner();

        let line = quotation.lines.get_mut(line_no).ok_or_else(|| {
            LifecycleError::LineNotFound { quotation: id.0.clone(), line_no }
        })?;
        patch.apply(line);
        provisioner.provision_line(id, line_no, line).await;

        self.quotations.save(quotation.clone()).await?;
        Ok(quotation)
    }

    /// Confirmation hook. With delivery suppression set, every linked
    /// shipment still open is cancelled; done or already-cancelled ones
    /// are left alone. Quotation fields other than the status are
    /// untouched.
    pub async fn confirm(&self, id: &QuotationId) -> Result<Quotation, LifecycleError> {
        let mut quotation = self.load(id).await?;
        quotation.confirm()?;
        self.quotations.save(quotation.clone()).await?;

        if quotation.no_delivery {
            for mut delivery in self.deliveries.list_for_quotation(id).await? {
                if !delivery.is_cancellable() {
                    debug!(
                        event_name = "sales.delivery.skip_cancel",
                        quotation_id = %id.0,
                        delivery_id = %delivery.id.0,
                        state = ?delivery.state,
                        "delivery is not open, leaving it untouched"
                    );
                    continue;
                }
                delivery.state = DeliveryState::Cancelled;
                self.deliveries.save(delivery.clone()).await?;
                info!(
                    event_name = "sales.delivery.cancelled",
                    quotation_id = %id.0,
                    delivery_id = %delivery.id.0,
                    "cancelled delivery of a no-delivery quotation"
                );
            }
        }

        Ok(quotation)
    }

    pub async fn derived_count(&self, id: &QuotationId) -> Result<u64, LifecycleError> {
        Ok(self.quotations.count_derived(id).await?)
    }

    pub async fn list_derived(&self, id: &QuotationId) -> Result<Vec<Quotation>, LifecycleError> {
        Ok(self.quotations.list_derived(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wasteflow_core::config::AppConfig;
    use wasteflow_core::domain::catalog::ProductId;
    use wasteflow_core::domain::delivery::{Delivery, DeliveryId, DeliveryState};
    use wasteflow_core::domain::partner::PartnerId;
    use wasteflow_core::domain::quotation::{
        LinePatch, Patch, Quotation, QuotationId, QuotationLine, QuotationPatch, QuotationStatus,
        SyncMode,
    };
    use wasteflow_db::repositories::{
        DeliveryRepository, InMemoryCatalogRepository, InMemoryDeliveryRepository,
        InMemoryLeadRepository, InMemoryQuotationRepository, QuotationRepository,
    };

    use super::QuotationLifecycle;
    use crate::context::{CreateContext, WriteContext};

    type TestLifecycle = QuotationLifecycle<
        InMemoryLeadRepository,
        InMemoryQuotationRepository,
        InMemoryCatalogRepository,
        InMemoryDeliveryRepository,
    >;

    struct Fixture {
        lifecycle: TestLifecycle,
        quotations: Arc<InMemoryQuotationRepository>,
        deliveries: Arc<InMemoryDeliveryRepository>,
    }

    fn fixture() -> Fixture {
        let leads = Arc::new(InMemoryLeadRepository::default());
        let quotations = Arc::new(InMemoryQuotationRepository::default());
        let catalog = Arc::new(InMemoryCatalogRepository::default());
        let deliveries = Arc::new(InMemoryDeliveryRepository::default());

        let lifecycle = QuotationLifecycle::new(
            leads,
            Arc::clone(&quotations),
            catalog,
            Arc::clone(&deliveries),
            AppConfig::default().catalog,
        );

        Fixture { lifecycle, quotations, deliveries }
    }

    fn draft(id: &str) -> Quotation {
        Quotation::new(
            QuotationId(id.to_string()),
            format!("S-{id}"),
            PartnerId("billing".to_string()),
        )
    }

    async fn created(fixture: &Fixture, quotation: Quotation) -> Quotation {
        fixture
            .lifecycle
            .create_batch(vec![quotation], &CreateContext::default())
            .await
            .expect("create quotation")
            .pop()
            .expect("one quotation")
    }

    #[tokio::test]
    async fn explicit_pickup_write_marks_manual() {
        let fixture = fixture();
        let quotation = created(&fixture, draft("Q-1")).await;

        let patch = QuotationPatch {
            pickup_location_id: Patch::Set(Some(PartnerId("chosen".to_string()))),
            ..QuotationPatch::default()
        };
        let updated = fixture
            .lifecycle
            .write(&quotation.id, patch, &WriteContext::default())
            .await
            .expect("write");

        assert_eq!(updated.pickup_location_id, Some(PartnerId("chosen".to_string())));
        assert_eq!(updated.pickup_location_sync, SyncMode::Manual);
    }

    #[tokio::test]
    async fn clearing_pickup_resets_marker_and_refills() {
        let fixture = fixture();
        let quotation = created(&fixture, draft("Q-1")).await;

        let patch = QuotationPatch {
            pickup_location_id: Patch::Set(None),
            ..QuotationPatch::default()
        };
        let updated = fixture
            .lifecycle
            .write(&quotation.id, patch, &WriteContext::default())
            .await
            .expect("write");

        // The cleared reference goes back to automatic and the
        // non-forcing refresh immediately refills it from the customer.
        assert_eq!(updated.pickup_location_sync, SyncMode::Auto);
        assert_eq!(updated.pickup_location_id, Some(PartnerId("billing".to_string())));
    }

    #[tokio::test]
    async fn customer_change_forces_pickup_refresh() {
        let fixture = fixture();
        let quotation = created(&fixture, draft("Q-1")).await;
        assert_eq!(quotation.pickup_location_id, Some(PartnerId("billing".to_string())));

        let patch = QuotationPatch {
            partner_shipping_id: Patch::Set(Some(PartnerId("new-shipping".to_string()))),
            ..QuotationPatch::default()
        };
        let updated = fixture
            .lifecycle
            .write(&quotation.id, patch, &WriteContext::default())
            .await
            .expect("write");

        assert_eq!(updated.pickup_location_id, Some(PartnerId("new-shipping".to_string())));
        assert_eq!(updated.pickup_location_sync, SyncMode::Auto);
    }

    #[tokio::test]
    async fn customer_change_with_explicit_pickup_keeps_the_explicit_value() {
        let fixture = fixture();
        let quotation = created(&fixture, draft("Q-1")).await;

        let patch = QuotationPatch {
            partner_shipping_id: Patch::Set(Some(PartnerId("new-shipping".to_string()))),
            pickup_location_id: Patch::Set(Some(PartnerId("chosen".to_string()))),
            ..QuotationPatch::default()
        };
        let updated = fixture
            .lifecycle
            .write(&quotation.id, patch, &WriteContext::default())
            .await
            .expect("write");

        assert_eq!(updated.pickup_location_id, Some(PartnerId("chosen".to_string())));
        assert_eq!(updated.pickup_location_sync, SyncMode::Manual);
    }

    #[tokio::test]
    async fn manual_pickup_survives_customer_changes() {
        let fixture = fixture();
        let quotation = created(&fixture, draft("Q-1")).await;

        let manual = QuotationPatch {
            pickup_location_id: Patch::Set(Some(PartnerId("chosen".to_string()))),
            ..QuotationPatch::default()
        };
        fixture
            .lifecycle
            .write(&quotation.id, manual, &WriteContext::default())
            .await
            .expect("manual write");

        let customer_change = QuotationPatch {
            partner_shipping_id: Patch::Set(Some(PartnerId("new-shipping".to_string()))),
            ..QuotationPatch::default()
        };
        let updated = fixture
            .lifecycle
            .write(&quotation.id, customer_change, &WriteContext::default())
            .await
            .expect("customer write");

        assert_eq!(updated.pickup_location_id, Some(PartnerId("chosen".to_string())));
        assert_eq!(updated.pickup_location_sync, SyncMode::Manual);
    }

    #[tokio::test]
    async fn suppressed_write_applies_patch_verbatim() {
        let fixture = fixture();
        let quotation = created(&fixture, draft("Q-1")).await;

        let patch = QuotationPatch {
            pickup_location_id: Patch::Set(Some(PartnerId("machine".to_string()))),
            pickup_location_sync: Patch::Set(SyncMode::Auto),
            ..QuotationPatch::default()
        };
        let updated = fixture
            .lifecycle
            .write(&quotation.id, patch, &WriteContext::suppressing_autofill())
            .await
            .expect("guarded write");

        // No Manual forcing on the guarded path.
        assert_eq!(updated.pickup_location_sync, SyncMode::Auto);
        assert_eq!(updated.pickup_location_id, Some(PartnerId("machine".to_string())));
    }

    #[tokio::test]
    async fn add_line_provisions_service_product() {
        let fixture = fixture();
        let quotation = created(&fixture, draft("Q-1")).await;

        let line = QuotationLine {
            create_new_service: true,
            residue_name: Some("Used Oil".to_string()),
            quantity: 10.0,
            ..QuotationLine::default()
        };
        let updated = fixture.lifecycle.add_line(&quotation.id, line).await.expect("add line");

        let line = updated.lines.last().expect("line added");
        assert!(line.product_id.is_some());
        assert_eq!(line.description, "Used Oil");

        let stored = fixture
            .quotations
            .find_by_id(&quotation.id)
            .await
            .expect("find")
            .expect("stored");
        assert_eq!(stored.lines.len(), 1);
    }

    #[tokio::test]
    async fn update_line_toggle_clears_and_reprovisions() {
        let fixture = fixture();
        let quotation = created(&fixture, draft("Q-1")).await;

        let line = QuotationLine {
            create_new_service: true,
            residue_name: Some("Used Oil".to_string()),
            ..QuotationLine::default()
        };
        let updated = fixture.lifecycle.add_line(&quotation.id, line).await.expect("add line");
        let resolved_id = updated.lines[0].product_id.clone().expect("resolved");

        // Flip to existing-service mode pointing at the resolved product.
        let patch = LinePatch {
            create_new_service: Patch::Set(false),
            existing_service_id: Patch::Set(Some(resolved_id.clone())),
            ..LinePatch::default()
        };
        let updated = fixture
            .lifecycle
            .update_line(&quotation.id, 0, patch)
            .await
            .expect("update line");

        assert!(updated.lines[0].residue_name.is_none(), "free text cleared by the toggle");
        assert_eq!(updated.lines[0].product_id, Some(resolved_id));
    }

    #[tokio::test]
    async fn update_line_rejects_out_of_range_index() {
        let fixture = fixture();
        let quotation = created(&fixture, draft("Q-1")).await;

        let error = fixture
            .lifecycle
            .update_line(&quotation.id, 3, LinePatch::default())
            .await
            .expect_err("line 3 does not exist");

        assert!(matches!(error, crate::LifecycleError::LineNotFound { line_no: 3, .. }));
    }

    #[tokio::test]
    async fn confirm_with_no_delivery_cancels_open_shipments() {
        let fixture = fixture();
        let mut quotation = draft("Q-1");
        quotation.no_delivery = true;
        let quotation = created(&fixture, quotation).await;

        fixture
            .deliveries
            .insert(Delivery {
                id: DeliveryId("D-1".to_string()),
                quotation_id: quotation.id.clone(),
                name: "WH/OUT/0001".to_string(),
                state: DeliveryState::Ready,
            })
            .await;
        fixture
            .deliveries
            .insert(Delivery {
                id: DeliveryId("D-2".to_string()),
                quotation_id: quotation.id.clone(),
                name: "WH/OUT/0002".to_string(),
                state: DeliveryState::Done,
            })
            .await;

        let before = fixture
            .quotations
            .find_by_id(&quotation.id)
            .await
            .expect("find")
            .expect("stored");

        let confirmed = fixture.lifecycle.confirm(&quotation.id).await.expect("confirm");
        assert_eq!(confirmed.status, QuotationStatus::Confirmed);

        let deliveries =
            fixture.deliveries.list_for_quotation(&quotation.id).await.expect("list");
        assert_eq!(deliveries[0].state, DeliveryState::Cancelled);
        assert_eq!(deliveries[1].state, DeliveryState::Done, "done shipments are left alone");

        // Everything but the status is unchanged.
        let mut expected = before.clone();
        expected.status = QuotationStatus::Confirmed;
        assert_eq!(confirmed, expected);
    }

    #[tokio::test]
    async fn confirm_without_suppression_leaves_shipments_open() {
        let fixture = fixture();
        let quotation = created(&fixture, draft("Q-1")).await;

        fixture
            .deliveries
            .insert(Delivery {
                id: DeliveryId("D-1".to_string()),
                quotation_id: quotation.id.clone(),
                name: "WH/OUT/0001".to_string(),
                state: DeliveryState::Ready,
            })
            .await;

        fixture.lifecycle.confirm(&quotation.id).await.expect("confirm");

        let deliveries =
            fixture.deliveries.list_for_quotation(&quotation.id).await.expect("list");
        assert_eq!(deliveries[0].state, DeliveryState::Ready);
    }

    #[tokio::test]
    async fn derived_count_reflects_related_references() {
        let fixture = fixture();
        let parent = created(&fixture, draft("Q-1")).await;
        let mut child = draft("Q-2");
        child.related_quotation_id = Some(parent.id.clone());
        created(&fixture, child).await;

        assert_eq!(fixture.lifecycle.derived_count(&parent.id).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn adopting_existing_service_sets_description_from_product() {
        use wasteflow_core::domain::catalog::{Product, ProductKind};

        let fixture = fixture();
        let catalog = Arc::new(InMemoryCatalogRepository::default());
        catalog
            .insert_product(Product {
                id: ProductId("prod-collection".to_string()),
                name: "Hazardous Waste Collection".to_string(),
                kind: ProductKind::Service,
                category_id: None,
                uom_id: None,
            })
            .await;
        let lifecycle = QuotationLifecycle::new(
            Arc::new(InMemoryLeadRepository::default()),
            Arc::clone(&fixture.quotations),
            catalog,
            Arc::new(InMemoryDeliveryRepository::default()),
            wasteflow_core::config::AppConfig::default().catalog,
        );

        let quotation = lifecycle
            .create_batch(vec![draft("Q-9")], &CreateContext::default())
            .await
            .expect("create")
            .pop()
            .expect("one");

        let line = QuotationLine {
            create_new_service: false,
            existing_service_id: Some(ProductId("prod-collection".to_string())),
            description: "placeholder".to_string(),
            ..QuotationLine::default()
        };
        let updated = lifecycle.add_line(&quotation.id, line).await.expect("add line");

        assert_eq!(updated.lines[0].product_id, Some(ProductId("prod-collection".to_string())));
        assert_eq!(updated.lines[0].description, "Hazardous Waste Collection");
    }
}
