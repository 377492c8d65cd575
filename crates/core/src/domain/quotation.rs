use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{ProductId, UomId};
use crate::domain::lead::{
    CompanySize, LeadId, ProspectPriority, ResidueType, SatisfactionLevel, ServiceUrgency,
};
use crate::domain::partner::PartnerId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotationId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    Draft,
    Confirmed,
    Cancelled,
}

/// Governs whether a sync rule may overwrite a tracked reference field.
/// `Manual` means a human (or an explicit write) chose the value and the
/// automatic refresh must leave it alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    #[default]
    Auto,
    Manual,
}

/// CRETIB hazard characteristics (NOM-052) carried per residue line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardProfile {
    pub corrosive: bool,
    pub reactive: bool,
    pub explosive: bool,
    pub toxic: bool,
    pub flammable: bool,
    pub biologic_infectious: bool,
    pub mutagenic: bool,
}

/// Where a line stands in service-product resolution. `Resolving` is the
/// transient state inside the provisioning pass; persisted lines are
/// always in one of the other two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionState {
    NoProduct,
    Resolving,
    Resolved,
}

/// One residue/service entry on a quotation. The service and packaging
/// selections each have two mutually exclusive input modes: free text
/// feeding auto-provisioning (`create_new_*` on), or a reference to an
/// existing catalog entity (`create_new_*` off).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct QuotationLine {
    pub product_id: Option<ProductId>,
    pub description: String,
    pub quantity: f64,
    pub product_uom_id: Option<UomId>,

    pub residue_name: Option<String>,
    pub residue_type: Option<ResidueType>,
    pub handling_plan: Option<String>,
    pub residue_capacity: f64,
    pub residue_weight_kg: f64,
    pub residue_volume: f64,
    pub weight_per_unit: f64,
    pub residue_uom_id: Option<UomId>,

    pub create_new_service: bool,
    pub existing_service_id: Option<ProductId>,

    pub create_new_packaging: bool,
    pub packaging_name: Option<String>,
    pub packaging_id: Option<UomId>,

    pub hazard: HazardProfile,
}

impl QuotationLine {
    pub fn provision_state(&self) -> ProvisionState {
        if self.product_id.is_some() {
            ProvisionState::Resolved
        } else {
            ProvisionState::NoProduct
        }
    }

    /// Switch the service input mode. Turning the flag off clears the
    /// free-text residue name; turning it on clears the existing-service
    /// reference. The two modes never coexist.
    pub fn set_create_new_service(&mut self, enabled: bool) {
        self.create_new_service = enabled;
        if enabled {
            self.existing_service_id = None;
        } else {
            self.residue_name = None;
        }
    }

    /// Packaging mirror of [`set_create_new_service`].
    ///
    /// [`set_create_new_service`]: QuotationLine::set_create_new_service
    pub fn set_create_new_packaging(&mut self, enabled: bool) {
        self.create_new_packaging = enabled;
        if enabled {
            self.packaging_id = None;
        } else {
            self.packaging_name = None;
        }
    }
}

/// Sales order document populated from a lead and maintained by the
/// write-consistency rules afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: QuotationId,
    pub name: String,
    pub status: QuotationStatus,
    pub partner_id: PartnerId,
    pub partner_shipping_id: Option<PartnerId>,
    pub opportunity_id: Option<LeadId>,

    pub pickup_location_id: Option<PartnerId>,
    pub pickup_location_sync: SyncMode,
    pub final_destination_id: Option<PartnerId>,
    pub final_destination_sync: SyncMode,

    pub service_frequency: Option<String>,
    pub residue_new: bool,
    pub site_visit_required: bool,
    pub expiration_date: Option<NaiveDate>,
    pub no_delivery: bool,
    pub always_service: bool,
    pub related_quotation_id: Option<QuotationId>,

    pub company_size: Option<CompanySize>,
    pub industrial_sector: Option<String>,
    pub prospect_priority: Option<ProspectPriority>,
    pub estimated_business_potential: Decimal,

    pub access_restrictions: Option<String>,
    pub allowed_collection_schedules: Option<String>,
    pub current_container_types: Option<String>,
    pub special_handling_conditions: Option<String>,
    pub seasonality: Option<String>,

    pub waste_generator_registration: Option<String>,
    pub environmental_authorizations: Option<String>,
    pub quality_certifications: Option<String>,
    pub other_relevant_permits: Option<String>,

    pub current_service_provider: Option<String>,
    pub current_costs: Decimal,
    pub current_provider_satisfaction: Option<SatisfactionLevel>,
    pub reason_for_new_provider: Option<String>,

    pub specific_certificates_needed: Option<String>,
    pub reporting_requirements: Option<String>,
    pub service_urgency: Option<ServiceUrgency>,
    pub estimated_budget: Decimal,

    pub next_contact_date: Option<DateTime<Utc>>,
    pub pending_actions: Option<String>,
    pub conversation_notes: Option<String>,

    pub lines: Vec<QuotationLine>,
}

impl Quotation {
    /// Draft quotation with default flags and the standard end-of-year
    /// expiration.
    pub fn new(id: QuotationId, name: impl Into<String>, partner_id: PartnerId) -> Self {
        Self {
            id,
            name: name.into(),
            status: QuotationStatus::Draft,
            partner_id,
            partner_shipping_id: None,
            opportunity_id: None,
            pickup_location_id: None,
            pickup_location_sync: SyncMode::Auto,
            final_destination_id: None,
            final_destination_sync: SyncMode::Auto,
            service_frequency: None,
            residue_new: false,
            site_visit_required: false,
            expiration_date: Some(default_expiration_date(Utc::now().date_naive())),
            no_delivery: false,
            always_service: true,
            related_quotation_id: None,
            company_size: None,
            industrial_sector: None,
            prospect_priority: None,
            estimated_business_potential: Decimal::ZERO,
            access_restrictions: None,
            allowed_collection_schedules: None,
            current_container_types: None,
            special_handling_conditions: None,
            seasonality: None,
            waste_generator_registration: None,
            environmental_authorizations: None,
            quality_certifications: None,
            other_relevant_permits: None,
            current_service_provider: None,
            current_costs: Decimal::ZERO,
            current_provider_satisfaction: None,
            reason_for_new_provider: None,
            specific_certificates_needed: None,
            reporting_requirements: None,
            service_urgency: None,
            estimated_budget: Decimal::ZERO,
            next_contact_date: None,
            pending_actions: None,
            conversation_notes: None,
            lines: Vec::new(),
        }
    }

    pub fn confirm(&mut self) -> Result<(), DomainError> {
        match self.status {
            QuotationStatus::Draft => {
                self.status = QuotationStatus::Confirmed;
                Ok(())
            }
            from => Err(DomainError::InvalidStatusTransition {
                from,
                to: QuotationStatus::Confirmed,
            }),
        }
    }
}

/// Quotations expire at the end of the calendar year they were drafted in.
pub fn default_expiration_date(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today)
}

/// Field update marker for patch-style writes: `Keep` leaves the stored
/// value untouched, `Set` replaces it (possibly with an empty value).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Patch<T> {
    Keep,
    Set(T),
}

// Hand-rolled so `Patch<T>::default()` works without a `T: Default`
// bound (the derive would add one).
impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    pub fn apply(self, target: &mut T) {
        if let Patch::Set(value) = self {
            *target = value;
        }
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Keep => None,
            Patch::Set(value) => Some(value),
        }
    }
}

/// Header-field update payload for the quotation write hook. Only the
/// fields the consistency rules inspect are modeled; anything not `Set`
/// keeps its stored value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotationPatch {
    pub partner_id: Patch<PartnerId>,
    pub partner_shipping_id: Patch<Option<PartnerId>>,
    pub pickup_location_id: Patch<Option<PartnerId>>,
    pub pickup_location_sync: Patch<SyncMode>,
    pub final_destination_id: Patch<Option<PartnerId>>,
    pub final_destination_sync: Patch<SyncMode>,
    pub related_quotation_id: Patch<Option<QuotationId>>,
    pub service_frequency: Patch<Option<String>>,
    pub expiration_date: Patch<Option<NaiveDate>>,
    pub no_delivery: Patch<bool>,
    pub always_service: Patch<bool>,
}

impl QuotationPatch {
    pub fn apply(self, quotation: &mut Quotation) {
        self.partner_id.apply(&mut quotation.partner_id);
        self.partner_shipping_id.apply(&mut quotation.partner_shipping_id);
        self.pickup_location_id.apply(&mut quotation.pickup_location_id);
        self.pickup_location_sync.apply(&mut quotation.pickup_location_sync);
        self.final_destination_id.apply(&mut quotation.final_destination_id);
        self.final_destination_sync.apply(&mut quotation.final_destination_sync);
        self.related_quotation_id.apply(&mut quotation.related_quotation_id);
        self.service_frequency.apply(&mut quotation.service_frequency);
        self.expiration_date.apply(&mut quotation.expiration_date);
        self.no_delivery.apply(&mut quotation.no_delivery);
        self.always_service.apply(&mut quotation.always_service);
    }
}

/// Update payload for a single quotation line. Flag changes route through
/// the mode toggles so the paired fields are cleared consistently.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinePatch {
    pub description: Patch<String>,
    pub quantity: Patch<f64>,
    pub residue_name: Patch<Option<String>>,
    pub residue_type: Patch<Option<ResidueType>>,
    pub handling_plan: Patch<Option<String>>,
    pub residue_capacity: Patch<f64>,
    pub residue_weight_kg: Patch<f64>,
    pub residue_volume: Patch<f64>,
    pub weight_per_unit: Patch<f64>,
    pub residue_uom_id: Patch<Option<UomId>>,
    pub create_new_service: Patch<bool>,
    pub existing_service_id: Patch<Option<ProductId>>,
    pub create_new_packaging: Patch<bool>,
    pub packaging_name: Patch<Option<String>>,
    pub packaging_id: Patch<Option<UomId>>,
    pub hazard: Patch<HazardProfile>,
}

impl LinePatch {
    pub fn apply(self, line: &mut QuotationLine) {
        self.description.apply(&mut line.description);
        self.quantity.apply(&mut line.quantity);
        self.residue_name.apply(&mut line.residue_name);
        self.residue_type.apply(&mut line.residue_type);
        self.handling_plan.apply(&mut line.handling_plan);
        self.residue_capacity.apply(&mut line.residue_capacity);
        self.residue_weight_kg.apply(&mut line.residue_weight_kg);
        self.residue_volume.apply(&mut line.residue_volume);
        self.weight_per_unit.apply(&mut line.weight_per_unit);
        self.residue_uom_id.apply(&mut line.residue_uom_id);
        self.existing_service_id.apply(&mut line.existing_service_id);
        self.packaging_name.apply(&mut line.packaging_name);
        self.packaging_id.apply(&mut line.packaging_id);
        self.hazard.apply(&mut line.hazard);

        // Mode toggles run last so they clear whatever the rest of the
        // patch set on the now-inactive side.
        if let Patch::Set(enabled) = self.create_new_service {
            if enabled != line.create_new_service {
                line.set_create_new_service(enabled);
            }
        }
        if let Patch::Set(enabled) = self.create_new_packaging {
            if enabled != line.create_new_packaging {
                line.set_create_new_packaging(enabled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        default_expiration_date, LinePatch, Patch, ProvisionState, Quotation, QuotationId,
        QuotationLine, QuotationStatus,
    };
    use crate::domain::catalog::{ProductId, UomId};
    use crate::domain::partner::PartnerId;
    use crate::errors::DomainError;

    fn line() -> QuotationLine {
        QuotationLine {
            description: "Used Oil".to_string(),
            residue_name: Some("Used Oil".to_string()),
            create_new_service: true,
            create_new_packaging: true,
            packaging_name: Some("200L Drum".to_string()),
            ..QuotationLine::default()
        }
    }

    #[test]
    fn disabling_new_service_clears_free_text_name() {
        let mut line = line();
        line.set_create_new_service(false);
        assert!(line.residue_name.is_none());
        assert!(!line.create_new_service);
    }

    #[test]
    fn enabling_new_service_clears_existing_reference() {
        let mut line = line();
        line.create_new_service = false;
        line.existing_service_id = Some(ProductId("prod-1".to_string()));

        line.set_create_new_service(true);
        assert!(line.existing_service_id.is_none());
    }

    #[test]
    fn packaging_toggle_mirrors_service_toggle() {
        let mut line = line();
        line.set_create_new_packaging(false);
        assert!(line.packaging_name.is_none());

        line.packaging_id = Some(UomId("uom-drum".to_string()));
        line.set_create_new_packaging(true);
        assert!(line.packaging_id.is_none());
    }

    #[test]
    fn provision_state_follows_product_reference() {
        let mut line = line();
        assert_eq!(line.provision_state(), ProvisionState::NoProduct);
        line.product_id = Some(ProductId("prod-1".to_string()));
        assert_eq!(line.provision_state(), ProvisionState::Resolved);
    }

    #[test]
    fn line_patch_toggle_clears_paired_fields() {
        let mut line = line();
        let patch = LinePatch {
            create_new_service: Patch::Set(false),
            existing_service_id: Patch::Set(Some(ProductId("prod-2".to_string()))),
            ..LinePatch::default()
        };
        patch.apply(&mut line);

        assert!(line.residue_name.is_none());
        assert_eq!(line.existing_service_id, Some(ProductId("prod-2".to_string())));
    }

    #[test]
    fn confirm_requires_draft() {
        let mut quotation = Quotation::new(
            QuotationId("Q-1".to_string()),
            "S00001",
            PartnerId("partner-1".to_string()),
        );
        quotation.confirm().expect("draft -> confirmed");
        assert_eq!(quotation.status, QuotationStatus::Confirmed);

        let error = quotation.confirm().expect_err("confirmed -> confirmed should fail");
        assert!(matches!(error, DomainError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn expiration_defaults_to_end_of_year() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date");
        assert_eq!(
            default_expiration_date(today),
            NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid date")
        );
    }
}
