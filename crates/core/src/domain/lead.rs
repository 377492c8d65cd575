use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{ProductId, UomId};
use crate::domain::partner::PartnerId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Micro,
    Small,
    Medium,
    Large,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProspectPriority {
    Low,
    Medium,
    High,
    Strategic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatisfactionLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceUrgency {
    Immediate,
    OneWeek,
    OneMonth,
    ThreeMonths,
    NoRush,
}

/// Waste stream classification under the Mexican waste framework:
/// urban solid (RSU), special handling (RME), hazardous (RP).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidueType {
    Rsu,
    Rme,
    Rp,
}

/// One waste-stream descriptor captured during lead qualification. Either
/// references an already-cataloged service product, or carries the
/// free-text fields a new service will be provisioned from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct ResidueLine {
    pub name: String,
    pub residue_type: Option<ResidueType>,
    pub handling_plan: Option<String>,
    pub capacity: f64,
    pub weight_kg: f64,
    pub volume: f64,
    pub weight_per_unit: f64,
    pub uom_id: Option<UomId>,
    pub product_id: Option<ProductId>,
    pub create_new_service: bool,
    pub existing_service_id: Option<ProductId>,
    pub create_new_packaging: bool,
    pub packaging_name: Option<String>,
    pub packaging_id: Option<UomId>,
}

/// Pre-sale qualification record. Read-only from this extension's
/// perspective: quotation creation copies from it, never writes back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub partner_id: Option<PartnerId>,

    pub service_frequency: Option<String>,
    pub residue_new: bool,
    pub site_visit_required: bool,

    pub pickup_location_id: Option<PartnerId>,
    pub final_destination_id: Option<PartnerId>,

    // Prospect basics.
    pub company_size: Option<CompanySize>,
    pub industrial_sector: Option<String>,
    pub prospect_priority: Option<ProspectPriority>,
    pub estimated_business_potential: Decimal,

    // Operational constraints.
    pub access_restrictions: Option<String>,
    pub allowed_collection_schedules: Option<String>,
    pub current_container_types: Option<String>,
    pub special_handling_conditions: Option<String>,
    pub seasonality: Option<String>,

    // Regulatory standing.
    pub waste_generator_registration: Option<String>,
    pub environmental_authorizations: Option<String>,
    pub quality_certifications: Option<String>,
    pub other_relevant_permits: Option<String>,

    // Competition and market.
    pub current_service_provider: Option<String>,
    pub current_costs: Decimal,
    pub current_provider_satisfaction: Option<SatisfactionLevel>,
    pub reason_for_new_provider: Option<String>,

    // Special requirements.
    pub specific_certificates_needed: Option<String>,
    pub reporting_requirements: Option<String>,
    pub service_urgency: Option<ServiceUrgency>,
    pub estimated_budget: Decimal,

    // Follow-up.
    pub next_contact_date: Option<DateTime<Utc>>,
    pub pending_actions: Option<String>,
    pub conversation_notes: Option<String>,

    pub residue_lines: Vec<ResidueLine>,
}

impl Lead {
    /// Bare lead with empty qualification data, useful as a fixture base.
    pub fn new(id: LeadId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            partner_id: None,
            service_frequency: None,
            residue_new: false,
            site_visit_required: false,
            pickup_location_id: None,
            final_destination_id: None,
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
            residue_lines: Vec::new(),
        }
    }
}
