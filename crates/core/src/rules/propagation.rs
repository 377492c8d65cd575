use crate::domain::lead::{Lead, ResidueLine};
use crate::domain::quotation::{Quotation, QuotationLine, SyncMode};

/// Placeholder description for a propagated line that carries neither a
/// resolved product nor a residue name.
pub const NEW_SERVICE_PLACEHOLDER: &str = "New Service";

/// Copy the qualification data of `lead` onto `quotation`, overwriting
/// whatever the creation payload supplied, and append one line per
/// residue descriptor. The sync marker of each location reference
/// becomes `Manual` exactly when a non-empty value was copied; the
/// automatic path never marks an empty reference as manual.
///
/// Product and packaging references on the appended lines are left for
/// the provisioning pass; a descriptor that already names a product is
/// carried as an existing-service reference with `create_new_service`
/// disabled.
pub fn apply_lead(quotation: &mut Quotation, lead: &Lead) {
    quotation.opportunity_id = Some(lead.id.clone());

    quotation.service_frequency = lead.service_frequency.clone();
    quotation.residue_new = lead.residue_new;
    quotation.site_visit_required = lead.site_visit_required;

    quotation.pickup_location_id = lead.pickup_location_id.clone();
    quotation.pickup_location_sync = if lead.pickup_location_id.is_some() {
        SyncMode::Manual
    } else {
        SyncMode::Auto
    };
    quotation.final_destination_id = lead.final_destination_id.clone();
    quotation.final_destination_sync = if lead.final_destination_id.is_some() {
        SyncMode::Manual
    } else {
        SyncMode::Auto
    };

    quotation.always_service = true;

    quotation.company_size = lead.company_size;
    quotation.industrial_sector = lead.industrial_sector.clone();
    quotation.prospect_priority = lead.prospect_priority;
    quotation.estimated_business_potential = lead.estimated_business_potential;

    quotation.access_restrictions = lead.access_restrictions.clone();
    quotation.allowed_collection_schedules = lead.allowed_collection_schedules.clone();
    quotation.current_container_types = lead.current_container_types.clone();
    quotation.special_handling_conditions = lead.special_handling_conditions.clone();
    quotation.seasonality = lead.seasonality.clone();

    quotation.waste_generator_registration = lead.waste_generator_registration.clone();
    quotation.environmental_authorizations = lead.environmental_authorizations.clone();
    quotation.quality_certifications = lead.quality_certifications.clone();
    quotation.other_relevant_permits = lead.other_relevant_permits.clone();

    quotation.current_service_provider = lead.current_service_provider.clone();
    quotation.current_costs = lead.current_costs;
    quotation.current_provider_satisfaction = lead.current_provider_satisfaction;
    quotation.reason_for_new_provider = lead.reason_for_new_provider.clone();

    quotation.specific_certificates_needed = lead.specific_certificates_needed.clone();
    quotation.reporting_requirements = lead.reporting_requirements.clone();
    quotation.service_urgency = lead.service_urgency;
    quotation.estimated_budget = lead.estimated_budget;

    quotation.next_contact_date = lead.next_contact_date;
    quotation.pending_actions = lead.pending_actions.clone();
    quotation.conversation_notes = lead.conversation_notes.clone();

    quotation
        .lines
        .extend(lead.residue_lines.iter().map(line_from_residue));
}

/// Build one quotation line from a lead residue descriptor.
pub fn line_from_residue(residue: &ResidueLine) -> QuotationLine {
    let mut line = QuotationLine {
        description: if residue.name.trim().is_empty() {
            NEW_SERVICE_PLACEHOLDER.to_string()
        } else {
            residue.name.clone()
        },
        quantity: residue.volume,
        product_uom_id: residue.uom_id.clone(),

        residue_name: Some(residue.name.clone()),
        residue_type: residue.residue_type,
        handling_plan: residue.handling_plan.clone(),
        residue_capacity: residue.capacity,
        residue_weight_kg: residue.weight_kg,
        residue_volume: residue.volume,
        weight_per_unit: residue.weight_per_unit,
        residue_uom_id: residue.uom_id.clone(),

        ..QuotationLine::default()
    };

    // Duplicate protection: a descriptor that already resolved a product
    // is always carried as an existing service, whatever its flags say.
    if let Some(product_id) = &residue.product_id {
        line.create_new_service = false;
        line.existing_service_id = Some(product_id.clone());
    } else {
        line.create_new_service = residue.create_new_service;
        line.existing_service_id = residue.existing_service_id.clone();
    }

    if let Some(packaging_id) = &residue.packaging_id {
        line.create_new_packaging = false;
        line.packaging_name = None;
        line.packaging_id = Some(packaging_id.clone());
    } else {
        line.create_new_packaging = residue.create_new_packaging;
        line.packaging_name = residue.packaging_name.clone();
    }

    line
}
