use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use wasteflow_core::domain::catalog::{ProductId, UomId};
use wasteflow_core::domain::lead::{Lead, LeadId, ResidueLine};
use wasteflow_core::domain::partner::PartnerId;

use super::codec::{
    company_size_from_str, decimal_from_text, priority_from_str, residue_type_from_str,
    satisfaction_from_str, urgency_from_str,
};
use super::{LeadRepository, RepositoryError};
use crate::DbPool;

pub struct SqlLeadRepository {
    pool: DbPool,
}

impl SqlLeadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn lead_from_row(row: &SqliteRow) -> Result<Lead, RepositoryError> {
    let mut lead = Lead::new(LeadId(row.get("id")), row.get::<String, _>("name"));

    lead.partner_id = row.get::<Option<String>, _>("partner_id").map(PartnerId);
    lead.service_frequency = row.get("service_frequency");
    lead.residue_new = row.get("residue_new");
    lead.site_visit_required = row.get("site_visit_required");
    lead.pickup_location_id = row.get::<Option<String>, _>("pickup_location_id").map(PartnerId);
    lead.final_destination_id =
        row.get::<Option<String>, _>("final_destination_id").map(PartnerId);

    lead.company_size = row
        .get::<Option<String>, _>("company_size")
        .map(|token| company_size_from_str(&token))
        .transpose()?;
    lead.industrial_sector = row.get("industrial_sector");
    lead.prospect_priority = row
        .get::<Option<String>, _>("prospect_priority")
        .map(|token| priority_from_str(&token))
        .transpose()?;
    lead.estimated_business_potential =
        decimal_from_text(&row.get::<String, _>("estimated_business_potential"))?;

    lead.access_restrictions = row.get("access_restrictions");
    lead.allowed_collection_schedules = row.get("allowed_collection_schedules");
    lead.current_container_types = row.get("current_container_types");
    lead.special_handling_conditions = row.get("special_handling_conditions");
    lead.seasonality = row.get("seasonality");

    lead.waste_generator_registration = row.get("waste_generator_registration");
    lead.environmental_authorizations = row.get("environmental_authorizations");
    lead.quality_certifications = row.get("quality_certifications");
    lead.other_relevant_permits = row.get("other_relevant_permits");

    lead.current_service_provider = row.get("current_service_provider");
    lead.current_costs = decimal_from_text(&row.get::<String, _>("current_costs"))?;
    lead.current_provider_satisfaction = row
        .get::<Option<String>, _>("current_provider_satisfaction")
        .map(|token| satisfaction_from_str(&token))
        .transpose()?;
    lead.reason_for_new_provider = row.get("reason_for_new_provider");

    lead.specific_certificates_needed = row.get("specific_certificates_needed");
    lead.reporting_requirements = row.get("reporting_requirements");
    lead.service_urgency = row
        .get::<Option<String>, _>("service_urgency")
        .map(|token| urgency_from_str(&token))
        .transpose()?;
    lead.estimated_budget = decimal_from_text(&row.get::<String, _>("estimated_budget"))?;

    lead.next_contact_date = row.get::<Option<DateTime<Utc>>, _>("next_contact_date");
    lead.pending_actions = row.get("pending_actions");
    lead.conversation_notes = row.get("conversation_notes");

    Ok(lead)
}

fn residue_from_row(row: &SqliteRow) -> Result<ResidueLine, RepositoryError> {
    Ok(ResidueLine {
        name: row.get("name"),
        residue_type: row
            .get::<Option<String>, _>("residue_type")
            .map(|token| residue_type_from_str(&token))
            .transpose()?,
        handling_plan: row.get("handling_plan"),
        capacity: row.get("capacity"),
        weight_kg: row.get("weight_kg"),
        volume: row.get("volume"),
        weight_per_unit: row.get("weight_per_unit"),
        uom_id: row.get::<Option<String>, _>("uom_id").map(UomId),
        product_id: row.get::<Option<String>, _>("product_id").map(ProductId),
        create_new_service: row.get("create_new_service"),
        existing_service_id: row.get::<Option<String>, _>("existing_service_id").map(ProductId),
        create_new_packaging: row.get("create_new_packaging"),
        packaging_name: row.get("packaging_name"),
        packaging_id: row.get::<Option<String>, _>("packaging_id").map(UomId),
    })
}

#[async_trait::async_trait]
impl LeadRepository for SqlLeadRepository {
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM leads WHERE id = ?1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut lead = lead_from_row(&row)?;

        let line_rows = sqlx::query(
            "SELECT * FROM lead_residue_lines WHERE lead_id = ?1 ORDER BY line_no",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?;

        lead.residue_lines =
            line_rows.iter().map(residue_from_row).collect::<Result<Vec<_>, _>>()?;

        Ok(Some(lead))
    }
}
