use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use wasteflow_core::domain::catalog::{ProductId, UomId};
use wasteflow_core::domain::lead::LeadId;
use wasteflow_core::domain::partner::PartnerId;
use wasteflow_core::domain::quotation::{Quotation, QuotationId, QuotationLine};

use super::codec::{
    company_size_from_str, company_size_to_str, decimal_from_text, decimal_to_text,
    hazard_from_json, hazard_to_json, priority_from_str, priority_to_str,
    quotation_status_from_str, quotation_status_to_str, residue_type_from_str,
    residue_type_to_str, satisfaction_from_str, satisfaction_to_str, sync_mode_from_str,
    sync_mode_to_str, urgency_from_str, urgency_to_str,
};
use super::{QuotationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlQuotationRepository {
    pool: DbPool,
}

impl SqlQuotationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_lines(&self, id: &QuotationId) -> Result<Vec<QuotationLine>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM quotation_lines WHERE quotation_id = ?1 ORDER BY line_no",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(line_from_row).collect()
    }
}

fn quotation_from_row(row: &SqliteRow) -> Result<Quotation, RepositoryError> {
    let status: String = row.get("status");
    let pickup_sync: String = row.get("pickup_location_sync");
    let destination_sync: String = row.get("final_destination_sync");

    let mut quotation = Quotation::new(
        QuotationId(row.get("id")),
        row.get::<String, _>("name"),
        PartnerId(row.get("partner_id")),
    );

    quotation.status = quotation_status_from_str(&status)?;
    quotation.partner_shipping_id =
        row.get::<Option<String>, _>("partner_shipping_id").map(PartnerId);
    quotation.opportunity_id = row.get::<Option<String>, _>("opportunity_id").map(LeadId);

    quotation.pickup_location_id =
        row.get::<Option<String>, _>("pickup_location_id").map(PartnerId);
    quotation.pickup_location_sync = sync_mode_from_str(&pickup_sync)?;
    quotation.final_destination_id =
        row.get::<Option<String>, _>("final_destination_id").map(PartnerId);
    quotation.final_destination_sync = sync_mode_from_str(&destination_sync)?;

    quotation.service_frequency = row.get("service_frequency");
    quotation.residue_new = row.get("residue_new");
    quotation.site_visit_required = row.get("site_visit_required");
    quotation.expiration_date = row.get::<Option<NaiveDate>, _>("expiration_date");
    quotation.no_delivery = row.get("no_delivery");
    quotation.always_service = row.get("always_service");
    quotation.related_quotation_id =
        row.get::<Option<String>, _>("related_quotation_id").map(QuotationId);

    quotation.company_size = row
        .get::<Option<String>, _>("company_size")
        .map(|token| company_size_from_str(&token))
        .transpose()?;
    quotation.industrial_sector = row.get("industrial_sector");
    quotation.prospect_priority = row
        .get::<Option<String>, _>("prospect_priority")
        .map(|token| priority_from_str(&token))
        .transpose()?;
    quotation.estimated_business_potential =
        decimal_from_text(&row.get::<String, _>("estimated_business_potential"))?;

    quotation.access_restrictions = row.get("access_restrictions");
    quotation.allowed_collection_schedules = row.get("allowed_collection_schedules");
    quotation.current_container_types = row.get("current_container_types");
    quotation.special_handling_conditions = row.get("special_handling_conditions");
    quotation.seasonality = row.get("seasonality");

    quotation.waste_generator_registration = row.get("waste_generator_registration");
    quotation.environmental_authorizations = row.get("environmental_authorizations");
    quotation.quality_certifications = row.get("quality_certifications");
    quotation.other_relevant_permits = row.get("other_relevant_permits");

    quotation.current_service_provider = row.get("current_service_provider");
    quotation.current_costs = decimal_from_text(&row.get::<String, _>("current_costs"))?;
    quotation.current_provider_satisfaction = row
        .get::<Option<String>, _>("current_provider_satisfaction")
        .map(|token| satisfaction_from_str(&token))
        .transpose()?;
    quotation.reason_for_new_provider = row.get("reason_for_new_provider");

    quotation.specific_certificates_needed = row.get("specific_certificates_needed");
    quotation.reporting_requirements = row.get("reporting_requirements");
    quotation.service_urgency = row
        .get::<Option<String>, _>("service_urgency")
        .map(|token| urgency_from_str(&token))
        .transpose()?;
    quotation.estimated_budget = decimal_from_text(&row.get::<String, _>("estimated_budget"))?;

    quotation.next_contact_date = row.get::<Option<DateTime<Utc>>, _>("next_contact_date");
    quotation.pending_actions = row.get("pending_actions");
    quotation.conversation_notes = row.get("conversation_notes");

    Ok(quotation)
}

fn line_from_row(row: &SqliteRow) -> Result<QuotationLine, RepositoryError> {
    let hazard: String = row.get("hazard");

    Ok(QuotationLine {
        product_id: row.get::<Option<String>, _>("product_id").map(ProductId),
        description: row.get("description"),
        quantity: row.get("quantity"),
        product_uom_id: row.get::<Option<String>, _>("product_uom_id").map(UomId),
        residue_name: row.get("residue_name"),
        residue_type: row
            .get::<Option<String>, _>("residue_type")
            .map(|token| residue_type_from_str(&token))
            .transpose()?,
        handling_plan: row.get("handling_plan"),
        residue_capacity: row.get("residue_capacity"),
        residue_weight_kg: row.get("residue_weight_kg"),
        residue_volume: row.get("residue_volume"),
        weight_per_unit: row.get("weight_per_unit"),
        residue_uom_id: row.get::<Option<String>, _>("residue_uom_id").map(UomId),
        create_new_service: row.get("create_new_service"),
        existing_service_id: row.get::<Option<String>, _>("existing_service_id").map(ProductId),
        create_new_packaging: row.get("create_new_packaging"),
        packaging_name: row.get("packaging_name"),
        packaging_id: row.get::<Option<String>, _>("packaging_id").map(UomId),
        hazard: hazard_from_json(&hazard)?,
    })
}

#[async_trait::async_trait]
impl QuotationRepository for SqlQuotationRepository {
    async fn find_by_id(&self, id: &QuotationId) -> Result<Option<Quotation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM quotations WHERE id = ?1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut quotation = quotation_from_row(&row)?;
        quotation.lines = self.load_lines(id).await?;

        Ok(Some(quotation))
    }

    async fn save(&self, quotation: Quotation) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO quotations (
                 id, name, status, partner_id, partner_shipping_id, opportunity_id,
                 pickup_location_id, pickup_location_sync,
                 final_destination_id, final_destination_sync,
                 service_frequency, residue_new, site_visit_required,
                 expiration_date, no_delivery, always_service, related_quotation_id,
                 company_size, industrial_sector, prospect_priority,
                 estimated_business_potential,
                 access_restrictions, allowed_collection_schedules,
                 current_container_types, special_handling_conditions, seasonality,
                 waste_generator_registration, environmental_authorizations,
                 quality_certifications, other_relevant_permits,
                 current_service_provider, current_costs,
                 current_provider_satisfaction, reason_for_new_provider,
                 specific_certificates_needed, reporting_requirements,
                 service_urgency, estimated_budget,
                 next_contact_date, pending_actions, conversation_notes
             ) VALUES (
                 ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                 ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20,
                 ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30,
                 ?31, ?32, ?33, ?34, ?35, ?36, ?37, ?38, ?39, ?40, ?41
             )
             ON CONFLICT (id) DO UPDATE SET
                 name = excluded.name,
                 status = excluded.status,
                 partner_id = excluded.partner_id,
                 partner_shipping_id = excluded.partner_shipping_id,
                 opportunity_id = excluded.opportunity_id,
                 pickup_location_id = excluded.pickup_location_id,
                 pickup_location_sync = excluded.pickup_location_sync,
                 final_destination_id = excluded.final_destination_id,
                 final_destination_sync = excluded.final_destination_sync,
                 service_frequency = excluded.service_frequency,
                 residue_new = excluded.residue_new,
                 site_visit_required = excluded.site_visit_required,
                 expiration_date = excluded.expiration_date,
                 no_delivery = excluded.no_delivery,
                 always_service = excluded.always_service,
                 related_quotation_id = excluded.related_quotation_id,
                 company_size = excluded.company_size,
                 industrial_sector = excluded.industrial_sector,
                 prospect_priority = excluded.prospect_priority,
                 estimated_business_potential = excluded.estimated_business_potential,
                 access_restrictions = excluded.access_restrictions,
                 allowed_collection_schedules = excluded.allowed_collection_schedules,
                 current_container_types = excluded.current_container_types,
                 special_handling_conditions = excluded.special_handling_conditions,
                 seasonality = excluded.seasonality,
                 waste_generator_registration = excluded.waste_generator_registration,
                 environmental_authorizations = excluded.environmental_authorizations,
                 quality_certifications = excluded.quality_certifications,
                 other_relevant_permits = excluded.other_relevant_permits,
                 current_service_provider = excluded.current_service_provider,
                 current_costs = excluded.current_costs,
                 current_provider_satisfaction = excluded.current_provider_satisfaction,
                 reason_for_new_provider = excluded.reason_for_new_provider,
                 specific_certificates_needed = excluded.specific_certificates_needed,
                 reporting_requirements = excluded.reporting_requirements,
                 service_urgency = excluded.service_urgency,
                 estimated_budget = excluded.estimated_budget,
                 next_contact_date = excluded.next_contact_date,
                 pending_actions = excluded.pending_actions,
                 conversation_notes = excluded.conversation_notes",
        )
        .bind(&quotation.id.0)
        .bind(&quotation.name)
        .bind(quotation_status_to_str(quotation.status))
        .bind(&quotation.partner_id.0)
        .bind(quotation.partner_shipping_id.as_ref().map(|id| id.0.clone()))
        .bind(quotation.opportunity_id.as_ref().map(|id| id.0.clone()))
        .bind(quotation.pickup_location_id.as_ref().map(|id| id.0.clone()))
        .bind(sync_mode_to_str(quotation.pickup_location_sync))
        .bind(quotation.final_destination_id.as_ref().map(|id| id.0.clone()))
        .bind(sync_mode_to_str(quotation.final_destination_sync))
        .bind(&quotation.service_frequency)
        .bind(quotation.residue_new)
        .bind(quotation.site_visit_required)
        .bind(quotation.expiration_date)
        .bind(quotation.no_delivery)
        .bind(quotation.always_service)
        .bind(quotation.related_quotation_id.as_ref().map(|id| id.0.clone()))
        .bind(quotation.company_size.map(company_size_to_str))
        .bind(&quotation.industrial_sector)
        .bind(quotation.prospect_priority.map(priority_to_str))
        .bind(decimal_to_text(quotation.estimated_business_potential))
        .bind(&quotation.access_restrictions)
        .bind(&quotation.allowed_collection_schedules)
        .bind(&quotation.current_container_types)
        .bind(&quotation.special_handling_conditions)
        .bind(&quotation.seasonality)
        .bind(&quotation.waste_generator_registration)
        .bind(&quotation.environmental_authorizations)
        .bind(&quotation.quality_certifications)
        .bind(&quotation.other_relevant_permits)
        .bind(&quotation.current_service_provider)
        .bind(decimal_to_text(quotation.current_costs))
        .bind(quotation.current_provider_satisfaction.map(satisfaction_to_str))
        .bind(&quotation.reason_for_new_provider)
        .bind(&quotation.specific_certificates_needed)
        .bind(&quotation.reporting_requirements)
        .bind(quotation.service_urgency.map(urgency_to_str))
        .bind(decimal_to_text(quotation.estimated_budget))
        .bind(quotation.next_contact_date)
        .bind(&quotation.pending_actions)
        .bind(&quotation.conversation_notes)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM quotation_lines WHERE quotation_id = ?1")
            .bind(&quotation.id.0)
            .execute(&mut *tx)
            .await?;

        for (line_no, line) in quotation.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO quotation_lines (
                     quotation_id, line_no, product_id, description, quantity,
                     product_uom_id, residue_name, residue_type, handling_plan,
                     residue_capacity, residue_weight_kg, residue_volume,
                     weight_per_unit, residue_uom_id,
                     create_new_service, existing_service_id,
                     create_new_packaging, packaging_name, packaging_id, hazard
                 ) VALUES (
                     ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                     ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
                 )",
            )
            .bind(&quotation.id.0)
            .bind(line_no as i64)
            .bind(line.product_id.as_ref().map(|id| id.0.clone()))
            .bind(&line.description)
            .bind(line.quantity)
            .bind(line.product_uom_id.as_ref().map(|id| id.0.clone()))
            .bind(&line.residue_name)
            .bind(line.residue_type.map(residue_type_to_str))
            .bind(&line.handling_plan)
            .bind(line.residue_capacity)
            .bind(line.residue_weight_kg)
            .bind(line.residue_volume)
            .bind(line.weight_per_unit)
            .bind(line.residue_uom_id.as_ref().map(|id| id.0.clone()))
            .bind(line.create_new_service)
            .bind(line.existing_service_id.as_ref().map(|id| id.0.clone()))
            .bind(line.create_new_packaging)
            .bind(&line.packaging_name)
            .bind(line.packaging_id.as_ref().map(|id| id.0.clone()))
            .bind(hazard_to_json(&line.hazard)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_derived(&self, id: &QuotationId) -> Result<Vec<Quotation>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM quotations WHERE related_quotation_id = ?1 ORDER BY id",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut derived = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut quotation = quotation_from_row(row)?;
            let derived_id = quotation.id.clone();
            quotation.lines = self.load_lines(&derived_id).await?;
            derived.push(quotation);
        }

        Ok(derived)
    }

    async fn count_derived(&self, id: &QuotationId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM quotations WHERE related_quotation_id = ?1",
        )
        .bind(&id.0)
        .fetch_one(&self.pool)
        .await?
        .get("count");

        Ok(count as u64)
    }
}
