//! Deterministic demo dataset: a partner directory, the catalog baseline
//! the provisioning rules expect, and one fully-qualified lead whose
//! residue descriptors exercise both line input modes (an already
//! cataloged service and a free-text residue awaiting provisioning).

use sqlx::Row;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

struct SeedPartner {
    id: &'static str,
    name: &'static str,
    street: Option<&'static str>,
    city: Option<&'static str>,
    state: Option<&'static str>,
    zip: Option<&'static str>,
    country: Option<&'static str>,
}

const SEED_PARTNERS: &[SeedPartner] = &[
    SeedPartner {
        id: "partner-acme",
        name: "Acme Industrial",
        street: Some("Blvd. Fundidora 500"),
        city: Some("Monterrey"),
        state: Some("NL"),
        zip: Some("64010"),
        country: Some("Mexico"),
    },
    SeedPartner {
        id: "partner-warehouse-a",
        name: "Warehouse A",
        street: Some("Av. Industria 120"),
        city: Some("Monterrey"),
        state: Some("NL"),
        zip: Some("64000"),
        country: Some("Mexico"),
    },
    SeedPartner {
        id: "partner-disposal-site",
        name: "Final Disposal Site Norte",
        street: Some("Carretera a Laredo km 22"),
        city: Some("Cienega de Flores"),
        state: Some("NL"),
        zip: Some("65550"),
        country: Some("Mexico"),
    },
];

pub const SEED_CATEGORY_ID: &str = "cat-waste-services";
pub const SEED_REFERENCE_UOM_ID: &str = "uom-units";
pub const SEED_SERVICE_UOM_ID: &str = "uom-service";
pub const SEED_PRODUCT_ID: &str = "prod-haz-collection";
pub const SEED_PRODUCT_NAME: &str = "Hazardous Waste Collection";
pub const SEED_LEAD_ID: &str = "lead-used-oil-001";

#[derive(Debug, Clone)]
pub struct SeedLeadInfo {
    pub lead_id: &'static str,
    pub description: &'static str,
    pub residue_count: usize,
}

#[derive(Debug, Clone)]
pub struct SeedResult {
    pub leads_seeded: Vec<SeedLeadInfo>,
}

#[derive(Debug, Clone)]
pub struct SeedVerification {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

pub struct SeedDataset;

impl SeedDataset {
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        for partner in SEED_PARTNERS {
            sqlx::query(
                "INSERT OR REPLACE INTO partners (id, name, street, street2, city, state, zip, country)
                 VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7)",
            )
            .bind(partner.id)
            .bind(partner.name)
            .bind(partner.street)
            .bind(partner.city)
            .bind(partner.state)
            .bind(partner.zip)
            .bind(partner.country)
            .execute(pool)
            .await?;
        }

        sqlx::query(
            "INSERT OR REPLACE INTO product_categories (id, name) VALUES (?1, 'Waste Services')",
        )
        .bind(SEED_CATEGORY_ID)
        .execute(pool)
        .await?;

        sqlx::query(
            "INSERT OR REPLACE INTO uoms (id, name, class, factor, rounding)
             VALUES (?1, 'Units', 'unit', 1.0, 0.01)",
        )
        .bind(SEED_REFERENCE_UOM_ID)
        .execute(pool)
        .await?;

        sqlx::query(
            "INSERT OR REPLACE INTO uoms (id, name, class, factor, rounding)
             VALUES (?1, 'Service Unit', 'unit', 1.0, 0.01)",
        )
        .bind(SEED_SERVICE_UOM_ID)
        .execute(pool)
        .await?;

        sqlx::query(
            "INSERT OR REPLACE INTO products (id, name, kind, category_id, uom_id)
             VALUES (?1, ?2, 'service', ?3, ?4)",
        )
        .bind(SEED_PRODUCT_ID)
        .bind(SEED_PRODUCT_NAME)
        .bind(SEED_CATEGORY_ID)
        .bind(SEED_SERVICE_UOM_ID)
        .execute(pool)
        .await?;

        sqlx::query(
            "INSERT OR REPLACE INTO leads (
                 id, name, partner_id, service_frequency, residue_new,
                 site_visit_required, pickup_location_id, final_destination_id,
                 company_size, industrial_sector, prospect_priority,
                 estimated_business_potential, allowed_collection_schedules,
                 waste_generator_registration, current_service_provider,
                 current_costs, current_provider_satisfaction, service_urgency,
                 estimated_budget
             ) VALUES (
                 ?1, 'Acme Industrial - Used Oil Program', 'partner-acme',
                 'weekly', 1, 1, 'partner-warehouse-a', 'partner-disposal-site',
                 'large', 'Metalworking', 'high', '250000.00',
                 'Mon-Fri 08:00-16:00', 'NL-GEN-2024-0117', 'EcoRecolecta SA',
                 '18500.00', 'low', 'one_month', '150000.00'
             )",
        )
        .bind(SEED_LEAD_ID)
        .execute(pool)
        .await?;

        // Replace the residue descriptors wholesale so reseeding stays
        // deterministic.
        sqlx::query("DELETE FROM lead_residue_lines WHERE lead_id = ?1")
            .bind(SEED_LEAD_ID)
            .execute(pool)
            .await?;

        sqlx::query(
            "INSERT INTO lead_residue_lines (
                 lead_id, line_no, name, residue_type, handling_plan,
                 capacity, weight_kg, volume, weight_per_unit, uom_id,
                 product_id, create_new_service, existing_service_id,
                 create_new_packaging, packaging_name, packaging_id
             ) VALUES (
                 ?1, 0, ?2, 'rp', 'PM-RP-014', 200.0, 180.0, 4.0, 45.0, ?3,
                 ?4, 0, ?4, 0, NULL, ?5
             )",
        )
        .bind(SEED_LEAD_ID)
        .bind(SEED_PRODUCT_NAME)
        .bind(SEED_REFERENCE_UOM_ID)
        .bind(SEED_PRODUCT_ID)
        .bind(SEED_REFERENCE_UOM_ID)
        .execute(pool)
        .await?;

        sqlx::query(
            "INSERT INTO lead_residue_lines (
                 lead_id, line_no, name, residue_type, handling_plan,
                 capacity, weight_kg, volume, weight_per_unit, uom_id,
                 product_id, create_new_service, existing_service_id,
                 create_new_packaging, packaging_name, packaging_id
             ) VALUES (
                 ?1, 1, 'Used Oil', 'rp', 'PM-RP-002', 200.0, 9.2, 10.0, 0.92,
                 ?2, NULL, 1, NULL, 1, '200L Drum', NULL
             )",
        )
        .bind(SEED_LEAD_ID)
        .bind(SEED_REFERENCE_UOM_ID)
        .execute(pool)
        .await?;

        Ok(SeedResult {
            leads_seeded: vec![SeedLeadInfo {
                lead_id: SEED_LEAD_ID,
                description: "qualified used-oil program with two residue streams",
                residue_count: 2,
            }],
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<SeedVerification, RepositoryError> {
        let mut checks = Vec::new();

        checks.push(("partners", count(pool, "partners").await? >= 3));
        checks.push(("catalog-category", count(pool, "product_categories").await? >= 1));
        checks.push(("catalog-uoms", count(pool, "uoms").await? >= 2));
        checks.push(("catalog-product", count(pool, "products").await? >= 1));

        let lead_count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM leads WHERE id = ?1")
            .bind(SEED_LEAD_ID)
            .fetch_one(pool)
            .await?
            .get("count");
        checks.push(("lead", lead_count == 1));

        let residue_count: i64 =
            sqlx::query("SELECT COUNT(*) AS count FROM lead_residue_lines WHERE lead_id = ?1")
                .bind(SEED_LEAD_ID)
                .fetch_one(pool)
                .await?
                .get("count");
        checks.push(("lead-residue-lines", residue_count == 2));

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(SeedVerification { all_present, checks })
    }
}

async fn count(pool: &DbPool, table: &str) -> Result<i64, RepositoryError> {
    // Table names come from the fixed list above, never from user input.
    let query = format!("SELECT COUNT(*) AS count FROM {table}");
    Ok(sqlx::query(&query).fetch_one(pool).await?.get("count"))
}
