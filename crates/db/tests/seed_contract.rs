use wasteflow_core::domain::lead::LeadId;
use wasteflow_core::domain::partner::PartnerId;
use wasteflow_core::domain::quotation::{Quotation, QuotationId, QuotationLine, SyncMode};
use wasteflow_db::repositories::{
    CatalogRepository, LeadRepository, QuotationRepository, SqlCatalogRepository,
    SqlLeadRepository, SqlQuotationRepository,
};
use wasteflow_db::{connect_with_settings, migrations, DbPool, SeedDataset};

async fn seeded_pool() -> DbPool {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("run migrations");
    SeedDataset::load(&pool).await.expect("load seed");
    pool
}

#[tokio::test]
async fn seed_passes_its_own_verification() {
    let pool = seeded_pool().await;

    let verification = SeedDataset::verify(&pool).await.expect("verify seed");

    assert!(
        verification.all_present,
        "failed checks: {:?}",
        verification
            .checks
            .iter()
            .filter(|(_, passed)| !passed)
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn seed_is_idempotent_across_runs() {
    let pool = seeded_pool().await;
    SeedDataset::load(&pool).await.expect("reseed");

    let verification = SeedDataset::verify(&pool).await.expect("verify seed");
    assert!(verification.all_present);

    let lead = SqlLeadRepository::new(pool.clone())
        .find_by_id(&LeadId(wasteflow_db::fixtures::SEED_LEAD_ID.to_string()))
        .await
        .expect("find lead")
        .expect("lead present");
    assert_eq!(lead.residue_lines.len(), 2, "reseeding must not duplicate residue lines");
}

#[tokio::test]
async fn seeded_lead_loads_with_residue_descriptors() {
    let pool = seeded_pool().await;
    let repo = SqlLeadRepository::new(pool);

    let lead = repo
        .find_by_id(&LeadId(wasteflow_db::fixtures::SEED_LEAD_ID.to_string()))
        .await
        .expect("find lead")
        .expect("lead present");

    assert_eq!(lead.pickup_location_id, Some(PartnerId("partner-warehouse-a".to_string())));
    assert_eq!(lead.final_destination_id, Some(PartnerId("partner-disposal-site".to_string())));
    assert_eq!(lead.service_frequency.as_deref(), Some("weekly"));
    assert_eq!(lead.residue_lines.len(), 2);

    let cataloged = &lead.residue_lines[0];
    assert!(cataloged.product_id.is_some());
    assert!(!cataloged.create_new_service);

    let free_text = &lead.residue_lines[1];
    assert_eq!(free_text.name, "Used Oil");
    assert!(free_text.create_new_service);
    assert_eq!(free_text.packaging_name.as_deref(), Some("200L Drum"));
    assert_eq!(free_text.volume, 10.0);
}

#[tokio::test]
async fn quotation_round_trips_through_sql_repository() {
    let pool = seeded_pool().await;
    let repo = SqlQuotationRepository::new(pool);

    let mut quotation = Quotation::new(
        QuotationId("Q-RT-1".to_string()),
        "S00010",
        PartnerId("partner-acme".to_string()),
    );
    quotation.pickup_location_id = Some(PartnerId("partner-warehouse-a".to_string()));
    quotation.pickup_location_sync = SyncMode::Manual;
    quotation.lines.push(QuotationLine {
        description: "Used Oil".to_string(),
        quantity: 10.0,
        residue_name: Some("Used Oil".to_string()),
        create_new_service: true,
        ..QuotationLine::default()
    });

    repo.save(quotation.clone()).await.expect("save quotation");
    let found = repo.find_by_id(&quotation.id).await.expect("find quotation");

    assert_eq!(found, Some(quotation));
}

#[tokio::test]
async fn saving_again_replaces_lines_instead_of_appending() {
    let pool = seeded_pool().await;
    let repo = SqlQuotationRepository::new(pool);

    let mut quotation = Quotation::new(
        QuotationId("Q-RT-2".to_string()),
        "S00011",
        PartnerId("partner-acme".to_string()),
    );
    quotation.lines.push(QuotationLine {
        description: "Used Oil".to_string(),
        ..QuotationLine::default()
    });
    repo.save(quotation.clone()).await.expect("first save");

    quotation.lines.push(QuotationLine {
        description: "Contaminated Rags".to_string(),
        ..QuotationLine::default()
    });
    repo.save(quotation.clone()).await.expect("second save");

    let found = repo
        .find_by_id(&quotation.id)
        .await
        .expect("find quotation")
        .expect("quotation present");
    assert_eq!(found.lines.len(), 2);
}

#[tokio::test]
async fn derived_quotations_are_counted_via_sql() {
    let pool = seeded_pool().await;
    let repo = SqlQuotationRepository::new(pool);

    let parent = Quotation::new(
        QuotationId("Q-PARENT".to_string()),
        "S00020",
        PartnerId("partner-acme".to_string()),
    );
    repo.save(parent.clone()).await.expect("save parent");

    for n in 0..2 {
        let mut child = Quotation::new(
            QuotationId(format!("Q-CHILD-{n}")),
            format!("S0002{}", n + 1),
            PartnerId("partner-acme".to_string()),
        );
        child.related_quotation_id = Some(parent.id.clone());
        repo.save(child).await.expect("save child");
    }

    assert_eq!(repo.count_derived(&parent.id).await.expect("count"), 2);
    let derived = repo.list_derived(&parent.id).await.expect("list");
    assert_eq!(derived.len(), 2);
    assert!(derived.iter().all(|q| q.related_quotation_id == Some(parent.id.clone())));
}

#[tokio::test]
async fn catalog_name_search_distinguishes_exact_and_contains() {
    let pool = seeded_pool().await;
    let repo = SqlCatalogRepository::new(pool);

    let exact = repo
        .find_product_by_name(wasteflow_db::fixtures::SEED_PRODUCT_NAME)
        .await
        .expect("exact search");
    assert!(exact.is_some());

    let miss = repo.find_product_by_name("hazardous waste collection").await.expect("search");
    assert!(miss.is_none(), "exact search should be case-sensitive");

    let ci = repo.find_product_by_name_ci("waste collection").await.expect("ci search");
    assert!(ci.is_some(), "contains search should match a substring case-insensitively");
}
