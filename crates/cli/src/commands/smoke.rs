use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::commands::CommandResult;
use wasteflow_core::config::{AppConfig, LoadOptions};
use wasteflow_core::domain::lead::LeadId;
use wasteflow_core::domain::partner::PartnerId;
use wasteflow_core::domain::quotation::{Quotation, QuotationId, SyncMode};
use wasteflow_db::repositories::{
    SqlCatalogRepository, SqlDeliveryRepository, SqlLeadRepository, SqlQuotationRepository,
};
use wasteflow_db::{connect, fixtures, migrations, DbPool, SeedDataset};
use wasteflow_sales::{CreateContext, QuotationLifecycle};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

pub fn run() -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config_started = Instant::now();
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(pass(
                "config_validation",
                config_started,
                "configuration loaded and validated".to_string(),
            ));
            config
        }
        Err(error) => {
            checks.push(fail("config_validation", config_started, error.to_string()));
            checks.push(skipped("db_connectivity"));
            checks.push(skipped("migration_visibility"));
            checks.push(skipped("seed_dataset"));
            checks.push(skipped("lead_propagation"));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            checks.push(SmokeCheck {
                name: "db_connectivity",
                status: SmokeStatus::Fail,
                elapsed_ms: 0,
                message: format!("failed to initialize async runtime: {error}"),
            });
            checks.push(skipped("migration_visibility"));
            checks.push(skipped("seed_dataset"));
            checks.push(skipped("lead_propagation"));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    };

    let db_started = Instant::now();
    let pool = match runtime.block_on(connect(&config.database)) {
        Ok(pool) => {
            checks.push(pass(
                "db_connectivity",
                db_started,
                format!("connected using `{}`", config.database.url),
            ));
            pool
        }
        Err(error) => {
            checks.push(fail("db_connectivity", db_started, format!("failed to connect: {error}")));
            checks.push(skipped("migration_visibility"));
            checks.push(skipped("seed_dataset"));
            checks.push(skipped("lead_propagation"));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    };

    let migration_started = Instant::now();
    match runtime.block_on(migrations::run_pending(&pool)) {
        Ok(()) => checks.push(pass(
            "migration_visibility",
            migration_started,
            "migrations are visible and executable".to_string(),
        )),
        Err(error) => {
            checks.push(fail(
                "migration_visibility",
                migration_started,
                format!("migration execution failed: {error}"),
            ));
            runtime.block_on(pool.close());
            checks.push(skipped("seed_dataset"));
            checks.push(skipped("lead_propagation"));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    }

    let seed_started = Instant::now();
    let seed_ok = runtime.block_on(async {
        SeedDataset::load(&pool).await?;
        SeedDataset::verify(&pool).await
    });
    match seed_ok {
        Ok(verification) if verification.all_present => checks.push(pass(
            "seed_dataset",
            seed_started,
            "demo dataset loaded and verified".to_string(),
        )),
        Ok(verification) => {
            let failed: Vec<&str> = verification
                .checks
                .iter()
                .filter_map(|(name, passed)| (!passed).then_some(*name))
                .collect();
            checks.push(fail(
                "seed_dataset",
                seed_started,
                format!("seed verification failed: {}", failed.join(", ")),
            ));
            runtime.block_on(pool.close());
            checks.push(skipped("lead_propagation"));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
        Err(error) => {
            checks.push(fail("seed_dataset", seed_started, format!("seed failed: {error}")));
            runtime.block_on(pool.close());
            checks.push(skipped("lead_propagation"));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    }

    let propagation_started = Instant::now();
    let propagation = runtime.block_on(propagation_pass(&pool, &config));
    match propagation {
        Ok(message) => checks.push(pass("lead_propagation", propagation_started, message)),
        Err(message) => checks.push(fail("lead_propagation", propagation_started, message)),
    }

    runtime.block_on(pool.close());
    finalize_report(checks, started.elapsed().as_millis() as u64)
}

/// Drive the full creation hook against the seeded lead and check the
/// propagation contract on the result.
async fn propagation_pass(pool: &DbPool, config: &AppConfig) -> Result<String, String> {
    let lifecycle = QuotationLifecycle::new(
        Arc::new(SqlLeadRepository::new(pool.clone())),
        Arc::new(SqlQuotationRepository::new(pool.clone())),
        Arc::new(SqlCatalogRepository::new(pool.clone())),
        Arc::new(SqlDeliveryRepository::new(pool.clone())),
        config.catalog.clone(),
    );

    let draft = Quotation::new(
        QuotationId("Q-SMOKE-001".to_string()),
        "S-SMOKE-001",
        PartnerId("partner-acme".to_string()),
    );

    let quotation = lifecycle
        .create_batch(
            vec![draft],
            &CreateContext::from_lead(LeadId(fixtures::SEED_LEAD_ID.to_string())),
        )
        .await
        .map_err(|error| format!("creation hook failed: {error}"))?
        .pop()
        .ok_or_else(|| "creation hook returned no quotation".to_string())?;

    if quotation.pickup_location_id.as_ref().map(|id| id.0.as_str())
        != Some("partner-warehouse-a")
    {
        return Err("pickup location was not copied from the lead".to_string());
    }
    if quotation.pickup_location_sync != SyncMode::Manual {
        return Err("copied pickup location should carry a manual sync marker".to_string());
    }
    if quotation.lines.len() != 2 {
        return Err(format!("expected 2 propagated lines, found {}", quotation.lines.len()));
    }
    let unresolved = quotation.lines.iter().filter(|line| line.product_id.is_none()).count();
    if unresolved != 0 {
        return Err(format!("{unresolved} propagated line(s) left unresolved"));
    }

    Ok("lead propagated: pickup copied, 2 lines resolved".to_string())
}

fn pass(name: &'static str, since: Instant, message: String) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Pass,
        elapsed_ms: since.elapsed().as_millis() as u64,
        message,
    }
}

fn fail(name: &'static str, since: Instant, message: String) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Fail,
        elapsed_ms: since.elapsed().as_millis() as u64,
        message,
    }
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped because an earlier check failed".to_string(),
    }
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let all_pass = checks.iter().all(|check| check.status == SmokeStatus::Pass);
    let status = if all_pass { SmokeStatus::Pass } else { SmokeStatus::Fail };
    let summary = if all_pass {
        "smoke: all readiness checks passed".to_string()
    } else {
        "smoke: one or more readiness checks failed".to_string()
    };

    let report = SmokeReport { command: "smoke", status, summary, total_elapsed_ms, checks };
    let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"report serialization failed: {}\"}}",
            error.to_string().replace('"', "'")
        )
    });

    CommandResult { exit_code: if all_pass { 0 } else { 1 }, output }
}
