//! TEXT-column codecs for the domain enums and decimal fields. SQLite
//! stores every enum as its snake_case token and money as a decimal
//! string, so encoding failures are impossible and decoding failures
//! surface as `RepositoryError::Decode` with the offending token.

use rust_decimal::Decimal;

use wasteflow_core::domain::catalog::{ProductKind, UomClass};
use wasteflow_core::domain::delivery::DeliveryState;
use wasteflow_core::domain::lead::{
    CompanySize, ProspectPriority, ResidueType, SatisfactionLevel, ServiceUrgency,
};
use wasteflow_core::domain::quotation::{HazardProfile, QuotationStatus, SyncMode};

use super::RepositoryError;

fn unknown(field: &str, token: &str) -> RepositoryError {
    RepositoryError::Decode(format!("unknown {field} token `{token}`"))
}

pub fn quotation_status_to_str(value: QuotationStatus) -> &'static str {
    match value {
        QuotationStatus::Draft => "draft",
        QuotationStatus::Confirmed => "confirmed",
        QuotationStatus::Cancelled => "cancelled",
    }
}

pub fn quotation_status_from_str(token: &str) -> Result<QuotationStatus, RepositoryError> {
    match token {
        "draft" => Ok(QuotationStatus::Draft),
        "confirmed" => Ok(QuotationStatus::Confirmed),
        "cancelled" => Ok(QuotationStatus::Cancelled),
        other => Err(unknown("quotation status", other)),
    }
}

pub fn sync_mode_to_str(value: SyncMode) -> &'static str {
    match value {
        SyncMode::Auto => "auto",
        SyncMode::Manual => "manual",
    }
}

pub fn sync_mode_from_str(token: &str) -> Result<SyncMode, RepositoryError> {
    match token {
        "auto" => Ok(SyncMode::Auto),
        "manual" => Ok(SyncMode::Manual),
        other => Err(unknown("sync mode", other)),
    }
}

pub fn residue_type_to_str(value: ResidueType) -> &'static str {
    match value {
        ResidueType::Rsu => "rsu",
        ResidueType::Rme => "rme",
        ResidueType::Rp => "rp",
    }
}

pub fn residue_type_from_str(token: &str) -> Result<ResidueType, RepositoryError> {
    match token {
        "rsu" => Ok(ResidueType::Rsu),
        "rme" => Ok(ResidueType::Rme),
        "rp" => Ok(ResidueType::Rp),
        other => Err(unknown("residue type", other)),
    }
}

pub fn company_size_to_str(value: CompanySize) -> &'static str {
    match value {
        CompanySize::Micro => "micro",
        CompanySize::Small => "small",
        CompanySize::Medium => "medium",
        CompanySize::Large => "large",
    }
}

pub fn company_size_from_str(token: &str) -> Result<CompanySize, RepositoryError> {
    match token {
        "micro" => Ok(CompanySize::Micro),
        "small" => Ok(CompanySize::Small),
        "medium" => Ok(CompanySize::Medium),
        "large" => Ok(CompanySize::Large),
        other => Err(unknown("company size", other)),
    }
}

pub fn priority_to_str(value: ProspectPriority) -> &'static str {
    match value {
        ProspectPriority::Low => "low",
        ProspectPriority::Medium => "medium",
        ProspectPriority::High => "high",
        ProspectPriority::Strategic => "strategic",
    }
}

pub fn priority_from_str(token: &str) -> Result<ProspectPriority, RepositoryError> {
    match token {
        "low" => Ok(ProspectPriority::Low),
        "medium" => Ok(ProspectPriority::Medium),
        "high" => Ok(ProspectPriority::High),
        "strategic" => Ok(ProspectPriority::Strategic),
        other => Err(unknown("prospect priority", other)),
    }
}

pub fn satisfaction_to_str(value: SatisfactionLevel) -> &'static str {
    match value {
        SatisfactionLevel::VeryLow => "very_low",
        SatisfactionLevel::Low => "low",
        SatisfactionLevel::Medium => "medium",
        SatisfactionLevel::High => "high",
        SatisfactionLevel::VeryHigh => "very_high",
    }
}

pub fn satisfaction_from_str(token: &str) -> Result<SatisfactionLevel, RepositoryError> {
    match token {
        "very_low" => Ok(SatisfactionLevel::VeryLow),
        "low" => Ok(SatisfactionLevel::Low),
        "medium" => Ok(SatisfactionLevel::Medium),
        "high" => Ok(SatisfactionLevel::High),
        "very_high" => Ok(SatisfactionLevel::VeryHigh),
        other => Err(unknown("satisfaction level", other)),
    }
}

pub fn urgency_to_str(value: ServiceUrgency) -> &'static str {
    match value {
        ServiceUrgency::Immediate => "immediate",
        ServiceUrgency::OneWeek => "one_week",
        ServiceUrgency::OneMonth => "one_month",
        ServiceUrgency::ThreeMonths => "three_months",
        ServiceUrgency::NoRush => "no_rush",
    }
}

pub fn urgency_from_str(token: &str) -> Result<ServiceUrgency, RepositoryError> {
    match token {
        "immediate" => Ok(ServiceUrgency::Immediate),
        "one_week" => Ok(ServiceUrgency::OneWeek),
        "one_month" => Ok(ServiceUrgency::OneMonth),
        "three_months" => Ok(ServiceUrgency::ThreeMonths),
        "no_rush" => Ok(ServiceUrgency::NoRush),
        other => Err(unknown("service urgency", other)),
    }
}

pub fn product_kind_to_str(value: ProductKind) -> &'static str {
    match value {
        ProductKind::Service => "service",
        ProductKind::Storable => "storable",
    }
}

pub fn product_kind_from_str(token: &str) -> Result<ProductKind, RepositoryError> {
    match token {
        "service" => Ok(ProductKind::Service),
        "storable" => Ok(ProductKind::Storable),
        other => Err(unknown("product kind", other)),
    }
}

pub fn uom_class_to_str(value: UomClass) -> &'static str {
    match value {
        UomClass::Unit => "unit",
        UomClass::Packaging => "packaging",
    }
}

pub fn uom_class_from_str(token: &str) -> Result<UomClass, RepositoryError> {
    match token {
        "unit" => Ok(UomClass::Unit),
        "packaging" => Ok(UomClass::Packaging),
        other => Err(unknown("uom class", other)),
    }
}

pub fn delivery_state_to_str(value: DeliveryState) -> &'static str {
    match value {
        DeliveryState::Ready => "ready",
        DeliveryState::Done => "done",
        DeliveryState::Cancelled => "cancelled",
    }
}

pub fn delivery_state_from_str(token: &str) -> Result<DeliveryState, RepositoryError> {
    match token {
        "ready" => Ok(DeliveryState::Ready),
        "done" => Ok(DeliveryState::Done),
        "cancelled" => Ok(DeliveryState::Cancelled),
        other => Err(unknown("delivery state", other)),
    }
}

pub fn decimal_to_text(value: Decimal) -> String {
    value.to_string()
}

pub fn decimal_from_text(text: &str) -> Result<Decimal, RepositoryError> {
    text.parse::<Decimal>()
        .map_err(|_| RepositoryError::Decode(format!("invalid decimal text `{text}`")))
}

pub fn hazard_to_json(value: &HazardProfile) -> Result<String, RepositoryError> {
    serde_json::to_string(value)
        .map_err(|error| RepositoryError::Decode(format!("hazard profile encode failed: {error}")))
}

pub fn hazard_from_json(text: &str) -> Result<HazardProfile, RepositoryError> {
    if text.trim().is_empty() || text.trim() == "{}" {
        return Ok(HazardProfile::default());
    }
    serde_json::from_str(text)
        .map_err(|error| RepositoryError::Decode(format!("hazard profile decode failed: {error}")))
}
