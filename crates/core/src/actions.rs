//! Window-action descriptors handed to the surrounding UI/action layer.
//!
//! The descriptors are plain data: a model, a view mode, a record filter,
//! and a context of `default_*` values for the form the UI opens next.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::quotation::Quotation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    #[serde(rename = "list,form")]
    ListForm,
    #[serde(rename = "form")]
    Form,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTarget {
    Current,
    New,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WindowAction {
    pub name: String,
    pub res_model: &'static str,
    pub view_mode: ViewMode,
    pub target: ActionTarget,
    pub domain: Value,
    pub context: Value,
}

/// List the quotations derived from `quotation` (those whose
/// related-quotation reference points back at it).
pub fn view_derived_quotations(quotation: &Quotation) -> WindowAction {
    WindowAction {
        name: format!("Derived Quotations of {}", quotation.name),
        res_model: "quotation",
        view_mode: ViewMode::ListForm,
        target: ActionTarget::Current,
        domain: json!([["related_quotation_id", "=", quotation.id.0]]),
        context: json!({
            "default_partner_id": quotation.partner_id.0,
            "default_related_quotation_id": quotation.id.0,
        }),
    }
}

/// Open a pre-populated form for a follow-up quotation on the same
/// customer, carrying over the service profile of the current one.
pub fn create_related_quotation(quotation: &Quotation) -> WindowAction {
    WindowAction {
        name: format!("New Quotation for {}", quotation.partner_id.0),
        res_model: "quotation",
        view_mode: ViewMode::Form,
        target: ActionTarget::Current,
        domain: json!([]),
        context: json!({
            "default_partner_id": quotation.partner_id.0,
            "default_related_quotation_id": quotation.id.0,
            "default_service_frequency": quotation.service_frequency,
            "default_pickup_location_id":
                quotation.pickup_location_id.as_ref().map(|id| id.0.clone()),
            "default_final_destination_id":
                quotation.final_destination_id.as_ref().map(|id| id.0.clone()),
            "default_company_size": quotation.company_size,
            "default_industrial_sector": quotation.industrial_sector,
            "default_prospect_priority": quotation.prospect_priority,
            "default_always_service": true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{create_related_quotation, view_derived_quotations, ViewMode};
    use crate::domain::lead::{CompanySize, ProspectPriority};
    use crate::domain::partner::PartnerId;
    use crate::domain::quotation::{Quotation, QuotationId, SyncMode};

    fn quotation() -> Quotation {
        let mut quotation = Quotation::new(
            QuotationId("Q-77".to_string()),
            "S00077",
            PartnerId("acme".to_string()),
        );
        quotation.service_frequency = Some("weekly".to_string());
        quotation.pickup_location_id = Some(PartnerId("warehouse-a".to_string()));
        quotation.pickup_location_sync = SyncMode::Manual;
        quotation.company_size = Some(CompanySize::Large);
        quotation.prospect_priority = Some(ProspectPriority::Strategic);
        quotation
    }

    #[test]
    fn derived_view_filters_on_related_reference() {
        let action = view_derived_quotations(&quotation());

        assert_eq!(action.view_mode, ViewMode::ListForm);
        assert_eq!(action.domain, json!([["related_quotation_id", "=", "Q-77"]]));
        assert_eq!(action.context["default_related_quotation_id"], "Q-77");
    }

    #[test]
    fn related_form_carries_service_profile_defaults() {
        let action = create_related_quotation(&quotation());

        assert_eq!(action.view_mode, ViewMode::Form);
        assert_eq!(action.context["default_partner_id"], "acme");
        assert_eq!(action.context["default_service_frequency"], "weekly");
        assert_eq!(action.context["default_pickup_location_id"], "warehouse-a");
        assert_eq!(action.context["default_final_destination_id"], serde_json::Value::Null);
        assert_eq!(action.context["default_company_size"], "large");
        assert_eq!(action.context["default_prospect_priority"], "strategic");
        assert_eq!(action.context["default_always_service"], true);
    }
}
