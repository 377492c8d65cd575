use crate::domain::partner::PartnerId;
use crate::domain::quotation::{Quotation, SyncMode};

/// Decide whether the pickup-location autofill should write, and with
/// which partner. Pure rule consulted by the creation and write hooks:
///
/// - a `Manual` sync marker always wins, nothing is proposed;
/// - without `force`, an already-populated pickup location is kept;
/// - the shipping customer is preferred over the billing customer;
/// - a proposal equal to the current value is suppressed, so the write
///   this rule triggers can never cascade into another autofill.
pub fn pickup_autofill(quotation: &Quotation, force: bool) -> Option<PartnerId> {
    if quotation.pickup_location_sync == SyncMode::Manual {
        return None;
    }
    if !force && quotation.pickup_location_id.is_some() {
        return None;
    }

    let candidate = quotation
        .partner_shipping_id
        .clone()
        .unwrap_or_else(|| quotation.partner_id.clone());

    if quotation.pickup_location_id.as_ref() == Some(&candidate) {
        return None;
    }

    Some(candidate)
}
