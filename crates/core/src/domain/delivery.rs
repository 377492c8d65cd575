use serde::{Deserialize, Serialize};

use crate::domain::quotation::QuotationId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    Ready,
    Done,
    Cancelled,
}

/// Shipment record owned by the delivery subsystem. This extension only
/// enumerates deliveries linked to a quotation and cancels them when the
/// quotation suppresses delivery at confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub quotation_id: QuotationId,
    pub name: String,
    pub state: DeliveryState,
}

impl Delivery {
    pub fn is_cancellable(&self) -> bool {
        matches!(self.state, DeliveryState::Ready)
    }
}
