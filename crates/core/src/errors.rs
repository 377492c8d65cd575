use thiserror::Error;

use crate::domain::quotation::QuotationStatus;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid quotation status transition from {from:?} to {to:?}")]
    InvalidStatusTransition { from: QuotationStatus, to: QuotationStatus },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}
