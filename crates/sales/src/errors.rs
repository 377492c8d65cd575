use thiserror::Error;

use wasteflow_core::DomainError;
use wasteflow_db::repositories::RepositoryError;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("quotation `{0}` was not found")]
    QuotationNotFound(String),
    #[error("quotation `{quotation}` has no line {line_no}")]
    LineNotFound { quotation: String, line_no: usize },
}
