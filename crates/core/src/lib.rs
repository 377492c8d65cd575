pub mod actions;
pub mod config;
pub mod domain;
pub mod errors;
pub mod rules;

pub use actions::{ActionTarget, ViewMode, WindowAction};
pub use domain::catalog::{
    Product, ProductCategory, ProductCategoryId, ProductId, ProductKind, Uom, UomClass, UomId,
};
pub use domain::delivery::{Delivery, DeliveryId, DeliveryState};
pub use domain::lead::{
    CompanySize, Lead, LeadId, ProspectPriority, ResidueLine, ResidueType, SatisfactionLevel,
    ServiceUrgency,
};
pub use domain::partner::{Partner, PartnerId};
pub use domain::quotation::{
    default_expiration_date, HazardProfile, LinePatch, Patch, ProvisionState, Quotation,
    QuotationId, QuotationLine, QuotationPatch, QuotationStatus, SyncMode,
};
pub use errors::DomainError;
