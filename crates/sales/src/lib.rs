//! Quotation lifecycle hooks: lead-to-quotation propagation at creation,
//! write consistency for the tracked location references, delivery
//! suppression at confirmation, and per-line auto-provisioning of
//! service products and packaging units.

pub mod context;
pub mod errors;
pub mod lifecycle;
pub mod provisioning;

pub use context::{CreateContext, WriteContext};
pub use errors::LifecycleError;
pub use lifecycle::QuotationLifecycle;
pub use provisioning::{packaging_factor, resolve_or_create, Provisioner};
