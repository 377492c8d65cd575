use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductCategoryId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UomId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Service,
    Storable,
}

/// Catalog product. Service products are what line auto-provisioning
/// creates from free-text residue names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub kind: ProductKind,
    pub category_id: Option<ProductCategoryId>,
    pub uom_id: Option<UomId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: ProductCategoryId,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UomClass {
    /// Plain counting unit (the reference unit has factor 1.0).
    Unit,
    /// Packaging unit derived from a residue's declared volume.
    Packaging,
}

/// Unit of measure. `factor` is the conversion ratio against the count
/// reference unit of the same class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Uom {
    pub id: UomId,
    pub name: String,
    pub class: UomClass,
    pub factor: f64,
    pub rounding: f64,
}

impl Uom {
    /// New unit carrying this unit's precision attributes, used when the
    /// provisioning logic derives a service or packaging unit from the
    /// count reference.
    pub fn derive(&self, id: UomId, name: impl Into<String>, class: UomClass, factor: f64) -> Uom {
        Uom { id, name: name.into(), class, factor, rounding: self.rounding }
    }
}
