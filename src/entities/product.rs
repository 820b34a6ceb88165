use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a product participates in the stock ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductKind {
    /// Physical goods with tracked quantity and weighted-average cost.
    Tracked,
    /// Services; never appear in the stock ledger.
    Service,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Tracked => "tracked",
            ProductKind::Service => "service",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "tracked" => Some(ProductKind::Tracked),
            "service" => Some(ProductKind::Service),
            _ => None,
        }
    }
}

/// Product entity.
///
/// `stock_quantity` and `average_cost` are mutated exclusively through the
/// stock ledger; document code never writes them directly. The `version`
/// column backs the optimistic check that guards the read-modify-write on
/// the WAC update.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub code: Option<String>,
    /// `tracked` or `service`; see [`ProductKind`]
    pub kind: String,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    /// On-hand quantity; never negative
    pub stock_quantity: Decimal,
    /// Weighted-average unit cost; never negative
    pub average_cost: Decimal,
    /// Optimistic-lock counter, bumped on every ledger write
    pub version: i32,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn kind(&self) -> Option<ProductKind> {
        ProductKind::from_str(&self.kind)
    }

    pub fn is_tracked(&self) -> bool {
        self.kind == ProductKind::Tracked.as_str()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
