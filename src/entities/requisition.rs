use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of requisition (stock permission slip).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequisitionKind {
    /// No stock effect
    Financial,
    /// Manual stock-in, one movement per line
    InventoryIn,
    /// Manual stock-out; the only path that validates availability
    /// before committing
    InventoryOut,
}

impl RequisitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequisitionKind::Financial => "financial",
            RequisitionKind::InventoryIn => "inventory_in",
            RequisitionKind::InventoryOut => "inventory_out",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "financial" => Some(RequisitionKind::Financial),
            "inventory_in" => Some(RequisitionKind::InventoryIn),
            "inventory_out" => Some(RequisitionKind::InventoryOut),
            _ => None,
        }
    }

    pub fn affects_stock(&self) -> bool {
        matches!(
            self,
            RequisitionKind::InventoryIn | RequisitionKind::InventoryOut
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "requisitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub code: Option<String>,
    /// See [`RequisitionKind`]
    pub kind: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn kind(&self) -> Option<RequisitionKind> {
        RequisitionKind::from_str(&self.kind)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::requisition_line::Entity")]
    RequisitionLines,
}

impl Related<super::requisition_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequisitionLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
