use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementDirection {
    In,
    Out,
}

impl MovementDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementDirection::In => "in",
            MovementDirection::Out => "out",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in" => Some(MovementDirection::In),
            "out" => Some(MovementDirection::Out),
            _ => None,
        }
    }

    /// The direction that undoes this one.
    pub fn opposite(&self) -> Self {
        match self {
            MovementDirection::In => MovementDirection::Out,
            MovementDirection::Out => MovementDirection::In,
        }
    }
}

/// Kind of document that caused a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementSource {
    /// Sales/purchase document (invoice or return)
    Transaction,
    /// Manual stock permission slip
    Requisition,
}

impl MovementSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementSource::Transaction => "transaction",
            MovementSource::Requisition => "requisition",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "transaction" => Some(MovementSource::Transaction),
            "requisition" => Some(MovementSource::Requisition),
            _ => None,
        }
    }
}

/// Append-only audit entry for one stock quantity change.
///
/// Records are only ever created; deletion of the causing document appends
/// compensating entries (`reversal = true`) instead of touching existing
/// rows, keeping the trail replayable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    /// Causing document id (document or requisition)
    pub reference_id: Uuid,
    /// `transaction` or `requisition`; see [`MovementSource`]
    pub reference_type: String,
    /// `in` or `out`; see [`MovementDirection`]
    pub direction: String,
    /// Requested quantity; may exceed `previous_quantity - new_quantity`
    /// when an out movement was clamped
    pub quantity: Decimal,
    pub previous_quantity: Decimal,
    pub new_quantity: Decimal,
    /// True when an out movement hit the zero floor
    pub clamped: bool,
    /// True for compensating entries appended on delete
    pub reversal: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}
