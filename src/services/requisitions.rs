//! Requisitions: manual stock-in/out slips and financial permission slips.
//!
//! Inventory-out requisitions are the one strict availability path in the
//! crate: every line is checked against on-hand stock before anything is
//! written, and the whole slip fails on the first shortage. Deleting a
//! requisition reverses its movements with compensating records and
//! soft-deletes the slip; the original movement records stay.

use crate::{
    db::DbPool,
    entities::{
        product,
        requisition::{self, RequisitionKind},
        requisition_line,
        stock_movement::{self, MovementDirection, MovementSource},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock_ledger::{self, MovementRequest},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequisitionLineRequest {
    pub product_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRequisitionRequest {
    pub kind: RequisitionKind,
    pub code: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<RequisitionLineRequest>,
}

/// Partial update. Line changes are only accepted for financial
/// requisitions; inventory slips already moved stock and their items are
/// immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequisitionRequest {
    pub code: Option<String>,
    pub notes: Option<String>,
    pub lines: Option<Vec<RequisitionLineRequest>>,
}

pub struct RequisitionService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl RequisitionService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(kind = request.kind.as_str()))]
    pub async fn create_requisition(
        &self,
        request: CreateRequisitionRequest,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<requisition::Model, ServiceError> {
        validate_lines(&request.lines)?;
        if request.kind.affects_stock() && request.lines.is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "A {} requisition requires at least one line item",
                request.kind.as_str()
            )));
        }

        let db = self.db_pool.as_ref();
        let (created, movements) = db
            .transaction::<_, (requisition::Model, Vec<stock_movement::Model>), ServiceError>(
                |txn| {
                    Box::pin(async move {
                        insert_requisition(txn, request, tenant_id, actor_id).await
                    })
                },
            )
            .await?;

        info!(requisition_id = %created.id, kind = %created.kind, "requisition created");

        self.emit(Event::RequisitionCreated {
            requisition_id: created.id,
            tenant_id,
            kind: created.kind.clone(),
        })
        .await;
        for movement in &movements {
            self.emit(movement_event(movement)).await;
        }

        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update_requisition(
        &self,
        requisition_id: Uuid,
        request: UpdateRequisitionRequest,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<requisition::Model, ServiceError> {
        if let Some(lines) = &request.lines {
            validate_lines(lines)?;
        }

        let db = self.db_pool.as_ref();
        let updated = db
            .transaction::<_, requisition::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let req = find_requisition(txn, requisition_id, tenant_id).await?;
                    let kind = parse_kind(&req)?;

                    if request.lines.is_some() && kind.affects_stock() {
                        return Err(ServiceError::ValidationError(format!(
                            "Line items of an {} requisition are immutable; delete the slip and recreate it",
                            req.kind
                        )));
                    }

                    if let Some(lines) = &request.lines {
                        requisition_line::Entity::delete_many()
                            .filter(requisition_line::Column::RequisitionId.eq(req.id))
                            .exec(txn)
                            .await
                            .map_err(ServiceError::db_error)?;
                        for line in lines {
                            requisition_line::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                requisition_id: Set(req.id),
                                product_id: Set(line.product_id),
                                quantity: Set(line.quantity),
                            }
                            .insert(txn)
                            .await
                            .map_err(ServiceError::db_error)?;
                        }
                    }

                    let mut active: requisition::ActiveModel = req.into();
                    if let Some(code) = request.code {
                        active.code = Set(Some(code));
                    }
                    if let Some(notes) = request.notes {
                        active.notes = Set(Some(notes));
                    }
                    active.updated_at = Set(Utc::now());
                    active.update(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await?;

        info!(requisition_id = %updated.id, "requisition updated");
        Ok(updated)
    }

    /// Reverses the slip's stock effect with compensating movements and
    /// soft-deletes it. The original movement records are kept.
    #[instrument(skip(self))]
    pub async fn delete_requisition(
        &self,
        requisition_id: Uuid,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<requisition::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let (deleted, reversals) = db
            .transaction::<_, (requisition::Model, Vec<stock_movement::Model>), ServiceError>(
                |txn| {
                    Box::pin(async move {
                        let req = find_requisition(txn, requisition_id, tenant_id).await?;
                        let kind = parse_kind(&req)?;

                        let reversals = if kind.affects_stock() {
                            stock_ledger::reverse_movements_for(txn, tenant_id, req.id, actor_id)
                                .await?
                        } else {
                            Vec::new()
                        };

                        let now = Utc::now();
                        let mut active: requisition::ActiveModel = req.into();
                        active.deleted_at = Set(Some(now));
                        active.deleted_by = Set(Some(actor_id));
                        active.updated_at = Set(now);
                        let deleted = active.update(txn).await.map_err(ServiceError::db_error)?;

                        Ok((deleted, reversals))
                    })
                },
            )
            .await?;

        info!(requisition_id = %deleted.id, reversals = reversals.len(), "requisition deleted");

        self.emit(Event::RequisitionDeleted {
            requisition_id: deleted.id,
            tenant_id,
        })
        .await;
        for movement in &reversals {
            self.emit(movement_event(movement)).await;
        }

        Ok(deleted)
    }

    pub async fn get_requisition(
        &self,
        requisition_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<(requisition::Model, Vec<requisition_line::Model>), ServiceError> {
        let db = self.db_pool.as_ref();
        let req = find_requisition(db, requisition_id, tenant_id).await?;
        let lines = requisition_line::Entity::find()
            .filter(requisition_line::Column::RequisitionId.eq(req.id))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok((req, lines))
    }

    pub async fn list_requisitions(
        &self,
        tenant_id: Uuid,
        kind: Option<RequisitionKind>,
    ) -> Result<Vec<requisition::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        let mut query = requisition::Entity::find()
            .filter(requisition::Column::TenantId.eq(tenant_id))
            .filter(requisition::Column::DeletedAt.is_null());
        if let Some(kind) = kind {
            query = query.filter(requisition::Column::Kind.eq(kind.as_str()));
        }
        query
            .order_by_desc(requisition::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!("Failed to send event: {}", e);
            }
        }
    }
}

async fn find_requisition<C: ConnectionTrait>(
    conn: &C,
    requisition_id: Uuid,
    tenant_id: Uuid,
) -> Result<requisition::Model, ServiceError> {
    requisition::Entity::find()
        .filter(requisition::Column::Id.eq(requisition_id))
        .filter(requisition::Column::TenantId.eq(tenant_id))
        .filter(requisition::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Requisition {} not found", requisition_id)))
}

fn parse_kind(req: &requisition::Model) -> Result<RequisitionKind, ServiceError> {
    RequisitionKind::from_str(&req.kind).ok_or_else(|| {
        ServiceError::InternalError(format!("Unknown requisition kind {:?}", req.kind))
    })
}

fn validate_lines(lines: &[RequisitionLineRequest]) -> Result<(), ServiceError> {
    for line in lines {
        if line.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Line quantity must be positive, got {}",
                line.quantity
            )));
        }
    }
    Ok(())
}

fn movement_event(movement: &stock_movement::Model) -> Event {
    Event::StockMovementApplied {
        product_id: movement.product_id,
        tenant_id: movement.tenant_id,
        direction: movement.direction.clone(),
        quantity: movement.quantity,
        previous_quantity: movement.previous_quantity,
        new_quantity: movement.new_quantity,
        clamped: movement.clamped,
    }
}

async fn insert_requisition(
    txn: &DatabaseTransaction,
    request: CreateRequisitionRequest,
    tenant_id: Uuid,
    actor_id: Uuid,
) -> Result<(requisition::Model, Vec<stock_movement::Model>), ServiceError> {
    // Strict availability check before any write: the whole slip fails on
    // the first shortage
    let mut resolved: Vec<(RequisitionLineRequest, product::Model)> =
        Vec::with_capacity(request.lines.len());
    for line in &request.lines {
        let found = product::Entity::find()
            .filter(product::Column::Id.eq(line.product_id))
            .filter(product::Column::TenantId.eq(tenant_id))
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", line.product_id))
            })?;
        if request.kind == RequisitionKind::InventoryOut && found.stock_quantity < line.quantity {
            return Err(ServiceError::InsufficientStock {
                product_name: found.name,
                available: found.stock_quantity,
                requested: line.quantity,
            });
        }
        resolved.push((line.clone(), found));
    }

    let now = Utc::now();
    let created = requisition::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        code: Set(request.code.clone()),
        kind: Set(request.kind.as_str().to_string()),
        status: Set("confirmed".to_string()),
        notes: Set(request.notes.clone()),
        created_by: Set(Some(actor_id)),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await
    .map_err(ServiceError::db_error)?;

    let direction = match request.kind {
        RequisitionKind::InventoryIn => Some(MovementDirection::In),
        RequisitionKind::InventoryOut => Some(MovementDirection::Out),
        RequisitionKind::Financial => None,
    };

    let mut movements = Vec::new();
    for (line, _product) in &resolved {
        requisition_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            requisition_id: Set(created.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        if let Some(direction) = direction {
            let (_, movement) = stock_ledger::apply_movement(
                txn,
                MovementRequest {
                    tenant_id,
                    product_id: line.product_id,
                    reference_id: created.id,
                    reference_type: MovementSource::Requisition,
                    direction,
                    quantity: line.quantity,
                    unit_cost: None,
                    reversal: false,
                    actor_id,
                },
            )
            .await?;
            movements.push(movement);
        }
    }

    Ok((created, movements))
}
