//! Stock ledger: the single write path for product quantity and
//! weighted-average cost.
//!
//! Every quantity change goes through [`apply_movement`], which updates the
//! product row and appends one immutable [`stock_movement`] record in the
//! caller's transaction. Nothing else in the crate writes `stock_quantity`
//! or `average_cost`.

use crate::entities::{
    product,
    stock_movement::{self, MovementDirection, MovementSource},
};
use crate::errors::ServiceError;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{debug, warn};
use uuid::Uuid;

/// One requested stock change against a single product.
#[derive(Debug, Clone)]
pub struct MovementRequest {
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    /// Document or requisition that caused the movement
    pub reference_id: Uuid,
    pub reference_type: MovementSource,
    pub direction: MovementDirection,
    pub quantity: Decimal,
    /// Unit cost for `in` movements. Defaults to the product's purchase
    /// price, or to its current average cost for reversals.
    pub unit_cost: Option<Decimal>,
    /// Marks a compensating entry appended by a delete path
    pub reversal: bool,
    pub actor_id: Uuid,
}

/// Applies one stock movement inside the caller's transaction.
///
/// Inbound movements fold the incoming units into the weighted-average
/// cost. Outbound movements never take the quantity below zero; an
/// oversized request is clamped and the movement record carries
/// `clamped = true` with the requested quantity intact.
///
/// The product row is updated with an optimistic version check; losing the
/// race yields [`ServiceError::ConcurrentModification`] and aborts the
/// caller's transaction.
pub async fn apply_movement<C: ConnectionTrait>(
    conn: &C,
    request: MovementRequest,
) -> Result<(product::Model, stock_movement::Model), ServiceError> {
    if request.quantity <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "Movement quantity must be positive, got {}",
            request.quantity
        )));
    }

    let product = product::Entity::find()
        .filter(product::Column::Id.eq(request.product_id))
        .filter(product::Column::TenantId.eq(request.tenant_id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Product {} not found", request.product_id))
        })?;

    if !product.is_tracked() {
        return Err(ServiceError::ValidationError(format!(
            "Product {} is a service and has no stock",
            product.name
        )));
    }

    let previous_quantity = product.stock_quantity;
    let (new_quantity, new_average_cost, clamped) = match request.direction {
        MovementDirection::In => {
            let unit_cost = request.unit_cost.unwrap_or(if request.reversal {
                product.average_cost
            } else {
                product.purchase_price
            });
            let new_quantity = previous_quantity + request.quantity;
            let new_average_cost = (previous_quantity * product.average_cost
                + request.quantity * unit_cost)
                / new_quantity;
            (new_quantity, new_average_cost, false)
        }
        MovementDirection::Out => {
            let clamped = request.quantity > previous_quantity;
            if clamped {
                warn!(
                    product_id = %product.id,
                    available = %previous_quantity,
                    requested = %request.quantity,
                    "stock-out clamped at zero"
                );
            }
            let new_quantity = if clamped {
                Decimal::ZERO
            } else {
                previous_quantity - request.quantity
            };
            (new_quantity, product.average_cost, clamped)
        }
    };

    let now = Utc::now();

    let updated = product::Entity::update_many()
        .col_expr(product::Column::StockQuantity, Expr::value(new_quantity))
        .col_expr(product::Column::AverageCost, Expr::value(new_average_cost))
        .col_expr(
            product::Column::Version,
            Expr::col(product::Column::Version).add(1),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(now))
        .filter(product::Column::Id.eq(product.id))
        .filter(product::Column::Version.eq(product.version))
        .exec(conn)
        .await
        .map_err(ServiceError::db_error)?;

    if updated.rows_affected == 0 {
        return Err(ServiceError::ConcurrentModification(product.id));
    }

    let movement = stock_movement::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(request.tenant_id),
        product_id: Set(product.id),
        reference_id: Set(request.reference_id),
        reference_type: Set(request.reference_type.as_str().to_string()),
        direction: Set(request.direction.as_str().to_string()),
        quantity: Set(request.quantity),
        previous_quantity: Set(previous_quantity),
        new_quantity: Set(new_quantity),
        clamped: Set(clamped),
        reversal: Set(request.reversal),
        created_by: Set(request.actor_id),
        created_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(ServiceError::db_error)?;

    debug!(
        product_id = %product.id,
        direction = %movement.direction,
        quantity = %movement.quantity,
        previous = %previous_quantity,
        new = %new_quantity,
        "stock movement applied"
    );

    let product = product::Model {
        stock_quantity: new_quantity,
        average_cost: new_average_cost,
        version: product.version + 1,
        updated_at: now,
        ..product
    };

    Ok((product, movement))
}

/// Movement trail for one product, newest first.
pub async fn list_movements<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    product_id: Uuid,
) -> Result<Vec<stock_movement::Model>, ServiceError> {
    stock_movement::Entity::find()
        .filter(stock_movement::Column::TenantId.eq(tenant_id))
        .filter(stock_movement::Column::ProductId.eq(product_id))
        .order_by_desc(stock_movement::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)
}

/// Appends compensating movements for everything a document or requisition
/// did to stock.
///
/// Looks up the original movement records for `reference_id`, skips
/// reversals already present, and applies the opposite direction for the
/// quantity that actually landed (`previous - new`, which differs from the
/// requested quantity when an outbound movement was clamped). Original
/// records are never touched.
pub async fn reverse_movements_for<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    reference_id: Uuid,
    actor_id: Uuid,
) -> Result<Vec<stock_movement::Model>, ServiceError> {
    let originals = stock_movement::Entity::find()
        .filter(stock_movement::Column::TenantId.eq(tenant_id))
        .filter(stock_movement::Column::ReferenceId.eq(reference_id))
        .filter(stock_movement::Column::Reversal.eq(false))
        .order_by_asc(stock_movement::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    let mut reversals = Vec::with_capacity(originals.len());
    for original in originals {
        let direction = MovementDirection::from_str(&original.direction).ok_or_else(|| {
            ServiceError::InternalError(format!(
                "Unknown movement direction {:?}",
                original.direction
            ))
        })?;
        let source = MovementSource::from_str(&original.reference_type).ok_or_else(|| {
            ServiceError::InternalError(format!(
                "Unknown movement source {:?}",
                original.reference_type
            ))
        })?;

        // Effective quantity, not the requested one
        let applied = (original.previous_quantity - original.new_quantity).abs();
        if applied.is_zero() {
            continue;
        }

        let (_, reversal) = apply_movement(
            conn,
            MovementRequest {
                tenant_id,
                product_id: original.product_id,
                reference_id,
                reference_type: source,
                direction: direction.opposite(),
                quantity: applied,
                unit_cost: None,
                reversal: true,
                actor_id,
            },
        )
        .await?;
        reversals.push(reversal);
    }

    Ok(reversals)
}
