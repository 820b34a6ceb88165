//! Per-tenant code sequencer.
//!
//! Human-readable codes come from named counters in `sequence_counters`,
//! bumped with an atomic in-database increment. Under concurrency two
//! callers can never observe the same value; the transaction that loses a
//! first-use insert race simply retries the increment.

use crate::entities::sequence_counter;
use crate::errors::ServiceError;
use chrono::{DateTime, Datelike, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::debug;
use uuid::Uuid;

/// Bound on retries when generating a code that must also clear a
/// uniqueness check (manually assigned codes can occupy generated values).
pub const MAX_CODE_ATTEMPTS: u32 = 3;

/// Returns the next value of the named counter, creating it on first use.
pub async fn next_value<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    scope: &str,
) -> Result<i64, ServiceError> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let updated = sequence_counter::Entity::update_many()
            .col_expr(
                sequence_counter::Column::LastValue,
                Expr::col(sequence_counter::Column::LastValue).add(1),
            )
            .filter(sequence_counter::Column::TenantId.eq(tenant_id))
            .filter(sequence_counter::Column::Scope.eq(scope))
            .exec(conn)
            .await
            .map_err(ServiceError::db_error)?;

        if updated.rows_affected > 0 {
            let counter = sequence_counter::Entity::find()
                .filter(sequence_counter::Column::TenantId.eq(tenant_id))
                .filter(sequence_counter::Column::Scope.eq(scope))
                .one(conn)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "Sequence counter {} vanished after increment",
                        scope
                    ))
                })?;
            return Ok(counter.last_value);
        }

        // First use of this scope
        let insert = sequence_counter::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            scope: Set(scope.to_string()),
            last_value: Set(1),
        }
        .insert(conn)
        .await;

        match insert {
            Ok(counter) => {
                debug!(%tenant_id, scope, "sequence counter created");
                return Ok(counter.last_value);
            }
            // Lost the insert race; the counter now exists, increment it
            Err(err) if ServiceError::is_unique_violation(&err) => continue,
            Err(err) => return Err(ServiceError::DatabaseError(err)),
        }
    }

    Err(ServiceError::InternalError(format!(
        "Could not advance sequence counter {} after {} attempts",
        scope, MAX_CODE_ATTEMPTS
    )))
}

/// Next code in a scope, formatted as `prefix` plus the zero-padded value.
pub async fn next_code<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    scope: &str,
    prefix: &str,
    width: usize,
) -> Result<String, ServiceError> {
    let value = next_value(conn, tenant_id, scope).await?;
    Ok(format_code(prefix, value, width))
}

pub fn format_code(prefix: &str, value: i64, width: usize) -> String {
    format!("{}{:0width$}", prefix, value, width = width)
}

/// Counter scope for contact codes, one sequence per business module.
pub fn contact_scope(module: &str) -> String {
    format!("contact:{}", module)
}

/// Counter scope for journal codes, one sequence per calendar month.
pub fn journal_scope(date: DateTime<Utc>) -> String {
    format!("journal:{:02}-{:02}", date.year() % 100, date.month())
}

/// Prefix for journal codes in the scope's month, e.g. `25-08-`.
pub fn journal_prefix(date: DateTime<Utc>) -> String {
    format!("{:02}-{:02}-", date.year() % 100, date.month())
}
