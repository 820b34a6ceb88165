//! Financial account ledger: receipts, disbursements, and transfers
//! against safes and bank accounts.
//!
//! A record and its balance impact always land in the same transaction.
//! Balances are signed and have no floor. Codes are unique per tenant
//! across all three record kinds; missing codes are generated from the
//! monthly journal sequence.

use crate::{
    db::DbPool,
    entities::{
        bank_account,
        financial_record::{self, AccountKind, AccountRef, FinancialRecordKind},
        safe,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::sequencer,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct PostRecordRequest {
    pub kind: FinancialRecordKind,
    /// Generated from the journal sequence when absent
    pub code: Option<String>,
    pub amount: Decimal,
    pub record_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    /// Receipt/disbursement account
    pub account: Option<AccountRef>,
    /// Transfer source
    pub from_account: Option<AccountRef>,
    /// Transfer destination
    pub to_account: Option<AccountRef>,
}

/// Partial update; the record kind is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecordRequest {
    pub amount: Option<Decimal>,
    pub record_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub account: Option<AccountRef>,
    pub from_account: Option<AccountRef>,
    pub to_account: Option<AccountRef>,
}

pub struct FinancialLedgerService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl FinancialLedgerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(kind = request.kind.as_str()))]
    pub async fn post_record(
        &self,
        request: PostRecordRequest,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<financial_record::Model, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Amount must be positive, got {}",
                request.amount
            )));
        }
        let db = self.db_pool.as_ref();
        let posted = db
            .transaction::<_, financial_record::Model, ServiceError>(|txn| {
                Box::pin(async move { insert_record(txn, request, tenant_id, actor_id).await })
            })
            .await?;

        info!(record_id = %posted.id, kind = %posted.kind, code = %posted.code, "financial record posted");

        self.emit(Event::FinancialRecordPosted {
            record_id: posted.id,
            tenant_id,
            kind: posted.kind.clone(),
            amount: posted.amount,
        })
        .await;

        Ok(posted)
    }

    /// Replaces a record's amount, date, or accounts: the old balance
    /// impact is reversed and the new one applied in the same transaction.
    #[instrument(skip(self, request))]
    pub async fn update_record(
        &self,
        record_id: Uuid,
        request: UpdateRecordRequest,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<financial_record::Model, ServiceError> {
        if request.amount.is_some_and(|a| a <= Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let updated = db
            .transaction::<_, financial_record::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let record = find_record(txn, record_id, tenant_id).await?;
                    let kind = parse_kind(&record)?;

                    let account = request.account.or_else(|| record.account_ref());
                    let from_account = request.from_account.or_else(|| record.from_account_ref());
                    let to_account = request.to_account.or_else(|| record.to_account_ref());
                    let accounts = validate_accounts(kind, account, from_account, to_account)?;

                    for (target, delta) in impact(kind, &record)? {
                        adjust_balance(txn, tenant_id, target, -delta).await?;
                    }

                    let amount = request.amount.unwrap_or(record.amount);
                    let mut active: financial_record::ActiveModel = record.into();
                    active.amount = Set(amount);
                    if let Some(record_date) = request.record_date {
                        active.record_date = Set(record_date);
                    }
                    if let Some(description) = request.description {
                        active.description = Set(Some(description));
                    }
                    set_accounts(&mut active, &accounts);
                    active.last_modified_by = Set(Some(actor_id));
                    active.updated_at = Set(Utc::now());
                    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

                    for (target, delta) in impact(kind, &updated)? {
                        adjust_balance(txn, tenant_id, target, delta).await?;
                    }

                    Ok(updated)
                })
            })
            .await?;

        info!(record_id = %updated.id, "financial record updated");
        Ok(updated)
    }

    /// Reverses the record's balance impact and soft-deletes it.
    #[instrument(skip(self))]
    pub async fn delete_record(
        &self,
        record_id: Uuid,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<financial_record::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let deleted = db
            .transaction::<_, financial_record::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let record = find_record(txn, record_id, tenant_id).await?;
                    let kind = parse_kind(&record)?;

                    for (target, delta) in impact(kind, &record)? {
                        adjust_balance(txn, tenant_id, target, -delta).await?;
                    }

                    let now = Utc::now();
                    let mut active: financial_record::ActiveModel = record.into();
                    active.deleted_at = Set(Some(now));
                    active.deleted_by = Set(Some(actor_id));
                    active.updated_at = Set(now);
                    active.update(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await?;

        info!(record_id = %deleted.id, "financial record deleted");

        self.emit(Event::FinancialRecordReversed {
            record_id: deleted.id,
            tenant_id,
        })
        .await;

        Ok(deleted)
    }

    pub async fn get_record(
        &self,
        record_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<financial_record::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        find_record(db, record_id, tenant_id).await
    }

    pub async fn list_records(
        &self,
        tenant_id: Uuid,
        kind: Option<FinancialRecordKind>,
    ) -> Result<Vec<financial_record::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        let mut query = financial_record::Entity::find()
            .filter(financial_record::Column::TenantId.eq(tenant_id))
            .filter(financial_record::Column::DeletedAt.is_null());
        if let Some(kind) = kind {
            query = query.filter(financial_record::Column::Kind.eq(kind.as_str()));
        }
        query
            .order_by_desc(financial_record::Column::RecordDate)
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

async fn find_record<C: ConnectionTrait>(
    conn: &C,
    record_id: Uuid,
    tenant_id: Uuid,
) -> Result<financial_record::Model, ServiceError> {
    financial_record::Entity::find()
        .filter(financial_record::Column::Id.eq(record_id))
        .filter(financial_record::Column::TenantId.eq(tenant_id))
        .filter(financial_record::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Financial record {} not found", record_id)))
}

fn parse_kind(record: &financial_record::Model) -> Result<FinancialRecordKind, ServiceError> {
    FinancialRecordKind::from_str(&record.kind).ok_or_else(|| {
        ServiceError::InternalError(format!("Unknown record kind {:?}", record.kind))
    })
}

/// Account references of a record after validation against its kind.
#[derive(Debug, Clone, Copy)]
enum ResolvedAccounts {
    /// Receipt or disbursement target
    Single(AccountRef),
    /// Transfer source and destination
    Pair(AccountRef, AccountRef),
}

fn validate_accounts(
    kind: FinancialRecordKind,
    account: Option<AccountRef>,
    from_account: Option<AccountRef>,
    to_account: Option<AccountRef>,
) -> Result<ResolvedAccounts, ServiceError> {
    match kind {
        FinancialRecordKind::Receipt | FinancialRecordKind::Disbursement => account
            .map(ResolvedAccounts::Single)
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("A {} requires an account", kind.as_str()))
            }),
        FinancialRecordKind::Transfer => {
            let (from, to) = match (from_account, to_account) {
                (Some(from), Some(to)) => (from, to),
                _ => {
                    return Err(ServiceError::ValidationError(
                        "A transfer requires a source and a destination account".to_string(),
                    ))
                }
            };
            if from == to {
                return Err(ServiceError::ValidationError(
                    "A transfer cannot use the same account on both sides".to_string(),
                ));
            }
            Ok(ResolvedAccounts::Pair(from, to))
        }
    }
}

/// The balance deltas a record applies when posted. Reversal negates them.
fn impact(
    kind: FinancialRecordKind,
    record: &financial_record::Model,
) -> Result<Vec<(AccountRef, Decimal)>, ServiceError> {
    let missing =
        || ServiceError::InternalError(format!("Record {} is missing its account", record.id));
    Ok(match kind {
        FinancialRecordKind::Receipt => {
            vec![(record.account_ref().ok_or_else(missing)?, record.amount)]
        }
        FinancialRecordKind::Disbursement => {
            vec![(record.account_ref().ok_or_else(missing)?, -record.amount)]
        }
        FinancialRecordKind::Transfer => vec![
            (record.from_account_ref().ok_or_else(missing)?, -record.amount),
            (record.to_account_ref().ok_or_else(missing)?, record.amount),
        ],
    })
}

/// Adds `delta` to the referenced account's balance. Dispatches on the
/// account kind; zero rows affected means the account does not exist for
/// this tenant.
async fn adjust_balance<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    account: AccountRef,
    delta: Decimal,
) -> Result<(), ServiceError> {
    let now = Utc::now();
    let rows_affected = match account.kind {
        AccountKind::Safe => {
            safe::Entity::update_many()
                .col_expr(
                    safe::Column::Balance,
                    Expr::col(safe::Column::Balance).add(delta),
                )
                .col_expr(safe::Column::UpdatedAt, Expr::value(now))
                .filter(safe::Column::Id.eq(account.id))
                .filter(safe::Column::TenantId.eq(tenant_id))
                .exec(conn)
                .await
                .map_err(ServiceError::db_error)?
                .rows_affected
        }
        AccountKind::Bank => {
            bank_account::Entity::update_many()
                .col_expr(
                    bank_account::Column::Balance,
                    Expr::col(bank_account::Column::Balance).add(delta),
                )
                .col_expr(bank_account::Column::UpdatedAt, Expr::value(now))
                .filter(bank_account::Column::Id.eq(account.id))
                .filter(bank_account::Column::TenantId.eq(tenant_id))
                .exec(conn)
                .await
                .map_err(ServiceError::db_error)?
                .rows_affected
        }
    };

    if rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "{} account {} not found",
            match account.kind {
                AccountKind::Safe => "Safe",
                AccountKind::Bank => "Bank",
            },
            account.id
        )));
    }
    Ok(())
}

fn set_accounts(active: &mut financial_record::ActiveModel, accounts: &ResolvedAccounts) {
    match accounts {
        ResolvedAccounts::Single(account) => {
            active.account_kind = Set(Some(account.kind.as_str().to_string()));
            active.account_id = Set(Some(account.id));
            active.from_account_kind = Set(None);
            active.from_account_id = Set(None);
            active.to_account_kind = Set(None);
            active.to_account_id = Set(None);
        }
        ResolvedAccounts::Pair(from, to) => {
            active.account_kind = Set(None);
            active.account_id = Set(None);
            active.from_account_kind = Set(Some(from.kind.as_str().to_string()));
            active.from_account_id = Set(Some(from.id));
            active.to_account_kind = Set(Some(to.kind.as_str().to_string()));
            active.to_account_id = Set(Some(to.id));
        }
    }
}

async fn insert_record(
    txn: &DatabaseTransaction,
    request: PostRecordRequest,
    tenant_id: Uuid,
    actor_id: Uuid,
) -> Result<financial_record::Model, ServiceError> {
    let accounts = validate_accounts(
        request.kind,
        request.account,
        request.from_account,
        request.to_account,
    )?;
    let record_date = request.record_date.unwrap_or_else(Utc::now);

    let code = match request.code {
        Some(code) => {
            // One table for all kinds, so one query covers receipts,
            // disbursements, and transfers
            let taken = financial_record::Entity::find()
                .filter(financial_record::Column::TenantId.eq(tenant_id))
                .filter(financial_record::Column::Code.eq(&code))
                .one(txn)
                .await
                .map_err(ServiceError::db_error)?
                .is_some();
            if taken {
                return Err(ServiceError::DuplicateCode(code));
            }
            code
        }
        None => generate_code(txn, tenant_id, record_date).await?,
    };

    let now = Utc::now();
    let mut active = financial_record::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        kind: Set(request.kind.as_str().to_string()),
        code: Set(code.clone()),
        amount: Set(request.amount),
        record_date: Set(record_date),
        description: Set(request.description.clone()),
        account_kind: Set(None),
        account_id: Set(None),
        from_account_kind: Set(None),
        from_account_id: Set(None),
        to_account_kind: Set(None),
        to_account_id: Set(None),
        created_by: Set(Some(actor_id)),
        last_modified_by: Set(Some(actor_id)),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    set_accounts(&mut active, &accounts);

    let record = active.insert(txn).await.map_err(|e| {
        if ServiceError::is_unique_violation(&e) {
            ServiceError::DuplicateCode(code.clone())
        } else {
            ServiceError::DatabaseError(e)
        }
    })?;

    for (target, delta) in impact(request.kind, &record)? {
        adjust_balance(txn, tenant_id, target, delta).await?;
    }

    Ok(record)
}

/// Generates the next free journal code for the record's month. Manually
/// assigned codes can occupy generated values, so a few sequence steps may
/// be needed.
async fn generate_code(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    record_date: DateTime<Utc>,
) -> Result<String, ServiceError> {
    let scope = sequencer::journal_scope(record_date);
    let prefix = sequencer::journal_prefix(record_date);
    for _ in 0..sequencer::MAX_CODE_ATTEMPTS {
        let code = sequencer::next_code(txn, tenant_id, &scope, &prefix, 6).await?;
        let taken = financial_record::Entity::find()
            .filter(financial_record::Column::TenantId.eq(tenant_id))
            .filter(financial_record::Column::Code.eq(&code))
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .is_some();
        if !taken {
            return Ok(code);
        }
    }
    Err(ServiceError::InternalError(format!(
        "Could not find a free journal code in {} after {} attempts",
        scope,
        sequencer::MAX_CODE_ATTEMPTS
    )))
}
