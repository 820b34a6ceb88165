use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of financial transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinancialRecordKind {
    /// +amount to one account
    Receipt,
    /// -amount from one account
    Disbursement,
    /// -amount from source, +amount to destination
    Transfer,
}

impl FinancialRecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialRecordKind::Receipt => "receipt",
            FinancialRecordKind::Disbursement => "disbursement",
            FinancialRecordKind::Transfer => "transfer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "receipt" => Some(FinancialRecordKind::Receipt),
            "disbursement" => Some(FinancialRecordKind::Disbursement),
            "transfer" => Some(FinancialRecordKind::Transfer),
            _ => None,
        }
    }
}

/// Which table an account reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Safe,
    Bank,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Safe => "safe",
            AccountKind::Bank => "bank_account",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "safe" => Some(AccountKind::Safe),
            "bank_account" => Some(AccountKind::Bank),
            _ => None,
        }
    }
}

/// Tagged reference to a financial account (safe or bank account),
/// resolved through the ledger's dispatch instead of runtime type-string
/// lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub kind: AccountKind,
    pub id: Uuid,
}

impl AccountRef {
    pub fn safe(id: Uuid) -> Self {
        Self {
            kind: AccountKind::Safe,
            id,
        }
    }

    pub fn bank(id: Uuid) -> Self {
        Self {
            kind: AccountKind::Bank,
            id,
        }
    }
}

/// Financial transaction record (receipt, disbursement, transfer), one
/// table for all three kinds so the per-tenant code uniqueness check is a
/// single query.
///
/// Receipts and disbursements fill `account_*`; transfers fill
/// `from_account_*` and `to_account_*`. Each committed record corresponds
/// to exactly one balance adjustment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// See [`FinancialRecordKind`]
    pub kind: String,
    /// Unique per tenant across all three kinds
    pub code: String,
    pub amount: Decimal,
    pub record_date: DateTime<Utc>,
    pub description: Option<String>,
    pub account_kind: Option<String>,
    pub account_id: Option<Uuid>,
    pub from_account_kind: Option<String>,
    pub from_account_id: Option<Uuid>,
    pub to_account_kind: Option<String>,
    pub to_account_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub last_modified_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn kind(&self) -> Option<FinancialRecordKind> {
        FinancialRecordKind::from_str(&self.kind)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Account reference for receipts and disbursements.
    pub fn account_ref(&self) -> Option<AccountRef> {
        let kind = AccountKind::from_str(self.account_kind.as_deref()?)?;
        Some(AccountRef {
            kind,
            id: self.account_id?,
        })
    }

    /// Source account for transfers.
    pub fn from_account_ref(&self) -> Option<AccountRef> {
        let kind = AccountKind::from_str(self.from_account_kind.as_deref()?)?;
        Some(AccountRef {
            kind,
            id: self.from_account_id?,
        })
    }

    /// Destination account for transfers.
    pub fn to_account_ref(&self) -> Option<AccountRef> {
        let kind = AccountKind::from_str(self.to_account_kind.as_deref()?)?;
        Some(AccountRef {
            kind,
            id: self.to_account_id?,
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
