use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Business module a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentModule {
    Sales,
    Purchases,
}

impl DocumentModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentModule::Sales => "sales",
            DocumentModule::Purchases => "purchases",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sales" => Some(DocumentModule::Sales),
            "purchases" => Some(DocumentModule::Purchases),
            _ => None,
        }
    }
}

/// Kind of sales/purchase document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Invoice,
    Return,
    Quotation,
    PurchaseOrder,
    Request,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Return => "return",
            DocumentType::Quotation => "quotation",
            DocumentType::PurchaseOrder => "purchase_order",
            DocumentType::Request => "request",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "invoice" => Some(DocumentType::Invoice),
            "return" => Some(DocumentType::Return),
            "quotation" => Some(DocumentType::Quotation),
            "purchase_order" => Some(DocumentType::PurchaseOrder),
            "request" => Some(DocumentType::Request),
            _ => None,
        }
    }

    /// Only invoices and returns move stock.
    pub fn affects_stock(&self) -> bool {
        matches!(self, DocumentType::Invoice | DocumentType::Return)
    }
}

/// Document lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Draft,
    Issued,
    Paid,
    PartiallyPaid,
    Overdue,
    Cancelled,
    Sent,
    Accepted,
    Rejected,
    Expired,
    ConvertedToInvoice,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Issued => "issued",
            DocumentStatus::Paid => "paid",
            DocumentStatus::PartiallyPaid => "partially_paid",
            DocumentStatus::Overdue => "overdue",
            DocumentStatus::Cancelled => "cancelled",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Accepted => "accepted",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Expired => "expired",
            DocumentStatus::ConvertedToInvoice => "converted_to_invoice",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(DocumentStatus::Draft),
            "issued" => Some(DocumentStatus::Issued),
            "paid" => Some(DocumentStatus::Paid),
            "partially_paid" => Some(DocumentStatus::PartiallyPaid),
            "overdue" => Some(DocumentStatus::Overdue),
            "cancelled" => Some(DocumentStatus::Cancelled),
            "sent" => Some(DocumentStatus::Sent),
            "accepted" => Some(DocumentStatus::Accepted),
            "rejected" => Some(DocumentStatus::Rejected),
            "expired" => Some(DocumentStatus::Expired),
            "converted_to_invoice" => Some(DocumentStatus::ConvertedToInvoice),
            _ => None,
        }
    }
}

/// Sales/purchase document header (invoice, return, quotation, purchase
/// order, request). Line items live in `document_lines`; totals are
/// recomputed by the totals calculator on every save.
///
/// Invariant for non-draft documents:
/// `total_amount = subtotal (after item and general discounts) + total_tax`,
/// and for invoices `remaining_amount = total_amount - paid_amount`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Human-readable number, unique per tenant
    pub document_number: String,
    /// `sales` or `purchases`; see [`DocumentModule`]
    pub module: String,
    /// See [`DocumentType`]
    pub document_type: String,
    /// See [`DocumentStatus`]
    pub status: String,
    /// External collaborator reference (customer or supplier)
    pub contact_id: Option<Uuid>,
    pub currency: String,
    pub issue_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    /// Document-level fixed discount
    pub general_discount: Decimal,
    /// Document-level percent discount; takes precedence when > 0
    pub general_discount_percent: Decimal,
    pub subtotal: Decimal,
    pub total_discount: Decimal,
    pub total_tax: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub notes: Option<String>,
    /// Quotation converted to an invoice points at it
    pub related_document_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub last_modified_by: Option<Uuid>,
    /// Soft delete: deletion is a state transition, not a row removal
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_draft(&self) -> bool {
        self.status == DocumentStatus::Draft.as_str()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::document_line::Entity")]
    DocumentLines,
}

impl Related<super::document_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
