//! Database entities (SeaORM models).
//!
//! All entities are tenant-scoped: every table carries a `tenant_id` and
//! every query filters on it. Nothing is shared across tenants.

pub mod bank_account;
pub mod document;
pub mod document_line;
pub mod financial_record;
pub mod product;
pub mod requisition;
pub mod requisition_line;
pub mod safe;
pub mod sequence_counter;
pub mod stock_movement;

pub use financial_record::{AccountKind, AccountRef, FinancialRecordKind};
pub use product::ProductKind;
pub use stock_movement::{MovementDirection, MovementSource};
