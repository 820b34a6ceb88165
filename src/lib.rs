//! Stockbooks core: the stock & ledger consistency engine behind a
//! multi-tenant business-management backend.
//!
//! The crate keeps three interdependent numeric states correct under
//! concurrent, partially-failing mutations:
//!
//! 1. per-product inventory quantity and weighted-average cost (WAC),
//! 2. per-document computed totals and payment state,
//! 3. per-account running balances driven by financial records.
//!
//! Every multi-entity mutation runs inside one database transaction: the
//! document or requisition is persisted first, then per-line stock or
//! balance mutations are applied through the ledgers, then the append-only
//! audit records, all or nothing. The surrounding CRUD layer (HTTP
//! controllers, auth, attachments, reporting) is an external collaborator
//! and is not part of this crate.

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod migrator;
pub mod services;

pub use config::{load_config, AppConfig};
pub use db::DbPool;
pub use errors::ServiceError;
pub use events::{Event, EventSender};
