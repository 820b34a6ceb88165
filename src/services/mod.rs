//! Service layer: the crate's public operation surface.
//!
//! `stock_ledger`, `totals`, and `sequencer` are building blocks that run
//! inside a caller-owned transaction; the three services own their
//! transactions and emit events after commit.

pub mod documents;
pub mod financial_ledger;
pub mod requisitions;
pub mod sequencer;
pub mod stock_ledger;
pub mod totals;

pub use documents::DocumentService;
pub use financial_ledger::FinancialLedgerService;
pub use requisitions::RequisitionService;
