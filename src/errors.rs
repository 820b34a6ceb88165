use rust_decimal::Decimal;
use sea_orm::error::DbErr;
use sea_orm::TransactionError;
use uuid::Uuid;

/// Error type shared by every service in the crate.
///
/// Any failure raised inside a database transaction aborts the whole
/// transaction; no partial stock, balance, or document state survives.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Pre-commit availability check for inventory-out requisitions.
    #[error("Insufficient stock for product {product_name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_name: String,
        available: Decimal,
        requested: Decimal,
    },

    /// A human-readable code/number already exists for the tenant.
    #[error("Duplicate code: {0}")]
    DuplicateCode(String),

    /// Wrong document kind for an operation, e.g. invoice conversion on a
    /// non-quotation.
    #[error("Invalid document type: {0}")]
    InvalidDocumentType(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Optimistic version check on a contended row lost the race.
    #[error("Concurrent modification of {0}")]
    ConcurrentModification(Uuid),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Helper to convert database errors consistently.
    pub fn db_error(err: DbErr) -> Self {
        ServiceError::DatabaseError(err)
    }

    /// Whether the underlying database error is a unique-constraint
    /// violation. Used to translate insert races into `DuplicateCode`.
    pub fn is_unique_violation(err: &DbErr) -> bool {
        let msg = err.to_string().to_lowercase();
        msg.contains("unique") || msg.contains("duplicate key")
    }
}

/// Unwrap the nested error produced by `TransactionTrait::transaction`.
impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        }
    }
}
