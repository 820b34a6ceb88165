use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Sends domain events to interested consumers (notification workers,
/// projections). Events are emitted after the owning transaction commits;
/// a failed send is logged by the caller and never rolls anything back.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Events emitted by the core after a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    DocumentCreated {
        document_id: Uuid,
        tenant_id: Uuid,
        module: String,
        document_type: String,
    },
    DocumentUpdated {
        document_id: Uuid,
        tenant_id: Uuid,
    },
    DocumentDeleted {
        document_id: Uuid,
        tenant_id: Uuid,
    },

    StockMovementApplied {
        product_id: Uuid,
        tenant_id: Uuid,
        direction: String,
        quantity: Decimal,
        previous_quantity: Decimal,
        new_quantity: Decimal,
        clamped: bool,
    },

    RequisitionCreated {
        requisition_id: Uuid,
        tenant_id: Uuid,
        kind: String,
    },
    RequisitionDeleted {
        requisition_id: Uuid,
        tenant_id: Uuid,
    },

    FinancialRecordPosted {
        record_id: Uuid,
        tenant_id: Uuid,
        kind: String,
        amount: Decimal,
    },
    FinancialRecordReversed {
        record_id: Uuid,
        tenant_id: Uuid,
    },
}
