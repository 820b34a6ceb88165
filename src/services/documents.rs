//! Document lifecycle: create, update, soft-delete, and convert sales and
//! purchase documents while keeping stock and totals consistent.
//!
//! Every write runs in one database transaction. Stock is touched only for
//! non-draft invoices and returns, through the stock ledger; deleting such
//! a document appends compensating movements instead of editing history.

use crate::{
    db::DbPool,
    entities::{
        document::{self, DocumentModule, DocumentStatus, DocumentType},
        document_line, product,
        stock_movement::{self, MovementDirection, MovementSource},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        stock_ledger::{self, MovementRequest},
        totals::{self, DocumentTotals, LineInput},
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Stock direction for a non-draft document, or `None` when the document
/// kind never moves stock.
///
/// Purchase invoices bring goods in and purchase returns send them back;
/// sales invoices ship goods out and sales returns take them back.
pub fn stock_direction(
    module: DocumentModule,
    document_type: DocumentType,
) -> Option<MovementDirection> {
    match (module, document_type) {
        (DocumentModule::Purchases, DocumentType::Invoice) => Some(MovementDirection::In),
        (DocumentModule::Purchases, DocumentType::Return) => Some(MovementDirection::Out),
        (DocumentModule::Sales, DocumentType::Invoice) => Some(MovementDirection::Out),
        (DocumentModule::Sales, DocumentType::Return) => Some(MovementDirection::In),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DocumentLineRequest {
    pub product_id: Uuid,
    pub quantity: Decimal,
    /// Defaults to the product's selling price (sales) or purchase price
    /// (purchases)
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub tax_percent: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    #[validate(length(min = 1))]
    pub document_number: String,
    pub module: DocumentModule,
    pub document_type: DocumentType,
    /// Defaults to issued; drafts reserve the number without touching
    /// stock or totals
    pub status: Option<DocumentStatus>,
    pub contact_id: Option<Uuid>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub issue_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub general_discount: Decimal,
    #[serde(default)]
    pub general_discount_percent: Decimal,
    #[serde(default)]
    pub paid_amount: Decimal,
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<DocumentLineRequest>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Partial update. Absent fields keep their current values; `lines`
/// replaces the whole line set when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocumentRequest {
    pub status: Option<DocumentStatus>,
    pub contact_id: Option<Uuid>,
    pub issue_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub general_discount: Option<Decimal>,
    pub general_discount_percent: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub lines: Option<Vec<DocumentLineRequest>>,
}

pub struct DocumentService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl DocumentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(document_number = %request.document_number))]
    pub async fn create_document(
        &self,
        request: CreateDocumentRequest,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<document::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid document: {}", e)))?;
        validate_lines(&request.lines)?;

        let status = request.status.unwrap_or(DocumentStatus::Issued);
        if status != DocumentStatus::Draft
            && request.document_type.affects_stock()
            && request.lines.is_empty()
        {
            return Err(ServiceError::ValidationError(format!(
                "A {} requires at least one line item",
                request.document_type.as_str()
            )));
        }

        let db = self.db_pool.as_ref();
        let (created, movements) = db
            .transaction::<_, (document::Model, Vec<stock_movement::Model>), ServiceError>(
                |txn| {
                    Box::pin(async move {
                        insert_document(txn, request, status, tenant_id, actor_id).await
                    })
                },
            )
            .await?;

        info!(document_id = %created.id, status = %created.status, "document created");

        self.emit(Event::DocumentCreated {
            document_id: created.id,
            tenant_id,
            module: created.module.clone(),
            document_type: created.document_type.clone(),
        })
        .await;
        for movement in &movements {
            self.emit(movement_event(movement)).await;
        }

        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update_document(
        &self,
        document_id: Uuid,
        request: UpdateDocumentRequest,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<document::Model, ServiceError> {
        if let Some(lines) = &request.lines {
            validate_lines(lines)?;
        }

        let db = self.db_pool.as_ref();
        let (updated, movements) = db
            .transaction::<_, (document::Model, Vec<stock_movement::Model>), ServiceError>(
                |txn| {
                    Box::pin(async move {
                        apply_document_update(txn, document_id, request, tenant_id, actor_id).await
                    })
                },
            )
            .await?;

        info!(document_id = %updated.id, status = %updated.status, "document updated");

        self.emit(Event::DocumentUpdated {
            document_id: updated.id,
            tenant_id,
        })
        .await;
        for movement in &movements {
            self.emit(movement_event(movement)).await;
        }

        Ok(updated)
    }

    /// Soft-deletes a document. For non-draft invoices and returns the
    /// stock effect is undone with compensating movement records before
    /// the document is marked deleted, all in one transaction.
    #[instrument(skip(self))]
    pub async fn delete_document(
        &self,
        document_id: Uuid,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<document::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let (deleted, reversals) = db
            .transaction::<_, (document::Model, Vec<stock_movement::Model>), ServiceError>(
                |txn| {
                    Box::pin(async move {
                        let doc = find_document(txn, document_id, tenant_id).await?;
                        let document_type = parse_document_type(&doc)?;

                        let reversals = if !doc.is_draft() && document_type.affects_stock() {
                            stock_ledger::reverse_movements_for(txn, tenant_id, doc.id, actor_id)
                                .await?
                        } else {
                            Vec::new()
                        };

                        let now = Utc::now();
                        let mut active: document::ActiveModel = doc.into();
                        active.deleted_at = Set(Some(now));
                        active.deleted_by = Set(Some(actor_id));
                        active.updated_at = Set(now);
                        let deleted = active.update(txn).await.map_err(ServiceError::db_error)?;

                        Ok((deleted, reversals))
                    })
                },
            )
            .await?;

        info!(document_id = %deleted.id, reversals = reversals.len(), "document deleted");

        self.emit(Event::DocumentDeleted {
            document_id: deleted.id,
            tenant_id,
        })
        .await;
        for movement in &reversals {
            self.emit(movement_event(movement)).await;
        }

        Ok(deleted)
    }

    /// Converts a quotation into an issued invoice with the same lines.
    ///
    /// The invoice is created through the normal path (number uniqueness,
    /// totals, stock for sales invoices) and the quotation transitions to
    /// `converted_to_invoice` pointing at it, in one transaction.
    #[instrument(skip(self))]
    pub async fn convert_to_invoice(
        &self,
        quotation_id: Uuid,
        invoice_number: String,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<document::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let (invoice, movements) = db
            .transaction::<_, (document::Model, Vec<stock_movement::Model>), ServiceError>(
                |txn| {
                    Box::pin(async move {
                        let quotation = find_document(txn, quotation_id, tenant_id).await?;
                        let document_type = parse_document_type(&quotation)?;
                        if document_type != DocumentType::Quotation {
                            return Err(ServiceError::InvalidDocumentType(format!(
                                "Document {} is a {}, only quotations can be converted",
                                quotation.document_number, quotation.document_type
                            )));
                        }
                        if quotation.status == DocumentStatus::ConvertedToInvoice.as_str() {
                            return Err(ServiceError::InvalidOperation(format!(
                                "Quotation {} was already converted",
                                quotation.document_number
                            )));
                        }
                        let module = parse_module(&quotation)?;

                        let lines = document_line::Entity::find()
                            .filter(document_line::Column::DocumentId.eq(quotation.id))
                            .order_by_asc(document_line::Column::LineNumber)
                            .all(txn)
                            .await
                            .map_err(ServiceError::db_error)?;

                        let request = CreateDocumentRequest {
                            document_number: invoice_number,
                            module,
                            document_type: DocumentType::Invoice,
                            status: Some(DocumentStatus::Issued),
                            contact_id: quotation.contact_id,
                            currency: quotation.currency.clone(),
                            issue_date: Some(Utc::now()),
                            due_date: quotation.due_date,
                            general_discount: quotation.general_discount,
                            general_discount_percent: quotation.general_discount_percent,
                            paid_amount: Decimal::ZERO,
                            notes: quotation.notes.clone(),
                            lines: lines
                                .iter()
                                .map(|l| DocumentLineRequest {
                                    product_id: l.product_id,
                                    quantity: l.quantity,
                                    unit_price: Some(l.unit_price),
                                    discount_percent: l.discount_percent,
                                    discount_amount: l.discount_amount,
                                    tax_percent: l.tax_percent,
                                })
                                .collect(),
                        };

                        let (invoice, movements) = insert_document(
                            txn,
                            request,
                            DocumentStatus::Issued,
                            tenant_id,
                            actor_id,
                        )
                        .await?;

                        let now = Utc::now();
                        let mut active: document::ActiveModel = quotation.into();
                        active.status = Set(DocumentStatus::ConvertedToInvoice.as_str().to_string());
                        active.related_document_id = Set(Some(invoice.id));
                        active.last_modified_by = Set(Some(actor_id));
                        active.updated_at = Set(now);
                        active.update(txn).await.map_err(ServiceError::db_error)?;

                        Ok((invoice, movements))
                    })
                },
            )
            .await?;

        info!(quotation_id = %quotation_id, invoice_id = %invoice.id, "quotation converted");

        self.emit(Event::DocumentCreated {
            document_id: invoice.id,
            tenant_id,
            module: invoice.module.clone(),
            document_type: invoice.document_type.clone(),
        })
        .await;
        for movement in &movements {
            self.emit(movement_event(movement)).await;
        }

        Ok(invoice)
    }

    pub async fn get_document(
        &self,
        document_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<(document::Model, Vec<document_line::Model>), ServiceError> {
        let db = self.db_pool.as_ref();
        let doc = find_document(db, document_id, tenant_id).await?;
        let lines = document_line::Entity::find()
            .filter(document_line::Column::DocumentId.eq(doc.id))
            .order_by_asc(document_line::Column::LineNumber)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok((doc, lines))
    }

    pub async fn list_documents(
        &self,
        tenant_id: Uuid,
        module: Option<DocumentModule>,
        document_type: Option<DocumentType>,
    ) -> Result<Vec<document::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        let mut query = document::Entity::find()
            .filter(document::Column::TenantId.eq(tenant_id))
            .filter(document::Column::DeletedAt.is_null());
        if let Some(module) = module {
            query = query.filter(document::Column::Module.eq(module.as_str()));
        }
        if let Some(document_type) = document_type {
            query = query.filter(document::Column::DocumentType.eq(document_type.as_str()));
        }
        query
            .order_by_desc(document::Column::CreatedAt)
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

async fn find_document<C: sea_orm::ConnectionTrait>(
    conn: &C,
    document_id: Uuid,
    tenant_id: Uuid,
) -> Result<document::Model, ServiceError> {
    document::Entity::find()
        .filter(document::Column::Id.eq(document_id))
        .filter(document::Column::TenantId.eq(tenant_id))
        .filter(document::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Document {} not found", document_id)))
}

fn parse_module(doc: &document::Model) -> Result<DocumentModule, ServiceError> {
    DocumentModule::from_str(&doc.module)
        .ok_or_else(|| ServiceError::InternalError(format!("Unknown module {:?}", doc.module)))
}

fn parse_document_type(doc: &document::Model) -> Result<DocumentType, ServiceError> {
    DocumentType::from_str(&doc.document_type).ok_or_else(|| {
        ServiceError::InternalError(format!("Unknown document type {:?}", doc.document_type))
    })
}

fn validate_lines(lines: &[DocumentLineRequest]) -> Result<(), ServiceError> {
    for line in lines {
        if line.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Line quantity must be positive, got {}",
                line.quantity
            )));
        }
        if line.unit_price.is_some_and(|p| p < Decimal::ZERO)
            || line.discount_amount < Decimal::ZERO
        {
            return Err(ServiceError::ValidationError(
                "Line prices and discounts cannot be negative".to_string(),
            ));
        }
        if line.discount_percent < Decimal::ZERO || line.discount_percent > Decimal::ONE_HUNDRED {
            return Err(ServiceError::ValidationError(format!(
                "Line discount percent must be between 0 and 100, got {}",
                line.discount_percent
            )));
        }
        if line.tax_percent < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Line tax percent cannot be negative".to_string(),
            ));
        }
    }
    Ok(())
}

fn movement_event(movement: &stock_movement::Model) -> Event {
    Event::StockMovementApplied {
        product_id: movement.product_id,
        tenant_id: movement.tenant_id,
        direction: movement.direction.clone(),
        quantity: movement.quantity,
        previous_quantity: movement.previous_quantity,
        new_quantity: movement.new_quantity,
        clamped: movement.clamped,
    }
}

fn line_input(line: &document_line::Model) -> LineInput {
    LineInput {
        quantity: line.quantity,
        unit_price: line.unit_price,
        discount_percent: line.discount_percent,
        discount_amount: line.discount_amount,
        tax_percent: line.tax_percent,
    }
}

/// Inserts a document with its lines, computing totals and applying stock
/// for non-draft invoices and returns. Shared by create and conversion.
async fn insert_document(
    txn: &DatabaseTransaction,
    request: CreateDocumentRequest,
    status: DocumentStatus,
    tenant_id: Uuid,
    actor_id: Uuid,
) -> Result<(document::Model, Vec<stock_movement::Model>), ServiceError> {
    let existing = document::Entity::find()
        .filter(document::Column::TenantId.eq(tenant_id))
        .filter(document::Column::DocumentNumber.eq(&request.document_number))
        .one(txn)
        .await
        .map_err(ServiceError::db_error)?;
    if existing.is_some() {
        return Err(ServiceError::DuplicateCode(request.document_number));
    }

    // Resolve products and default prices up front so a bad line aborts
    // before anything is written
    let mut resolved: Vec<(DocumentLineRequest, product::Model, Decimal)> =
        Vec::with_capacity(request.lines.len());
    for line in &request.lines {
        let product = product::Entity::find()
            .filter(product::Column::Id.eq(line.product_id))
            .filter(product::Column::TenantId.eq(tenant_id))
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", line.product_id))
            })?;
        let unit_price = line.unit_price.unwrap_or(match request.module {
            DocumentModule::Sales => product.selling_price,
            DocumentModule::Purchases => product.purchase_price,
        });
        resolved.push((line.clone(), product, unit_price));
    }

    let draft = status == DocumentStatus::Draft;
    let inputs: Vec<LineInput> = resolved
        .iter()
        .map(|(line, _, unit_price)| LineInput {
            quantity: line.quantity,
            unit_price: *unit_price,
            discount_percent: line.discount_percent,
            discount_amount: line.discount_amount,
            tax_percent: line.tax_percent,
        })
        .collect();
    let totals = if draft {
        DocumentTotals::zeroed(inputs.len())
    } else {
        totals::compute(
            &inputs,
            request.general_discount,
            request.general_discount_percent,
        )
    };

    let now = Utc::now();
    let is_invoice = request.document_type == DocumentType::Invoice;
    let status = if is_invoice && !draft && is_payment_status(status) {
        totals::derive_status(totals.total_amount, request.paid_amount, request.due_date, now)
    } else {
        status
    };
    let remaining_amount = if is_invoice && !draft {
        totals.total_amount - request.paid_amount
    } else {
        Decimal::ZERO
    };

    let header = document::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        document_number: Set(request.document_number.clone()),
        module: Set(request.module.as_str().to_string()),
        document_type: Set(request.document_type.as_str().to_string()),
        status: Set(status.as_str().to_string()),
        contact_id: Set(request.contact_id),
        currency: Set(request.currency.clone()),
        issue_date: Set(request.issue_date.unwrap_or(now)),
        due_date: Set(request.due_date),
        general_discount: Set(request.general_discount),
        general_discount_percent: Set(request.general_discount_percent),
        subtotal: Set(totals.subtotal),
        total_discount: Set(totals.total_discount),
        total_tax: Set(totals.total_tax),
        total_amount: Set(totals.total_amount),
        paid_amount: Set(if draft { Decimal::ZERO } else { request.paid_amount }),
        remaining_amount: Set(remaining_amount),
        notes: Set(request.notes.clone()),
        related_document_id: Set(None),
        created_by: Set(Some(actor_id)),
        last_modified_by: Set(Some(actor_id)),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await
    .map_err(|e| {
        if ServiceError::is_unique_violation(&e) {
            ServiceError::DuplicateCode(request.document_number.clone())
        } else {
            ServiceError::DatabaseError(e)
        }
    })?;

    for (index, ((line, product, unit_price), computed)) in
        resolved.iter().zip(&totals.lines).enumerate()
    {
        document_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            document_id: Set(header.id),
            product_id: Set(product.id),
            product_name: Set(product.name.clone()),
            line_number: Set(index as i32 + 1),
            quantity: Set(line.quantity),
            unit_price: Set(*unit_price),
            discount_percent: Set(line.discount_percent),
            // Drafts keep the entered fixed discount so re-computation on
            // issue sees the original input
            discount_amount: Set(if draft {
                line.discount_amount
            } else {
                computed.discount_amount
            }),
            subtotal: Set(computed.subtotal),
            tax_percent: Set(line.tax_percent),
            tax_amount: Set(computed.tax_amount),
            total: Set(computed.total),
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;
    }

    let mut movements = Vec::new();
    if !draft {
        if let Some(direction) = stock_direction(request.module, request.document_type) {
            for (line, product, unit_price) in &resolved {
                if !product.is_tracked() {
                    continue;
                }
                let unit_cost = match (request.module, direction) {
                    // Purchases establish the cost from the document line
                    (DocumentModule::Purchases, MovementDirection::In) => Some(*unit_price),
                    // Sales returns re-enter at the current average cost
                    (DocumentModule::Sales, MovementDirection::In) => Some(product.average_cost),
                    _ => None,
                };
                let (_, movement) = stock_ledger::apply_movement(
                    txn,
                    MovementRequest {
                        tenant_id,
                        product_id: product.id,
                        reference_id: header.id,
                        reference_type: MovementSource::Transaction,
                        direction,
                        quantity: line.quantity,
                        unit_cost,
                        reversal: false,
                        actor_id,
                    },
                )
                .await?;
                movements.push(movement);
            }
        }
    }

    Ok((header, movements))
}

fn is_payment_status(status: DocumentStatus) -> bool {
    matches!(
        status,
        DocumentStatus::Issued
            | DocumentStatus::Paid
            | DocumentStatus::PartiallyPaid
            | DocumentStatus::Overdue
    )
}

async fn apply_document_update(
    txn: &DatabaseTransaction,
    document_id: Uuid,
    request: UpdateDocumentRequest,
    tenant_id: Uuid,
    actor_id: Uuid,
) -> Result<(document::Model, Vec<stock_movement::Model>), ServiceError> {
    let doc = find_document(txn, document_id, tenant_id).await?;
    let module = parse_module(&doc)?;
    let document_type = parse_document_type(&doc)?;
    let was_draft = doc.is_draft();

    let current_status = DocumentStatus::from_str(&doc.status)
        .ok_or_else(|| ServiceError::InternalError(format!("Unknown status {:?}", doc.status)))?;
    let new_status = request.status.unwrap_or(current_status);

    if !was_draft && new_status == DocumentStatus::Draft {
        return Err(ServiceError::ValidationError(format!(
            "Document {} is already issued and cannot return to draft",
            doc.document_number
        )));
    }
    if request.lines.is_some() && !was_draft && document_type.affects_stock() {
        return Err(ServiceError::ValidationError(format!(
            "Line items of issued {} {} are immutable; delete the document and recreate it",
            doc.document_type, doc.document_number
        )));
    }

    let now = Utc::now();

    // Replace the line set when requested (drafts, or kinds with no stock
    // effect)
    if let Some(lines) = &request.lines {
        document_line::Entity::delete_many()
            .filter(document_line::Column::DocumentId.eq(doc.id))
            .exec(txn)
            .await
            .map_err(ServiceError::db_error)?;
        for (index, line) in lines.iter().enumerate() {
            let product = product::Entity::find()
                .filter(product::Column::Id.eq(line.product_id))
                .filter(product::Column::TenantId.eq(tenant_id))
                .one(txn)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", line.product_id))
                })?;
            let unit_price = line.unit_price.unwrap_or(match module {
                DocumentModule::Sales => product.selling_price,
                DocumentModule::Purchases => product.purchase_price,
            });
            document_line::ActiveModel {
                id: Set(Uuid::new_v4()),
                document_id: Set(doc.id),
                product_id: Set(product.id),
                product_name: Set(product.name.clone()),
                line_number: Set(index as i32 + 1),
                quantity: Set(line.quantity),
                unit_price: Set(unit_price),
                discount_percent: Set(line.discount_percent),
                discount_amount: Set(line.discount_amount),
                subtotal: Set(Decimal::ZERO),
                tax_percent: Set(line.tax_percent),
                tax_amount: Set(Decimal::ZERO),
                total: Set(Decimal::ZERO),
            }
            .insert(txn)
            .await
            .map_err(ServiceError::db_error)?;
        }
    }

    let line_models = document_line::Entity::find()
        .filter(document_line::Column::DocumentId.eq(doc.id))
        .order_by_asc(document_line::Column::LineNumber)
        .all(txn)
        .await
        .map_err(ServiceError::db_error)?;

    let draft_after = new_status == DocumentStatus::Draft;
    let leaving_draft = was_draft && !draft_after;

    if leaving_draft && document_type.affects_stock() && line_models.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "A {} requires at least one line item",
            doc.document_type
        )));
    }

    let general_discount = request.general_discount.unwrap_or(doc.general_discount);
    let general_discount_percent = request
        .general_discount_percent
        .unwrap_or(doc.general_discount_percent);

    let inputs: Vec<LineInput> = line_models.iter().map(line_input).collect();
    let totals = if draft_after {
        DocumentTotals::zeroed(inputs.len())
    } else {
        totals::compute(&inputs, general_discount, general_discount_percent)
    };

    if !draft_after {
        for (model, computed) in line_models.iter().zip(&totals.lines) {
            let mut active: document_line::ActiveModel = model.clone().into();
            active.discount_amount = Set(computed.discount_amount);
            active.subtotal = Set(computed.subtotal);
            active.tax_amount = Set(computed.tax_amount);
            active.total = Set(computed.total);
            active.update(txn).await.map_err(ServiceError::db_error)?;
        }
    }

    let due_date = request.due_date.or(doc.due_date);
    let paid_amount = if draft_after {
        Decimal::ZERO
    } else {
        request.paid_amount.unwrap_or(doc.paid_amount)
    };

    let is_invoice = document_type == DocumentType::Invoice;
    let final_status = if is_invoice && !draft_after && is_payment_status(new_status) {
        totals::derive_status(totals.total_amount, paid_amount, due_date, now)
    } else {
        new_status
    };
    let remaining_amount = if is_invoice && !draft_after {
        totals.total_amount - paid_amount
    } else {
        Decimal::ZERO
    };

    // Issuing a draft is the moment its stock effect lands
    let mut movements = Vec::new();
    if leaving_draft {
        if let Some(direction) = stock_direction(module, document_type) {
            for line in &line_models {
                let product = product::Entity::find()
                    .filter(product::Column::Id.eq(line.product_id))
                    .filter(product::Column::TenantId.eq(tenant_id))
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Product {} not found", line.product_id))
                    })?;
                if !product.is_tracked() {
                    continue;
                }
                let unit_cost = match (module, direction) {
                    (DocumentModule::Purchases, MovementDirection::In) => Some(line.unit_price),
                    (DocumentModule::Sales, MovementDirection::In) => Some(product.average_cost),
                    _ => None,
                };
                let (_, movement) = stock_ledger::apply_movement(
                    txn,
                    MovementRequest {
                        tenant_id,
                        product_id: product.id,
                        reference_id: doc.id,
                        reference_type: MovementSource::Transaction,
                        direction,
                        quantity: line.quantity,
                        unit_cost,
                        reversal: false,
                        actor_id,
                    },
                )
                .await?;
                movements.push(movement);
            }
        }
    }

    let mut active: document::ActiveModel = doc.into();
    active.status = Set(final_status.as_str().to_string());
    if let Some(contact_id) = request.contact_id {
        active.contact_id = Set(Some(contact_id));
    }
    if let Some(issue_date) = request.issue_date {
        active.issue_date = Set(issue_date);
    }
    active.due_date = Set(due_date);
    active.general_discount = Set(general_discount);
    active.general_discount_percent = Set(general_discount_percent);
    active.subtotal = Set(totals.subtotal);
    active.total_discount = Set(totals.total_discount);
    active.total_tax = Set(totals.total_tax);
    active.total_amount = Set(totals.total_amount);
    active.paid_amount = Set(paid_amount);
    active.remaining_amount = Set(remaining_amount);
    if let Some(notes) = request.notes {
        active.notes = Set(Some(notes));
    }
    active.last_modified_by = Set(Some(actor_id));
    active.updated_at = Set(now);
    let updated = active.update(txn).await.map_err(ServiceError::db_error)?;

    Ok((updated, movements))
}
