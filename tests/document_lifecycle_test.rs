mod common;

use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use uuid::Uuid;

use stockbooks_api::entities::document::{DocumentModule, DocumentStatus, DocumentType};
use stockbooks_api::entities::{document, product, stock_movement};
use stockbooks_api::errors::ServiceError;
use stockbooks_api::services::documents::{
    CreateDocumentRequest, DocumentLineRequest, DocumentService, UpdateDocumentRequest,
};

fn service(pool: &stockbooks_api::db::DbPool) -> DocumentService {
    DocumentService::new(Arc::new(pool.clone()), None)
}

fn line(product_id: Uuid, quantity: rust_decimal::Decimal) -> DocumentLineRequest {
    DocumentLineRequest {
        product_id,
        quantity,
        unit_price: None,
        discount_percent: dec!(0),
        discount_amount: dec!(0),
        tax_percent: dec!(0),
    }
}

fn request(
    number: &str,
    module: DocumentModule,
    document_type: DocumentType,
    lines: Vec<DocumentLineRequest>,
) -> CreateDocumentRequest {
    CreateDocumentRequest {
        document_number: number.to_string(),
        module,
        document_type,
        status: None,
        contact_id: None,
        currency: "USD".to_string(),
        issue_date: None,
        due_date: None,
        general_discount: dec!(0),
        general_discount_percent: dec!(0),
        paid_amount: dec!(0),
        notes: None,
        lines,
    }
}

async fn reload_product(pool: &stockbooks_api::db::DbPool, id: Uuid) -> product::Model {
    product::Entity::find_by_id(id)
        .one(pool)
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn purchase_then_sale_then_delete_restores_stock() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let widget =
        common::seed_product(&pool, tenant_id, "Widget", dec!(5), dec!(9), dec!(0), dec!(0)).await;

    // Buy 10 @ 5
    let mut purchase_line = line(widget.id, dec!(10));
    purchase_line.unit_price = Some(dec!(5));
    svc.create_document(
        request(
            "PINV-1",
            DocumentModule::Purchases,
            DocumentType::Invoice,
            vec![purchase_line],
        ),
        tenant_id,
        actor_id,
    )
    .await
    .unwrap();

    let p = reload_product(&pool, widget.id).await;
    assert_eq!(p.stock_quantity, dec!(10));
    assert_eq!(p.average_cost, dec!(5));

    // Sell 4
    let sale = svc
        .create_document(
            request(
                "SINV-1",
                DocumentModule::Sales,
                DocumentType::Invoice,
                vec![line(widget.id, dec!(4))],
            ),
            tenant_id,
            actor_id,
        )
        .await
        .unwrap();

    let p = reload_product(&pool, widget.id).await;
    assert_eq!(p.stock_quantity, dec!(6));
    assert_eq!(p.average_cost, dec!(5));

    // Deleting the sales invoice puts the 4 back at the same average
    let deleted = svc
        .delete_document(sale.id, tenant_id, actor_id)
        .await
        .unwrap();
    assert!(deleted.deleted_at.is_some());

    let p = reload_product(&pool, widget.id).await;
    assert_eq!(p.stock_quantity, dec!(10));
    assert_eq!(p.average_cost, dec!(5));

    // The sale's out movement is still there, joined by its reversal
    let movements = stock_movement::Entity::find()
        .filter(stock_movement::Column::ReferenceId.eq(sale.id))
        .all(&pool)
        .await
        .unwrap();
    assert_eq!(movements.len(), 2);
    assert_eq!(movements.iter().filter(|m| m.reversal).count(), 1);

    // Soft-deleted documents disappear from reads
    assert!(matches!(
        svc.get_document(sale.id, tenant_id).await,
        Err(ServiceError::NotFound(_))
    ));
    let listed = svc.list_documents(tenant_id, None, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].document_number, "PINV-1");
}

#[tokio::test]
async fn totals_and_payment_state_on_create() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let widget =
        common::seed_product(&pool, tenant_id, "Widget", dec!(5), dec!(9), dec!(50), dec!(5))
            .await;

    let mut l = line(widget.id, dec!(2));
    l.unit_price = Some(dec!(100));
    l.discount_percent = dec!(10);
    l.tax_percent = dec!(15);
    let mut req = request(
        "SINV-10",
        DocumentModule::Sales,
        DocumentType::Invoice,
        vec![l],
    );
    req.paid_amount = dec!(100);
    req.due_date = Some(chrono::Utc::now() + chrono::Duration::days(14));

    let invoice = svc
        .create_document(req, tenant_id, Uuid::new_v4())
        .await
        .unwrap();

    // 200 gross, 10% line discount, 15% tax on 180
    assert_eq!(invoice.subtotal, dec!(180));
    assert_eq!(invoice.total_discount, dec!(20));
    assert_eq!(invoice.total_tax, dec!(27.00));
    assert_eq!(invoice.total_amount, dec!(207.00));
    assert_eq!(invoice.paid_amount, dec!(100));
    assert_eq!(invoice.remaining_amount, dec!(107.00));
    assert_eq!(invoice.status, DocumentStatus::PartiallyPaid.as_str());
}

#[tokio::test]
async fn fully_paid_invoice_derives_paid_status() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let widget =
        common::seed_product(&pool, tenant_id, "Widget", dec!(5), dec!(10), dec!(50), dec!(5))
            .await;

    let mut req = request(
        "SINV-11",
        DocumentModule::Sales,
        DocumentType::Invoice,
        vec![line(widget.id, dec!(3))],
    );
    req.paid_amount = dec!(30);

    let invoice = svc
        .create_document(req, tenant_id, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(invoice.total_amount, dec!(30));
    assert_eq!(invoice.status, DocumentStatus::Paid.as_str());
    assert_eq!(invoice.remaining_amount, dec!(0));
}

#[tokio::test]
async fn duplicate_document_number_is_rejected() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let widget =
        common::seed_product(&pool, tenant_id, "Widget", dec!(5), dec!(9), dec!(50), dec!(5))
            .await;

    svc.create_document(
        request(
            "SINV-42",
            DocumentModule::Sales,
            DocumentType::Invoice,
            vec![line(widget.id, dec!(1))],
        ),
        tenant_id,
        actor_id,
    )
    .await
    .unwrap();

    let err = svc
        .create_document(
            request(
                "SINV-42",
                DocumentModule::Sales,
                DocumentType::Invoice,
                vec![line(widget.id, dec!(1))],
            ),
            tenant_id,
            actor_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateCode(n) if n == "SINV-42"));

    // Another tenant may reuse the number
    let other_tenant = Uuid::new_v4();
    let other_widget =
        common::seed_product(&pool, other_tenant, "Widget", dec!(5), dec!(9), dec!(50), dec!(5))
            .await;
    svc.create_document(
        request(
            "SINV-42",
            DocumentModule::Sales,
            DocumentType::Invoice,
            vec![line(other_widget.id, dec!(1))],
        ),
        other_tenant,
        actor_id,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn failed_line_rolls_back_the_whole_document() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let widget =
        common::seed_product(&pool, tenant_id, "Widget", dec!(5), dec!(9), dec!(20), dec!(5))
            .await;

    let err = svc
        .create_document(
            request(
                "SINV-90",
                DocumentModule::Sales,
                DocumentType::Invoice,
                vec![line(widget.id, dec!(4)), line(Uuid::new_v4(), dec!(2))],
            ),
            tenant_id,
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    // Nothing persisted: no document, no movements, stock untouched
    let docs = document::Entity::find()
        .filter(document::Column::TenantId.eq(tenant_id))
        .all(&pool)
        .await
        .unwrap();
    assert!(docs.is_empty());
    let movements = stock_movement::Entity::find()
        .filter(stock_movement::Column::TenantId.eq(tenant_id))
        .all(&pool)
        .await
        .unwrap();
    assert!(movements.is_empty());
    let p = reload_product(&pool, widget.id).await;
    assert_eq!(p.stock_quantity, dec!(20));
    assert_eq!(p.version, 1);
}

#[tokio::test]
async fn draft_keeps_zero_totals_and_no_stock_until_issued() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let widget =
        common::seed_product(&pool, tenant_id, "Widget", dec!(5), dec!(10), dec!(20), dec!(5))
            .await;

    let mut req = request(
        "SINV-D1",
        DocumentModule::Sales,
        DocumentType::Invoice,
        vec![line(widget.id, dec!(6))],
    );
    req.status = Some(DocumentStatus::Draft);

    let draft = svc
        .create_document(req, tenant_id, actor_id)
        .await
        .unwrap();
    assert_eq!(draft.status, DocumentStatus::Draft.as_str());
    assert_eq!(draft.total_amount, dec!(0));
    assert_eq!(reload_product(&pool, widget.id).await.stock_quantity, dec!(20));

    // Issuing the draft is when totals and stock land
    let issued = svc
        .update_document(
            draft.id,
            UpdateDocumentRequest {
                status: Some(DocumentStatus::Issued),
                ..Default::default()
            },
            tenant_id,
            actor_id,
        )
        .await
        .unwrap();
    assert_eq!(issued.total_amount, dec!(60));
    assert_eq!(reload_product(&pool, widget.id).await.stock_quantity, dec!(14));
}

#[tokio::test]
async fn line_edits_on_issued_invoice_are_rejected() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let widget =
        common::seed_product(&pool, tenant_id, "Widget", dec!(5), dec!(10), dec!(20), dec!(5))
            .await;

    let invoice = svc
        .create_document(
            request(
                "SINV-77",
                DocumentModule::Sales,
                DocumentType::Invoice,
                vec![line(widget.id, dec!(2))],
            ),
            tenant_id,
            actor_id,
        )
        .await
        .unwrap();

    let err = svc
        .update_document(
            invoice.id,
            UpdateDocumentRequest {
                lines: Some(vec![line(widget.id, dec!(8))]),
                ..Default::default()
            },
            tenant_id,
            actor_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
    assert_eq!(reload_product(&pool, widget.id).await.stock_quantity, dec!(18));

    // Header-only edits still go through
    let updated = svc
        .update_document(
            invoice.id,
            UpdateDocumentRequest {
                notes: Some("rush order".to_string()),
                paid_amount: Some(dec!(20)),
                ..Default::default()
            },
            tenant_id,
            actor_id,
        )
        .await
        .unwrap();
    assert_eq!(updated.notes.as_deref(), Some("rush order"));
    assert_eq!(updated.status, DocumentStatus::Paid.as_str());
}

#[tokio::test]
async fn service_lines_never_touch_stock() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let widget =
        common::seed_product(&pool, tenant_id, "Widget", dec!(5), dec!(10), dec!(20), dec!(5))
            .await;
    let consulting = common::seed_service_product(&pool, tenant_id, "Consulting").await;

    svc.create_document(
        request(
            "SINV-S1",
            DocumentModule::Sales,
            DocumentType::Invoice,
            vec![line(widget.id, dec!(1)), line(consulting.id, dec!(3))],
        ),
        tenant_id,
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let movements = stock_movement::Entity::find()
        .filter(stock_movement::Column::TenantId.eq(tenant_id))
        .all(&pool)
        .await
        .unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].product_id, widget.id);
}

#[tokio::test]
async fn quotation_converts_once_into_a_stock_moving_invoice() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let widget =
        common::seed_product(&pool, tenant_id, "Widget", dec!(5), dec!(10), dec!(20), dec!(5))
            .await;

    let quotation = svc
        .create_document(
            request(
                "QUO-1",
                DocumentModule::Sales,
                DocumentType::Quotation,
                vec![line(widget.id, dec!(5))],
            ),
            tenant_id,
            actor_id,
        )
        .await
        .unwrap();
    // Quotations never move stock
    assert_eq!(reload_product(&pool, widget.id).await.stock_quantity, dec!(20));

    let invoice = svc
        .convert_to_invoice(quotation.id, "SINV-Q1".to_string(), tenant_id, actor_id)
        .await
        .unwrap();
    assert_eq!(invoice.document_type, DocumentType::Invoice.as_str());
    assert_eq!(invoice.total_amount, dec!(50));
    assert_eq!(reload_product(&pool, widget.id).await.stock_quantity, dec!(15));

    let (quotation, _) = svc.get_document(quotation.id, tenant_id).await.unwrap();
    assert_eq!(
        quotation.status,
        DocumentStatus::ConvertedToInvoice.as_str()
    );
    assert_eq!(quotation.related_document_id, Some(invoice.id));

    let err = svc
        .convert_to_invoice(quotation.id, "SINV-Q2".to_string(), tenant_id, actor_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    let err = svc
        .convert_to_invoice(invoice.id, "SINV-Q3".to_string(), tenant_id, actor_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidDocumentType(_)));
}

#[tokio::test]
async fn purchase_return_sends_stock_back() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let widget =
        common::seed_product(&pool, tenant_id, "Widget", dec!(5), dec!(10), dec!(10), dec!(5))
            .await;

    svc.create_document(
        request(
            "PRET-1",
            DocumentModule::Purchases,
            DocumentType::Return,
            vec![line(widget.id, dec!(3))],
        ),
        tenant_id,
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let p = reload_product(&pool, widget.id).await;
    assert_eq!(p.stock_quantity, dec!(7));
    assert_eq!(p.average_cost, dec!(5));
}
