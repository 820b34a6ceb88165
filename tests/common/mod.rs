#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use stockbooks_api::db::{self, DbPool};
use stockbooks_api::entities::{bank_account, product, safe, ProductKind};

/// Fresh in-memory database with migrations applied. Each call gets its
/// own named shared-cache database so pooled connections see the same
/// data without tests seeing each other.
pub async fn setup_pool() -> DbPool {
    let url = format!(
        "sqlite:file:test-{}?mode=memory&cache=shared",
        Uuid::new_v4()
    );
    let pool = db::establish_connection(&url)
        .await
        .expect("Failed to establish connection");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

pub async fn seed_product(
    pool: &DbPool,
    tenant_id: Uuid,
    name: &str,
    purchase_price: Decimal,
    selling_price: Decimal,
    stock_quantity: Decimal,
    average_cost: Decimal,
) -> product::Model {
    let now = Utc::now();
    product::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        name: Set(name.to_string()),
        code: Set(None),
        kind: Set(ProductKind::Tracked.as_str().to_string()),
        purchase_price: Set(purchase_price),
        selling_price: Set(selling_price),
        stock_quantity: Set(stock_quantity),
        average_cost: Set(average_cost),
        version: Set(1),
        is_active: Set(true),
        created_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(pool)
    .await
    .expect("Failed to seed product")
}

pub async fn seed_service_product(pool: &DbPool, tenant_id: Uuid, name: &str) -> product::Model {
    let now = Utc::now();
    product::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        name: Set(name.to_string()),
        code: Set(None),
        kind: Set(ProductKind::Service.as_str().to_string()),
        purchase_price: Set(Decimal::ZERO),
        selling_price: Set(Decimal::new(5000, 2)),
        stock_quantity: Set(Decimal::ZERO),
        average_cost: Set(Decimal::ZERO),
        version: Set(1),
        is_active: Set(true),
        created_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(pool)
    .await
    .expect("Failed to seed service product")
}

pub async fn seed_safe(
    pool: &DbPool,
    tenant_id: Uuid,
    name: &str,
    balance: Decimal,
) -> safe::Model {
    let now = Utc::now();
    safe::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        name: Set(name.to_string()),
        balance: Set(balance),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(pool)
    .await
    .expect("Failed to seed safe")
}

pub async fn seed_bank_account(
    pool: &DbPool,
    tenant_id: Uuid,
    name: &str,
    balance: Decimal,
) -> bank_account::Model {
    let now = Utc::now();
    bank_account::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        name: Set(name.to_string()),
        balance: Set(balance),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(pool)
    .await
    .expect("Failed to seed bank account")
}
