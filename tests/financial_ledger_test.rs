mod common;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use std::sync::Arc;
use uuid::Uuid;

use stockbooks_api::entities::{
    bank_account, financial_record::FinancialRecordKind, safe, AccountRef,
};
use stockbooks_api::errors::ServiceError;
use stockbooks_api::services::financial_ledger::{
    FinancialLedgerService, PostRecordRequest, UpdateRecordRequest,
};

fn service(pool: &stockbooks_api::db::DbPool) -> FinancialLedgerService {
    FinancialLedgerService::new(Arc::new(pool.clone()), None)
}

fn receipt(account: AccountRef, amount: rust_decimal::Decimal) -> PostRecordRequest {
    PostRecordRequest {
        kind: FinancialRecordKind::Receipt,
        code: None,
        amount,
        record_date: None,
        description: None,
        account: Some(account),
        from_account: None,
        to_account: None,
    }
}

fn disbursement(account: AccountRef, amount: rust_decimal::Decimal) -> PostRecordRequest {
    PostRecordRequest {
        kind: FinancialRecordKind::Disbursement,
        ..receipt(account, amount)
    }
}

fn transfer(
    from: AccountRef,
    to: AccountRef,
    amount: rust_decimal::Decimal,
) -> PostRecordRequest {
    PostRecordRequest {
        kind: FinancialRecordKind::Transfer,
        code: None,
        amount,
        record_date: None,
        description: None,
        account: None,
        from_account: Some(from),
        to_account: Some(to),
    }
}

async fn safe_balance(pool: &stockbooks_api::db::DbPool, id: Uuid) -> rust_decimal::Decimal {
    safe::Entity::find_by_id(id)
        .one(pool)
        .await
        .unwrap()
        .unwrap()
        .balance
}

async fn bank_balance(pool: &stockbooks_api::db::DbPool, id: Uuid) -> rust_decimal::Decimal {
    bank_account::Entity::find_by_id(id)
        .one(pool)
        .await
        .unwrap()
        .unwrap()
        .balance
}

#[tokio::test]
async fn receipt_and_disbursement_move_the_balance_both_ways() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let cash = common::seed_safe(&pool, tenant_id, "Main Safe", dec!(100)).await;

    svc.post_record(receipt(AccountRef::safe(cash.id), dec!(250)), tenant_id, actor_id)
        .await
        .unwrap();
    assert_eq!(safe_balance(&pool, cash.id).await, dec!(350));

    svc.post_record(
        disbursement(AccountRef::safe(cash.id), dec!(400)),
        tenant_id,
        actor_id,
    )
    .await
    .unwrap();
    // Balances are signed; no floor
    assert_eq!(safe_balance(&pool, cash.id).await, dec!(-50));
}

#[tokio::test]
async fn transfer_and_its_deletion_restore_both_balances() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let cash = common::seed_safe(&pool, tenant_id, "Main Safe", dec!(500)).await;
    let bank = common::seed_bank_account(&pool, tenant_id, "Checking", dec!(80)).await;

    let record = svc
        .post_record(
            transfer(AccountRef::safe(cash.id), AccountRef::bank(bank.id), dec!(150)),
            tenant_id,
            actor_id,
        )
        .await
        .unwrap();
    assert_eq!(safe_balance(&pool, cash.id).await, dec!(350));
    assert_eq!(bank_balance(&pool, bank.id).await, dec!(230));

    let deleted = svc
        .delete_record(record.id, tenant_id, actor_id)
        .await
        .unwrap();
    assert!(deleted.deleted_at.is_some());
    assert_eq!(safe_balance(&pool, cash.id).await, dec!(500));
    assert_eq!(bank_balance(&pool, bank.id).await, dec!(80));

    assert!(matches!(
        svc.get_record(record.id, tenant_id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn codes_are_unique_across_record_kinds() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let cash = common::seed_safe(&pool, tenant_id, "Main Safe", dec!(500)).await;
    let bank = common::seed_bank_account(&pool, tenant_id, "Checking", dec!(0)).await;

    let mut first = receipt(AccountRef::safe(cash.id), dec!(10));
    first.code = Some("JV-100".to_string());
    svc.post_record(first, tenant_id, actor_id).await.unwrap();

    let mut clash = transfer(AccountRef::safe(cash.id), AccountRef::bank(bank.id), dec!(10));
    clash.code = Some("JV-100".to_string());
    let err = svc.post_record(clash, tenant_id, actor_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateCode(c) if c == "JV-100"));

    // The rejected transfer moved nothing
    assert_eq!(safe_balance(&pool, cash.id).await, dec!(510));
    assert_eq!(bank_balance(&pool, bank.id).await, dec!(0));
}

#[tokio::test]
async fn generated_codes_follow_the_monthly_journal_sequence() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let cash = common::seed_safe(&pool, tenant_id, "Main Safe", dec!(0)).await;

    let date = Utc.with_ymd_and_hms(2025, 8, 15, 9, 0, 0).unwrap();
    let mut first = receipt(AccountRef::safe(cash.id), dec!(5));
    first.record_date = Some(date);
    let mut second = receipt(AccountRef::safe(cash.id), dec!(5));
    second.record_date = Some(date);

    let first = svc.post_record(first, tenant_id, actor_id).await.unwrap();
    let second = svc.post_record(second, tenant_id, actor_id).await.unwrap();
    assert_eq!(first.code, "25-08-000001");
    assert_eq!(second.code, "25-08-000002");
}

#[tokio::test]
async fn transfer_needs_two_distinct_accounts() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let cash = common::seed_safe(&pool, tenant_id, "Main Safe", dec!(100)).await;

    let err = svc
        .post_record(
            transfer(AccountRef::safe(cash.id), AccountRef::safe(cash.id), dec!(10)),
            tenant_id,
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
    assert_eq!(safe_balance(&pool, cash.id).await, dec!(100));
}

#[tokio::test]
async fn missing_account_rolls_back_the_record() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();

    let err = svc
        .post_record(
            receipt(AccountRef::safe(Uuid::new_v4()), dec!(10)),
            tenant_id,
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    // The record insert was rolled back with the balance step
    assert!(svc.list_records(tenant_id, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn updating_the_amount_reapplies_the_impact() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let cash = common::seed_safe(&pool, tenant_id, "Main Safe", dec!(0)).await;

    let record = svc
        .post_record(receipt(AccountRef::safe(cash.id), dec!(100)), tenant_id, actor_id)
        .await
        .unwrap();
    assert_eq!(safe_balance(&pool, cash.id).await, dec!(100));

    svc.update_record(
        record.id,
        UpdateRecordRequest {
            amount: Some(dec!(60)),
            ..Default::default()
        },
        tenant_id,
        actor_id,
    )
    .await
    .unwrap();
    // Old +100 reversed, new +60 applied
    assert_eq!(safe_balance(&pool, cash.id).await, dec!(60));
}

#[tokio::test]
async fn update_can_move_the_record_to_another_account() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let cash = common::seed_safe(&pool, tenant_id, "Main Safe", dec!(0)).await;
    let bank = common::seed_bank_account(&pool, tenant_id, "Checking", dec!(0)).await;

    let record = svc
        .post_record(receipt(AccountRef::safe(cash.id), dec!(40)), tenant_id, actor_id)
        .await
        .unwrap();

    svc.update_record(
        record.id,
        UpdateRecordRequest {
            account: Some(AccountRef::bank(bank.id)),
            ..Default::default()
        },
        tenant_id,
        actor_id,
    )
    .await
    .unwrap();
    assert_eq!(safe_balance(&pool, cash.id).await, dec!(0));
    assert_eq!(bank_balance(&pool, bank.id).await, dec!(40));
}

#[tokio::test]
async fn listing_filters_by_kind_and_skips_deleted() {
    let pool = common::setup_pool().await;
    let svc = service(&pool);
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();
    let cash = common::seed_safe(&pool, tenant_id, "Main Safe", dec!(1000)).await;
    let bank = common::seed_bank_account(&pool, tenant_id, "Checking", dec!(0)).await;

    svc.post_record(receipt(AccountRef::safe(cash.id), dec!(10)), tenant_id, actor_id)
        .await
        .unwrap();
    let victim = svc
        .post_record(
            disbursement(AccountRef::safe(cash.id), dec!(20)),
            tenant_id,
            actor_id,
        )
        .await
        .unwrap();
    svc.post_record(
        transfer(AccountRef::safe(cash.id), AccountRef::bank(bank.id), dec!(30)),
        tenant_id,
        actor_id,
    )
    .await
    .unwrap();
    svc.delete_record(victim.id, tenant_id, actor_id)
        .await
        .unwrap();

    assert_eq!(svc.list_records(tenant_id, None).await.unwrap().len(), 2);
    assert_eq!(
        svc.list_records(tenant_id, Some(FinancialRecordKind::Receipt))
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(svc
        .list_records(tenant_id, Some(FinancialRecordKind::Disbursement))
        .await
        .unwrap()
        .is_empty());
}
