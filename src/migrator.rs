use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_products_table::Migration),
            Box::new(m20240101_000002_create_stock_movements_table::Migration),
            Box::new(m20240101_000003_create_documents_table::Migration),
            Box::new(m20240101_000004_create_document_lines_table::Migration),
            Box::new(m20240101_000005_create_requisitions_table::Migration),
            Box::new(m20240101_000006_create_financial_accounts_tables::Migration),
            Box::new(m20240101_000007_create_financial_records_table::Migration),
            Box::new(m20240101_000008_create_sequence_counters_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::TenantId).uuid().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Code).string().null())
                        .col(ColumnDef::new(Products::Kind).string().not_null())
                        .col(
                            ColumnDef::new(Products::PurchasePrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::SellingPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::StockQuantity)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::AverageCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_tenant_id")
                        .table(Products::Table)
                        .col(Products::TenantId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        TenantId,
        Name,
        Code,
        Kind,
        PurchasePrice,
        SellingPrice,
        StockQuantity,
        AverageCost,
        Version,
        IsActive,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_stock_movements_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_stock_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::TenantId).uuid().not_null())
                        .col(ColumnDef::new(StockMovements::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockMovements::ReferenceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::ReferenceType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::Direction)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::PreviousQuantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::NewQuantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::Clamped)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(StockMovements::Reversal)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(StockMovements::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(StockMovements::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_tenant_product")
                        .table(StockMovements::Table)
                        .col(StockMovements::TenantId)
                        .col(StockMovements::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_reference_id")
                        .table(StockMovements::Table)
                        .col(StockMovements::ReferenceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockMovements {
        Table,
        Id,
        TenantId,
        ProductId,
        ReferenceId,
        ReferenceType,
        Direction,
        Quantity,
        PreviousQuantity,
        NewQuantity,
        Clamped,
        Reversal,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240101_000003_create_documents_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_documents_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Documents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Documents::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Documents::TenantId).uuid().not_null())
                        .col(
                            ColumnDef::new(Documents::DocumentNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Documents::Module).string().not_null())
                        .col(ColumnDef::new(Documents::DocumentType).string().not_null())
                        .col(ColumnDef::new(Documents::Status).string().not_null())
                        .col(ColumnDef::new(Documents::ContactId).uuid().null())
                        .col(ColumnDef::new(Documents::Currency).string().not_null())
                        .col(ColumnDef::new(Documents::IssueDate).timestamp().not_null())
                        .col(ColumnDef::new(Documents::DueDate).timestamp().null())
                        .col(
                            ColumnDef::new(Documents::GeneralDiscount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::GeneralDiscountPercent)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::Subtotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::TotalDiscount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::TotalTax)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::PaidAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Documents::RemainingAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Documents::Notes).string().null())
                        .col(ColumnDef::new(Documents::RelatedDocumentId).uuid().null())
                        .col(ColumnDef::new(Documents::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Documents::LastModifiedBy).uuid().null())
                        .col(ColumnDef::new(Documents::DeletedAt).timestamp().null())
                        .col(ColumnDef::new(Documents::DeletedBy).uuid().null())
                        .col(ColumnDef::new(Documents::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Documents::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_documents_tenant_number")
                        .table(Documents::Table)
                        .col(Documents::TenantId)
                        .col(Documents::DocumentNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_documents_tenant_module_type")
                        .table(Documents::Table)
                        .col(Documents::TenantId)
                        .col(Documents::Module)
                        .col(Documents::DocumentType)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Documents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Documents {
        Table,
        Id,
        TenantId,
        DocumentNumber,
        Module,
        DocumentType,
        Status,
        ContactId,
        Currency,
        IssueDate,
        DueDate,
        GeneralDiscount,
        GeneralDiscountPercent,
        Subtotal,
        TotalDiscount,
        TotalTax,
        TotalAmount,
        PaidAmount,
        RemainingAmount,
        Notes,
        RelatedDocumentId,
        CreatedBy,
        LastModifiedBy,
        DeletedAt,
        DeletedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_document_lines_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_document_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DocumentLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DocumentLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DocumentLines::DocumentId).uuid().not_null())
                        .col(ColumnDef::new(DocumentLines::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(DocumentLines::ProductName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentLines::LineNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentLines::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentLines::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DocumentLines::DiscountPercent)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLines::DiscountAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLines::Subtotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLines::TaxPercent)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLines::TaxAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DocumentLines::Total)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_document_lines_document_id")
                        .table(DocumentLines::Table)
                        .col(DocumentLines::DocumentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DocumentLines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum DocumentLines {
        Table,
        Id,
        DocumentId,
        ProductId,
        ProductName,
        LineNumber,
        Quantity,
        UnitPrice,
        DiscountPercent,
        DiscountAmount,
        Subtotal,
        TaxPercent,
        TaxAmount,
        Total,
    }
}

mod m20240101_000005_create_requisitions_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_requisitions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Requisitions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Requisitions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Requisitions::TenantId).uuid().not_null())
                        .col(ColumnDef::new(Requisitions::Code).string().null())
                        .col(ColumnDef::new(Requisitions::Kind).string().not_null())
                        .col(ColumnDef::new(Requisitions::Status).string().not_null())
                        .col(ColumnDef::new(Requisitions::Notes).string().null())
                        .col(ColumnDef::new(Requisitions::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Requisitions::DeletedAt).timestamp().null())
                        .col(ColumnDef::new(Requisitions::DeletedBy).uuid().null())
                        .col(
                            ColumnDef::new(Requisitions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Requisitions::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requisitions_tenant_id")
                        .table(Requisitions::Table)
                        .col(Requisitions::TenantId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RequisitionLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RequisitionLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionLines::RequisitionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionLines::ProductId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionLines::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requisition_lines_requisition_id")
                        .table(RequisitionLines::Table)
                        .col(RequisitionLines::RequisitionId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RequisitionLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Requisitions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Requisitions {
        Table,
        Id,
        TenantId,
        Code,
        Kind,
        Status,
        Notes,
        CreatedBy,
        DeletedAt,
        DeletedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum RequisitionLines {
        Table,
        Id,
        RequisitionId,
        ProductId,
        Quantity,
    }
}

mod m20240101_000006_create_financial_accounts_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_financial_accounts_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Safes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Safes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Safes::TenantId).uuid().not_null())
                        .col(ColumnDef::new(Safes::Name).string().not_null())
                        .col(
                            ColumnDef::new(Safes::Balance)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Safes::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Safes::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Safes::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BankAccounts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BankAccounts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BankAccounts::TenantId).uuid().not_null())
                        .col(ColumnDef::new(BankAccounts::Name).string().not_null())
                        .col(
                            ColumnDef::new(BankAccounts::Balance)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(BankAccounts::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(BankAccounts::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BankAccounts::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BankAccounts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Safes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Safes {
        Table,
        Id,
        TenantId,
        Name,
        Balance,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum BankAccounts {
        Table,
        Id,
        TenantId,
        Name,
        Balance,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000007_create_financial_records_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_financial_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FinancialRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FinancialRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FinancialRecords::TenantId).uuid().not_null())
                        .col(ColumnDef::new(FinancialRecords::Kind).string().not_null())
                        .col(ColumnDef::new(FinancialRecords::Code).string().not_null())
                        .col(
                            ColumnDef::new(FinancialRecords::Amount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FinancialRecords::RecordDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FinancialRecords::Description).string().null())
                        .col(ColumnDef::new(FinancialRecords::AccountKind).string().null())
                        .col(ColumnDef::new(FinancialRecords::AccountId).uuid().null())
                        .col(
                            ColumnDef::new(FinancialRecords::FromAccountKind)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(FinancialRecords::FromAccountId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(FinancialRecords::ToAccountKind)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(FinancialRecords::ToAccountId).uuid().null())
                        .col(ColumnDef::new(FinancialRecords::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(FinancialRecords::LastModifiedBy)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(FinancialRecords::DeletedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(ColumnDef::new(FinancialRecords::DeletedBy).uuid().null())
                        .col(
                            ColumnDef::new(FinancialRecords::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FinancialRecords::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_financial_records_tenant_code")
                        .table(FinancialRecords::Table)
                        .col(FinancialRecords::TenantId)
                        .col(FinancialRecords::Code)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FinancialRecords::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum FinancialRecords {
        Table,
        Id,
        TenantId,
        Kind,
        Code,
        Amount,
        RecordDate,
        Description,
        AccountKind,
        AccountId,
        FromAccountKind,
        FromAccountId,
        ToAccountKind,
        ToAccountId,
        CreatedBy,
        LastModifiedBy,
        DeletedAt,
        DeletedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000008_create_sequence_counters_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_sequence_counters_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SequenceCounters::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SequenceCounters::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SequenceCounters::TenantId).uuid().not_null())
                        .col(ColumnDef::new(SequenceCounters::Scope).string().not_null())
                        .col(
                            ColumnDef::new(SequenceCounters::LastValue)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sequence_counters_tenant_scope")
                        .table(SequenceCounters::Table)
                        .col(SequenceCounters::TenantId)
                        .col(SequenceCounters::Scope)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SequenceCounters::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum SequenceCounters {
        Table,
        Id,
        TenantId,
        Scope,
        LastValue,
    }
}
