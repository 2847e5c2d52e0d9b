//! Migration to create customer_products table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomerProducts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomerProducts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomerProducts::CustomerId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomerProducts::ProductId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomerProducts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_products_customer")
                            .from(CustomerProducts::Table, CustomerProducts::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_customer_products_customer")
                    .table(CustomerProducts::Table)
                    .col(CustomerProducts::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_customer_products_unique")
                    .table(CustomerProducts::Table)
                    .col(CustomerProducts::CustomerId)
                    .col(CustomerProducts::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomerProducts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CustomerProducts {
    Table,
    Id,
    CustomerId,
    ProductId,
    CreatedAt,
}

#[derive(Iden)]
enum Customers {
    Table,
    Id,
}
