//! Single-table schema.
//!
//! Every entity (profile, transaction, budget) lives in `records`, keyed by
//! `(pk, sk)`:
//!
//! - `USER#<id>` / `PROFILE`
//! - `USER#<id>` / `#TRANSACTION#<txn id>`
//! - `USER#<id>` / `BUDGET#<category>`
//!
//! Two secondary access paths are provided: `(user_id, created_at)` for
//! time-ordered scans of a user's transactions and budgets, and a unique
//! `email` index for profile lookup at login/registration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Records {
    Table,
    Pk,
    Sk,
    UserId,
    CreatedAt,
    Email,
    Name,
    PasswordHash,
    TransactionId,
    Kind,
    AmountMinor,
    Category,
    Description,
    SourceAccount,
    DestinationAccount,
    MonthlyLimitMinor,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Records::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Records::Pk).string().not_null())
                    .col(ColumnDef::new(Records::Sk).string().not_null())
                    .col(ColumnDef::new(Records::UserId).string())
                    .col(ColumnDef::new(Records::CreatedAt).string())
                    .col(ColumnDef::new(Records::Email).string())
                    .col(ColumnDef::new(Records::Name).string())
                    .col(ColumnDef::new(Records::PasswordHash).string())
                    .col(ColumnDef::new(Records::TransactionId).string())
                    .col(ColumnDef::new(Records::Kind).string())
                    .col(ColumnDef::new(Records::AmountMinor).big_integer())
                    .col(ColumnDef::new(Records::Category).string())
                    .col(ColumnDef::new(Records::Description).string())
                    .col(ColumnDef::new(Records::SourceAccount).string())
                    .col(ColumnDef::new(Records::DestinationAccount).string())
                    .col(ColumnDef::new(Records::MonthlyLimitMinor).big_integer())
                    .primary_key(
                        Index::create()
                            .name("pk-records")
                            .col(Records::Pk)
                            .col(Records::Sk),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-records-user_id-created_at")
                    .table(Records::Table)
                    .col(Records::UserId)
                    .col(Records::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // NULL emails (non-profile rows) never collide.
        manager
            .create_index(
                Index::create()
                    .name("idx-records-email")
                    .table(Records::Table)
                    .col(Records::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Records::Table).to_owned())
            .await
    }
}
