//! 初始表迁移
//!
//! 创建核心业务表：
//! - accounts: 页面所有者账户（邮箱 + argon2 密码哈希 + 订阅等级）
//! - pages: 用户页面（slug 全局唯一）
//! - blocks: 页面内容块（page_id 级联删除）

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 accounts 表
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::PasswordHash)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::PlanTier)
                            .string_len(16)
                            .not_null()
                            .default("free"),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 pages 表
        manager
            .create_table(
                Table::create()
                    .table(Pages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Pages::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Pages::Title).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Pages::Slug)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Pages::Description).text().null())
                    .col(
                        ColumnDef::new(Pages::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Pages::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Pages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pages_account_id")
                            .from(Pages::Table, Pages::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // slug 查询是公开渲染的热路径
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pages_slug")
                    .table(Pages::Table)
                    .col(Pages::Slug)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pages_account_id")
                    .table(Pages::Table)
                    .col(Pages::AccountId)
                    .to_owned(),
            )
            .await?;

        // 创建 blocks 表
        manager
            .create_table(
                Table::create()
                    .table(Blocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Blocks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Blocks::PageId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Blocks::BlockType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Blocks::Position).integer().not_null())
                    .col(ColumnDef::new(Blocks::Config).json().not_null())
                    .col(
                        ColumnDef::new(Blocks::IsVisible)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Blocks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Blocks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blocks_page_id")
                            .from(Blocks::Table, Blocks::PageId)
                            .to(Pages::Table, Pages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 复合索引：按页加载并排序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_blocks_page_position")
                    .table(Blocks::Table)
                    .col(Blocks::PageId)
                    .col(Blocks::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除索引
        manager
            .drop_index(Index::drop().name("idx_blocks_page_position").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_pages_account_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_pages_slug").to_owned())
            .await?;

        // 删除表（先子后父）
        manager
            .drop_table(Table::drop().table(Blocks::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Pages::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Accounts {
    #[sea_orm(iden = "accounts")]
    Table,
    Id,
    Email,
    PasswordHash,
    PlanTier,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Pages {
    #[sea_orm(iden = "pages")]
    Table,
    Id,
    AccountId,
    Title,
    Slug,
    Description,
    IsPublished,
    ViewCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Blocks {
    #[sea_orm(iden = "blocks")]
    Table,
    Id,
    PageId,
    BlockType,
    Position,
    Config,
    IsVisible,
    CreatedAt,
    UpdatedAt,
}
