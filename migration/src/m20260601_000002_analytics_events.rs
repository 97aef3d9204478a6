//! 分析事件表迁移
//!
//! 创建 analytics_events 表用于存储追踪事件，包括：
//! - 事件目标（page_id / block_id / shortlink_id，弱引用，不加外键）
//! - 事件类型（view / click / purchase / submit / download）
//! - 来源信息（referrer, source, ip_address）
//! - 设备信息（browser, os, device_type）
//!
//! 事件是 append-only 的：页面删除不级联到事件，过期数据由保留策略清理。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 analytics_events 表
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::PageId).big_integer().null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::BlockId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::ShortlinkId)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::EventType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::IpAddress)
                            .string_len(45)
                            .null(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::Referrer).text().null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::Source)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::Browser)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::Os).string_len(64).null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::DeviceType)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::Metadata).json().null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 page_id 索引（用于单页查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_page_id")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::PageId)
                    .to_owned(),
            )
            .await?;

        // 创建 created_at 索引（用于时间范围查询和保留策略清理）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_created_at")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 创建复合索引（用于单页时间序列查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_page_time")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::PageId)
                    .col(AnalyticsEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除索引
        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_page_time")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_created_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_page_id")
                    .to_owned(),
            )
            .await?;

        // 删除表
        manager
            .drop_table(Table::drop().table(AnalyticsEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AnalyticsEvents {
    #[sea_orm(iden = "analytics_events")]
    Table,
    Id,
    PageId,
    BlockId,
    ShortlinkId,
    EventType,
    IpAddress,
    Referrer,
    Source,
    Browser,
    Os,
    DeviceType,
    Metadata,
    CreatedAt,
}
