use sea_orm_migration::prelude::*;

use crate::db::AcctV5;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Mirrors the traffic meter's flow table; stamps are stored in the
        // textual format the meter writes.
        manager
            .create_table(
                Table::create()
                    .table(AcctV5::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AcctV5::AgentId).integer().not_null())
                    .col(ColumnDef::new(AcctV5::ClassId).string().not_null())
                    .col(ColumnDef::new(AcctV5::MacSrc).string().not_null())
                    .col(ColumnDef::new(AcctV5::MacDst).string().not_null())
                    .col(ColumnDef::new(AcctV5::Vlan).integer().not_null())
                    .col(ColumnDef::new(AcctV5::IpSrc).string().not_null())
                    .col(ColumnDef::new(AcctV5::IpDst).string().not_null())
                    .col(ColumnDef::new(AcctV5::SrcPort).integer().not_null())
                    .col(ColumnDef::new(AcctV5::DstPort).integer().not_null())
                    .col(ColumnDef::new(AcctV5::IpProto).string().not_null())
                    .col(ColumnDef::new(AcctV5::Tos).integer().not_null())
                    .col(ColumnDef::new(AcctV5::Packets).integer().not_null())
                    .col(ColumnDef::new(AcctV5::Bytes).big_integer().not_null())
                    .col(ColumnDef::new(AcctV5::Flows).integer().not_null())
                    .col(ColumnDef::new(AcctV5::StampInserted).string().not_null())
                    .col(ColumnDef::new(AcctV5::StampUpdated).string().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_acct_v5_ip_dst")
                    .table(AcctV5::Table)
                    .col(AcctV5::IpDst)
                    .col(AcctV5::DstPort)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_acct_v5_ip_src")
                    .table(AcctV5::Table)
                    .col(AcctV5::IpSrc)
                    .col(AcctV5::SrcPort)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_acct_v5_stamp_inserted")
                    .table(AcctV5::Table)
                    .col(AcctV5::StampInserted)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AcctV5::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
