//! Queries over the flow-accounting database written by the external traffic
//! meter. This crate only reads it.

use chrono::NaiveDateTime;
use sea_orm::sea_query::{Expr, Order, Query};
use sea_orm::{DatabaseConnection, QueryResult};

use moat_core::{time, AccountingRecord, PortRange, Prefix, StoreResult};

use crate::config::ACCOUNTING_DATABASE;
use crate::connection::ConnectionManager;
use crate::db::AcctV5;
use crate::store::{col_name, db_err, query_all};

/// Handle to the accounting database. Cloning shares the pool.
#[derive(Clone)]
pub struct AcctStore {
    conn: DatabaseConnection,
}

impl AcctStore {
    /// Obtain a store over the manager's shared accounting handle.
    pub async fn from_manager(manager: &mut ConnectionManager) -> StoreResult<Self> {
        let conn = manager.connect(Some(ACCOUNTING_DATABASE)).await?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Flows toward any of the target addresses on any of the destination
    /// port ranges, inserted within `[window_start, window_start +
    /// window_secs]`. One query per (target, range) pair; results keep pair
    /// order, each pair's rows ordered by insertion then update stamp.
    pub async fn find_by_destination(
        &self,
        targets: &[Prefix],
        port_ranges: &[PortRange],
        window_start: NaiveDateTime,
        window_secs: i64,
    ) -> StoreResult<Vec<AccountingRecord>> {
        self.find(
            AcctV5::IpDst,
            AcctV5::DstPort,
            targets,
            port_ranges,
            window_start,
            window_secs,
        )
        .await
    }

    /// As `find_by_destination`, matching on the source address and port.
    pub async fn find_by_source(
        &self,
        targets: &[Prefix],
        port_ranges: &[PortRange],
        window_start: NaiveDateTime,
        window_secs: i64,
    ) -> StoreResult<Vec<AccountingRecord>> {
        self.find(
            AcctV5::IpSrc,
            AcctV5::SrcPort,
            targets,
            port_ranges,
            window_start,
            window_secs,
        )
        .await
    }

    async fn find(
        &self,
        addr_col: AcctV5,
        port_col: AcctV5,
        targets: &[Prefix],
        port_ranges: &[PortRange],
        window_start: NaiveDateTime,
        window_secs: i64,
    ) -> StoreResult<Vec<AccountingRecord>> {
        let from = time::encode(window_start);
        let to = time::encode(time::add_seconds(window_start, window_secs));
        let mut records = Vec::new();
        for target in targets {
            for range in port_ranges {
                let stmt = Query::select()
                    .columns([
                        AcctV5::AgentId,
                        AcctV5::ClassId,
                        AcctV5::MacSrc,
                        AcctV5::MacDst,
                        AcctV5::Vlan,
                        AcctV5::IpSrc,
                        AcctV5::IpDst,
                        AcctV5::SrcPort,
                        AcctV5::DstPort,
                        AcctV5::IpProto,
                        AcctV5::Tos,
                        AcctV5::Packets,
                        AcctV5::Bytes,
                        AcctV5::Flows,
                        AcctV5::StampInserted,
                        AcctV5::StampUpdated,
                    ])
                    .from(AcctV5::Table)
                    .and_where(Expr::col(addr_col).eq(target.addr()))
                    .and_where(Expr::col(port_col).between(
                        i32::from(range.lower_port()),
                        i32::from(range.upper_port()),
                    ))
                    .and_where(
                        Expr::col(AcctV5::StampInserted).between(from.as_str(), to.as_str()),
                    )
                    .order_by(AcctV5::StampInserted, Order::Asc)
                    .order_by(AcctV5::StampUpdated, Order::Asc)
                    .to_owned();
                for row in query_all(&self.conn, &stmt).await? {
                    records.push(record_from_row(&row)?);
                }
            }
        }
        Ok(records)
    }
}

fn record_from_row(row: &QueryResult) -> StoreResult<AccountingRecord> {
    let get_i32 = |col: AcctV5| row.try_get::<i32>("", &col_name(col)).map_err(db_err);
    let get_str = |col: AcctV5| row.try_get::<String>("", &col_name(col)).map_err(db_err);
    let inserted: String = get_str(AcctV5::StampInserted)?;
    let updated: String = get_str(AcctV5::StampUpdated)?;
    Ok(AccountingRecord {
        agent_id: get_i32(AcctV5::AgentId)?,
        class_id: get_str(AcctV5::ClassId)?,
        mac_src: get_str(AcctV5::MacSrc)?,
        mac_dst: get_str(AcctV5::MacDst)?,
        vlan: get_i32(AcctV5::Vlan)?,
        ip_src: get_str(AcctV5::IpSrc)?,
        ip_dst: get_str(AcctV5::IpDst)?,
        src_port: get_i32(AcctV5::SrcPort)?,
        dst_port: get_i32(AcctV5::DstPort)?,
        ip_proto: get_str(AcctV5::IpProto)?,
        tos: get_i32(AcctV5::Tos)?,
        packets: get_i32(AcctV5::Packets)?,
        bytes: row.try_get("", &col_name(AcctV5::Bytes)).map_err(db_err)?,
        flows: get_i32(AcctV5::Flows)?,
        inserted_at: time::decode(&inserted),
        updated_at: time::decode(&updated),
    })
}
