//! Prefix and port-range child rows.
//!
//! Like attribute rows, each prefix row belongs to exactly one owner and is
//! tagged with the role it plays for that owner.

use sea_orm::sea_query::{Expr, Order, Query};
use sea_orm::{ConnectionTrait, Value};

use moat_core::{PortRange as PortRangeValue, Prefix as PrefixValue, StoreError, StoreResult};

use crate::db::{PortRange, Prefix};
use crate::store::{col_name, db_err, exec, query_all};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixOwner {
    Customer(i32),
    Identifier(i64),
    MitigationScope(i64),
    AclEntry(i64),
}

impl PrefixOwner {
    fn column(self) -> Prefix {
        match self {
            PrefixOwner::Customer(_) => Prefix::CustomerId,
            PrefixOwner::Identifier(_) => Prefix::IdentifierId,
            PrefixOwner::MitigationScope(_) => Prefix::MitigationScopeId,
            PrefixOwner::AclEntry(_) => Prefix::AccessControlListEntryId,
        }
    }

    fn key(self) -> Value {
        match self {
            PrefixOwner::Customer(id) => id.into(),
            PrefixOwner::Identifier(id) => id.into(),
            PrefixOwner::MitigationScope(id) => id.into(),
            PrefixOwner::AclEntry(id) => id.into(),
        }
    }

    fn row_keys(self) -> (i32, i64, i64, i64) {
        match self {
            PrefixOwner::Customer(id) => (id, 0, 0, 0),
            PrefixOwner::Identifier(id) => (0, id, 0, 0),
            PrefixOwner::MitigationScope(id) => (0, 0, id, 0),
            PrefixOwner::AclEntry(id) => (0, 0, 0, id),
        }
    }
}

/// Role a stored prefix plays for its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixKind {
    AddressRange,
    Ip,
    Prefix,
    TargetIp,
    TargetPrefix,
    SourceNetwork,
    DestinationNetwork,
}

impl PrefixKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrefixKind::AddressRange => "ADDRESS_RANGE",
            PrefixKind::Ip => "IP",
            PrefixKind::Prefix => "PREFIX",
            PrefixKind::TargetIp => "TARGET_IP",
            PrefixKind::TargetPrefix => "TARGET_PREFIX",
            PrefixKind::SourceNetwork => "SOURCE_IPV4_NETWORK",
            PrefixKind::DestinationNetwork => "DESTINATION_IPV4_NETWORK",
        }
    }
}

pub(crate) async fn insert_prefixes<C: ConnectionTrait>(
    conn: &C,
    owner: PrefixOwner,
    kind: PrefixKind,
    prefixes: &[PrefixValue],
) -> StoreResult<()> {
    let (customer_id, identifier_id, mitigation_scope_id, entry_id) = owner.row_keys();
    for prefix in prefixes {
        let stmt = Query::insert()
            .into_table(Prefix::Table)
            .columns([
                Prefix::CustomerId,
                Prefix::IdentifierId,
                Prefix::MitigationScopeId,
                Prefix::AccessControlListEntryId,
                Prefix::Type,
                Prefix::Addr,
                Prefix::PrefixLen,
            ])
            .values_panic([
                customer_id.into(),
                identifier_id.into(),
                mitigation_scope_id.into(),
                entry_id.into(),
                kind.as_str().into(),
                prefix.addr().into(),
                i32::from(prefix.prefix_len()).into(),
            ])
            .to_owned();
        exec(conn, &stmt).await?;
    }
    Ok(())
}

/// Load the owner's prefixes of one kind, oldest first. Rows whose stored
/// literal no longer parses are skipped with a warning rather than failing
/// the whole read.
pub(crate) async fn load_prefixes<C: ConnectionTrait>(
    conn: &C,
    owner: PrefixOwner,
    kind: PrefixKind,
) -> StoreResult<Vec<PrefixValue>> {
    let stmt = Query::select()
        .columns([Prefix::Addr, Prefix::PrefixLen])
        .from(Prefix::Table)
        .and_where(Expr::col(owner.column()).eq(owner.key()))
        .and_where(Expr::col(Prefix::Type).eq(kind.as_str()))
        .order_by(Prefix::Id, Order::Asc)
        .to_owned();
    let rows = query_all(conn, &stmt).await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let addr: String = row.try_get("", &col_name(Prefix::Addr)).map_err(db_err)?;
        let prefix_len: i32 = row
            .try_get("", &col_name(Prefix::PrefixLen))
            .map_err(db_err)?;
        match PrefixValue::from_parts(&addr, prefix_len as u8) {
            Ok(prefix) => out.push(prefix),
            Err(err) => log::warn!("skipping stored prefix {addr}/{prefix_len}: {err}"),
        }
    }
    Ok(out)
}

pub(crate) async fn delete_prefixes<C: ConnectionTrait>(
    conn: &C,
    owner: PrefixOwner,
) -> StoreResult<()> {
    let stmt = Query::delete()
        .from_table(Prefix::Table)
        .and_where(Expr::col(owner.column()).eq(owner.key()))
        .to_owned();
    exec(conn, &stmt).await
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeOwner {
    Identifier(i64),
    MitigationScope(i64),
}

impl RangeOwner {
    fn column(self) -> PortRange {
        match self {
            RangeOwner::Identifier(_) => PortRange::IdentifierId,
            RangeOwner::MitigationScope(_) => PortRange::MitigationScopeId,
        }
    }

    fn key(self) -> Value {
        match self {
            RangeOwner::Identifier(id) => id.into(),
            RangeOwner::MitigationScope(id) => id.into(),
        }
    }

    fn row_keys(self) -> (i64, i64) {
        match self {
            RangeOwner::Identifier(id) => (id, 0),
            RangeOwner::MitigationScope(id) => (0, id),
        }
    }
}

pub(crate) async fn insert_port_ranges<C: ConnectionTrait>(
    conn: &C,
    owner: RangeOwner,
    ranges: &[PortRangeValue],
) -> StoreResult<()> {
    let (identifier_id, mitigation_scope_id) = owner.row_keys();
    for range in ranges {
        let stmt = Query::insert()
            .into_table(PortRange::Table)
            .columns([
                PortRange::IdentifierId,
                PortRange::MitigationScopeId,
                PortRange::LowerPort,
                PortRange::UpperPort,
            ])
            .values_panic([
                identifier_id.into(),
                mitigation_scope_id.into(),
                i32::from(range.lower_port()).into(),
                i32::from(range.upper_port()).into(),
            ])
            .to_owned();
        exec(conn, &stmt).await?;
    }
    Ok(())
}

pub(crate) async fn load_port_ranges<C: ConnectionTrait>(
    conn: &C,
    owner: RangeOwner,
) -> StoreResult<Vec<PortRangeValue>> {
    let stmt = Query::select()
        .columns([PortRange::LowerPort, PortRange::UpperPort])
        .from(PortRange::Table)
        .and_where(Expr::col(owner.column()).eq(owner.key()))
        .order_by(PortRange::Id, Order::Asc)
        .to_owned();
    let rows = query_all(conn, &stmt).await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let lower: i32 = row
            .try_get("", &col_name(PortRange::LowerPort))
            .map_err(db_err)?;
        let upper: i32 = row
            .try_get("", &col_name(PortRange::UpperPort))
            .map_err(db_err)?;
        let lower = u16::try_from(lower)
            .map_err(|_| StoreError::storage(format!("stored port {lower} out of range")))?;
        let upper = u16::try_from(upper)
            .map_err(|_| StoreError::storage(format!("stored port {upper} out of range")))?;
        out.push(PortRangeValue::new(lower, upper)?);
    }
    Ok(out)
}

pub(crate) async fn delete_port_ranges<C: ConnectionTrait>(
    conn: &C,
    owner: RangeOwner,
) -> StoreResult<()> {
    let stmt = Query::delete()
        .from_table(PortRange::Table)
        .and_where(Expr::col(owner.column()).eq(owner.key()))
        .to_owned();
    exec(conn, &stmt).await
}
