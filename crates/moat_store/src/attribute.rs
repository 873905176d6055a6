//! Polymorphic name/number attributes shared by several aggregates.
//!
//! Every row in `parameter_value` belongs to exactly one owner; the two
//! foreign-key columns that do not apply stay zero.

use sea_orm::sea_query::{Expr, Order, Query};
use sea_orm::{ConnectionTrait, Value};

use moat_core::{OrderedIntSet, OrderedStringSet, StoreResult};

use crate::db::ParameterValue;
use crate::store::{col_name, exec, query_all};

/// The aggregate a `parameter_value` row hangs off of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeOwner {
    Customer(i32),
    Identifier(i64),
    MitigationScope(i64),
}

impl AttributeOwner {
    fn column(self) -> ParameterValue {
        match self {
            AttributeOwner::Customer(_) => ParameterValue::CustomerId,
            AttributeOwner::Identifier(_) => ParameterValue::IdentifierId,
            AttributeOwner::MitigationScope(_) => ParameterValue::MitigationScopeId,
        }
    }

    fn key(self) -> Value {
        match self {
            AttributeOwner::Customer(id) => id.into(),
            AttributeOwner::Identifier(id) => id.into(),
            AttributeOwner::MitigationScope(id) => id.into(),
        }
    }

    /// Full (customer_id, identifier_id, mitigation_scope_id) triple for an
    /// insert, with the non-owning columns zeroed.
    fn row_keys(self) -> (i32, i64, i64) {
        match self {
            AttributeOwner::Customer(id) => (id, 0, 0),
            AttributeOwner::Identifier(id) => (0, id, 0),
            AttributeOwner::MitigationScope(id) => (0, 0, id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    Fqdn,
    Uri,
    E164,
    TrafficProtocol,
    Alias,
    TargetProtocol,
}

impl AttributeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Fqdn => "FQDN",
            AttributeKind::Uri => "URI",
            AttributeKind::E164 => "E_164",
            AttributeKind::TrafficProtocol => "TRAFFIC_PROTOCOL",
            AttributeKind::Alias => "ALIAS",
            AttributeKind::TargetProtocol => "TARGET_PROTOCOL",
        }
    }
}

/// Insert one row per string, skipping empties. Rows land in iteration order,
/// which autoincrement ids preserve for reads.
pub(crate) async fn insert_strings<C: ConnectionTrait>(
    conn: &C,
    owner: AttributeOwner,
    kind: AttributeKind,
    values: &OrderedStringSet,
) -> StoreResult<()> {
    let (customer_id, identifier_id, mitigation_scope_id) = owner.row_keys();
    for value in values {
        if value.is_empty() {
            continue;
        }
        let stmt = Query::insert()
            .into_table(ParameterValue::Table)
            .columns([
                ParameterValue::CustomerId,
                ParameterValue::IdentifierId,
                ParameterValue::MitigationScopeId,
                ParameterValue::Type,
                ParameterValue::StringValue,
                ParameterValue::IntValue,
            ])
            .values_panic([
                customer_id.into(),
                identifier_id.into(),
                mitigation_scope_id.into(),
                kind.as_str().into(),
                value.as_str().into(),
                0i32.into(),
            ])
            .to_owned();
        exec(conn, &stmt).await?;
    }
    Ok(())
}

/// Insert one row per integer, skipping zeroes.
pub(crate) async fn insert_ints<C: ConnectionTrait>(
    conn: &C,
    owner: AttributeOwner,
    kind: AttributeKind,
    values: &OrderedIntSet,
) -> StoreResult<()> {
    let (customer_id, identifier_id, mitigation_scope_id) = owner.row_keys();
    for value in values {
        if *value == 0 {
            continue;
        }
        let stmt = Query::insert()
            .into_table(ParameterValue::Table)
            .columns([
                ParameterValue::CustomerId,
                ParameterValue::IdentifierId,
                ParameterValue::MitigationScopeId,
                ParameterValue::Type,
                ParameterValue::StringValue,
                ParameterValue::IntValue,
            ])
            .values_panic([
                customer_id.into(),
                identifier_id.into(),
                mitigation_scope_id.into(),
                kind.as_str().into(),
                "".into(),
                (*value).into(),
            ])
            .to_owned();
        exec(conn, &stmt).await?;
    }
    Ok(())
}

pub(crate) async fn load_strings<C: ConnectionTrait>(
    conn: &C,
    owner: AttributeOwner,
    kind: AttributeKind,
) -> StoreResult<OrderedStringSet> {
    let stmt = Query::select()
        .column(ParameterValue::StringValue)
        .from(ParameterValue::Table)
        .and_where(Expr::col(owner.column()).eq(owner.key()))
        .and_where(Expr::col(ParameterValue::Type).eq(kind.as_str()))
        .order_by(ParameterValue::Id, Order::Asc)
        .to_owned();
    let rows = query_all(conn, &stmt).await?;
    let mut out = OrderedStringSet::new();
    for row in rows {
        let value: String = row
            .try_get("", &col_name(ParameterValue::StringValue))
            .map_err(crate::store::db_err)?;
        out.insert(value);
    }
    Ok(out)
}

pub(crate) async fn load_ints<C: ConnectionTrait>(
    conn: &C,
    owner: AttributeOwner,
    kind: AttributeKind,
) -> StoreResult<OrderedIntSet> {
    let stmt = Query::select()
        .column(ParameterValue::IntValue)
        .from(ParameterValue::Table)
        .and_where(Expr::col(owner.column()).eq(owner.key()))
        .and_where(Expr::col(ParameterValue::Type).eq(kind.as_str()))
        .order_by(ParameterValue::Id, Order::Asc)
        .to_owned();
    let rows = query_all(conn, &stmt).await?;
    let mut out = OrderedIntSet::new();
    for row in rows {
        let value: i32 = row
            .try_get("", &col_name(ParameterValue::IntValue))
            .map_err(crate::store::db_err)?;
        out.insert(value);
    }
    Ok(out)
}

/// Drop every attribute row the owner holds, regardless of kind.
pub(crate) async fn delete_for_owner<C: ConnectionTrait>(
    conn: &C,
    owner: AttributeOwner,
) -> StoreResult<()> {
    let stmt = Query::delete()
        .from_table(ParameterValue::Table)
        .and_where(Expr::col(owner.column()).eq(owner.key()))
        .to_owned();
    exec(conn, &stmt).await
}
