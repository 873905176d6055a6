//! Identifier aggregate persistence. One identifier per customer.

use sea_orm::sea_query::{Expr, Query};
use sea_orm::{ConnectionTrait, TransactionTrait};

use moat_core::{Identifier, StoreResult};

use crate::attribute::{self, AttributeKind, AttributeOwner};
use crate::db::Identifier as IdentifierTable;
use crate::ranges::{self, PrefixKind, PrefixOwner, RangeOwner};
use crate::store::{col_name, db_err, exec, query_one, MoatStore, UpdateOutcome};

impl MoatStore {
    /// Create a customer's identifier, or rewrite the one it already has.
    pub async fn create_identifier(&self, identifier: &Identifier) -> StoreResult<()> {
        if find_identifier_id(&self.conn, identifier.customer_id)
            .await?
            .is_some()
        {
            self.update_identifier(identifier).await?;
            return Ok(());
        }
        let tx = self.conn.begin().await.map_err(db_err)?;
        let stmt = Query::insert()
            .into_table(IdentifierTable::Table)
            .columns([IdentifierTable::CustomerId, IdentifierTable::AliasName])
            .values_panic([
                identifier.customer_id.into(),
                identifier.alias_name.as_str().into(),
            ])
            .to_owned();
        exec(&tx, &stmt).await?;
        let Some(id) = find_identifier_id(&tx, identifier.customer_id).await? else {
            return Err(moat_core::StoreError::storage(
                "identifier row missing after insert",
            ));
        };
        insert_children(&tx, id, identifier).await?;
        tx.commit().await.map_err(db_err)
    }

    /// Load the customer's identifier. A customer without one yields the
    /// empty aggregate.
    pub async fn get_identifier(&self, customer_id: i32) -> StoreResult<Identifier> {
        let stmt = Query::select()
            .columns([IdentifierTable::Id, IdentifierTable::AliasName])
            .from(IdentifierTable::Table)
            .and_where(Expr::col(IdentifierTable::CustomerId).eq(customer_id))
            .to_owned();
        let Some(row) = query_one(&self.conn, &stmt).await? else {
            return Ok(Identifier::default());
        };
        let id: i64 = row
            .try_get("", &col_name(IdentifierTable::Id))
            .map_err(db_err)?;
        let alias_name: String = row
            .try_get("", &col_name(IdentifierTable::AliasName))
            .map_err(db_err)?;
        let mut identifier = Identifier {
            customer_id,
            alias_name,
            ..Identifier::default()
        };
        let owner = AttributeOwner::Identifier(id);
        identifier.fqdn = attribute::load_strings(&self.conn, owner, AttributeKind::Fqdn).await?;
        identifier.uri = attribute::load_strings(&self.conn, owner, AttributeKind::Uri).await?;
        identifier.e164 = attribute::load_strings(&self.conn, owner, AttributeKind::E164).await?;
        identifier.traffic_protocol =
            attribute::load_ints(&self.conn, owner, AttributeKind::TrafficProtocol).await?;
        identifier.ip =
            ranges::load_prefixes(&self.conn, PrefixOwner::Identifier(id), PrefixKind::Ip).await?;
        identifier.prefix =
            ranges::load_prefixes(&self.conn, PrefixOwner::Identifier(id), PrefixKind::Prefix)
                .await?;
        identifier.port_ranges =
            ranges::load_port_ranges(&self.conn, RangeOwner::Identifier(id)).await?;
        Ok(identifier)
    }

    pub async fn update_identifier(&self, identifier: &Identifier) -> StoreResult<UpdateOutcome> {
        let tx = self.conn.begin().await.map_err(db_err)?;
        let Some(id) = find_identifier_id(&tx, identifier.customer_id).await? else {
            log::warn!(
                "update of missing identifier for customer {}",
                identifier.customer_id
            );
            return Ok(UpdateOutcome::NotFound);
        };
        let stmt = Query::update()
            .table(IdentifierTable::Table)
            .value(IdentifierTable::AliasName, identifier.alias_name.as_str())
            .and_where(Expr::col(IdentifierTable::Id).eq(id))
            .to_owned();
        exec(&tx, &stmt).await?;
        delete_children(&tx, id).await?;
        insert_children(&tx, id, identifier).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(UpdateOutcome::Updated)
    }

    /// Remove the customer's identifier if it has one.
    pub async fn delete_identifier(&self, customer_id: i32) -> StoreResult<()> {
        let tx = self.conn.begin().await.map_err(db_err)?;
        let Some(id) = find_identifier_id(&tx, customer_id).await? else {
            return Ok(());
        };
        delete_children(&tx, id).await?;
        let stmt = Query::delete()
            .from_table(IdentifierTable::Table)
            .and_where(Expr::col(IdentifierTable::Id).eq(id))
            .to_owned();
        exec(&tx, &stmt).await?;
        tx.commit().await.map_err(db_err)
    }
}

async fn find_identifier_id<C: ConnectionTrait>(
    conn: &C,
    customer_id: i32,
) -> StoreResult<Option<i64>> {
    let stmt = Query::select()
        .column(IdentifierTable::Id)
        .from(IdentifierTable::Table)
        .and_where(Expr::col(IdentifierTable::CustomerId).eq(customer_id))
        .to_owned();
    match query_one(conn, &stmt).await? {
        Some(row) => Ok(Some(
            row.try_get("", &col_name(IdentifierTable::Id))
                .map_err(db_err)?,
        )),
        None => Ok(None),
    }
}

async fn insert_children<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    identifier: &Identifier,
) -> StoreResult<()> {
    let owner = AttributeOwner::Identifier(id);
    attribute::insert_strings(conn, owner, AttributeKind::Fqdn, &identifier.fqdn).await?;
    attribute::insert_strings(conn, owner, AttributeKind::Uri, &identifier.uri).await?;
    attribute::insert_strings(conn, owner, AttributeKind::E164, &identifier.e164).await?;
    attribute::insert_ints(
        conn,
        owner,
        AttributeKind::TrafficProtocol,
        &identifier.traffic_protocol,
    )
    .await?;
    ranges::insert_prefixes(
        conn,
        PrefixOwner::Identifier(id),
        PrefixKind::Ip,
        &identifier.ip,
    )
    .await?;
    ranges::insert_prefixes(
        conn,
        PrefixOwner::Identifier(id),
        PrefixKind::Prefix,
        &identifier.prefix,
    )
    .await?;
    ranges::insert_port_ranges(conn, RangeOwner::Identifier(id), &identifier.port_ranges).await
}

async fn delete_children<C: ConnectionTrait>(conn: &C, id: i64) -> StoreResult<()> {
    attribute::delete_for_owner(conn, AttributeOwner::Identifier(id)).await?;
    ranges::delete_prefixes(conn, PrefixOwner::Identifier(id)).await?;
    ranges::delete_port_ranges(conn, RangeOwner::Identifier(id)).await
}
