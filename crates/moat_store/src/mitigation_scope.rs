//! Mitigation scope aggregate persistence, keyed by
//! `(customer_id, mitigation_id)`.

use sea_orm::sea_query::{Expr, Order, Query};
use sea_orm::{ConnectionTrait, TransactionTrait};

use moat_core::{MitigationScope, MitigationStatus, StoreResult};

use crate::attribute::{self, AttributeKind, AttributeOwner};
use crate::db::MitigationScope as ScopeTable;
use crate::ranges::{self, PrefixKind, PrefixOwner, RangeOwner};
use crate::store::{col_name, db_err, exec, query_all, query_one, MoatStore, UpdateOutcome};

impl MoatStore {
    /// Create a mitigation scope, or rewrite it if its key already exists.
    pub async fn create_mitigation_scope(&self, scope: &MitigationScope) -> StoreResult<()> {
        if find_scope_id(&self.conn, scope.customer_id, scope.mitigation_id)
            .await?
            .is_some()
        {
            self.update_mitigation_scope(scope).await?;
            return Ok(());
        }
        let tx = self.conn.begin().await.map_err(db_err)?;
        let stmt = Query::insert()
            .into_table(ScopeTable::Table)
            .columns([
                ScopeTable::CustomerId,
                ScopeTable::MitigationId,
                ScopeTable::Lifetime,
                ScopeTable::Status,
            ])
            .values_panic([
                scope.customer_id.into(),
                scope.mitigation_id.into(),
                scope.lifetime.into(),
                scope.status.as_i32().into(),
            ])
            .to_owned();
        exec(&tx, &stmt).await?;
        let Some(id) = find_scope_id(&tx, scope.customer_id, scope.mitigation_id).await? else {
            return Err(moat_core::StoreError::storage(
                "mitigation scope row missing after insert",
            ));
        };
        insert_children(&tx, id, scope).await?;
        tx.commit().await.map_err(db_err)
    }

    /// Load a mitigation scope. A missing key yields the empty aggregate.
    pub async fn get_mitigation_scope(
        &self,
        customer_id: i32,
        mitigation_id: i32,
    ) -> StoreResult<MitigationScope> {
        let stmt = Query::select()
            .columns([ScopeTable::Id, ScopeTable::Lifetime, ScopeTable::Status])
            .from(ScopeTable::Table)
            .and_where(Expr::col(ScopeTable::CustomerId).eq(customer_id))
            .and_where(Expr::col(ScopeTable::MitigationId).eq(mitigation_id))
            .to_owned();
        let Some(row) = query_one(&self.conn, &stmt).await? else {
            return Ok(MitigationScope::default());
        };
        let id: i64 = row.try_get("", &col_name(ScopeTable::Id)).map_err(db_err)?;
        let lifetime: i32 = row
            .try_get("", &col_name(ScopeTable::Lifetime))
            .map_err(db_err)?;
        let status: i32 = row
            .try_get("", &col_name(ScopeTable::Status))
            .map_err(db_err)?;
        let mut scope = MitigationScope {
            customer_id,
            mitigation_id,
            lifetime,
            status: MitigationStatus::from_i32(status).unwrap_or_default(),
            ..MitigationScope::default()
        };
        let owner = AttributeOwner::MitigationScope(id);
        scope.fqdn = attribute::load_strings(&self.conn, owner, AttributeKind::Fqdn).await?;
        scope.uri = attribute::load_strings(&self.conn, owner, AttributeKind::Uri).await?;
        scope.e164 = attribute::load_strings(&self.conn, owner, AttributeKind::E164).await?;
        scope.alias = attribute::load_strings(&self.conn, owner, AttributeKind::Alias).await?;
        scope.target_protocol =
            attribute::load_ints(&self.conn, owner, AttributeKind::TargetProtocol).await?;
        scope.target_ip = ranges::load_prefixes(
            &self.conn,
            PrefixOwner::MitigationScope(id),
            PrefixKind::TargetIp,
        )
        .await?;
        scope.target_prefix = ranges::load_prefixes(
            &self.conn,
            PrefixOwner::MitigationScope(id),
            PrefixKind::TargetPrefix,
        )
        .await?;
        scope.target_port_ranges =
            ranges::load_port_ranges(&self.conn, RangeOwner::MitigationScope(id)).await?;
        Ok(scope)
    }

    /// All mitigation ids a customer has scopes for, oldest first.
    pub async fn mitigation_ids(&self, customer_id: i32) -> StoreResult<Vec<i32>> {
        let stmt = Query::select()
            .column(ScopeTable::MitigationId)
            .from(ScopeTable::Table)
            .and_where(Expr::col(ScopeTable::CustomerId).eq(customer_id))
            .order_by(ScopeTable::Id, Order::Asc)
            .to_owned();
        let rows = query_all(&self.conn, &stmt).await?;
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(
                row.try_get("", &col_name(ScopeTable::MitigationId))
                    .map_err(db_err)?,
            );
        }
        Ok(ids)
    }

    pub async fn update_mitigation_scope(
        &self,
        scope: &MitigationScope,
    ) -> StoreResult<UpdateOutcome> {
        let tx = self.conn.begin().await.map_err(db_err)?;
        let Some(id) = find_scope_id(&tx, scope.customer_id, scope.mitigation_id).await? else {
            log::warn!(
                "update of missing mitigation scope ({}, {})",
                scope.customer_id,
                scope.mitigation_id
            );
            return Ok(UpdateOutcome::NotFound);
        };
        let stmt = Query::update()
            .table(ScopeTable::Table)
            .value(ScopeTable::Lifetime, scope.lifetime)
            .value(ScopeTable::Status, scope.status.as_i32())
            .and_where(Expr::col(ScopeTable::Id).eq(id))
            .to_owned();
        exec(&tx, &stmt).await?;
        delete_children(&tx, id).await?;
        insert_children(&tx, id, scope).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(UpdateOutcome::Updated)
    }

    /// Flip only the status column, leaving children untouched.
    pub async fn update_mitigation_scope_status(
        &self,
        customer_id: i32,
        mitigation_id: i32,
        status: MitigationStatus,
    ) -> StoreResult<UpdateOutcome> {
        let Some(id) = find_scope_id(&self.conn, customer_id, mitigation_id).await? else {
            return Ok(UpdateOutcome::NotFound);
        };
        let stmt = Query::update()
            .table(ScopeTable::Table)
            .value(ScopeTable::Status, status.as_i32())
            .and_where(Expr::col(ScopeTable::Id).eq(id))
            .to_owned();
        exec(&self.conn, &stmt).await?;
        Ok(UpdateOutcome::Updated)
    }

    /// Remove a scope and its children. Missing keys are a no-op.
    pub async fn delete_mitigation_scope(
        &self,
        customer_id: i32,
        mitigation_id: i32,
    ) -> StoreResult<()> {
        let tx = self.conn.begin().await.map_err(db_err)?;
        let Some(id) = find_scope_id(&tx, customer_id, mitigation_id).await? else {
            return Ok(());
        };
        delete_children(&tx, id).await?;
        let stmt = Query::delete()
            .from_table(ScopeTable::Table)
            .and_where(Expr::col(ScopeTable::Id).eq(id))
            .to_owned();
        exec(&tx, &stmt).await?;
        tx.commit().await.map_err(db_err)
    }
}

async fn find_scope_id<C: ConnectionTrait>(
    conn: &C,
    customer_id: i32,
    mitigation_id: i32,
) -> StoreResult<Option<i64>> {
    let stmt = Query::select()
        .column(ScopeTable::Id)
        .from(ScopeTable::Table)
        .and_where(Expr::col(ScopeTable::CustomerId).eq(customer_id))
        .and_where(Expr::col(ScopeTable::MitigationId).eq(mitigation_id))
        .to_owned();
    match query_one(conn, &stmt).await? {
        Some(row) => Ok(Some(
            row.try_get("", &col_name(ScopeTable::Id)).map_err(db_err)?,
        )),
        None => Ok(None),
    }
}

async fn insert_children<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    scope: &MitigationScope,
) -> StoreResult<()> {
    let owner = AttributeOwner::MitigationScope(id);
    attribute::insert_strings(conn, owner, AttributeKind::Fqdn, &scope.fqdn).await?;
    attribute::insert_strings(conn, owner, AttributeKind::Uri, &scope.uri).await?;
    attribute::insert_strings(conn, owner, AttributeKind::E164, &scope.e164).await?;
    attribute::insert_strings(conn, owner, AttributeKind::Alias, &scope.alias).await?;
    attribute::insert_ints(
        conn,
        owner,
        AttributeKind::TargetProtocol,
        &scope.target_protocol,
    )
    .await?;
    ranges::insert_prefixes(
        conn,
        PrefixOwner::MitigationScope(id),
        PrefixKind::TargetIp,
        &scope.target_ip,
    )
    .await?;
    ranges::insert_prefixes(
        conn,
        PrefixOwner::MitigationScope(id),
        PrefixKind::TargetPrefix,
        &scope.target_prefix,
    )
    .await?;
    ranges::insert_port_ranges(conn, RangeOwner::MitigationScope(id), &scope.target_port_ranges)
        .await
}

async fn delete_children<C: ConnectionTrait>(conn: &C, id: i64) -> StoreResult<()> {
    attribute::delete_for_owner(conn, AttributeOwner::MitigationScope(id)).await?;
    ranges::delete_prefixes(conn, PrefixOwner::MitigationScope(id)).await?;
    ranges::delete_port_ranges(conn, RangeOwner::MitigationScope(id)).await
}
