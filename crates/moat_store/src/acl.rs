//! Access control list aggregate persistence. One list per customer; each
//! entry carries its network match as owned prefix rows and its forwarding
//! actions as typed action rows.

use sea_orm::sea_query::{Expr, Order, Query};
use sea_orm::{ConnectionTrait, TransactionTrait};

use moat_core::{AccessControlList, Ace, StoreResult};

use crate::db::{AccessControlList as AclTable, AccessControlListEntry, AclRuleAction};
use crate::ranges::{self, PrefixKind, PrefixOwner};
use crate::store::{col_name, db_err, exec, query_all, query_one, MoatStore, UpdateOutcome};

#[derive(Clone, Copy)]
enum ActionKind {
    Deny,
    Permit,
    RateLimit,
}

impl ActionKind {
    fn as_str(self) -> &'static str {
        match self {
            ActionKind::Deny => "DENY",
            ActionKind::Permit => "PERMIT",
            ActionKind::RateLimit => "RATE_LIMIT",
        }
    }
}

impl MoatStore {
    /// Create a customer's access control list, or rewrite the existing one.
    pub async fn create_access_control_list(&self, acl: &AccessControlList) -> StoreResult<()> {
        if find_acl_id(&self.conn, acl.customer_id).await?.is_some() {
            self.update_access_control_list(acl).await?;
            return Ok(());
        }
        let tx = self.conn.begin().await.map_err(db_err)?;
        let stmt = Query::insert()
            .into_table(AclTable::Table)
            .columns([AclTable::CustomerId, AclTable::Name, AclTable::Type])
            .values_panic([
                acl.customer_id.into(),
                acl.acl_name.as_str().into(),
                acl.acl_type.as_str().into(),
            ])
            .to_owned();
        exec(&tx, &stmt).await?;
        let Some(id) = find_acl_id(&tx, acl.customer_id).await? else {
            return Err(moat_core::StoreError::storage(
                "access control list row missing after insert",
            ));
        };
        insert_entries(&tx, id, acl).await?;
        tx.commit().await.map_err(db_err)
    }

    /// Load the customer's access control list. A customer without one yields
    /// the empty aggregate. Entries whose network rows are gone are skipped.
    pub async fn get_access_control_list(
        &self,
        customer_id: i32,
    ) -> StoreResult<AccessControlList> {
        let stmt = Query::select()
            .columns([AclTable::Id, AclTable::Name, AclTable::Type])
            .from(AclTable::Table)
            .and_where(Expr::col(AclTable::CustomerId).eq(customer_id))
            .to_owned();
        let Some(row) = query_one(&self.conn, &stmt).await? else {
            return Ok(AccessControlList::default());
        };
        let id: i64 = row.try_get("", &col_name(AclTable::Id)).map_err(db_err)?;
        let mut acl = AccessControlList {
            customer_id,
            acl_name: row.try_get("", &col_name(AclTable::Name)).map_err(db_err)?,
            acl_type: row.try_get("", &col_name(AclTable::Type)).map_err(db_err)?,
            entries: Vec::new(),
        };
        let stmt = Query::select()
            .columns([AccessControlListEntry::Id, AccessControlListEntry::RuleName])
            .from(AccessControlListEntry::Table)
            .and_where(Expr::col(AccessControlListEntry::AccessControlListId).eq(id))
            .order_by(AccessControlListEntry::Id, Order::Asc)
            .to_owned();
        for row in query_all(&self.conn, &stmt).await? {
            let entry_id: i64 = row
                .try_get("", &col_name(AccessControlListEntry::Id))
                .map_err(db_err)?;
            let rule_name: String = row
                .try_get("", &col_name(AccessControlListEntry::RuleName))
                .map_err(db_err)?;
            match self.load_entry(entry_id, rule_name).await? {
                Some(ace) => acl.entries.push(ace),
                None => log::warn!("skipping acl entry {entry_id}: network rows missing"),
            }
        }
        Ok(acl)
    }

    pub async fn update_access_control_list(
        &self,
        acl: &AccessControlList,
    ) -> StoreResult<UpdateOutcome> {
        let tx = self.conn.begin().await.map_err(db_err)?;
        let Some(id) = find_acl_id(&tx, acl.customer_id).await? else {
            log::warn!(
                "update of missing access control list for customer {}",
                acl.customer_id
            );
            return Ok(UpdateOutcome::NotFound);
        };
        let stmt = Query::update()
            .table(AclTable::Table)
            .value(AclTable::Name, acl.acl_name.as_str())
            .value(AclTable::Type, acl.acl_type.as_str())
            .and_where(Expr::col(AclTable::Id).eq(id))
            .to_owned();
        exec(&tx, &stmt).await?;
        delete_entries(&tx, id).await?;
        insert_entries(&tx, id, acl).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(UpdateOutcome::Updated)
    }

    /// Remove the customer's access control list if it has one.
    pub async fn delete_access_control_list(&self, customer_id: i32) -> StoreResult<()> {
        let tx = self.conn.begin().await.map_err(db_err)?;
        let Some(id) = find_acl_id(&tx, customer_id).await? else {
            return Ok(());
        };
        delete_entries(&tx, id).await?;
        let stmt = Query::delete()
            .from_table(AclTable::Table)
            .and_where(Expr::col(AclTable::Id).eq(id))
            .to_owned();
        exec(&tx, &stmt).await?;
        tx.commit().await.map_err(db_err)
    }

    async fn load_entry(&self, entry_id: i64, rule_name: String) -> StoreResult<Option<Ace>> {
        let owner = PrefixOwner::AclEntry(entry_id);
        let mut sources =
            ranges::load_prefixes(&self.conn, owner, PrefixKind::SourceNetwork).await?;
        let mut destinations =
            ranges::load_prefixes(&self.conn, owner, PrefixKind::DestinationNetwork).await?;
        let (Some(source_network), Some(destination_network)) =
            (sources.pop(), destinations.pop())
        else {
            return Ok(None);
        };
        Ok(Some(Ace {
            rule_name,
            source_network,
            destination_network,
            deny_actions: self.load_actions(entry_id, ActionKind::Deny).await?,
            permit_actions: self.load_actions(entry_id, ActionKind::Permit).await?,
            rate_limit_actions: self.load_actions(entry_id, ActionKind::RateLimit).await?,
        }))
    }

    async fn load_actions(&self, entry_id: i64, kind: ActionKind) -> StoreResult<Vec<String>> {
        let stmt = Query::select()
            .column(AclRuleAction::Action)
            .from(AclRuleAction::Table)
            .and_where(Expr::col(AclRuleAction::AccessControlListEntryId).eq(entry_id))
            .and_where(Expr::col(AclRuleAction::Type).eq(kind.as_str()))
            .order_by(AclRuleAction::Id, Order::Asc)
            .to_owned();
        let rows = query_all(&self.conn, &stmt).await?;
        let mut actions = Vec::with_capacity(rows.len());
        for row in rows {
            actions.push(
                row.try_get("", &col_name(AclRuleAction::Action))
                    .map_err(db_err)?,
            );
        }
        Ok(actions)
    }
}

async fn find_acl_id<C: ConnectionTrait>(conn: &C, customer_id: i32) -> StoreResult<Option<i64>> {
    let stmt = Query::select()
        .column(AclTable::Id)
        .from(AclTable::Table)
        .and_where(Expr::col(AclTable::CustomerId).eq(customer_id))
        .to_owned();
    match query_one(conn, &stmt).await? {
        Some(row) => Ok(Some(
            row.try_get("", &col_name(AclTable::Id)).map_err(db_err)?,
        )),
        None => Ok(None),
    }
}

async fn insert_entries<C: ConnectionTrait>(
    conn: &C,
    acl_id: i64,
    acl: &AccessControlList,
) -> StoreResult<()> {
    for entry in &acl.entries {
        let stmt = Query::insert()
            .into_table(AccessControlListEntry::Table)
            .columns([
                AccessControlListEntry::AccessControlListId,
                AccessControlListEntry::RuleName,
            ])
            .values_panic([acl_id.into(), entry.rule_name.as_str().into()])
            .to_owned();
        exec(conn, &stmt).await?;
        let entry_id = last_entry_id(conn, acl_id).await?;
        let owner = PrefixOwner::AclEntry(entry_id);
        ranges::insert_prefixes(
            conn,
            owner,
            PrefixKind::SourceNetwork,
            std::slice::from_ref(&entry.source_network),
        )
        .await?;
        ranges::insert_prefixes(
            conn,
            owner,
            PrefixKind::DestinationNetwork,
            std::slice::from_ref(&entry.destination_network),
        )
        .await?;
        insert_actions(conn, entry_id, ActionKind::Deny, &entry.deny_actions).await?;
        insert_actions(conn, entry_id, ActionKind::Permit, &entry.permit_actions).await?;
        insert_actions(conn, entry_id, ActionKind::RateLimit, &entry.rate_limit_actions).await?;
    }
    Ok(())
}

/// Id of the entry row just inserted for this list. Runs inside the same
/// transaction as the insert, so the max id is the new row's.
async fn last_entry_id<C: ConnectionTrait>(conn: &C, acl_id: i64) -> StoreResult<i64> {
    let stmt = Query::select()
        .column(AccessControlListEntry::Id)
        .from(AccessControlListEntry::Table)
        .and_where(Expr::col(AccessControlListEntry::AccessControlListId).eq(acl_id))
        .order_by(AccessControlListEntry::Id, Order::Desc)
        .limit(1)
        .to_owned();
    match query_one(conn, &stmt).await? {
        Some(row) => row
            .try_get("", &col_name(AccessControlListEntry::Id))
            .map_err(db_err),
        None => Err(moat_core::StoreError::storage(
            "acl entry row missing after insert",
        )),
    }
}

async fn insert_actions<C: ConnectionTrait>(
    conn: &C,
    entry_id: i64,
    kind: ActionKind,
    actions: &[String],
) -> StoreResult<()> {
    for action in actions {
        let stmt = Query::insert()
            .into_table(AclRuleAction::Table)
            .columns([
                AclRuleAction::AccessControlListEntryId,
                AclRuleAction::Type,
                AclRuleAction::Action,
            ])
            .values_panic([
                entry_id.into(),
                kind.as_str().into(),
                action.as_str().into(),
            ])
            .to_owned();
        exec(conn, &stmt).await?;
    }
    Ok(())
}

async fn delete_entries<C: ConnectionTrait>(conn: &C, acl_id: i64) -> StoreResult<()> {
    let stmt = Query::select()
        .column(AccessControlListEntry::Id)
        .from(AccessControlListEntry::Table)
        .and_where(Expr::col(AccessControlListEntry::AccessControlListId).eq(acl_id))
        .to_owned();
    for row in query_all(conn, &stmt).await? {
        let entry_id: i64 = row
            .try_get("", &col_name(AccessControlListEntry::Id))
            .map_err(db_err)?;
        ranges::delete_prefixes(conn, PrefixOwner::AclEntry(entry_id)).await?;
        let stmt = Query::delete()
            .from_table(AclRuleAction::Table)
            .and_where(Expr::col(AclRuleAction::AccessControlListEntryId).eq(entry_id))
            .to_owned();
        exec(conn, &stmt).await?;
    }
    let stmt = Query::delete()
        .from_table(AccessControlListEntry::Table)
        .and_where(Expr::col(AccessControlListEntry::AccessControlListId).eq(acl_id))
        .to_owned();
    exec(conn, &stmt).await
}
