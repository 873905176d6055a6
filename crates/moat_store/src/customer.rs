//! Customer aggregate persistence.

use sea_orm::sea_query::{Expr, Order, Query};
use sea_orm::{ConnectionTrait, TransactionTrait};

use moat_core::{Customer, StoreResult};

use crate::attribute::{self, AttributeKind, AttributeOwner};
use crate::db::{Customer as CustomerTable, CustomerCommonName};
use crate::ranges::{self, PrefixKind, PrefixOwner};
use crate::store::{col_name, db_err, exec, query_all, query_one, MoatStore, UpdateOutcome};

impl MoatStore {
    /// Create a customer, or rewrite it if the id is already taken.
    pub async fn create_customer(&self, customer: &Customer) -> StoreResult<()> {
        if customer_exists(&self.conn, customer.id).await? {
            self.update_customer(customer).await?;
            return Ok(());
        }
        let tx = self.conn.begin().await.map_err(db_err)?;
        let stmt = Query::insert()
            .into_table(CustomerTable::Table)
            .columns([CustomerTable::Id, CustomerTable::Name])
            .values_panic([customer.id.into(), customer.name.as_str().into()])
            .to_owned();
        exec(&tx, &stmt).await?;
        insert_children(&tx, customer).await?;
        tx.commit().await.map_err(db_err)
    }

    /// Load a customer by id. A missing id yields the empty aggregate.
    pub async fn get_customer(&self, customer_id: i32) -> StoreResult<Customer> {
        let stmt = Query::select()
            .column(CustomerTable::Name)
            .from(CustomerTable::Table)
            .and_where(Expr::col(CustomerTable::Id).eq(customer_id))
            .to_owned();
        let Some(row) = query_one(&self.conn, &stmt).await? else {
            return Ok(Customer::default());
        };
        let name: String = row
            .try_get("", &col_name(CustomerTable::Name))
            .map_err(db_err)?;
        self.load_customer(customer_id, name).await
    }

    /// Look a customer up by one of its certificate common names.
    pub async fn get_customer_by_common_name(&self, common_name: &str) -> StoreResult<Customer> {
        let stmt = Query::select()
            .column(CustomerCommonName::CustomerId)
            .from(CustomerCommonName::Table)
            .and_where(Expr::col(CustomerCommonName::CommonName).eq(common_name))
            .limit(1)
            .to_owned();
        let Some(row) = query_one(&self.conn, &stmt).await? else {
            return Ok(Customer::default());
        };
        let customer_id: i32 = row
            .try_get("", &col_name(CustomerCommonName::CustomerId))
            .map_err(db_err)?;
        self.get_customer(customer_id).await
    }

    /// Rewrite an existing customer: the root row is updated in place and
    /// every child row is deleted and reinserted from the aggregate.
    pub async fn update_customer(&self, customer: &Customer) -> StoreResult<UpdateOutcome> {
        let tx = self.conn.begin().await.map_err(db_err)?;
        if !customer_exists(&tx, customer.id).await? {
            log::warn!("update of missing customer {}", customer.id);
            return Ok(UpdateOutcome::NotFound);
        }
        let stmt = Query::update()
            .table(CustomerTable::Table)
            .value(CustomerTable::Name, customer.name.as_str())
            .and_where(Expr::col(CustomerTable::Id).eq(customer.id))
            .to_owned();
        exec(&tx, &stmt).await?;
        delete_children(&tx, customer.id).await?;
        insert_children(&tx, customer).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(UpdateOutcome::Updated)
    }

    /// Remove a customer and all of its children. Deleting an id that does
    /// not exist is a no-op.
    pub async fn delete_customer(&self, customer_id: i32) -> StoreResult<()> {
        let tx = self.conn.begin().await.map_err(db_err)?;
        delete_children(&tx, customer_id).await?;
        let stmt = Query::delete()
            .from_table(CustomerTable::Table)
            .and_where(Expr::col(CustomerTable::Id).eq(customer_id))
            .to_owned();
        exec(&tx, &stmt).await?;
        tx.commit().await.map_err(db_err)
    }

    async fn load_customer(&self, customer_id: i32, name: String) -> StoreResult<Customer> {
        let mut customer = Customer {
            id: customer_id,
            name,
            ..Customer::default()
        };
        let stmt = Query::select()
            .column(CustomerCommonName::CommonName)
            .from(CustomerCommonName::Table)
            .and_where(Expr::col(CustomerCommonName::CustomerId).eq(customer_id))
            .order_by(CustomerCommonName::Id, Order::Asc)
            .to_owned();
        for row in query_all(&self.conn, &stmt).await? {
            let common_name: String = row
                .try_get("", &col_name(CustomerCommonName::CommonName))
                .map_err(db_err)?;
            customer.common_names.insert(common_name);
        }
        let owner = AttributeOwner::Customer(customer_id);
        customer.network_info.fqdn =
            attribute::load_strings(&self.conn, owner, AttributeKind::Fqdn).await?;
        customer.network_info.uri =
            attribute::load_strings(&self.conn, owner, AttributeKind::Uri).await?;
        customer.network_info.e164 =
            attribute::load_strings(&self.conn, owner, AttributeKind::E164).await?;
        customer.network_info.address_ranges = ranges::load_prefixes(
            &self.conn,
            PrefixOwner::Customer(customer_id),
            PrefixKind::AddressRange,
        )
        .await?;
        Ok(customer)
    }
}

async fn customer_exists<C: ConnectionTrait>(conn: &C, customer_id: i32) -> StoreResult<bool> {
    let stmt = Query::select()
        .column(CustomerTable::Id)
        .from(CustomerTable::Table)
        .and_where(Expr::col(CustomerTable::Id).eq(customer_id))
        .to_owned();
    Ok(query_one(conn, &stmt).await?.is_some())
}

async fn insert_children<C: ConnectionTrait>(conn: &C, customer: &Customer) -> StoreResult<()> {
    for common_name in &customer.common_names {
        let stmt = Query::insert()
            .into_table(CustomerCommonName::Table)
            .columns([CustomerCommonName::CustomerId, CustomerCommonName::CommonName])
            .values_panic([customer.id.into(), common_name.as_str().into()])
            .to_owned();
        exec(conn, &stmt).await?;
    }
    let owner = AttributeOwner::Customer(customer.id);
    attribute::insert_strings(conn, owner, AttributeKind::Fqdn, &customer.network_info.fqdn)
        .await?;
    attribute::insert_strings(conn, owner, AttributeKind::Uri, &customer.network_info.uri).await?;
    attribute::insert_strings(conn, owner, AttributeKind::E164, &customer.network_info.e164)
        .await?;
    ranges::insert_prefixes(
        conn,
        PrefixOwner::Customer(customer.id),
        PrefixKind::AddressRange,
        &customer.network_info.address_ranges,
    )
    .await
}

async fn delete_children<C: ConnectionTrait>(conn: &C, customer_id: i32) -> StoreResult<()> {
    let stmt = Query::delete()
        .from_table(CustomerCommonName::Table)
        .and_where(Expr::col(CustomerCommonName::CustomerId).eq(customer_id))
        .to_owned();
    exec(conn, &stmt).await?;
    attribute::delete_for_owner(conn, AttributeOwner::Customer(customer_id)).await?;
    ranges::delete_prefixes(conn, PrefixOwner::Customer(customer_id)).await
}
