use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use sea_orm::sea_query;
use sea_orm::sea_query::{
    MysqlQueryBuilder, PostgresQueryBuilder, QueryStatementWriter, SqliteQueryBuilder,
};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, QueryResult,
    Statement, TransactionTrait,
};

use moat_core::{StoreError, StoreResult};

use crate::config::MoatConfig;
use crate::connection::ConnectionManager;

/// Handle to the default aggregate database. Cloning shares the pool.
#[derive(Clone)]
pub struct MoatStore {
    pub(crate) conn: DatabaseConnection,
}

/// Outcome of an update against a natural key. Updating an aggregate that was
/// never created is not an error, but callers get to tell the two apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
}

impl UpdateOutcome {
    pub fn is_updated(self) -> bool {
        matches!(self, UpdateOutcome::Updated)
    }
}

impl MoatStore {
    pub async fn connect(config: &MoatConfig, base_dir: &Path) -> StoreResult<Self> {
        let mut manager = ConnectionManager::new(config.clone(), base_dir);
        Self::from_manager(&mut manager).await
    }

    /// Obtain a store over the manager's shared default handle.
    pub async fn from_manager(manager: &mut ConnectionManager) -> StoreResult<Self> {
        let conn = manager.connect(None).await?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Run `f` inside one transaction. Commits on `Ok`; an `Err` return rolls
    /// the transaction back and propagates.
    pub async fn with_transaction<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        )
            -> Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'c>>,
    {
        let tx = self.conn.begin().await.map_err(db_err)?;
        let value = f(&tx).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(value)
    }
}

pub(crate) fn db_err(err: sea_orm::DbErr) -> StoreError {
    StoreError::storage(err.to_string())
}

pub(crate) fn col_name(column: impl sea_query::Iden) -> String {
    column.to_string()
}

fn build_stmt<S: QueryStatementWriter>(
    backend: DatabaseBackend,
    stmt: &S,
) -> (String, sea_query::Values) {
    match backend {
        DatabaseBackend::Sqlite => stmt.build(SqliteQueryBuilder),
        DatabaseBackend::Postgres => stmt.build(PostgresQueryBuilder),
        DatabaseBackend::MySql => stmt.build(MysqlQueryBuilder),
    }
}

pub(crate) async fn exec<C, S>(conn: &C, stmt: &S) -> StoreResult<()>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    conn.execute(Statement::from_sql_and_values(backend, sql, values))
        .await
        .map_err(db_err)?;
    Ok(())
}

pub(crate) async fn query_all<C, S>(conn: &C, stmt: &S) -> StoreResult<Vec<QueryResult>>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    conn.query_all(Statement::from_sql_and_values(backend, sql, values))
        .await
        .map_err(db_err)
}

pub(crate) async fn query_one<C, S>(conn: &C, stmt: &S) -> StoreResult<Option<QueryResult>>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    conn.query_one(Statement::from_sql_and_values(backend, sql, values))
        .await
        .map_err(db_err)
}
