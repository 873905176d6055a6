//! Signal session configuration persistence, keyed by
//! `(customer_id, session_id)`. Scalar columns only, so no child rewrite.

use sea_orm::sea_query::{Expr, Query};
use sea_orm::ConnectionTrait;

use moat_core::{SignalSessionConfiguration, StoreResult};

use crate::db::SignalSessionConfiguration as SessionTable;
use crate::store::{col_name, db_err, exec, query_one, MoatStore, UpdateOutcome};

impl MoatStore {
    /// Create a session configuration, or rewrite it if its key exists.
    pub async fn create_signal_session_configuration(
        &self,
        config: &SignalSessionConfiguration,
    ) -> StoreResult<()> {
        if find_session_id(&self.conn, config.customer_id, config.session_id)
            .await?
            .is_some()
        {
            self.update_signal_session_configuration(config).await?;
            return Ok(());
        }
        let stmt = Query::insert()
            .into_table(SessionTable::Table)
            .columns([
                SessionTable::CustomerId,
                SessionTable::SessionId,
                SessionTable::HeartbeatInterval,
                SessionTable::MissingHbAllowed,
                SessionTable::MaxRetransmit,
                SessionTable::AckTimeout,
                SessionTable::AckRandomFactor,
                SessionTable::TriggerMitigation,
            ])
            .values_panic([
                config.customer_id.into(),
                config.session_id.into(),
                config.heartbeat_interval.into(),
                config.missing_hb_allowed.into(),
                config.max_retransmit.into(),
                config.ack_timeout.into(),
                config.ack_random_factor.into(),
                config.trigger_mitigation.into(),
            ])
            .to_owned();
        exec(&self.conn, &stmt).await
    }

    /// Load a session configuration. A missing key yields the empty
    /// aggregate.
    pub async fn get_signal_session_configuration(
        &self,
        customer_id: i32,
        session_id: i32,
    ) -> StoreResult<SignalSessionConfiguration> {
        let stmt = Query::select()
            .columns([
                SessionTable::HeartbeatInterval,
                SessionTable::MissingHbAllowed,
                SessionTable::MaxRetransmit,
                SessionTable::AckTimeout,
                SessionTable::AckRandomFactor,
                SessionTable::TriggerMitigation,
            ])
            .from(SessionTable::Table)
            .and_where(Expr::col(SessionTable::CustomerId).eq(customer_id))
            .and_where(Expr::col(SessionTable::SessionId).eq(session_id))
            .to_owned();
        let Some(row) = query_one(&self.conn, &stmt).await? else {
            return Ok(SignalSessionConfiguration::default());
        };
        Ok(SignalSessionConfiguration {
            customer_id,
            session_id,
            heartbeat_interval: row
                .try_get("", &col_name(SessionTable::HeartbeatInterval))
                .map_err(db_err)?,
            missing_hb_allowed: row
                .try_get("", &col_name(SessionTable::MissingHbAllowed))
                .map_err(db_err)?,
            max_retransmit: row
                .try_get("", &col_name(SessionTable::MaxRetransmit))
                .map_err(db_err)?,
            ack_timeout: row
                .try_get("", &col_name(SessionTable::AckTimeout))
                .map_err(db_err)?,
            ack_random_factor: row
                .try_get("", &col_name(SessionTable::AckRandomFactor))
                .map_err(db_err)?,
            trigger_mitigation: row
                .try_get("", &col_name(SessionTable::TriggerMitigation))
                .map_err(db_err)?,
        })
    }

    pub async fn update_signal_session_configuration(
        &self,
        config: &SignalSessionConfiguration,
    ) -> StoreResult<UpdateOutcome> {
        let Some(id) = find_session_id(&self.conn, config.customer_id, config.session_id).await?
        else {
            log::warn!(
                "update of missing session configuration ({}, {})",
                config.customer_id,
                config.session_id
            );
            return Ok(UpdateOutcome::NotFound);
        };
        let stmt = Query::update()
            .table(SessionTable::Table)
            .value(SessionTable::HeartbeatInterval, config.heartbeat_interval)
            .value(SessionTable::MissingHbAllowed, config.missing_hb_allowed)
            .value(SessionTable::MaxRetransmit, config.max_retransmit)
            .value(SessionTable::AckTimeout, config.ack_timeout)
            .value(SessionTable::AckRandomFactor, config.ack_random_factor)
            .value(SessionTable::TriggerMitigation, config.trigger_mitigation)
            .and_where(Expr::col(SessionTable::Id).eq(id))
            .to_owned();
        exec(&self.conn, &stmt).await?;
        Ok(UpdateOutcome::Updated)
    }

    /// Remove every session configuration a customer holds. Missing customers
    /// are a no-op.
    pub async fn delete_signal_session_configurations(
        &self,
        customer_id: i32,
    ) -> StoreResult<()> {
        let stmt = Query::delete()
            .from_table(SessionTable::Table)
            .and_where(Expr::col(SessionTable::CustomerId).eq(customer_id))
            .to_owned();
        exec(&self.conn, &stmt).await
    }
}

async fn find_session_id<C: ConnectionTrait>(
    conn: &C,
    customer_id: i32,
    session_id: i32,
) -> StoreResult<Option<i64>> {
    let stmt = Query::select()
        .column(SessionTable::Id)
        .from(SessionTable::Table)
        .and_where(Expr::col(SessionTable::CustomerId).eq(customer_id))
        .and_where(Expr::col(SessionTable::SessionId).eq(session_id))
        .to_owned();
    match query_one(conn, &stmt).await? {
        Some(row) => Ok(Some(
            row.try_get("", &col_name(SessionTable::Id)).map_err(db_err)?,
        )),
        None => Ok(None),
    }
}
