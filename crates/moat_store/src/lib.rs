//! Relational persistence for the mitigation-coordination service: customer,
//! identifier, mitigation scope, access list and session configuration
//! aggregates in the default database, plus read access to the traffic
//! meter's flow-accounting database.

pub mod accounting;
pub mod attribute;
pub mod config;
pub mod connection;
pub mod db;
pub mod migration;
pub mod ranges;
pub mod store;

mod acl;
mod customer;
mod identifier;
mod mitigation_scope;
mod session_config;

pub use accounting::AcctStore;
pub use attribute::{AttributeKind, AttributeOwner};
pub use config::{
    DatabaseConfig, MoatConfig, PoolConfig, ACCOUNTING_DATABASE, DEFAULT_DATABASE,
};
pub use connection::ConnectionManager;
pub use ranges::{PrefixKind, PrefixOwner, RangeOwner};
pub use store::{MoatStore, UpdateOutcome};

pub use moat_core::{StoreError, StoreResult};
