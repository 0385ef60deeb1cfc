//! # Record Store Gateway
//!
//! The bot keeps no durable state of its own. Every row lives in a hosted
//! Postgres database, reached either through its REST endpoint
//! ([`RestStore`]) or through a direct connection ([`PgStore`]).
//!
//! Handlers only see the [`RecordStore`] trait, so tests substitute an
//! in-memory fake. Backend failures are plain `anyhow` errors; the command
//! handler decides how much of them reaches the user (nothing).

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::StoreConfig;
use crate::models::{Member, MemberQuery, NewExplanation, NewMember, RosterEntry};

pub mod postgres;
pub mod rest;

pub use postgres::{init_database_schema, PgStore};
pub use rest::RestStore;

pub const MEMBERS_TABLE: &str = "members";
pub const EXPLANATIONS_TABLE: &str = "explanations";
pub const ROSTER_TABLE: &str = "group_members";

/// Append-only access to the roster tables
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a member and return it with its assigned id
    async fn insert_member(&self, member: &NewMember) -> Result<Member>;

    /// Members matching `query`, ordered by id
    async fn find_members(&self, query: &MemberQuery) -> Result<Vec<Member>>;

    /// Insert an explanation and return its id
    async fn insert_explanation(&self, explanation: &NewExplanation) -> Result<i64>;

    /// Users saved for broadcast alerts in one chat
    async fn list_roster(&self, scope_id: i64) -> Result<Vec<RosterEntry>>;
}

/// Pick the backend for this configuration
///
/// A direct `DATABASE_URL` wins over the REST endpoint; the schema is
/// created on first connection in that case.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn RecordStore>> {
    match &config.database_url {
        Some(database_url) => {
            info!("Using direct Postgres record store");
            let store = PgStore::connect(database_url).await?;
            init_database_schema(store.pool()).await?;
            Ok(Arc::new(store))
        }
        None => {
            info!(url = %config.url, "Using REST record store");
            Ok(Arc::new(RestStore::new(&config.url, &config.key)?))
        }
    }
}
