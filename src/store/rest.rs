//! REST backend speaking the PostgREST dialect of the hosted database.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{RecordStore, EXPLANATIONS_TABLE, MEMBERS_TABLE, ROSTER_TABLE};
use crate::config::REST_PAGE_SIZE;
use crate::models::{Member, MemberQuery, NewExplanation, NewMember, RosterEntry};

#[derive(Debug, Deserialize)]
struct InsertedId {
    id: i64,
}

/// Record store backed by `<url>/rest/v1/<table>`
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    page_size: usize,
}

impl RestStore {
    /// Build a client that sends the service key on every request
    pub fn new(url: &str, key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key).context("Store key is not a valid header value")?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .context("Store key is not a valid header value")?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build store HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            page_size: REST_PAGE_SIZE,
        })
    }

    /// Rows requested per page; must not exceed the server's max-rows
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    /// POST one row and return the representation the server sends back
    async fn insert_returning<T, R>(&self, table: &str, row: &T) -> Result<R>
    where
        T: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned + Send,
    {
        let rows: Vec<R> = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .with_context(|| format!("Insert into {table} failed"))?
            .error_for_status()
            .with_context(|| format!("Insert into {table} rejected"))?
            .json()
            .await
            .with_context(|| format!("Insert into {table} returned an unreadable body"))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {table} returned no rows"))
    }

    /// GET every matching row, one `limit`/`offset` page at a time
    ///
    /// The server truncates large responses silently, so a full page means
    /// another one may follow. `filters` must impose a stable order.
    async fn select<R>(&self, table: &str, filters: &[(&str, String)]) -> Result<Vec<R>>
    where
        R: serde::de::DeserializeOwned + Send,
    {
        let mut rows: Vec<R> = Vec::new();
        loop {
            let mut query = filters.to_vec();
            query.push(("limit", self.page_size.to_string()));
            query.push(("offset", rows.len().to_string()));

            let page: Vec<R> = self
                .client
                .get(self.table_url(table))
                .query(&query)
                .send()
                .await
                .with_context(|| format!("Query on {table} failed"))?
                .error_for_status()
                .with_context(|| format!("Query on {table} rejected"))?
                .json()
                .await
                .with_context(|| format!("Query on {table} returned an unreadable body"))?;

            let fetched = page.len();
            rows.extend(page);
            if fetched < self.page_size {
                break;
            }
        }

        debug!(table, rows = rows.len(), "Query complete");
        Ok(rows)
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn insert_member(&self, member: &NewMember) -> Result<Member> {
        let stored: Member = self.insert_returning(MEMBERS_TABLE, member).await?;
        debug!(member_id = stored.id, "Member row inserted");
        Ok(stored)
    }

    async fn find_members(&self, query: &MemberQuery) -> Result<Vec<Member>> {
        let mut filters = vec![("select", "*".to_string()), ("order", "id.asc".to_string())];
        if let Some(scope_id) = query.scope_id {
            filters.push(("scope_id", format!("eq.{scope_id}")));
        }

        // Class filter is applied locally: `ilike` treats `*` and `%` in labels as wildcards
        let rows: Vec<Member> = self.select(MEMBERS_TABLE, &filters).await?;
        Ok(rows.into_iter().filter(|m| query.matches(m)).collect())
    }

    async fn insert_explanation(&self, explanation: &NewExplanation) -> Result<i64> {
        let inserted: InsertedId = self
            .insert_returning(EXPLANATIONS_TABLE, explanation)
            .await?;
        Ok(inserted.id)
    }

    async fn list_roster(&self, scope_id: i64) -> Result<Vec<RosterEntry>> {
        let filters = [
            ("select", "scope_id,user_id".to_string()),
            ("order", "user_id.asc".to_string()),
            ("scope_id", format!("eq.{scope_id}")),
        ];
        self.select(ROSTER_TABLE, &filters).await
    }
}
