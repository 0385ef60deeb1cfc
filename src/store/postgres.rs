use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::info;

use super::RecordStore;
use crate::models::{Member, MemberQuery, NewExplanation, NewMember, RosterEntry};

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS members (
            id BIGSERIAL PRIMARY KEY,
            scope_id BIGINT,
            first_name TEXT NOT NULL,
            class TEXT NOT NULL,
            age BIGINT NOT NULL CHECK (age BETWEEN 5 AND 120),
            added_by BIGINT NOT NULL,
            created_at TIMESTAMPTZ DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create members table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_members_scope_class ON members (scope_id, LOWER(class))")
        .execute(pool)
        .await
        .context("Failed to create members index")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS explanations (
            id BIGSERIAL PRIMARY KEY,
            topic TEXT NOT NULL,
            word_limit BIGINT NOT NULL,
            user_id BIGINT NOT NULL,
            scope_id BIGINT,
            response TEXT NOT NULL,
            created_at TIMESTAMPTZ DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create explanations table")?;

    // Populated outside the bot; created here so reads never fail on a fresh database
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS group_members (
            scope_id BIGINT NOT NULL,
            user_id BIGINT NOT NULL,
            PRIMARY KEY (scope_id, user_id)
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create group_members table")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Record store over a direct Postgres connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert_member(&self, member: &NewMember) -> Result<Member> {
        info!(added_by = member.added_by, "Creating new member");

        let stored = sqlx::query_as::<_, Member>(
            "INSERT INTO members (scope_id, first_name, class, age, added_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, scope_id, first_name, class, age, added_by, created_at",
        )
        .bind(member.scope_id)
        .bind(&member.first_name)
        .bind(&member.class_name)
        .bind(member.age)
        .bind(member.added_by)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert new member")?;

        info!(member_id = stored.id, "Member created");
        Ok(stored)
    }

    async fn find_members(&self, query: &MemberQuery) -> Result<Vec<Member>> {
        sqlx::query_as::<_, Member>(
            "SELECT id, scope_id, first_name, class, age, added_by, created_at
             FROM members
             WHERE ($1::BIGINT IS NULL OR scope_id = $1)
               AND ($2::TEXT IS NULL OR LOWER(class) = LOWER($2))
             ORDER BY id",
        )
        .bind(query.scope_id)
        .bind(query.class_name.as_deref())
        .fetch_all(&self.pool)
        .await
        .context("Failed to query members")
    }

    async fn insert_explanation(&self, explanation: &NewExplanation) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO explanations (topic, word_limit, user_id, scope_id, response)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&explanation.topic)
        .bind(explanation.word_limit)
        .bind(explanation.user_id)
        .bind(explanation.scope_id)
        .bind(&explanation.response)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert explanation")?;

        Ok(id)
    }

    async fn list_roster(&self, scope_id: i64) -> Result<Vec<RosterEntry>> {
        sqlx::query_as::<_, RosterEntry>(
            "SELECT scope_id, user_id FROM group_members WHERE scope_id = $1 ORDER BY user_id",
        )
        .bind(scope_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query group members")
    }
}
