//! # Configuration Module
//!
//! This module defines the startup configuration for the bot: the four
//! required credentials, the optional health-server port and the settings
//! that select store backend, generation model and member scoping.
//!
//! The configuration is built once in `main` and passed explicitly to every
//! component that needs it.

use anyhow::{bail, Context, Result};
use std::env;

// Constants for command processing
pub const MENTION_BATCH_SIZE: usize = 50;
pub const TOKEN_INFLATION_PERCENT: u32 = 133; // ~1.33 tokens per English word
pub const MIN_AGE: i64 = 5;
pub const MAX_AGE: i64 = 120;
pub const MIN_WORD_LIMIT: i64 = 10;
pub const MAX_WORD_LIMIT: i64 = 1000;
pub const MAX_MESSAGE_CHARS: usize = 4096; // Telegram rejects longer texts
pub const REST_PAGE_SIZE: usize = 1000; // PostgREST default max-rows

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// How member and explanation rows are partitioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeMode {
    /// Rows carry the originating chat id and reads are filtered by it
    #[default]
    PerChat,
    /// Rows are shared by every chat the bot is in
    Global,
}

impl ScopeMode {
    /// Scope id to store for a command issued in `chat_id`
    pub fn scope_for(&self, chat_id: i64) -> Option<i64> {
        match self {
            ScopeMode::PerChat => Some(chat_id),
            ScopeMode::Global => None,
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chat" | "per_chat" => Ok(ScopeMode::PerChat),
            "global" => Ok(ScopeMode::Global),
            other => bail!("MEMBER_SCOPE must be 'chat' or 'global', got '{other}'"),
        }
    }
}

/// Settings for the chat-completion API
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// API key sent as a bearer token
    pub api_key: String,
    /// Base URL without trailing slash (e.g. "https://api.openai.com/v1")
    pub base_url: String,
    /// Model name passed with every request
    pub model: String,
}

/// Settings for the hosted record store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project URL of the REST endpoint
    pub url: String,
    /// Service key sent as `apikey` and bearer token
    pub key: String,
    /// Direct Postgres connection string; takes precedence over REST when set
    pub database_url: Option<String>,
}

/// Complete process configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,
    /// Record store settings
    pub store: StoreConfig,
    /// Explanation generator settings
    pub generation: GenerationConfig,
    /// Port for the keep-alive HTTP server
    pub port: u16,
    /// Member partitioning
    pub scope_mode: ScopeMode,
}

impl Config {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// Blank values count as missing. Any missing required credential is an
    /// error, which `main` treats as fatal.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| optional(key).with_context(|| format!("{key} must be set"));

        let bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let store_url = required("SUPABASE_URL")?;
        let store_key = required("SUPABASE_KEY")?;
        let api_key = required("OPENAI_API_KEY")?;

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        let scope_mode = match optional("MEMBER_SCOPE") {
            Some(raw) => ScopeMode::parse(&raw)?,
            None => ScopeMode::default(),
        };

        Ok(Self {
            bot_token,
            store: StoreConfig {
                url: store_url.trim_end_matches('/').to_string(),
                key: store_key,
                database_url: optional("DATABASE_URL"),
            },
            generation: GenerationConfig {
                api_key,
                base_url: optional("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                model: optional("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            },
            port,
            scope_mode,
        })
    }
}
