//! # Roster Data Model
//!
//! Rows persisted by the record store. Nothing here is ever updated or
//! deleted by the bot: members and explanations are insert-only, and the
//! alert roster is maintained outside the bot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered member as stored in the `members` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    /// Store-assigned identifier
    pub id: i64,
    /// Chat the member was registered in (absent in global scope)
    pub scope_id: Option<i64>,
    /// Alphabetic first name
    pub first_name: String,
    /// Free-text class label, matched case-insensitively
    #[serde(rename = "class")]
    #[sqlx(rename = "class")]
    pub class_name: String,
    /// Age in years, always within 5..=120
    pub age: i64,
    /// Telegram user id of whoever submitted the registration
    pub added_by: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A validated member that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMember {
    pub scope_id: Option<i64>,
    pub first_name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub age: i64,
    pub added_by: i64,
}

impl NewMember {
    /// Attach the identifier assigned by the store
    pub fn into_member(self, id: i64) -> Member {
        Member {
            id,
            scope_id: self.scope_id,
            first_name: self.first_name,
            class_name: self.class_name,
            age: self.age,
            added_by: self.added_by,
            created_at: None,
        }
    }
}

/// Filter for member lookups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberQuery {
    /// Restrict to one chat; `None` reads every scope
    pub scope_id: Option<i64>,
    /// Restrict to one class, compared case-insensitively
    pub class_name: Option<String>,
}

impl MemberQuery {
    /// Whether a member satisfies this filter
    pub fn matches(&self, member: &Member) -> bool {
        let scope_ok = self.scope_id.is_none() || member.scope_id == self.scope_id;
        let class_ok = self
            .class_name
            .as_ref()
            .map_or(true, |class| member.class_name.to_lowercase() == class.to_lowercase());
        scope_ok && class_ok
    }
}

/// A generated explanation row for the `explanations` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExplanation {
    pub topic: String,
    pub word_limit: i64,
    pub user_id: i64,
    pub scope_id: Option<i64>,
    /// Generated text, already truncated to `word_limit` words
    pub response: String,
}

/// One entry of the externally maintained alert roster (`group_members`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RosterEntry {
    pub scope_id: i64,
    pub user_id: i64,
}
