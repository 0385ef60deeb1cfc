//! Messenger module: the outbound side of the Telegram API used by commands

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

/// Outbound chat operations needed by the command handlers
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send plain text, no markup interpretation
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Send text rendered with Telegram's HTML parse mode
    async fn send_html(&self, chat_id: i64, html: &str) -> Result<()>;

    /// Whether `user_id` is an owner or administrator of `chat_id`
    async fn is_admin(&self, chat_id: i64, user_id: i64) -> Result<bool>;
}

/// [`Messenger`] over a live bot connection
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }

    async fn send_html(&self, chat_id: i64, html: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), html)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    async fn is_admin(&self, chat_id: i64, user_id: i64) -> Result<bool> {
        // Private chats have no administrators
        if chat_id > 0 {
            return Ok(false);
        }
        let admins = self.bot.get_chat_administrators(ChatId(chat_id)).await?;
        Ok(admins
            .iter()
            .any(|member| member.user.id.0 as i64 == user_id))
    }
}
