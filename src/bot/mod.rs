//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `commands`: the slash-command enum parsed by teloxide
//! - `command_handler`: the per-command pipelines
//! - `messenger`: outbound Telegram calls behind a trait
//! - `ui_builder`: formats member tables and mentions

pub mod command_handler;
pub mod commands;
pub mod messenger;
pub mod ui_builder;

use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

pub use command_handler::{CommandContext, CommandService, Reply};
pub use commands::Command;
pub use messenger::{Messenger, TelegramMessenger};

/// Message → command → [`CommandService::handle`]
pub fn schema() -> UpdateHandler<anyhow::Error> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(command_endpoint)
}

async fn command_endpoint(
    msg: Message,
    command: Command,
    service: Arc<CommandService>,
) -> anyhow::Result<()> {
    let ctx = CommandContext {
        chat_id: msg.chat.id.0,
        // Channel posts and anonymous admins carry no sender; attribute them to the chat
        user_id: msg
            .from
            .as_ref()
            .map(|user| user.id.0 as i64)
            .unwrap_or(msg.chat.id.0),
    };
    service.handle(&ctx, command).await
}
