//! Command Handler module: one linear pipeline per slash-command
//!
//! Every command runs `parse → validate → gateway call(s) → dispatch → reply`.
//! The first failing step ends the pipeline; its [`CommandError`] becomes the
//! single reply the user sees. Gateway failures are logged here in full and
//! replaced by a generic message.

use std::sync::Arc;
use teloxide::utils::command::BotCommands;
use teloxide::utils::html::escape;
use tracing::{debug, error, info, warn};

use crate::command_parser::{parse_add, parse_alert, parse_explain, parse_tag};
use crate::config::{ScopeMode, MAX_MESSAGE_CHARS};
use crate::errors::{CommandError, StoreOp};
use crate::explainer::{build_prompt, max_output_tokens, truncate_words, ExplanationGateway};
use crate::fanout::{caption_batch, send_in_order, FanOutDispatcher, FanOutReport};
use crate::localization::{t, t_args};
use crate::models::{MemberQuery, NewExplanation, NewMember};
use crate::store::RecordStore;
use crate::validation::{validate_explain, validate_member, validate_non_empty};

use super::commands::Command;
use super::messenger::Messenger;
use super::ui_builder::{format_member_pages, member_mention, split_text, user_mention};

/// Label for roster mentions, which carry no name
const ROSTER_MENTION_LABEL: &str = "👤";

/// Who issued a command, and where
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandContext {
    pub chat_id: i64,
    pub user_id: i64,
}

/// What a successful pipeline leaves to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text, split into several messages when too long for one
    Text(String),
    /// HTML messages were already sent one by one
    Broadcast(FanOutReport),
}

/// Runs commands against injected gateways
pub struct CommandService {
    store: Arc<dyn RecordStore>,
    explainer: Arc<dyn ExplanationGateway>,
    messenger: Arc<dyn Messenger>,
    dispatcher: FanOutDispatcher,
    scope_mode: ScopeMode,
}

impl CommandService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        explainer: Arc<dyn ExplanationGateway>,
        messenger: Arc<dyn Messenger>,
        scope_mode: ScopeMode,
    ) -> Self {
        Self {
            store,
            explainer,
            messenger,
            dispatcher: FanOutDispatcher::default(),
            scope_mode,
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: FanOutDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Run `command` to completion and send its reply
    ///
    /// Only a failure to deliver the reply itself is returned as an error.
    pub async fn handle(&self, ctx: &CommandContext, command: Command) -> anyhow::Result<()> {
        let name = command.name();
        debug!(chat_id = ctx.chat_id, user_id = ctx.user_id, command = name, "Handling command");

        let outcome = match command {
            Command::Start => Ok(Reply::Text(format!(
                "👋 {}\n\n{}\n\n{}",
                t("welcome-title"),
                t("welcome-description"),
                t("welcome-help")
            ))),
            Command::Help => Ok(Reply::Text(Command::descriptions().to_string())),
            Command::Add(text) => self.handle_add(ctx, &text).await,
            Command::Tag(text) => self.handle_tag(ctx, &text).await,
            Command::List => self.handle_list(ctx).await,
            Command::Explain(text) => self.handle_explain(ctx, &text).await,
            Command::Alert(text) => self.handle_alert(ctx, &text).await,
        };

        match outcome {
            Ok(Reply::Text(text)) => {
                for page in split_text(&text, MAX_MESSAGE_CHARS) {
                    self.messenger.send_text(ctx.chat_id, &page).await?;
                }
            }
            Ok(Reply::Broadcast(report)) => {
                if report.is_complete() {
                    info!(chat_id = ctx.chat_id, command = name, batches = report.batches, "Messages delivered");
                } else {
                    warn!(
                        chat_id = ctx.chat_id,
                        command = name,
                        batches = report.batches,
                        failed = ?report.failed,
                        "Messages partially delivered"
                    );
                }
            }
            Err(err) => {
                if err.is_input_error() {
                    info!(chat_id = ctx.chat_id, user_id = ctx.user_id, command = name, error = %err, "Rejected command input");
                } else {
                    warn!(chat_id = ctx.chat_id, user_id = ctx.user_id, command = name, error = %err, "Command failed");
                }
                self.messenger
                    .send_text(ctx.chat_id, &err.user_message())
                    .await?;
            }
        }

        Ok(())
    }

    fn member_scope(&self, ctx: &CommandContext) -> Option<i64> {
        self.scope_mode.scope_for(ctx.chat_id)
    }

    async fn handle_add(&self, ctx: &CommandContext, text: &str) -> Result<Reply, CommandError> {
        let args = parse_add(text)?;
        let valid = validate_member(&args)?;

        let new_member = NewMember {
            scope_id: self.member_scope(ctx),
            first_name: valid.first_name,
            class_name: valid.class_name,
            age: valid.age,
            added_by: ctx.user_id,
        };

        let member = self.store.insert_member(&new_member).await.map_err(|e| {
            error!(chat_id = ctx.chat_id, user_id = ctx.user_id, error = ?e, "Failed to insert member");
            CommandError::Store(StoreOp::Insert)
        })?;

        info!(chat_id = ctx.chat_id, member_id = member.id, "Member registered");

        Ok(Reply::Text(t_args(
            "add-success",
            &[
                ("id", &member.id.to_string()),
                ("name", &member.first_name),
                ("class", &member.class_name),
                ("age", &member.age.to_string()),
            ],
        )))
    }

    async fn handle_tag(&self, ctx: &CommandContext, text: &str) -> Result<Reply, CommandError> {
        let class_name = validate_non_empty(parse_tag(text)?, "field-class")?;

        let query = MemberQuery {
            scope_id: self.member_scope(ctx),
            class_name: Some(class_name.clone()),
        };
        let members = self.store.find_members(&query).await.map_err(|e| {
            error!(chat_id = ctx.chat_id, error = ?e, "Failed to query members by class");
            CommandError::Store(StoreOp::Query)
        })?;

        if members.is_empty() {
            return Err(CommandError::NoRecipients {
                message: t_args("tag-no-members", &[("class", &class_name)]),
            });
        }

        let mentions: Vec<String> = members.iter().map(member_mention).collect();
        let caption = escape(&t_args("tag-caption", &[("class", &class_name)]));

        let report = self
            .dispatcher
            .dispatch(self.messenger.as_ref(), ctx.chat_id, &mentions, |batch| {
                caption_batch(&caption, batch)
            })
            .await;

        Ok(Reply::Broadcast(report))
    }

    async fn handle_list(&self, ctx: &CommandContext) -> Result<Reply, CommandError> {
        let query = MemberQuery {
            scope_id: self.member_scope(ctx),
            class_name: None,
        };
        let members = self.store.find_members(&query).await.map_err(|e| {
            error!(chat_id = ctx.chat_id, error = ?e, "Failed to list members");
            CommandError::Store(StoreOp::Query)
        })?;

        if members.is_empty() {
            return Err(CommandError::NoRecipients {
                message: t("list-empty"),
            });
        }

        let pages = format_member_pages(&members, MAX_MESSAGE_CHARS);
        let report = send_in_order(self.messenger.as_ref(), ctx.chat_id, &pages).await;

        Ok(Reply::Broadcast(report))
    }

    async fn handle_explain(&self, ctx: &CommandContext, text: &str) -> Result<Reply, CommandError> {
        let args = parse_explain(text)?;
        let valid = validate_explain(&args)?;
        // Validated to 10..=1000
        let word_limit = valid.word_limit as u32;

        let prompt = build_prompt(&valid.topic, word_limit);
        let generated = self
            .explainer
            .generate(&prompt, max_output_tokens(word_limit))
            .await
            .map_err(|e| {
                error!(chat_id = ctx.chat_id, user_id = ctx.user_id, error = ?e, "Explanation generation failed");
                CommandError::Generation
            })?;

        let response = truncate_words(&generated, word_limit as usize);

        let record = NewExplanation {
            topic: valid.topic.clone(),
            word_limit: valid.word_limit,
            user_id: ctx.user_id,
            scope_id: self.member_scope(ctx),
            response: response.clone(),
        };
        // Best effort: the user still gets the explanation
        if let Err(e) = self.store.insert_explanation(&record).await {
            warn!(chat_id = ctx.chat_id, error = ?e, "Failed to persist explanation");
        }

        Ok(Reply::Text(format!(
            "{}\n\n{}",
            t_args("explain-title", &[("topic", &valid.topic)]),
            response
        )))
    }

    async fn handle_alert(&self, ctx: &CommandContext, text: &str) -> Result<Reply, CommandError> {
        parse_alert(text)?;

        let authorized = match self.messenger.is_admin(ctx.chat_id, ctx.user_id).await {
            Ok(authorized) => authorized,
            Err(e) => {
                warn!(chat_id = ctx.chat_id, user_id = ctx.user_id, error = ?e, "Admin check failed, denying");
                false
            }
        };
        if !authorized {
            return Err(CommandError::Authorization);
        }

        let roster = self.store.list_roster(ctx.chat_id).await.map_err(|e| {
            error!(chat_id = ctx.chat_id, error = ?e, "Failed to query alert roster");
            CommandError::Store(StoreOp::Query)
        })?;

        if roster.is_empty() {
            return Err(CommandError::NoRecipients {
                message: t("alert-empty-roster"),
            });
        }

        let mentions: Vec<String> = roster
            .iter()
            .map(|entry| user_mention(entry.user_id, ROSTER_MENTION_LABEL))
            .collect();
        let caption = escape(&t("alert-caption"));

        let report = self
            .dispatcher
            .dispatch(self.messenger.as_ref(), ctx.chat_id, &mentions, |batch| {
                caption_batch(&caption, batch)
            })
            .await;

        Ok(Reply::Broadcast(report))
    }
}
