//! Slash-commands understood by the bot

use teloxide::utils::command::BotCommands;

/// Each variant receives the raw text after the command; argument shape is
/// checked by `command_parser`, not by teloxide.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "introduce the bot.")]
    Start,
    #[command(description = "show this message.")]
    Help,
    #[command(description = "register a member: /add <first_name> <class> <age>")]
    Add(String),
    #[command(description = "mention every member of a class: /tag <class>")]
    Tag(String),
    #[command(description = "list registered members.")]
    List,
    #[command(description = "explain a topic: /explain <topic> <word_limit>")]
    Explain(String),
    #[command(description = "mention every saved group member (admins only): /alert everyone")]
    Alert(String),
}

impl Command {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Add(_) => "add",
            Command::Tag(_) => "tag",
            Command::List => "list",
            Command::Explain(_) => "explain",
            Command::Alert(_) => "alert",
        }
    }
}
