//! # Class Roster Telegram Bot
//!
//! A Telegram group bot that registers members by name, class and age,
//! mentions them by class in batches, broadcasts alerts to a saved roster
//! and fetches short generated explanations of topics. All rows live in a
//! hosted Postgres database.

pub mod bot;
pub mod command_parser;
pub mod config;
pub mod errors;
pub mod explainer;
pub mod fanout;
pub mod health;
pub mod localization;
pub mod models;
pub mod store;
pub mod validation;
