//! Client modules for external services

pub mod model;
pub mod telegram;
pub mod twitter;

pub use model::ModelClient;
pub use telegram::{CallbackQuery, Chat, Message, TelegramClient, Update};
pub use twitter::TwitterClient;
