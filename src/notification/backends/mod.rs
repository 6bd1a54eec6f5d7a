//! 脚本调用后端实现

pub mod command;
pub mod log;
pub mod webhook;

pub use command::CommandDispatcher;
pub use log::LogDispatcher;
pub use webhook::{WebhookConfig, WebhookDispatcher};
