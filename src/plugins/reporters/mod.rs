// Reporter sink implementations
pub mod channel;
pub mod console;
pub mod discord;
pub mod status_board;

pub use channel::ChannelReporter;
pub use console::ConsoleReporter;
pub use discord::{DiscordReporter, DiscordWebhook};
pub use status_board::{ChannelView, StatusBoard};
