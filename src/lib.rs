pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;
pub use config::BotConfig;

#[cfg(feature = "chromium")]
pub use adapters::ChromiumSession;
pub use adapters::TelegramNotifier;
pub use core::{extractor::OfferExtractor, policy::decide, poller::TicketPoller};
pub use utils::error::{BotError, Result};
