// Adapters layer: concrete implementations of the domain ports.

#[cfg(feature = "chromium")]
pub mod chromium;
pub mod telegram;

#[cfg(feature = "chromium")]
pub use chromium::ChromiumSession;
pub use telegram::TelegramNotifier;
