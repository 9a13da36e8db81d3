use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ticket-sniper")]
#[command(about = "Polls raja.ir search results and reserves the first acceptable train ticket")]
pub struct CliArgs {
    /// Path to TOML configuration file (environment variables still apply on top)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the price ceiling in Rials
    #[arg(long)]
    pub max_price: Option<u64>,

    /// Override the blacklist (comma-separated keywords)
    #[arg(long)]
    pub blacklist: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    /// Print the search URL and settings without launching a browser
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn apply_overrides(&self, config: &mut crate::config::BotConfig) {
        if let Some(max_price) = self.max_price {
            config.acceptance.max_price = max_price;
        }
        if let Some(blacklist) = &self.blacklist {
            config.acceptance.set_blacklist_csv(blacklist);
        }
        if self.headed {
            config.browser.headless = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BotConfig;

    #[test]
    fn test_cli_overrides_win() {
        let args = CliArgs::parse_from([
            "ticket-sniper",
            "--max-price",
            "5000000",
            "--blacklist",
            "سالنی,VIP",
            "--headed",
        ]);

        let mut config = BotConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.acceptance.max_price, 5_000_000);
        assert_eq!(config.acceptance.blacklist, vec!["سالنی", "VIP"]);
        assert!(!config.browser.headless);
        assert_eq!(args.log_format, LogFormat::Compact);
    }
}
