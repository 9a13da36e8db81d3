#[cfg(feature = "cli")]
pub mod cli;
pub mod cookies;
pub mod search;

use crate::utils::error::{BotError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub search: SearchConfig,
    pub acceptance: AcceptanceConfig,
    pub timing: TimingConfig,
    pub page: PageLayout,
    pub notify: NotifyConfig,
    pub browser: BrowserConfig,
}

/// 搜尋條件，啟動後不再變動
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub home_url: String,
    pub base_url: String,
    pub adult: u32,
    pub child: u32,
    pub infant: u32,
    pub move_type: u32,
    pub is_charter: bool,
    pub from_station: String,
    pub to_station: String,
    /// 出發日期 (伊朗曆 yyyymmdd)
    pub go_date: String,
    pub ticket_type: String,
    pub return_date: String,
    pub passengers: u32,
    pub mode: String,
    /// 行程描述 (未編碼的原始文字)
    pub description: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            home_url: "https://www.raja.ir".to_string(),
            base_url: "https://www.raja.ir/search".to_string(),
            adult: 1,
            child: 0,
            infant: 0,
            move_type: 1,
            is_charter: false,
            from_station: "191".to_string(),
            to_station: "1".to_string(),
            go_date: "14040119".to_string(),
            ticket_type: "Family".to_string(),
            return_date: String::new(),
            passengers: 1,
            mode: "Train".to_string(),
            description: "قطار مشهد به تهران".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptanceConfig {
    pub max_price: u64,
    /// 大小寫敏感的子字串，比對車次名稱與車廂類型
    pub blacklist: Vec<String>,
    pub sold_out_marker: String,
    /// 價格無法解析時視為等於上限 (預設直接拒絕)
    pub accept_unknown_price: bool,
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self {
            max_price: 10_000_000,
            blacklist: vec!["اتوبوسی".to_string(), "سالنی".to_string()],
            sold_out_marker: "تمام شد".to_string(),
            accept_unknown_price: false,
        }
    }
}

impl AcceptanceConfig {
    pub fn set_blacklist_csv(&mut self, csv: &str) {
        self.blacklist = parse_keyword_list(csv);
    }
}

/// 任何等待、逾時或退避設定的上限 (秒)
pub const MAX_DELAY_SECS: u64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub results_timeout_secs: u64,
    pub reserve_timeout_secs: u64,
    pub continue_timeout_secs: u64,
    pub reload_delay_secs: u64,
    pub backoff_min_secs: f64,
    pub backoff_max_secs: f64,
    pub poll_interval_ms: u64,
    pub navigation_settle_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            results_timeout_secs: 15,
            reserve_timeout_secs: 8,
            continue_timeout_secs: 15,
            reload_delay_secs: 5,
            backoff_min_secs: 3.0,
            backoff_max_secs: 6.0,
            poll_interval_ms: 250,
            navigation_settle_secs: 5,
        }
    }
}

impl TimingConfig {
    pub fn results_timeout(&self) -> Duration {
        Duration::from_secs(self.results_timeout_secs)
    }

    pub fn reserve_timeout(&self) -> Duration {
        Duration::from_secs(self.reserve_timeout_secs)
    }

    pub fn continue_timeout(&self) -> Duration {
        Duration::from_secs(self.continue_timeout_secs)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_secs(self.reload_delay_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn navigation_settle(&self) -> Duration {
        Duration::from_secs(self.navigation_settle_secs)
    }
}

/// 結果頁面的 CSS 選擇器
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub results_container: String,
    pub name: String,
    pub category: String,
    pub capacity: String,
    pub price: String,
    pub reserve_button: String,
    pub continue_button: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            results_container: ".train-result".to_string(),
            name: ".train-name".to_string(),
            category: ".wagon-type".to_string(),
            capacity: ".field-value".to_string(),
            price: ".price".to_string(),
            reserve_button: ".lock-btn".to_string(),
            continue_button: ".btn-block".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            telegram_token: None,
            telegram_chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
            timeout_secs: 10,
        }
    }
}

impl NotifyConfig {
    /// 兩個憑證都存在且非空才回傳
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.telegram_token.as_deref().filter(|t| !t.trim().is_empty())?;
        let chat_id = self
            .telegram_chat_id
            .as_deref()
            .filter(|c| !c.trim().is_empty())?;
        Some((token, chat_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub user_agent: String,
    pub chrome_path: Option<String>,
    pub cookies_path: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36".to_string(),
            chrome_path: None,
            cookies_path: "raja_cookies.json".to_string(),
            window_width: 1920,
            window_height: 1080,
        }
    }
}

impl BotConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BotError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BotError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 預設值 → 設定檔 → 環境變數
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 替換環境變數 (例如 ${TELEGRAM_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BotError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 套用與原始腳本相同名稱的環境變數
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key);
        let number = |key: &str| -> Option<u32> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("⚠️ Ignoring {}={}: not a number", key, raw);
                    None
                }
            }
        };

        if let Some(v) = text("TELEGRAM_TOKEN") {
            self.notify.telegram_token = Some(v);
        }
        if let Some(v) = text("TELEGRAM_CHAT_ID") {
            self.notify.telegram_chat_id = Some(v);
        }
        if let Some(v) = text("COOKIES_PATH") {
            self.browser.cookies_path = v;
        }

        let search = &mut self.search;
        if let Some(v) = number("ADULT") {
            search.adult = v;
        }
        if let Some(v) = number("CHILD") {
            search.child = v;
        }
        if let Some(v) = number("INFANT") {
            search.infant = v;
        }
        if let Some(v) = number("MOVE_TYPE") {
            search.move_type = v;
        }
        if let Some(v) = text("IS_CHARTER") {
            search.is_charter = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = text("FROM_STATION") {
            search.from_station = v;
        }
        if let Some(v) = text("TO_STATION") {
            search.to_station = v;
        }
        if let Some(v) = text("GO_DATE") {
            search.go_date = v;
        }
        if let Some(v) = text("TICKET_TYPE") {
            search.ticket_type = v;
        }
        if let Some(v) = text("RETURN_DATE") {
            search.return_date = v;
        }
        if let Some(v) = number("NUM_PASSENGER") {
            search.passengers = v;
        }
        if let Some(v) = text("MODE") {
            search.mode = v;
        }
        if let Some(v) = text("DESC_TRAVEL") {
            search.description = v;
        }

        if let Some(raw) = text("MAX_PRICE") {
            match raw.trim().parse() {
                Ok(v) => self.acceptance.max_price = v,
                Err(_) => tracing::warn!("⚠️ Ignoring MAX_PRICE={}: not a number", raw),
            }
        }
        if let Some(v) = text("BLACKLIST_KEYWORDS") {
            self.acceptance.set_blacklist_csv(&v);
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("search.home_url", &self.search.home_url)?;
        validation::validate_url("search.base_url", &self.search.base_url)?;
        validation::validate_non_empty_string("search.from_station", &self.search.from_station)?;
        validation::validate_non_empty_string("search.to_station", &self.search.to_station)?;
        validation::validate_non_empty_string("search.go_date", &self.search.go_date)?;

        let timing = &self.timing;
        for (field, secs, min) in [
            ("timing.results_timeout_secs", timing.results_timeout_secs, 1),
            ("timing.reserve_timeout_secs", timing.reserve_timeout_secs, 1),
            ("timing.continue_timeout_secs", timing.continue_timeout_secs, 1),
            ("timing.reload_delay_secs", timing.reload_delay_secs, 0),
            ("timing.navigation_settle_secs", timing.navigation_settle_secs, 0),
        ] {
            validation::validate_range(field, secs, min, MAX_DELAY_SECS)?;
        }
        validation::validate_range(
            "timing.poll_interval_ms",
            timing.poll_interval_ms,
            1,
            MAX_DELAY_SECS * 1000,
        )?;

        let cap = MAX_DELAY_SECS as f64;
        validation::validate_seconds("timing.backoff_min_secs", timing.backoff_min_secs, cap)?;
        validation::validate_seconds("timing.backoff_max_secs", timing.backoff_max_secs, cap)?;
        validation::validate_range(
            "timing.backoff_min_secs",
            timing.backoff_min_secs,
            0.0,
            timing.backoff_max_secs,
        )?;

        for (field, selector) in [
            ("page.results_container", &self.page.results_container),
            ("page.name", &self.page.name),
            ("page.category", &self.page.category),
            ("page.capacity", &self.page.capacity),
            ("page.price", &self.page.price),
            ("page.reserve_button", &self.page.reserve_button),
            ("page.continue_button", &self.page.continue_button),
        ] {
            validation::validate_non_empty_string(field, selector)?;
            validation::parse_selector(selector)?;
        }

        validation::validate_url("notify.api_base", &self.notify.api_base)?;

        Ok(())
    }
}

impl Validate for BotConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// 逗號分隔的關鍵字，去除空白並忽略空項目
pub fn parse_keyword_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
