use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// 搜尋結果中的一筆候選車票，單次輪詢的不可變快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    /// 在結果列表中的位置 (與頁面顯示順序一致)
    pub position: usize,
    pub name: String,
    pub category: String,
    pub capacity_text: String,
    /// 最小貨幣單位 (Rial)，None 代表無法解析
    pub price: Option<u64>,
    /// 抽取時找不到或無法解析而改用預設值的欄位
    pub gaps: Vec<OfferField>,
}

impl Offer {
    pub fn is_degraded(&self) -> bool {
        !self.gaps.is_empty()
    }

    pub fn price_label(&self) -> String {
        match self.price {
            Some(price) => price.to_string(),
            None => "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfferField {
    Name,
    Category,
    Capacity,
    Price,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject(RejectReason),
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Blacklisted { keyword: String },
    SoldOut,
    PriceUnknown,
    PriceAboveCeiling { price: u64, max_price: u64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Blacklisted { keyword } => write!(f, "blacklisted keyword '{}'", keyword),
            RejectReason::SoldOut => write!(f, "no capacity"),
            RejectReason::PriceUnknown => write!(f, "price unknown"),
            RejectReason::PriceAboveCeiling { price, max_price } => {
                write!(f, "price exceeds limit: {} > {}", price, max_price)
            }
        }
    }
}

/// 頁面上可操作的控制項
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// 整個頁面範圍內的第一個符合元素
    Page { selector: String },
    /// 第 `index` 個結果列之內的元素
    Row {
        container: String,
        index: usize,
        selector: String,
    },
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Page { selector } => write!(f, "{}", selector),
            Control::Row {
                container,
                index,
                selector,
            } => write!(f, "{}[{}] {}", container, index, selector),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    Success { purchase_link: String },
    Failed { reason: ReservationFailure },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationFailure {
    #[error("reserve control not clickable within {waited:?}")]
    ReserveControlUnavailable { waited: Duration },

    #[error("continue-purchase control not clickable within {waited:?}")]
    ContinueControlUnavailable { waited: Duration },

    #[error("{stage} click failed: {message}")]
    ActivationFailed { stage: String, message: String },

    /// 等待或讀取頁面時瀏覽器回報錯誤 (例如導航中 execution context 被銷毀)
    #[error("{stage} stage lost the page: {message}")]
    SessionFault { stage: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedTicket {
    pub offer: Offer,
    pub purchase_link: String,
}

impl ReservedTicket {
    pub fn notification_text(&self) -> String {
        format!(
            "Ticket found!\nTrain: {}\nPrice: {} Rials\nPurchase link: {}",
            self.offer.name,
            self.offer.price_label(),
            self.purchase_link
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Reserved(ReservedTicket),
    NoMatch,
    LoadFailed,
    Faulted(String),
}

/// 單次 搜尋→抽取→過濾→預訂 的紀錄
#[derive(Debug, Clone)]
pub struct PollCycle {
    pub number: u64,
    pub search_url: String,
    pub started_at: DateTime<Utc>,
    pub offers: Vec<Offer>,
    /// 本輪實際嘗試預訂的結果列位置
    pub attempted: Vec<usize>,
    pub outcome: CycleOutcome,
}

impl PollCycle {
    pub fn begin(number: u64, search_url: &str) -> Self {
        Self {
            number,
            search_url: search_url.to_string(),
            started_at: Utc::now(),
            offers: Vec::new(),
            attempted: Vec::new(),
            outcome: CycleOutcome::NoMatch,
        }
    }

    pub fn is_reserved(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Reserved(_))
    }
}

/// 從瀏覽器匯出的 cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub http_only: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_text() {
        let ticket = ReservedTicket {
            offer: Offer {
                position: 0,
                name: "Fadak".to_string(),
                category: "4-bed".to_string(),
                capacity_text: String::new(),
                price: Some(8_500_000),
                gaps: vec![],
            },
            purchase_link: "https://www.raja.ir/checkout/42".to_string(),
        };

        let text = ticket.notification_text();
        assert!(text.starts_with("Ticket found!"));
        assert!(text.contains("Train: Fadak"));
        assert!(text.contains("Price: 8500000 Rials"));
        assert!(text.contains("Purchase link: https://www.raja.ir/checkout/42"));
    }

    #[test]
    fn test_cookie_accepts_selenium_export() {
        let json = r#"{"name":"sid","value":"abc","domain":".raja.ir","path":"/","httpOnly":true,"expiry":1790000000}"#;
        let cookie: SessionCookie = serde_json::from_str(json).unwrap();
        assert_eq!(cookie.name, "sid");
        assert_eq!(cookie.http_only, Some(true));
        assert_eq!(cookie.secure, None);
    }
}
