use crate::config::AcceptanceConfig;
use crate::core::extractor::normalize_digit;
use crate::domain::model::{Decision, Offer, RejectReason};

/// 依序檢查 黑名單 → 座位 → 價格，第一個不通過的規則即為拒絕原因
pub fn decide(offer: &Offer, config: &AcceptanceConfig) -> Decision {
    if let Some(keyword) = blacklisted_keyword(offer, &config.blacklist) {
        return Decision::Reject(RejectReason::Blacklisted {
            keyword: keyword.to_string(),
        });
    }

    if is_sold_out(&offer.capacity_text, &config.sold_out_marker) {
        return Decision::Reject(RejectReason::SoldOut);
    }

    let price = match offer.price {
        Some(price) => price,
        None if config.accept_unknown_price => config.max_price,
        None => return Decision::Reject(RejectReason::PriceUnknown),
    };

    if price > config.max_price {
        return Decision::Reject(RejectReason::PriceAboveCeiling {
            price,
            max_price: config.max_price,
        });
    }

    Decision::Accept
}

fn blacklisted_keyword<'a>(offer: &Offer, blacklist: &'a [String]) -> Option<&'a str> {
    blacklist
        .iter()
        .filter(|kw| !kw.is_empty())
        .find(|kw| offer.name.contains(kw.as_str()) || offer.category.contains(kw.as_str()))
        .map(String::as_str)
}

/// 空字串視為仍有座位
fn is_sold_out(capacity_text: &str, marker: &str) -> bool {
    if !marker.is_empty() && capacity_text.contains(marker) {
        return true;
    }

    let trimmed = capacity_text.trim();
    let mut chars = trimmed.chars();
    matches!(
        (chars.next().and_then(normalize_digit), chars.next()),
        (Some('0'), None)
    )
}
