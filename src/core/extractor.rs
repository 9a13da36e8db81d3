//! Parse a rendered search-results page into [`Offer`] records.
//!
//! Every field is looked up independently inside its own result row. A field
//! that cannot be found falls back to its empty/unknown default and is
//! recorded in [`Offer::gaps`]; it never drops the row or its siblings.

use crate::config::PageLayout;
use crate::domain::model::{Offer, OfferField};
use crate::utils::error::Result;
use crate::utils::validation::parse_selector;
use scraper::{ElementRef, Html, Selector};

pub struct OfferExtractor {
    row: Selector,
    name: Selector,
    category: Selector,
    capacity: Selector,
    price: Selector,
}

impl OfferExtractor {
    pub fn new(layout: &PageLayout) -> Result<Self> {
        Ok(Self {
            row: parse_selector(&layout.results_container)?,
            name: parse_selector(&layout.name)?,
            category: parse_selector(&layout.category)?,
            capacity: parse_selector(&layout.capacity)?,
            price: parse_selector(&layout.price)?,
        })
    }

    /// 依頁面顯示順序回傳每一個結果列
    pub fn extract(&self, html: &str) -> Vec<Offer> {
        let document = Html::parse_document(html);

        document
            .select(&self.row)
            .enumerate()
            .map(|(position, row)| self.extract_row(position, &row))
            .collect()
    }

    fn extract_row(&self, position: usize, row: &ElementRef<'_>) -> Offer {
        let mut gaps = Vec::new();

        let name = field_text(row, &self.name);
        let category = field_text(row, &self.category);
        let capacity = field_text(row, &self.capacity);
        let price_text = field_text(row, &self.price);

        if name.is_none() {
            gaps.push(OfferField::Name);
        }
        if category.is_none() {
            gaps.push(OfferField::Category);
        }
        if capacity.is_none() {
            gaps.push(OfferField::Capacity);
        }

        let price = price_text.as_deref().and_then(normalize_price);
        if price.is_none() {
            gaps.push(OfferField::Price);
        }

        let offer = Offer {
            position,
            name: name.unwrap_or_default(),
            category: category.unwrap_or_default(),
            capacity_text: capacity.unwrap_or_default(),
            price,
            gaps,
        };

        if offer.is_degraded() {
            tracing::debug!(
                "Row {} extracted with defaulted fields: {:?}",
                position,
                offer.gaps
            );
        }

        offer
    }
}

/// 在結果列內找第一個符合的元素並取出文字
fn field_text(row: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector).next().map(|el| element_text(&el))
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 將阿拉伯-印度數字與波斯數字轉為 ASCII
pub fn normalize_digit(c: char) -> Option<char> {
    match c {
        '0'..='9' => Some(c),
        '\u{0660}'..='\u{0669}' => char::from_digit(c as u32 - 0x0660, 10),
        '\u{06F0}'..='\u{06F9}' => char::from_digit(c as u32 - 0x06F0, 10),
        _ => None,
    }
}

/// 去除千分位與所有非數字字元後解析；沒有數字或溢位時為 None
pub fn normalize_price(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter_map(normalize_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
