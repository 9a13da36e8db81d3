use crate::utils::error::{BotError, Result};
use scraper::Selector;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(BotError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 秒數必須是有限值並落在 [0, max] 之間 (TOML 允許 inf/nan)
pub fn validate_seconds(field_name: &str, value: f64, max: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite number of seconds".to_string(),
        });
    }
    validate_range(field_name, value, 0.0, max)
}

/// 解析 CSS 選擇器，失敗時回傳設定錯誤
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| BotError::SelectorError {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("search.base_url", "https://www.raja.ir/search").is_ok());
        assert!(validate_url("search.base_url", "http://localhost:8080").is_ok());
        assert!(validate_url("search.base_url", "").is_err());
        assert!(validate_url("search.base_url", "invalid-url").is_err());
        assert!(validate_url("search.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_seconds() {
        assert!(validate_seconds("timing.backoff_max_secs", 6.0, 3600.0).is_ok());
        assert!(validate_seconds("timing.backoff_max_secs", 0.0, 3600.0).is_ok());
        assert!(validate_seconds("timing.backoff_max_secs", f64::INFINITY, 3600.0).is_err());
        assert!(validate_seconds("timing.backoff_max_secs", f64::NAN, 3600.0).is_err());
        assert!(validate_seconds("timing.backoff_max_secs", -1.0, 3600.0).is_err());
        assert!(validate_seconds("timing.backoff_max_secs", 1e300, 3600.0).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("timing.backoff_min_secs", 3.0, 0.0, 6.0).is_ok());
        assert!(validate_range("timing.backoff_min_secs", 7.0, 0.0, 6.0).is_err());
    }

    #[test]
    fn test_parse_selector() {
        assert!(parse_selector(".train-result").is_ok());
        assert!(parse_selector("div > .price").is_ok());

        let err = parse_selector("..broken[").unwrap_err();
        assert!(matches!(err, BotError::SelectorError { .. }));
    }
}
