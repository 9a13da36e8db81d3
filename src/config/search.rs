use crate::config::SearchConfig;
use crate::utils::error::{BotError, Result};
use url::Url;

/// 依固定參數組出搜尋網址，參數順序與網站前端一致
pub fn build_search_url(search: &SearchConfig) -> Result<String> {
    let mut url = Url::parse(&search.base_url).map_err(|e| BotError::InvalidConfigValueError {
        field: "search.base_url".to_string(),
        value: search.base_url.clone(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    url.query_pairs_mut()
        .clear()
        .append_pair("adult", &search.adult.to_string())
        .append_pair("child", &search.child.to_string())
        .append_pair("infant", &search.infant.to_string())
        .append_pair("movetype", &search.move_type.to_string())
        .append_pair("ischarter", if search.is_charter { "true" } else { "false" })
        .append_pair("fs", &search.from_station)
        .append_pair("ts", &search.to_station)
        .append_pair("godate", &search.go_date)
        .append_pair("tickettype", &search.ticket_type)
        .append_pair("returndate", &search.return_date)
        .append_pair("numberpassenger", &search.passengers.to_string())
        .append_pair("mode", &search.mode)
        .append_pair("desctravel", &search.description);

    Ok(url.to_string())
}
