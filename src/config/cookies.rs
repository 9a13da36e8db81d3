use crate::domain::model::SessionCookie;
use crate::utils::error::Result;
use std::path::Path;

/// 讀取瀏覽器匯出的 cookies (JSON 陣列)
pub fn load_cookies<P: AsRef<Path>>(path: P) -> Result<Vec<SessionCookie>> {
    let content = std::fs::read_to_string(path)?;
    parse_cookies(&content)
}

pub fn parse_cookies(content: &str) -> Result<Vec<SessionCookie>> {
    let cookies: Vec<SessionCookie> = serde_json::from_str(content)?;
    Ok(cookies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::BotError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_cookies_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"[
  {"name": "ASP.NET_SessionId", "value": "x1", "domain": "www.raja.ir", "path": "/", "secure": true},
  {"name": "lang", "value": "fa"}
]"#,
            )
            .unwrap();

        let cookies = load_cookies(temp_file.path()).unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].domain.as_deref(), Some("www.raja.ir"));
        assert_eq!(cookies[1].path, None);
    }

    #[test]
    fn test_parse_rejects_object() {
        let err = parse_cookies(r#"{"name": "lang"}"#).unwrap_err();
        assert!(matches!(err, BotError::SerializationError(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_cookies("/nonexistent/cookies.json").unwrap_err();
        assert!(matches!(err, BotError::IoError(_)));
    }
}
