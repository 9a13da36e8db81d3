use crate::config::cookies::load_cookies;
use crate::config::BotConfig;
use crate::domain::ports::PageSession;
use crate::utils::error::{BotError, Result};
use std::path::Path;

/// 開啟首頁並匯入 cookies；首頁打不開屬於啟動錯誤，cookies 問題只記錄警告
pub async fn prepare_session<S>(session: &mut S, config: &BotConfig) -> Result<()>
where
    S: PageSession + ?Sized,
{
    session
        .open(&config.search.home_url)
        .await
        .map_err(|e| BotError::StartupError {
            message: format!("cannot open {}: {}", config.search.home_url, e),
        })?;

    let cookies_path = &config.browser.cookies_path;
    if !Path::new(cookies_path).exists() {
        tracing::info!("No cookies file found. Continuing without cookies.");
        return Ok(());
    }

    let cookies = match load_cookies(cookies_path) {
        Ok(cookies) => cookies,
        Err(e) => {
            tracing::warn!("⚠️ Failed to load cookies from {}: {}", cookies_path, e);
            return Ok(());
        }
    };

    if let Err(e) = session.set_cookies(&cookies).await {
        tracing::warn!("⚠️ Failed to apply cookies: {}", e);
        return Ok(());
    }
    tracing::info!("🍪 {} cookies loaded from file and applied", cookies.len());

    match session.reload().await {
        Ok(()) => {
            let url = session.current_url().await.unwrap_or_default();
            tracing::info!("Main page refreshed with cookies: {}", url);
        }
        Err(e) => tracing::warn!("⚠️ Refresh after applying cookies failed: {}", e),
    }

    Ok(())
}
