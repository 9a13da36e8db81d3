//! Headless Chromium session driven through chromiumoxide.

use crate::config::BrowserConfig;
use crate::domain::model::{Control, SessionCookie};
use crate::domain::ports::PageSession;
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::fmt::Display;
use tokio::task::JoinHandle;

pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    /// 啟動瀏覽器並開啟一個空白分頁；失敗屬於啟動錯誤
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let mut builder = LaunchConfig::builder()
            .window_size(config.window_width, config.window_height)
            .no_sandbox()
            .arg(format!("--user-agent={}", config.user_agent))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--disable-extensions");

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let launch_config = builder.build().map_err(|e| BotError::StartupError {
            message: format!("failed to build browser config: {}", e),
        })?;

        let (browser, mut handler) =
            Browser::launch(launch_config)
                .await
                .map_err(|e| BotError::StartupError {
                    message: format!("failed to launch Chrome: {}", e),
                })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BotError::StartupError {
                message: format!("failed to open page: {}", e),
            })?;

        tracing::info!("🌐 Chrome started (headless: {})", config.headless);
        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T> {
        let result = self.page.evaluate(script.as_str()).await.map_err(cdp("evaluate"))?;
        result
            .into_value()
            .map_err(|e| BotError::browser(format!("unexpected script result: {}", e)))
    }

    async fn locate(&self, control: &Control) -> Result<Element> {
        match control {
            Control::Page { selector } => self
                .page
                .find_element(selector.as_str())
                .await
                .map_err(cdp("find element")),
            Control::Row {
                container,
                index,
                selector,
            } => {
                let rows = self
                    .page
                    .find_elements(container.as_str())
                    .await
                    .map_err(cdp("find rows"))?;
                let row = rows.get(*index).ok_or_else(|| {
                    BotError::browser(format!("result row {} is no longer on the page", index))
                })?;
                row.find_element(selector.as_str())
                    .await
                    .map_err(cdp("find element in row"))
            }
        }
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn open(&mut self, url: &str) -> Result<()> {
        self.page.goto(url).await.map_err(cdp("navigate"))?;
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        self.page.reload().await.map_err(cdp("reload"))?;
        Ok(())
    }

    async fn is_present(&self, selector: &str) -> Result<bool> {
        self.evaluate(format!("document.querySelector({}) !== null", js_string(selector)?))
            .await
    }

    async fn is_clickable(&self, control: &Control) -> Result<bool> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return false; \
             const style = window.getComputedStyle(el); \
             return !el.disabled && el.getAttribute('aria-disabled') !== 'true' \
             && style.visibility !== 'hidden' && style.pointerEvents !== 'none' \
             && el.getClientRects().length > 0; }})()",
            locate_script(control)?
        );
        self.evaluate(script).await
    }

    async fn click(&mut self, control: &Control) -> Result<()> {
        let element = self.locate(control).await?;
        element.click().await.map_err(cdp("click"))?;
        Ok(())
    }

    async fn html(&self) -> Result<String> {
        self.page.content().await.map_err(cdp("read page content"))
    }

    async fn current_url(&self) -> Result<String> {
        let url = self.page.url().await.map_err(cdp("read url"))?;
        Ok(url.unwrap_or_default())
    }

    async fn set_cookies(&mut self, cookies: &[SessionCookie]) -> Result<()> {
        let params = cookies
            .iter()
            .map(cookie_param)
            .collect::<Result<Vec<_>>>()?;
        self.page.set_cookies(params).await.map_err(cdp("set cookies"))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.browser.close().await.map_err(cdp("close browser"))?;
        let _ = self.browser.wait().await;
        self.handler.abort();
        Ok(())
    }
}

fn cdp<E: Display>(action: &'static str) -> impl FnOnce(E) -> BotError {
    move |e| BotError::browser(format!("{} failed: {}", action, e))
}

fn js_string(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn locate_script(control: &Control) -> Result<String> {
    Ok(match control {
        Control::Page { selector } => format!("document.querySelector({})", js_string(selector)?),
        Control::Row {
            container,
            index,
            selector,
        } => format!(
            "(() => {{ const row = document.querySelectorAll({})[{}]; \
             return row ? row.querySelector({}) : null; }})()",
            js_string(container)?,
            index,
            js_string(selector)?
        ),
    })
}

fn cookie_param(cookie: &SessionCookie) -> Result<CookieParam> {
    let mut builder = CookieParam::builder()
        .name(cookie.name.clone())
        .value(cookie.value.clone());
    if let Some(domain) = &cookie.domain {
        builder = builder.domain(domain.clone());
    }
    if let Some(path) = &cookie.path {
        builder = builder.path(path.clone());
    }
    if let Some(secure) = cookie.secure {
        builder = builder.secure(secure);
    }
    if let Some(http_only) = cookie.http_only {
        builder = builder.http_only(http_only);
    }
    builder.build().map_err(|e| BotError::browser(format!("invalid cookie {}: {}", cookie.name, e)))
}
