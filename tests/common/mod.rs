#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use ticket_sniper::domain::model::{Control, SessionCookie};
use ticket_sniper::domain::ports::{Notifier, PageSession};
use ticket_sniper::{BotError, Result};
use tokio::sync::Mutex;

/// 每次 open() 依序取用的頁面劇本
#[derive(Debug, Clone)]
pub enum ScriptedPage {
    Results {
        html: String,
        lockable_rows: Vec<usize>,
        continue_ready: bool,
        purchase_url: String,
        /// 檢查這些結果列的按鈕時瀏覽器回報錯誤
        faulty_rows: Vec<usize>,
        faulty_continue: bool,
        /// 列表出現了，但讀取 DOM 失敗
        unreadable: bool,
    },
    /// 頁面開得起來，但結果列表永遠不出現
    Empty,
    /// 導航本身失敗
    Unreachable,
}

impl ScriptedPage {
    pub fn results(html: String) -> Self {
        ScriptedPage::Results {
            html,
            lockable_rows: Vec::new(),
            continue_ready: false,
            purchase_url: String::new(),
            faulty_rows: Vec::new(),
            faulty_continue: false,
            unreadable: false,
        }
    }

    pub fn faulty_rows(mut self, rows: &[usize]) -> Self {
        if let ScriptedPage::Results { faulty_rows, .. } = &mut self {
            *faulty_rows = rows.to_vec();
        }
        self
    }

    pub fn faulty_continue(mut self) -> Self {
        if let ScriptedPage::Results {
            faulty_continue, ..
        } = &mut self
        {
            *faulty_continue = true;
        }
        self
    }

    pub fn unreadable(mut self) -> Self {
        if let ScriptedPage::Results { unreadable, .. } = &mut self {
            *unreadable = true;
        }
        self
    }

    pub fn lockable(mut self, rows: &[usize]) -> Self {
        if let ScriptedPage::Results { lockable_rows, .. } = &mut self {
            *lockable_rows = rows.to_vec();
        }
        self
    }

    pub fn with_checkout(mut self, url: &str) -> Self {
        if let ScriptedPage::Results {
            continue_ready,
            purchase_url,
            ..
        } = &mut self
        {
            *continue_ready = true;
            *purchase_url = url.to_string();
        }
        self
    }
}

#[derive(Debug, Default)]
pub struct SessionLog {
    pub opens: Vec<String>,
    pub reloads: usize,
    pub clicks: Vec<Control>,
    pub cookies: Vec<SessionCookie>,
    pub closed: bool,
}

#[derive(Debug, Default)]
struct PageState {
    current: Option<ScriptedPage>,
    url: String,
    locked: bool,
}

pub struct ScriptedSession {
    pages: VecDeque<ScriptedPage>,
    state: Mutex<PageState>,
    log: Arc<Mutex<SessionLog>>,
}

impl ScriptedSession {
    /// 劇本用完後重複最後一頁
    pub fn new(pages: Vec<ScriptedPage>) -> (Self, Arc<Mutex<SessionLog>>) {
        let log = Arc::new(Mutex::new(SessionLog::default()));
        let session = Self {
            pages: pages.into(),
            state: Mutex::new(PageState::default()),
            log: Arc::clone(&log),
        };
        (session, log)
    }

    fn next_page(&mut self) -> ScriptedPage {
        if self.pages.len() > 1 {
            self.pages.pop_front().unwrap()
        } else {
            self.pages.front().cloned().unwrap_or(ScriptedPage::Empty)
        }
    }
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn open(&mut self, url: &str) -> Result<()> {
        self.log.lock().await.opens.push(url.to_string());
        let page = self.next_page();

        if let ScriptedPage::Unreachable = page {
            return Err(BotError::browser("net::ERR_CONNECTION_RESET"));
        }

        let mut state = self.state.lock().await;
        state.current = Some(page);
        state.url = url.to_string();
        state.locked = false;
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        self.log.lock().await.reloads += 1;
        Ok(())
    }

    async fn is_present(&self, _selector: &str) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(matches!(state.current, Some(ScriptedPage::Results { .. })))
    }

    async fn is_clickable(&self, control: &Control) -> Result<bool> {
        let state = self.state.lock().await;
        let Some(ScriptedPage::Results {
            lockable_rows,
            continue_ready,
            faulty_rows,
            faulty_continue,
            ..
        }) = &state.current
        else {
            return Ok(false);
        };

        let faulty = match control {
            Control::Row { index, .. } => faulty_rows.contains(index),
            Control::Page { .. } => *faulty_continue,
        };
        if faulty {
            return Err(BotError::browser("Execution context was destroyed"));
        }

        Ok(match control {
            Control::Row { index, .. } => lockable_rows.contains(index),
            Control::Page { .. } => *continue_ready && state.locked,
        })
    }

    async fn click(&mut self, control: &Control) -> Result<()> {
        self.log.lock().await.clicks.push(control.clone());

        let mut state = self.state.lock().await;
        let (lockable, ready, purchase) = match &state.current {
            Some(ScriptedPage::Results {
                lockable_rows,
                continue_ready,
                purchase_url,
                ..
            }) => (lockable_rows.clone(), *continue_ready, purchase_url.clone()),
            _ => return Err(BotError::browser("no such element")),
        };

        match control {
            Control::Row { index, .. } if lockable.contains(index) => {
                state.locked = true;
                Ok(())
            }
            Control::Page { .. } if ready && state.locked => {
                state.url = purchase;
                Ok(())
            }
            _ => Err(BotError::browser("element is not clickable")),
        }
    }

    async fn html(&self) -> Result<String> {
        let state = self.state.lock().await;
        match &state.current {
            Some(ScriptedPage::Results {
                unreadable: true, ..
            }) => Err(BotError::browser("Target closed while reading page content")),
            Some(ScriptedPage::Results { html, .. }) => Ok(html.clone()),
            _ => Ok("<html><body></body></html>".to_string()),
        }
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().await.url.clone())
    }

    async fn set_cookies(&mut self, cookies: &[SessionCookie]) -> Result<()> {
        self.log.lock().await.cookies.extend_from_slice(cookies);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().await.closed = true;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub messages: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        self.messages.lock().await.push(message.to_string());
        Ok(())
    }
}

/// (車次, 車廂, 座位, 價格) 組成的結果頁
pub fn results_page(rows: &[(&str, &str, &str, &str)]) -> String {
    let body: Vec<String> = rows
        .iter()
        .map(|(name, wagon, capacity, price)| {
            format!(
                r#"<div class="train-result">
                     <div class="train-name">{}</div>
                     <div class="wagon-type">{}</div>
                     <div class="field-value">{}</div>
                     <div class="price">{}</div>
                     <button class="lock-btn">انتخاب</button>
                   </div>"#,
                name, wagon, capacity, price
            )
        })
        .collect();

    format!(
        "<html><body><section class=\"results\">{}</section></body></html>",
        body.join("\n")
    )
}
