use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// 有上限的輪詢等待：反覆檢查條件直到成立或逾時
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Wait {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// 回傳 `Ok(true)` 表示條件成立，`Ok(false)` 表示逾時；檢查本身的錯誤直接向上傳遞
    pub async fn until<F, Fut>(&self, mut probe: F) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let deadline = Instant::now() + self.timeout;

        loop {
            if probe().await? {
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }

            tokio::time::sleep(self.interval.min(deadline - now)).await;
        }
    }
}
