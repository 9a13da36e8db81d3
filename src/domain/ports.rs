use crate::domain::model::{Control, SessionCookie};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 單一瀏覽器分頁，整個程式生命週期只有輪詢迴圈擁有並操作它
#[async_trait]
pub trait PageSession: Send + Sync {
    async fn open(&mut self, url: &str) -> Result<()>;

    async fn reload(&mut self) -> Result<()>;

    /// 頁面上是否已存在符合 selector 的元素
    async fn is_present(&self, selector: &str) -> Result<bool>;

    /// 控制項是否存在、可見且未停用
    async fn is_clickable(&self, control: &Control) -> Result<bool>;

    async fn click(&mut self, control: &Control) -> Result<()>;

    /// 目前渲染完成的 DOM
    async fn html(&self) -> Result<String>;

    async fn current_url(&self) -> Result<String>;

    async fn set_cookies(&mut self, cookies: &[SessionCookie]) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}
