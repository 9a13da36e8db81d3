//! Two-stage reservation of one accepted offer: lock the seat from its result
//! row, then confirm with the page-level continue-purchase control.
//!
//! Every failure at either stage, including the session erroring while it is
//! probed, yields [`ReservationOutcome::Failed`] so the caller can move on to
//! the next accepted offer in the same cycle.

use crate::config::{PageLayout, TimingConfig};
use crate::core::wait::Wait;
use crate::domain::model::{Control, Offer, ReservationFailure, ReservationOutcome};
use crate::domain::ports::PageSession;
use crate::utils::error::{BotError, Result};

pub struct ReservationAttempt<'a> {
    layout: &'a PageLayout,
    timing: &'a TimingConfig,
}

impl<'a> ReservationAttempt<'a> {
    pub fn new(layout: &'a PageLayout, timing: &'a TimingConfig) -> Self {
        Self { layout, timing }
    }

    pub fn reserve_control(&self, offer: &Offer) -> Control {
        Control::Row {
            container: self.layout.results_container.clone(),
            index: offer.position,
            selector: self.layout.reserve_button.clone(),
        }
    }

    pub fn continue_control(&self) -> Control {
        Control::Page {
            selector: self.layout.continue_button.clone(),
        }
    }

    pub async fn run<S>(&self, session: &mut S, offer: &Offer) -> ReservationOutcome
    where
        S: PageSession + ?Sized,
    {
        match self.stages(session, offer).await {
            Ok(outcome) => outcome,
            Err(failure) => ReservationOutcome::Failed { reason: failure },
        }
    }

    async fn stages<S>(
        &self,
        session: &mut S,
        offer: &Offer,
    ) -> std::result::Result<ReservationOutcome, ReservationFailure>
    where
        S: PageSession + ?Sized,
    {
        // 第一步：鎖定座位
        let reserve = self.reserve_control(offer);
        let reserve_wait = Wait::new(self.timing.reserve_timeout(), self.timing.poll_interval());
        if !wait_clickable(session, &reserve, reserve_wait)
            .await
            .map_err(session_fault("reserve"))?
        {
            return Err(ReservationFailure::ReserveControlUnavailable {
                waited: reserve_wait.timeout,
            });
        }
        session
            .click(&reserve)
            .await
            .map_err(activation_failed("reserve"))?;
        tracing::info!("🔒 Reserve clicked: {}", offer.name);

        // 第二步：繼續購買
        let proceed = self.continue_control();
        let continue_wait =
            Wait::new(self.timing.continue_timeout(), self.timing.poll_interval());
        if !wait_clickable(session, &proceed, continue_wait)
            .await
            .map_err(session_fault("continue"))?
        {
            return Err(ReservationFailure::ContinueControlUnavailable {
                waited: continue_wait.timeout,
            });
        }

        let before = session
            .current_url()
            .await
            .map_err(session_fault("continue"))?;
        session
            .click(&proceed)
            .await
            .map_err(activation_failed("continue"))?;
        tracing::info!("🛒 Continue purchase clicked");

        let purchase_link = self
            .settled_url(session, &before)
            .await
            .map_err(session_fault("continue"))?;
        Ok(ReservationOutcome::Success { purchase_link })
    }

    /// 等待頁面導向新網址；逾時則回傳當下的網址
    async fn settled_url<S>(&self, session: &S, before: &str) -> Result<String>
    where
        S: PageSession + ?Sized,
    {
        let settle = Wait::new(self.timing.navigation_settle(), self.timing.poll_interval());
        // 導航途中讀不到網址視為尚未完成
        let navigated = settle
            .until(move || async move {
                let changed = match session.current_url().await {
                    Ok(current) => current != before,
                    Err(_) => false,
                };
                Ok::<bool, BotError>(changed)
            })
            .await?;

        if !navigated {
            tracing::debug!("URL unchanged after continue click, reporting current page");
        }
        session.current_url().await
    }
}

async fn wait_clickable<S>(session: &S, control: &Control, wait: Wait) -> Result<bool>
where
    S: PageSession + ?Sized,
{
    wait.until(move || session.is_clickable(control)).await
}

fn session_fault(stage: &'static str) -> impl FnOnce(BotError) -> ReservationFailure {
    move |e| ReservationFailure::SessionFault {
        stage: stage.to_string(),
        message: e.to_string(),
    }
}

fn activation_failed(stage: &'static str) -> impl FnOnce(BotError) -> ReservationFailure {
    move |e| ReservationFailure::ActivationFailed {
        stage: stage.to_string(),
        message: e.to_string(),
    }
}
