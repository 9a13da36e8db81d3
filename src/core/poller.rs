//! The poll → extract → filter → reserve loop.
//!
//! Each cycle walks `Searching → Extracting → Filtering → {Done | Backoff |
//! Recovering}`. `Done` is the only exit from [`TicketPoller::run`]; every
//! other outcome ends the cycle with a delay and the next cycle starts from
//! `Searching` with the same search URL.

use crate::config::{AcceptanceConfig, BotConfig, PageLayout, TimingConfig, MAX_DELAY_SECS};
use crate::config::search::build_search_url;
use crate::core::extractor::OfferExtractor;
use crate::core::policy::decide;
use crate::core::reservation::ReservationAttempt;
use crate::core::wait::Wait;
use crate::domain::model::{
    CycleOutcome, Decision, Offer, PollCycle, ReservationOutcome, ReservedTicket,
};
use crate::domain::ports::{Notifier, PageSession};
use crate::utils::error::{BotError, Result};
use rand::Rng;
use std::time::Duration;

#[derive(Debug)]
enum PollState {
    Searching,
    Extracting,
    Filtering(Vec<Offer>),
    Backoff,
    /// 結果逾時 (`BotError::LoadTimeout`) 或整輪錯誤，兩者都以重新載入恢復
    Recovering(BotError),
    Done(ReservedTicket),
}

pub struct TicketPoller<S: PageSession, N: Notifier> {
    session: S,
    notifier: N,
    extractor: OfferExtractor,
    search_url: String,
    acceptance: AcceptanceConfig,
    layout: PageLayout,
    timing: TimingConfig,
    cycles: u64,
}

impl<S: PageSession, N: Notifier> TicketPoller<S, N> {
    pub fn new(session: S, notifier: N, config: &BotConfig) -> Result<Self> {
        Ok(Self {
            session,
            notifier,
            extractor: OfferExtractor::new(&config.page)?,
            search_url: build_search_url(&config.search)?,
            acceptance: config.acceptance.clone(),
            layout: config.page.clone(),
            timing: config.timing.clone(),
            cycles: 0,
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// 持續輪詢直到成功預訂；成功後通知並關閉瀏覽器
    pub async fn run(mut self) -> ReservedTicket {
        tracing::info!("🔎 Search URL: {}", self.search_url);

        loop {
            let cycle = self.run_cycle().await;
            if let CycleOutcome::Reserved(ticket) = cycle.outcome {
                self.finish(&ticket).await;
                return ticket;
            }
        }
    }

    /// 執行一輪完整的狀態轉換，包含結尾的退避或恢復延遲
    pub async fn run_cycle(&mut self) -> PollCycle {
        self.cycles += 1;
        let mut cycle = PollCycle::begin(self.cycles, &self.search_url);
        let mut state = PollState::Searching;

        loop {
            tracing::trace!("cycle {} state: {:?}", cycle.number, state);
            state = match state {
                PollState::Searching => self.search().await,
                PollState::Extracting => self.await_results().await,
                PollState::Filtering(offers) => {
                    cycle.offers = offers;
                    self.filter_and_reserve(&cycle.offers, &mut cycle.attempted)
                        .await
                }
                PollState::Backoff => {
                    self.backoff().await;
                    cycle.outcome = CycleOutcome::NoMatch;
                    return cycle;
                }
                PollState::Recovering(error) => {
                    cycle.outcome = match &error {
                        BotError::LoadTimeout { .. } => CycleOutcome::LoadFailed,
                        e => CycleOutcome::Faulted(e.to_string()),
                    };
                    self.recover(&error).await;
                    return cycle;
                }
                PollState::Done(ticket) => {
                    cycle.outcome = CycleOutcome::Reserved(ticket);
                    return cycle;
                }
            };
        }
    }

    async fn search(&mut self) -> PollState {
        match self.session.open(&self.search_url).await {
            Ok(()) => {
                tracing::info!("🔄 Search link refreshed (cycle {})", self.cycles);
                PollState::Extracting
            }
            Err(e) => PollState::Recovering(e),
        }
    }

    async fn await_results(&mut self) -> PollState {
        let wait = Wait::new(self.timing.results_timeout(), self.timing.poll_interval());
        let session = &self.session;
        let container = self.layout.results_container.as_str();

        match wait.until(move || session.is_present(container)).await {
            Ok(true) => {}
            Ok(false) => {
                return PollState::Recovering(BotError::LoadTimeout {
                    selector: container.to_string(),
                    waited: wait.timeout,
                });
            }
            Err(e) => return PollState::Recovering(e),
        }

        match self.session.html().await {
            Ok(html) => {
                let offers = self.extractor.extract(&html);
                tracing::info!("🚆 Number of trains found: {}", offers.len());
                PollState::Filtering(offers)
            }
            Err(e) => PollState::Recovering(e),
        }
    }

    /// 依頁面順序檢查，第一個成功預訂者勝出；每個被接受的車次本輪最多嘗試一次
    async fn filter_and_reserve(
        &mut self,
        offers: &[Offer],
        attempted: &mut Vec<usize>,
    ) -> PollState {
        let attempt = ReservationAttempt::new(&self.layout, &self.timing);

        for offer in offers {
            tracing::info!(
                "Train name: {}, Wagon type: {}, Capacity: {:?}, Price: {}",
                offer.name,
                offer.category,
                offer.capacity_text,
                offer.price_label()
            );

            if let Decision::Reject(reason) = decide(offer, &self.acceptance) {
                tracing::info!("⏭️ Skipped {}: {}", offer.name, reason);
                continue;
            }

            attempted.push(offer.position);
            match attempt.run(&mut self.session, offer).await {
                ReservationOutcome::Success { purchase_link } => {
                    return PollState::Done(ReservedTicket {
                        offer: offer.clone(),
                        purchase_link,
                    });
                }
                ReservationOutcome::Failed { reason } => {
                    tracing::warn!("❌ Error reserving train {}: {}", offer.name, reason);
                }
            }
        }

        PollState::Backoff
    }

    async fn backoff(&self) {
        let delay = backoff_delay(&self.timing);
        tracing::info!(
            "😴 No suitable tickets found. Refreshing in {:.1} seconds...",
            delay.as_secs_f64()
        );
        tokio::time::sleep(delay).await;
    }

    async fn recover(&mut self, error: &BotError) {
        if error.is_transient() {
            tracing::warn!("🔁 {}, reloading (cycle {})", error, self.cycles);
        } else {
            tracing::error!("⚠️ Cycle {} failed: {}, reloading", self.cycles, error);
        }

        if let Err(e) = self.session.reload().await {
            tracing::warn!("Reload failed: {}", e);
        }
        tokio::time::sleep(self.timing.reload_delay()).await;
    }

    async fn finish(&mut self, ticket: &ReservedTicket) {
        tracing::info!(
            "🎉 Reserved {} ({} Rials): {}",
            ticket.offer.name,
            ticket.offer.price_label(),
            ticket.purchase_link
        );

        match self.notifier.notify(&ticket.notification_text()).await {
            Ok(()) => tracing::info!("📨 Notification sent. Exiting..."),
            Err(e) => tracing::warn!("Failed to send notification: {}", e),
        }

        if let Err(e) = self.session.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }
    }
}

/// 在 [backoff_min, backoff_max) 之間均勻取樣；非有限或超出上限的設定值先夾到 [0, MAX_DELAY_SECS]
pub fn backoff_delay(timing: &TimingConfig) -> Duration {
    let min = clamp_secs(timing.backoff_min_secs);
    let max = clamp_secs(timing.backoff_max_secs);
    if max <= min {
        return Duration::from_secs_f64(min);
    }
    Duration::from_secs_f64(rand::thread_rng().gen_range(min..max))
}

fn clamp_secs(secs: f64) -> f64 {
    if secs.is_nan() {
        return 0.0;
    }
    secs.clamp(0.0, MAX_DELAY_SECS as f64)
}
