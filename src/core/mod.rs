pub mod extractor;
pub mod poller;
pub mod policy;
pub mod reservation;
pub mod wait;

pub use crate::domain::model::{Decision, Offer, PollCycle, ReservationOutcome, ReservedTicket};
pub use crate::domain::ports::{Notifier, PageSession};
pub use crate::utils::error::Result;
