pub mod booking;
pub mod payment;

pub use booking::{BookingSession, Quote, QuoteOutcome, QuoteRequest};
pub use payment::PaymentDesk;
