pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{NominatimGeocoder, OsrmRouter};
pub use app::{BookingSession, PaymentDesk, Quote, QuoteOutcome, QuoteRequest};
pub use config::TomlConfig;
pub use crate::core::{engine::TripPricingEngine, pricing::FareTable};
pub use domain::model::{GeoPoint, Location, PricedEstimate, ServiceTier};
pub use utils::error::{QuoteError, Result};
