pub mod engine;
pub mod pricing;
pub mod supersede;

pub use crate::domain::model::{GeoPoint, PricedEstimate, RouteResult, ServiceTier};
pub use crate::domain::ports::{ConfigProvider, GeocodingProvider, RoutingProvider};
pub use crate::utils::error::Result;
