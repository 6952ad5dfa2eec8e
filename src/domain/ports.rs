use crate::domain::model::{GeoPoint, GeocodeHit, RegionFilter, RouteResponse};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Driving routes between two points.
///
/// Transport failures and non-success answers must be reported as
/// `QuoteError::RoutingUnavailable`; "no road connects these points" is an
/// `Ok` response with no candidates.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn route(&self, pickup: GeoPoint, dropoff: GeoPoint) -> Result<RouteResponse>;
}

#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn search(&self, query: &str, region: Option<&RegionFilter>) -> Result<Vec<GeocodeHit>>;
    async fn reverse_geocode(&self, point: GeoPoint) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn routing_endpoint(&self) -> &str;
    fn routing_profile(&self) -> &str;
    fn routing_timeout(&self) -> Duration;
    fn geocoding_endpoint(&self) -> &str;
    fn geocoding_contact_email(&self) -> &str;
    fn geocoding_timeout(&self) -> Duration;
}
