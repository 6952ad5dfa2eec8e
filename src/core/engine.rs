use crate::core::pricing::FareTable;
use crate::core::supersede::RequestId;
use crate::domain::model::{GeoPoint, PricedEstimate, RouteResponse, RouteResult, ServiceTier};
use crate::domain::ports::RoutingProvider;
use crate::utils::error::{QuoteError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ROUTING_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything one pricing call needs; nothing outlives it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub id: RequestId,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub tier: ServiceTier,
}

/// Picks the provider's first candidate. Alternatives are ignored.
pub fn select_route(response: &RouteResponse) -> Result<RouteResult> {
    let first = response.candidates.first().ok_or(QuoteError::NoRouteFound)?;

    if response.candidates.len() > 1 {
        tracing::debug!(
            "Routing returned {} candidates, using the first",
            response.candidates.len()
        );
    }

    RouteResult::from_candidate(first)
}

pub struct TripPricingEngine<R: RoutingProvider> {
    router: R,
    fares: FareTable,
    timeout: Duration,
}

impl<R: RoutingProvider> TripPricingEngine<R> {
    pub fn new(router: R) -> Self {
        Self {
            router,
            fares: FareTable::default(),
            timeout: DEFAULT_ROUTING_TIMEOUT,
        }
    }

    pub fn with_fares(mut self, fares: FareTable) -> Self {
        self.fares = fares;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fares(&self) -> &FareTable {
        &self.fares
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn estimate(
        &self,
        pickup: GeoPoint,
        dropoff: GeoPoint,
        tier: ServiceTier,
    ) -> Result<PricedEstimate> {
        let route = self.route(pickup, dropoff).await?;
        let estimate = self.fares.price(&route, tier);

        tracing::info!(
            "Trip estimate: {} miles, {} min, ${:.2} ({})",
            estimate.display_distance(),
            estimate.duration_minutes,
            estimate.display_fare(),
            tier.key()
        );

        Ok(estimate)
    }

    pub async fn estimate_request(&self, request: &EstimateRequest) -> Result<PricedEstimate> {
        tracing::debug!("Estimating request {}", request.id);
        self.estimate(request.pickup, request.dropoff, request.tier)
            .await
    }

    /// Validates both points, then asks the provider for a route.
    pub async fn route(&self, pickup: GeoPoint, dropoff: GeoPoint) -> Result<RouteResult> {
        pickup.validate("pickup")?;
        dropoff.validate("dropoff")?;

        tracing::debug!("Requesting route {} -> {}", pickup, dropoff);

        let response = match tokio::time::timeout(self.timeout, self.router.route(pickup, dropoff))
            .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!("Routing failed: {}", e);
                return Err(match e {
                    QuoteError::RoutingUnavailable { .. } | QuoteError::NoRouteFound => e,
                    other => QuoteError::routing(other.to_string()),
                });
            }
            Err(_) => {
                tracing::warn!("Routing timed out after {:?}", self.timeout);
                return Err(QuoteError::routing(format!(
                    "no response within {:?}",
                    self.timeout
                )));
            }
        };

        select_route(&response)
    }

    /// Prices an existing estimate's route for another tier without routing again.
    pub fn reprice(&self, estimate: &PricedEstimate, tier: ServiceTier) -> PricedEstimate {
        self.fares.price(&estimate.route(), tier)
    }
}
