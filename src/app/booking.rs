use crate::adapters::{NominatimGeocoder, OsrmRouter};
use crate::app::payment::PaymentDesk;
use crate::config::toml_config::TomlConfig;
use crate::core::engine::{EstimateRequest, TripPricingEngine};
use crate::core::supersede::{RequestId, RequestTracker};
use crate::core::{ConfigProvider, GeocodingProvider, RoutingProvider};
use crate::domain::model::{
    GeoPoint, GeocodeHit, Location, PaymentRequest, Place, PricedEstimate, RegionFilter,
    ServiceTier, TripSummary,
};
use crate::utils::error::{QuoteError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_QUERY_LENGTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub pickup: Location,
    pub dropoff: Location,
    pub tier: ServiceTier,
    pub pickup_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub request_id: RequestId,
    pub pickup: Place,
    pub dropoff: Place,
    pub estimate: PricedEstimate,
    pub pickup_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuoteOutcome {
    Current(Quote),
    /// A newer quote was issued while this one was in flight.
    Superseded { request_id: RequestId },
}

impl QuoteOutcome {
    pub fn into_current(self) -> Option<Quote> {
        match self {
            QuoteOutcome::Current(quote) => Some(quote),
            QuoteOutcome::Superseded { .. } => None,
        }
    }
}

/// One rider's booking flow: resolve both ends, price the trip, hand over
/// payment instructions. Quotes follow latest-issued-wins.
pub struct BookingSession<R: RoutingProvider, G: GeocodingProvider> {
    engine: TripPricingEngine<R>,
    geocoder: G,
    region: RegionFilter,
    min_query_length: usize,
    tracker: RequestTracker,
    payments: PaymentDesk,
}

impl BookingSession<OsrmRouter, NominatimGeocoder> {
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        let engine = TripPricingEngine::new(OsrmRouter::from_config(config)?)
            .with_fares(config.pricing)
            .with_timeout(config.routing_timeout());
        let geocoder = NominatimGeocoder::from_config(config)?;

        Ok(Self::new(engine, geocoder, PaymentDesk::from_config(&config.payment))
            .with_region(config.region_filter())
            .with_min_query_length(config.geocoding.min_query_length))
    }
}

impl<R: RoutingProvider, G: GeocodingProvider> BookingSession<R, G> {
    pub fn new(engine: TripPricingEngine<R>, geocoder: G, payments: PaymentDesk) -> Self {
        Self {
            engine,
            geocoder,
            region: RegionFilter::default(),
            min_query_length: DEFAULT_MIN_QUERY_LENGTH,
            tracker: RequestTracker::new(),
            payments,
        }
    }

    pub fn with_region(mut self, region: RegionFilter) -> Self {
        self.region = region;
        self
    }

    pub fn with_min_query_length(mut self, min_query_length: usize) -> Self {
        self.min_query_length = min_query_length;
        self
    }

    pub fn engine(&self) -> &TripPricingEngine<R> {
        &self.engine
    }

    pub fn payments(&self) -> &PaymentDesk {
        &self.payments
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    fn region(&self) -> Option<&RegionFilter> {
        if self.region == RegionFilter::default() {
            None
        } else {
            Some(&self.region)
        }
    }

    fn check_query(&self, query: &str) -> Result<()> {
        if query.trim().chars().count() < self.min_query_length {
            return Err(QuoteError::QueryTooShort {
                query: query.to_string(),
                min_length: self.min_query_length,
            });
        }
        Ok(())
    }

    /// Address suggestions for a partially typed query.
    pub async fn suggest(&self, query: &str) -> Result<Vec<GeocodeHit>> {
        self.check_query(query)?;
        self.geocoder.search(query.trim(), self.region()).await
    }

    pub async fn resolve_address(&self, query: &str) -> Result<Place> {
        let hits = self.suggest(query).await?;

        hits.into_iter()
            .next()
            .map(Place::from)
            .ok_or_else(|| QuoteError::NoAddressMatch {
                query: query.trim().to_string(),
            })
    }

    pub async fn resolve(&self, location: &Location) -> Result<Place> {
        match location {
            Location::Point(point) => Ok(Place::from_point(*point)),
            Location::Address(query) => self.resolve_address(query).await,
        }
    }

    /// Turns a device position into a pickup place. If the address lookup fails
    /// the coordinates themselves become the label.
    pub async fn place_from_current_location(&self, point: GeoPoint) -> Result<Place> {
        point.validate("current location")?;

        match self.geocoder.reverse_geocode(point).await {
            Ok(label) => Ok(Place { point, label }),
            Err(e) => {
                tracing::warn!("Reverse geocoding failed, using coordinates: {}", e);
                Ok(Place::from_point(point))
            }
        }
    }

    pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteOutcome> {
        let request_id = self.tracker.issue();

        match self.price(request_id, request).await {
            Ok(quote) => Ok(self
                .tracker
                .accept(request_id, quote)
                .map(QuoteOutcome::Current)
                .unwrap_or(QuoteOutcome::Superseded { request_id })),
            // 過期請求的錯誤同樣不應該顯示給使用者
            Err(_) if !self.tracker.is_current(request_id) => {
                tracing::debug!("Dropping error of superseded request {}", request_id);
                Ok(QuoteOutcome::Superseded { request_id })
            }
            Err(e) => Err(e),
        }
    }

    async fn price(&self, request_id: RequestId, request: &QuoteRequest) -> Result<Quote> {
        let pickup = self.resolve(&request.pickup).await?;
        let dropoff = self.resolve(&request.dropoff).await?;

        let estimate = self
            .engine
            .estimate_request(&EstimateRequest {
                id: request_id,
                pickup: pickup.point,
                dropoff: dropoff.point,
                tier: request.tier,
            })
            .await?;

        Ok(Quote {
            request_id,
            pickup,
            dropoff,
            estimate,
            pickup_at: request.pickup_at,
        })
    }

    /// Same trip, another tier. No routing call.
    pub fn reprice(&self, quote: &Quote, tier: ServiceTier) -> Quote {
        Quote {
            estimate: self.engine.reprice(&quote.estimate, tier),
            ..quote.clone()
        }
    }

    pub fn payment_request(&self, quote: &Quote) -> PaymentRequest {
        PaymentRequest {
            total_fare: quote.estimate.total_fare,
            trip_summary: TripSummary {
                pickup: quote.pickup.label.clone(),
                dropoff: quote.dropoff.label.clone(),
                service: quote.estimate.tier.display_name().to_string(),
                distance_miles: quote.estimate.display_distance(),
                duration_minutes: quote.estimate.duration_minutes,
                pickup_at: quote.pickup_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RouteCandidate, RouteResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedRouter {
        distance_meters: f64,
        duration_seconds: f64,
    }

    #[async_trait]
    impl RoutingProvider for FixedRouter {
        async fn route(&self, _pickup: GeoPoint, _dropoff: GeoPoint) -> Result<RouteResponse> {
            Ok(RouteResponse {
                candidates: vec![RouteCandidate {
                    distance_meters: self.distance_meters,
                    duration_seconds: self.duration_seconds,
                    geometry: None,
                }],
            })
        }
    }

    #[derive(Default)]
    struct Gazetteer {
        searches: AtomicUsize,
        reverse_fails: bool,
    }

    #[async_trait]
    impl GeocodingProvider for Gazetteer {
        async fn search(
            &self,
            query: &str,
            _region: Option<&RegionFilter>,
        ) -> Result<Vec<GeocodeHit>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            let hits = match query {
                "City Hall" => vec![GeocodeHit {
                    point: GeoPoint::new(40.7128, -74.0060),
                    label: "City Hall, New York".to_string(),
                }],
                "Times Square" => vec![
                    GeocodeHit {
                        point: GeoPoint::new(40.7580, -73.9855),
                        label: "Times Square, New York".to_string(),
                    },
                    GeocodeHit {
                        point: GeoPoint::new(41.0, -74.5),
                        label: "Times Square Diner, NJ".to_string(),
                    },
                ],
                _ => vec![],
            };
            Ok(hits)
        }

        async fn reverse_geocode(&self, _point: GeoPoint) -> Result<String> {
            if self.reverse_fails {
                Err(QuoteError::geocoding("429 Too Many Requests"))
            } else {
                Ok("Battery Park, New York".to_string())
            }
        }
    }

    fn session(geocoder: Gazetteer) -> BookingSession<FixedRouter, Gazetteer> {
        let engine = TripPricingEngine::new(FixedRouter {
            distance_meters: 8046.72,
            duration_seconds: 600.0,
        });
        BookingSession::new(engine, geocoder, PaymentDesk::default())
    }

    fn request(tier: ServiceTier) -> QuoteRequest {
        QuoteRequest {
            pickup: Location::Address("City Hall".to_string()),
            dropoff: Location::Address("Times Square".to_string()),
            tier,
            pickup_at: None,
        }
    }

    #[tokio::test]
    async fn test_quote_resolves_addresses_with_first_hit() {
        let session = session(Gazetteer::default());

        let quote = session
            .quote(&request(ServiceTier::Taxi))
            .await
            .unwrap()
            .into_current()
            .unwrap();

        assert_eq!(quote.pickup.label, "City Hall, New York");
        assert_eq!(quote.dropoff.label, "Times Square, New York");
        assert_eq!(quote.estimate.display_fare(), 22.50);
        assert_eq!(quote.estimate.display_distance(), 5.0);
    }

    #[tokio::test]
    async fn test_short_query_never_reaches_geocoder() {
        let session = session(Gazetteer::default());

        let err = session.resolve_address(" ab ").await.unwrap_err();
        assert!(matches!(err, QuoteError::QueryTooShort { min_length: 3, .. }));
        assert_eq!(session.geocoder.searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_address_is_no_match() {
        let session = session(Gazetteer::default());

        let err = session.resolve_address("Atlantis").await.unwrap_err();
        assert!(matches!(err, QuoteError::NoAddressMatch { .. }));
    }

    #[tokio::test]
    async fn test_current_location_falls_back_to_coordinates() {
        let here = GeoPoint::new(40.7033, -74.0170);

        let ok = session(Gazetteer::default());
        let place = ok.place_from_current_location(here).await.unwrap();
        assert_eq!(place.label, "Battery Park, New York");

        let failing = session(Gazetteer {
            reverse_fails: true,
            ..Default::default()
        });
        let place = failing.place_from_current_location(here).await.unwrap();
        assert_eq!(place.label, here.to_string());
        assert_eq!(place.point, here);
    }

    #[tokio::test]
    async fn test_reprice_and_payment_request() {
        let session = session(Gazetteer::default());
        let quote = session
            .quote(&QuoteRequest {
                pickup_at: Some(
                    NaiveDateTime::parse_from_str("2026-10-16T14:30", "%Y-%m-%dT%H:%M").unwrap(),
                ),
                ..request(ServiceTier::Taxi)
            })
            .await
            .unwrap()
            .into_current()
            .unwrap();

        let stretcher = session.reprice(&quote, ServiceTier::StretcherMedical);
        assert_eq!(stretcher.estimate.display_fare(), 110.00);
        assert_eq!(stretcher.request_id, quote.request_id);

        let payment = session.payment_request(&stretcher);
        assert_eq!(payment.trip_summary.service, "Stretcher / Medical Assist");
        assert_eq!(payment.trip_summary.distance_miles, 5.0);
        assert!(payment.trip_summary.pickup_at.is_some());

        let instruction = session.payments().instruction(&payment);
        assert_eq!(instruction.amount, 110.0);
    }

    struct SlowFirstRouter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RoutingProvider for SlowFirstRouter {
        async fn route(&self, _pickup: GeoPoint, _dropoff: GeoPoint) -> Result<RouteResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                tokio::time::sleep(Duration::from_millis(150)).await;
            }
            Ok(RouteResponse {
                candidates: vec![RouteCandidate {
                    distance_meters: 1609.344 * (call + 1) as f64,
                    duration_seconds: 60.0,
                    geometry: None,
                }],
            })
        }
    }

    #[tokio::test]
    async fn test_latest_quote_wins() {
        let engine = TripPricingEngine::new(SlowFirstRouter {
            calls: AtomicUsize::new(0),
        });
        let session = BookingSession::new(engine, Gazetteer::default(), PaymentDesk::default());

        let first = request(ServiceTier::Taxi);
        let second = request(ServiceTier::WheelchairVan);

        let slow = session.quote(&first);
        let fast = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session.quote(&second).await
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert!(matches!(slow.unwrap(), QuoteOutcome::Superseded { .. }));
        let current = fast.unwrap().into_current().unwrap();
        assert_eq!(current.estimate.tier, ServiceTier::WheelchairVan);
        assert_eq!(Some(current.request_id), session.tracker().latest());
    }
}
