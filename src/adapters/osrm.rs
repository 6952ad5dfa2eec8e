use crate::domain::model::{GeoPoint, RouteCandidate, RouteResponse};
use crate::domain::ports::{ConfigProvider, RoutingProvider};
use crate::utils::error::{QuoteError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_OSRM_ENDPOINT: &str = "https://router.project-osrm.org";

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    #[serde(default)]
    geometry: Option<serde_json::Value>,
}

impl OsrmResponse {
    /// OSRM 用這兩個代碼表示「找不到可行駛的路線」，這是正常答覆而非服務故障
    fn is_negative_answer(&self) -> bool {
        matches!(self.code.as_deref(), Some("NoRoute") | Some("NoSegment"))
    }
}

/// Routing provider backed by an OSRM HTTP server.
#[derive(Debug, Clone)]
pub struct OsrmRouter {
    client: Client,
    endpoint: String,
    profile: String,
}

impl OsrmRouter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ride-quote/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QuoteError::ConfigError {
                message: format!("Failed to build routing HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            profile: "driving".to_string(),
        })
    }

    pub fn from_config(config: &impl ConfigProvider) -> Result<Self> {
        Ok(Self::new(config.routing_endpoint(), config.routing_timeout())?
            .with_profile(config.routing_profile()))
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// OSRM expects `lon,lat` order.
    fn route_url(&self, pickup: GeoPoint, dropoff: GeoPoint) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.endpoint,
            self.profile,
            pickup.longitude(),
            pickup.latitude(),
            dropoff.longitude(),
            dropoff.latitude()
        )
    }
}

#[async_trait]
impl RoutingProvider for OsrmRouter {
    async fn route(&self, pickup: GeoPoint, dropoff: GeoPoint) -> Result<RouteResponse> {
        let url = self.route_url(pickup, dropoff);
        tracing::debug!("Making routing request to: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await
            .map_err(|e| QuoteError::routing(format!("request failed: {}", e)))?;

        let status = response.status();
        tracing::debug!("Routing response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| QuoteError::routing(format!("failed to read response: {}", e)))?;
        let parsed = serde_json::from_str::<OsrmResponse>(&body);

        if !status.is_success() {
            return match parsed {
                Ok(answer) if answer.is_negative_answer() => {
                    tracing::info!("Routing service found no route ({:?})", answer.code);
                    Ok(RouteResponse::default())
                }
                _ => Err(QuoteError::routing(format!(
                    "routing service returned {}",
                    status
                ))),
            };
        }

        let answer = parsed
            .map_err(|e| QuoteError::routing(format!("unreadable route response: {}", e)))?;

        match answer.code.as_deref() {
            None | Some("Ok") => {}
            _ if answer.is_negative_answer() => return Ok(RouteResponse::default()),
            Some(code) => {
                return Err(QuoteError::routing(format!(
                    "routing service answered {}: {}",
                    code,
                    answer.message.as_deref().unwrap_or("no message")
                )));
            }
        }

        let candidates = answer
            .routes
            .into_iter()
            .map(|route| RouteCandidate {
                distance_meters: route.distance,
                duration_seconds: route.duration,
                geometry: route.geometry,
            })
            .collect::<Vec<_>>();

        tracing::debug!("Routing returned {} candidate(s)", candidates.len());

        Ok(RouteResponse { candidates })
    }
}
