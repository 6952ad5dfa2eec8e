use crate::domain::model::{GeoPoint, GeocodeHit, RegionFilter};
use crate::domain::ports::{ConfigProvider, GeocodingProvider};
use crate::utils::error::{QuoteError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
    error: Option<String>,
}

impl NominatimPlace {
    /// Nominatim 以字串回傳座標
    fn into_hit(self) -> Option<GeocodeHit> {
        let latitude = self.lat.parse::<f64>().ok()?;
        let longitude = self.lon.parse::<f64>().ok()?;
        let point = GeoPoint::try_new(latitude, longitude).ok()?;

        Some(GeocodeHit {
            point,
            label: self.display_name,
        })
    }
}

/// Geocoding provider backed by a Nominatim server.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
    contact_email: String,
}

impl NominatimGeocoder {
    pub fn new(
        endpoint: impl Into<String>,
        contact_email: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let contact_email = contact_email.into();

        // Nominatim's usage policy requires an identifying User-Agent.
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!(
                "ride-quote/{} ({})",
                env!("CARGO_PKG_VERSION"),
                contact_email
            ))
            .build()
            .map_err(|e| QuoteError::ConfigError {
                message: format!("Failed to build geocoding HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            contact_email,
        })
    }

    pub fn from_config(config: &impl ConfigProvider) -> Result<Self> {
        Self::new(
            config.geocoding_endpoint(),
            config.geocoding_contact_email(),
            config.geocoding_timeout(),
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.endpoint, path);
        tracing::debug!("Making geocoding request to: {}", url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| QuoteError::geocoding(format!("request failed: {}", e)))?;

        let status = response.status();
        tracing::debug!("Geocoding response status: {}", status);

        if !status.is_success() {
            return Err(QuoteError::geocoding(format!(
                "geocoding service returned {}",
                status
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| QuoteError::geocoding(format!("unreadable geocoding response: {}", e)))
    }
}

#[async_trait]
impl GeocodingProvider for NominatimGeocoder {
    async fn search(&self, query: &str, region: Option<&RegionFilter>) -> Result<Vec<GeocodeHit>> {
        let mut params = vec![
            ("format", "json".to_string()),
            ("q", query.to_string()),
        ];

        if let Some(region) = region {
            if !region.country_codes.is_empty() {
                params.push(("countrycodes", region.country_codes.join(",")));
            }
            if let Some(limit) = region.limit {
                params.push(("limit", limit.to_string()));
            }
        }

        let places: Vec<NominatimPlace> = self.get_json("search", &params).await?;
        let total = places.len();
        let hits: Vec<GeocodeHit> = places
            .into_iter()
            .filter_map(NominatimPlace::into_hit)
            .collect();

        if hits.len() < total {
            tracing::warn!(
                "Dropped {} geocoding result(s) with unusable coordinates",
                total - hits.len()
            );
        }

        tracing::debug!("Geocoding '{}' returned {} hit(s)", query, hits.len());
        Ok(hits)
    }

    async fn reverse_geocode(&self, point: GeoPoint) -> Result<String> {
        let params = [
            ("format", "json".to_string()),
            ("lat", point.latitude().to_string()),
            ("lon", point.longitude().to_string()),
            ("email", self.contact_email.clone()),
        ];

        let answer: NominatimReverse = self.get_json("reverse", &params).await?;

        match answer.display_name {
            Some(label) if !label.is_empty() => Ok(label),
            _ => {
                if let Some(error) = answer.error {
                    tracing::debug!("Reverse geocoding answered: {}", error);
                }
                Err(QuoteError::NoAddressMatch {
                    query: point.to_string(),
                })
            }
        }
    }
}
