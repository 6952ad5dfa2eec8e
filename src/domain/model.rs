use crate::utils::error::{QuoteError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 公尺轉英里
pub const METERS_TO_MILES: f64 = 0.000621371;

/// A WGS84 coordinate. Immutable; range checks live in [`GeoPoint::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a point and range-checks it in one step.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        let point = Self::new(latitude, longitude);
        point.validate("point")?;
        Ok(point)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }

        let reason = if !self.latitude.is_finite() || !self.longitude.is_finite() {
            "coordinates must be finite numbers"
        } else if !(-90.0..=90.0).contains(&self.latitude) {
            "latitude must be within [-90, 90]"
        } else {
            "longitude must be within [-180, 180]"
        };

        Err(QuoteError::InvalidCoordinates {
            field: field.to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            reason: reason.to_string(),
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lon"`. Only the syntax is checked here.
impl FromStr for GeoPoint {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| QuoteError::InvalidLocation {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| invalid("expected 'lat,lon'"))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("latitude is not a number"))?;
        let longitude = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("longitude is not a number"))?;

        Ok(Self::new(latitude, longitude))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceTier {
    #[serde(rename = "taxi")]
    Taxi,
    #[serde(rename = "wheelchair")]
    WheelchairVan,
    #[serde(rename = "stretcher")]
    StretcherMedical,
}

impl ServiceTier {
    pub const ALL: [ServiceTier; 3] = [
        ServiceTier::Taxi,
        ServiceTier::WheelchairVan,
        ServiceTier::StretcherMedical,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ServiceTier::Taxi => "taxi",
            ServiceTier::WheelchairVan => "wheelchair",
            ServiceTier::StretcherMedical => "stretcher",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceTier::Taxi => "Standard Taxi",
            ServiceTier::WheelchairVan => "Wheelchair Accessible Van",
            ServiceTier::StretcherMedical => "Stretcher / Medical Assist",
        }
    }
}

impl fmt::Display for ServiceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ServiceTier {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "taxi" => Ok(ServiceTier::Taxi),
            "wheelchair" | "wheelchair-van" => Ok(ServiceTier::WheelchairVan),
            "stretcher" | "stretcher-medical" => Ok(ServiceTier::StretcherMedical),
            _ => Err(QuoteError::InvalidTier {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRate {
    pub base_fee: f64,
    pub rate_per_mile: f64,
}

/// One route alternative as reported by the routing provider, in provider units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
}

/// Candidates are ordered by the provider, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub candidates: Vec<RouteCandidate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub distance_miles: f64,
    pub duration_minutes: u32,
}

impl RouteResult {
    /// Converts a provider candidate, rejecting negative or non-finite measurements.
    pub fn from_candidate(candidate: &RouteCandidate) -> Result<Self> {
        let RouteCandidate {
            distance_meters,
            duration_seconds,
            ..
        } = *candidate;

        if !distance_meters.is_finite() || distance_meters < 0.0 {
            return Err(QuoteError::routing(format!(
                "malformed route distance: {}",
                distance_meters
            )));
        }
        if !duration_seconds.is_finite() || duration_seconds < 0.0 {
            return Err(QuoteError::routing(format!(
                "malformed route duration: {}",
                duration_seconds
            )));
        }

        Ok(Self {
            distance_miles: distance_meters * METERS_TO_MILES,
            duration_minutes: (duration_seconds / 60.0).round() as u32,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricedEstimate {
    pub tier: ServiceTier,
    pub distance_miles: f64,
    pub duration_minutes: u32,
    pub total_fare: f64,
}

impl PricedEstimate {
    /// 顯示用：距離取一位小數
    pub fn display_distance(&self) -> f64 {
        crate::core::pricing::round_to(self.distance_miles, 1)
    }

    /// 顯示用：車資取兩位小數
    pub fn display_fare(&self) -> f64 {
        crate::core::pricing::round_to(self.total_fare, 2)
    }

    pub fn route(&self) -> RouteResult {
        RouteResult {
            distance_miles: self.distance_miles,
            duration_minutes: self.duration_minutes,
        }
    }

    pub fn view(&self) -> EstimateView {
        EstimateView {
            tier: self.tier,
            tier_name: self.tier.display_name().to_string(),
            distance_miles: self.display_distance(),
            duration_minutes: self.duration_minutes,
            total_fare: self.display_fare(),
        }
    }
}

impl fmt::Display for PricedEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ${:.2} ({:.1} miles, {} min)",
            self.tier.display_name(),
            self.display_fare(),
            self.display_distance(),
            self.duration_minutes
        )
    }
}

/// Rounded values for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateView {
    pub tier: ServiceTier,
    pub tier_name: String,
    pub distance_miles: f64,
    pub duration_minutes: u32,
    pub total_fare: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeHit {
    pub point: GeoPoint,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionFilter {
    pub country_codes: Vec<String>,
    pub limit: Option<usize>,
}

/// A resolved location: where it is and what to call it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub point: GeoPoint,
    pub label: String,
}

impl Place {
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            label: point.to_string(),
            point,
        }
    }
}

impl From<GeocodeHit> for Place {
    fn from(hit: GeocodeHit) -> Self {
        Self {
            point: hit.point,
            label: hit.label,
        }
    }
}

/// What the rider typed: coordinates are used as-is, anything else is geocoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Location {
    Point(GeoPoint),
    Address(String),
}

impl FromStr for Location {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(QuoteError::InvalidLocation {
                value: s.to_string(),
                reason: "location cannot be empty".to_string(),
            });
        }

        match trimmed.parse::<GeoPoint>() {
            Ok(point) => Ok(Location::Point(point)),
            Err(_) => Ok(Location::Address(trimmed.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub pickup: String,
    pub dropoff: String,
    pub service: String,
    pub distance_miles: f64,
    pub duration_minutes: u32,
    pub pickup_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub total_fare: f64,
    pub trip_summary: TripSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInstruction {
    pub amount: f64,
    pub payee_handle: String,
    pub qr_image_url: String,
    pub summary: TripSummary,
}

impl fmt::Display for PaymentInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scan to pay ${:.2}", self.amount)?;
        writeln!(f, "QR code: {}", self.qr_image_url)?;
        write!(f, "Or send manually to {}", self.payee_handle)
    }
}

/// Payment state as far as this crate can know it. A rider's claim is never
/// promoted to `Verified` on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentStatus {
    AwaitingPayment,
    ClaimedByRider,
    Verified { reference: String },
}
