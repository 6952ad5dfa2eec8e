use crate::domain::model::{PricedEstimate, RouteResult, ServiceTier, TierRate};
use crate::utils::error::Result;
use crate::utils::validation::{validate_amount, Validate};
use serde::{Deserialize, Serialize};

/// Rounds half away from zero to `decimals` places.
///
/// The tie is decided on the binary product `value * 10^decimals`. A decimal
/// tie that f64 cannot hold exactly (1.005 is stored as 1.00499999...) rounds
/// toward whichever side the stored value lies on. Ties that are exact in
/// binary (0.125, 10.625, 2.5) always round away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Base fee and per-mile rate for every tier. Loaded once, read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FareTable {
    pub taxi: TierRate,
    pub wheelchair: TierRate,
    pub stretcher: TierRate,
}

impl Default for FareTable {
    fn default() -> Self {
        Self {
            taxi: TierRate {
                base_fee: 10.00,
                rate_per_mile: 2.50,
            },
            wheelchair: TierRate {
                base_fee: 35.00,
                rate_per_mile: 3.50,
            },
            stretcher: TierRate {
                base_fee: 85.00,
                rate_per_mile: 5.00,
            },
        }
    }
}

impl FareTable {
    pub fn rate(&self, tier: ServiceTier) -> TierRate {
        match tier {
            ServiceTier::Taxi => self.taxi,
            ServiceTier::WheelchairVan => self.wheelchair,
            ServiceTier::StretcherMedical => self.stretcher,
        }
    }

    /// `base_fee + distance_miles * rate_per_mile`, full precision.
    pub fn fare(&self, tier: ServiceTier, distance_miles: f64) -> f64 {
        let rate = self.rate(tier);
        rate.base_fee + distance_miles * rate.rate_per_mile
    }

    pub fn price(&self, route: &RouteResult, tier: ServiceTier) -> PricedEstimate {
        let rate = self.rate(tier);
        let total_fare = self.fare(tier, route.distance_miles);

        tracing::debug!(
            tier = tier.key(),
            "Pricing: {} base ${:.2} + {:.2} miles * ${:.2}/mile = ${:.2}",
            tier.display_name(),
            rate.base_fee,
            route.distance_miles,
            rate.rate_per_mile,
            total_fare
        );

        PricedEstimate {
            tier,
            distance_miles: route.distance_miles,
            duration_minutes: route.duration_minutes,
            total_fare,
        }
    }
}

impl Validate for FareTable {
    fn validate(&self) -> Result<()> {
        for tier in ServiceTier::ALL {
            let rate = self.rate(tier);
            validate_amount(&format!("pricing.{}.base_fee", tier.key()), rate.base_fee)?;
            validate_amount(
                &format!("pricing.{}.rate_per_mile", tier.key()),
                rate.rate_per_mile,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(distance_miles: f64) -> RouteResult {
        RouteResult {
            distance_miles,
            duration_minutes: 0,
        }
    }

    #[test]
    fn test_fare_formula_per_tier() {
        let table = FareTable::default();
        let distances = [0.0, 0.3, 1.0, 5.0, 12.75, 250.0];

        for tier in ServiceTier::ALL {
            let rate = table.rate(tier);
            for d in distances {
                let estimate = table.price(&route(d), tier);
                let expected = round_to(rate.base_fee + d * rate.rate_per_mile, 2);
                assert_eq!(estimate.display_fare(), expected, "{:?} at {} miles", tier, d);
            }
        }
    }

    #[test]
    fn test_zero_distance_prices_to_base_fee() {
        let table = FareTable::default();
        for tier in ServiceTier::ALL {
            let estimate = table.price(&route(0.0), tier);
            assert_eq!(estimate.total_fare, table.rate(tier).base_fee);
        }
    }

    #[test]
    fn test_fare_is_monotonic_in_distance() {
        let table = FareTable::default();
        for tier in ServiceTier::ALL {
            let mut previous = table.fare(tier, 0.0);
            for step in 1..=500 {
                let fare = table.fare(tier, step as f64 * 0.1);
                assert!(fare >= previous);
                assert!(fare >= table.rate(tier).base_fee);
                previous = fare;
            }
        }
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(22.499_996_1, 2), 22.5);
        assert_eq!(round_to(4.999_998_5, 1), 5.0);
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(3.04, 1), 3.0);
    }

    #[test]
    fn test_rounding_ties() {
        // exact in binary: half away from zero
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(10.625, 2), 10.63);
        assert_eq!(round_to(0.25, 1), 0.3);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);

        // 1.005 is stored just below the tie
        assert_eq!(round_to(1.005, 2), 1.0);
    }

    #[test]
    fn test_text_output_matches_display_values_on_ties() {
        let estimate = FareTable::default().price(
            &RouteResult {
                distance_miles: 0.25,
                duration_minutes: 1,
            },
            ServiceTier::Taxi,
        );

        assert_eq!(estimate.display_fare(), 10.63);
        assert_eq!(estimate.display_distance(), 0.3);
        assert_eq!(estimate.to_string(), "Standard Taxi: $10.63 (0.3 miles, 1 min)");
    }

    #[test]
    fn test_negative_rates_fail_validation() {
        let mut table = FareTable::default();
        assert!(table.validate().is_ok());

        table.wheelchair.rate_per_mile = -1.0;
        assert!(table.validate().is_err());
    }
}
