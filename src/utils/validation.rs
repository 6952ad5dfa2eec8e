use crate::utils::error::{QuoteError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(QuoteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(QuoteError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(QuoteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(QuoteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 金額必須是有限且不為負的數字
pub fn validate_amount(field_name: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(QuoteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: amount.to_string(),
            reason: "Amount must be a finite, non-negative number".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(QuoteError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty".to_string(),
        });
    }
    Ok(())
}

pub fn validate_country_codes(field_name: &str, codes: &[String]) -> Result<()> {
    for code in codes {
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(QuoteError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: code.clone(),
                reason: "Country codes must be two-letter ISO 3166-1 codes".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("routing.endpoint", "https://router.project-osrm.org").is_ok());
        assert!(validate_url("routing.endpoint", "http://localhost:5000").is_ok());
        assert!(validate_url("routing.endpoint", "").is_err());
        assert!(validate_url("routing.endpoint", "ftp://example.com").is_err());
        assert!(validate_url("routing.endpoint", "not a url").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("timeout_seconds", 10, 1).is_ok());
        assert!(validate_positive_number("timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("pricing.taxi.base_fee", 0.0).is_ok());
        assert!(validate_amount("pricing.taxi.base_fee", 10.0).is_ok());
        assert!(validate_amount("pricing.taxi.base_fee", -0.01).is_err());
        assert!(validate_amount("pricing.taxi.base_fee", f64::NAN).is_err());
        assert!(validate_amount("pricing.taxi.base_fee", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_country_codes() {
        assert!(validate_country_codes("geocoding.country_codes", &["us".to_string(), "ca".to_string()]).is_ok());
        assert!(validate_country_codes("geocoding.country_codes", &["usa".to_string()]).is_err());
        assert!(validate_country_codes("geocoding.country_codes", &[]).is_ok());
    }
}
