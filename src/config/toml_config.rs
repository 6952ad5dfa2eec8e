use crate::adapters::nominatim::DEFAULT_NOMINATIM_ENDPOINT;
use crate::adapters::osrm::DEFAULT_OSRM_ENDPOINT;
use crate::core::pricing::FareTable;
use crate::core::ConfigProvider;
use crate::domain::model::RegionFilter;
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::{
    validate_country_codes, validate_non_empty, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub routing: RoutingConfig,
    pub geocoding: GeocodingConfig,
    pub pricing: FareTable,
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub endpoint: String,
    pub profile: String,
    pub timeout_seconds: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OSRM_ENDPOINT.to_string(),
            profile: "driving".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub endpoint: String,
    pub contact_email: String,
    pub country_codes: Vec<String>,
    pub result_limit: usize,
    pub min_query_length: usize,
    pub timeout_seconds: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_NOMINATIM_ENDPOINT.to_string(),
            contact_email: "info@auramobility.com".to_string(),
            country_codes: vec!["us".to_string()],
            result_limit: 5,
            min_query_length: 3,
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub payee_handle: String,
    pub qr_image_url: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            payee_handle: "$AuraMobility".to_string(),
            qr_image_url:
                "https://upload.wikimedia.org/wikipedia/commons/d/d0/QR_code_for_mobile_English_Wikipedia.svg"
                    .to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(QuoteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| QuoteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NOMINATIM_EMAIL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| QuoteError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_url("routing.endpoint", &self.routing.endpoint)?;
        validate_non_empty("routing.profile", &self.routing.profile)?;
        validate_positive_number("routing.timeout_seconds", self.routing.timeout_seconds, 1)?;

        validate_url("geocoding.endpoint", &self.geocoding.endpoint)?;
        validate_non_empty("geocoding.contact_email", &self.geocoding.contact_email)?;
        validate_country_codes("geocoding.country_codes", &self.geocoding.country_codes)?;
        validate_positive_number(
            "geocoding.result_limit",
            self.geocoding.result_limit as u64,
            1,
        )?;
        validate_positive_number(
            "geocoding.timeout_seconds",
            self.geocoding.timeout_seconds,
            1,
        )?;

        self.pricing.validate()?;

        validate_non_empty("payment.payee_handle", &self.payment.payee_handle)?;
        validate_url("payment.qr_image_url", &self.payment.qr_image_url)?;

        Ok(())
    }

    pub fn region_filter(&self) -> RegionFilter {
        RegionFilter {
            country_codes: self.geocoding.country_codes.clone(),
            limit: Some(self.geocoding.result_limit),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn routing_endpoint(&self) -> &str {
        &self.routing.endpoint
    }

    fn routing_profile(&self) -> &str {
        &self.routing.profile
    }

    fn routing_timeout(&self) -> Duration {
        Duration::from_secs(self.routing.timeout_seconds)
    }

    fn geocoding_endpoint(&self) -> &str {
        &self.geocoding.endpoint
    }

    fn geocoding_contact_email(&self) -> &str {
        &self.geocoding.contact_email
    }

    fn geocoding_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoding.timeout_seconds)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
