use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Invalid coordinates for {field}: ({latitude}, {longitude}) - {reason}")]
    InvalidCoordinates {
        field: String,
        latitude: f64,
        longitude: f64,
        reason: String,
    },

    #[error("Routing service unavailable: {message}")]
    RoutingUnavailable { message: String },

    #[error("No driving route found between the selected locations")]
    NoRouteFound,

    #[error("Geocoding service unavailable: {message}")]
    GeocodingUnavailable { message: String },

    #[error("No address matched '{query}'")]
    NoAddressMatch { query: String },

    #[error("Address query '{query}' is too short (minimum {min_length} characters)")]
    QueryTooShort { query: String, min_length: usize },

    #[error("Unknown service tier: {value}")]
    InvalidTier { value: String },

    #[error("Invalid location '{value}': {reason}")]
    InvalidLocation { value: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Routing,
    Geocoding,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl QuoteError {
    pub fn routing(message: impl Into<String>) -> Self {
        Self::RoutingUnavailable {
            message: message.into(),
        }
    }

    pub fn geocoding(message: impl Into<String>) -> Self {
        Self::GeocodingUnavailable {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCoordinates { .. }
            | Self::QueryTooShort { .. }
            | Self::InvalidTier { .. }
            | Self::InvalidLocation { .. }
            | Self::ValidationError { .. } => ErrorCategory::Input,
            Self::RoutingUnavailable { .. } | Self::NoRouteFound => ErrorCategory::Routing,
            Self::GeocodingUnavailable { .. } | Self::NoAddressMatch { .. } => {
                ErrorCategory::Geocoding
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 使用者可以直接修正的輸入問題
            Self::QueryTooShort { .. } | Self::NoAddressMatch { .. } | Self::NoRouteFound => {
                ErrorSeverity::Low
            }
            // 外部服務暫時失敗，稍後可再試
            Self::RoutingUnavailable { .. } | Self::GeocodingUnavailable { .. } => {
                ErrorSeverity::Medium
            }
            Self::InvalidCoordinates { .. }
            | Self::InvalidTier { .. }
            | Self::InvalidLocation { .. }
            | Self::ValidationError { .. }
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::InvalidCoordinates { .. } => {
                "Latitude must be within [-90, 90] and longitude within [-180, 180]".to_string()
            }
            Self::RoutingUnavailable { .. } => {
                "Check the routing endpoint and network connectivity, then try again".to_string()
            }
            Self::NoRouteFound => {
                "Make sure both locations are connected by road, or pick nearby addresses"
                    .to_string()
            }
            Self::GeocodingUnavailable { .. } => {
                "The address service may be rate limiting; wait a moment or enter coordinates as 'lat,lon'"
                    .to_string()
            }
            Self::NoAddressMatch { .. } => {
                "Try a more specific address, including city and state".to_string()
            }
            Self::QueryTooShort { min_length, .. } => {
                format!("Type at least {} characters of the address", min_length)
            }
            Self::InvalidTier { .. } => "Use one of: taxi, wheelchair, stretcher".to_string(),
            Self::InvalidLocation { .. } => {
                "Use 'lat,lon' (e.g. 40.7128,-74.0060) or a street address".to_string()
            }
            Self::ValidationError { .. } => "Correct the input and try again".to_string(),
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Review the configuration file and command-line overrides".to_string()
            }
            Self::IoError(_) => "Check file paths and permissions".to_string(),
            Self::SerializationError(_) => {
                "The service returned data in an unexpected format".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidCoordinates { field, .. } => {
                format!("The {} location has invalid coordinates.", field)
            }
            Self::RoutingUnavailable { .. } => {
                "Error calculating route. Please try again.".to_string()
            }
            Self::NoRouteFound => {
                "No driving route found between these locations. Are they connected by road?"
                    .to_string()
            }
            Self::GeocodingUnavailable { .. } => {
                "Address lookup is currently unavailable.".to_string()
            }
            Self::NoAddressMatch { query } => format!("We couldn't find '{}'.", query),
            Self::QueryTooShort { query, .. } => {
                format!("'{}' is too short to look up an address.", query)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
