//! Error types for the audit system

use thiserror::Error;

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Main error type for audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Network error: {0}")]
    NetworkError(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("HTTP {status} from {service} for {url}")]
    HttpStatus {
        service: String,
        status: u16,
        url: String,
    },

    #[error("Failed to decode response: {0}")]
    DecodeError(String),

    #[error("Missing field in {document}: {field}")]
    MissingField { document: String, field: String },

    #[error("Invalid version '{version}': {source}")]
    VersionParse {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Failed to parse project descriptor: {0}")]
    XmlError(#[from] roxmltree::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

#[derive(Debug)]
struct StringError(String);

impl std::fmt::Display for StringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StringError {}

impl From<reqwest::Error> for AuditError {
    fn from(err: reqwest::Error) -> Self {
        // Status errors are produced explicitly by the clients, so what is left
        // here is either a body that failed to decode or a transport failure.
        if err.is_decode() || err.is_body() {
            Self::DecodeError(err.to_string())
        } else {
            Self::NetworkError(Box::new(err))
        }
    }
}

impl AuditError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(Box::new(StringError(msg.into())))
    }

    /// Create an HTTP status error
    pub fn http_status(service: impl Into<String>, status: u16, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            service: service.into(),
            status,
            url: url.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(document: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            document: document.into(),
            field: field.into(),
        }
    }

    /// Create a version parse error
    pub fn version(version: impl Into<String>, source: semver::Error) -> Self {
        Self::VersionParse {
            version: version.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message() {
        let err = AuditError::http_status("GitHub", 404, "https://api.github.com/user/repos");
        assert_eq!(
            err.to_string(),
            "HTTP 404 from GitHub for https://api.github.com/user/repos"
        );
    }

    #[test]
    fn test_parse_failures_keep_their_source() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(AuditError::from(json), AuditError::JsonError(_)));

        let xml = roxmltree::Document::parse("<Project>").unwrap_err();
        assert!(matches!(AuditError::from(xml), AuditError::XmlError(_)));
    }

    #[test]
    fn test_version_error_keeps_input() {
        let source = semver::Version::parse("13.0").unwrap_err();
        let err = AuditError::version("13.0", source);
        assert!(err.to_string().starts_with("Invalid version '13.0'"));
    }
}
