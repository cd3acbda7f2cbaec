//! Error types for Album Core.

use album_abstraction::ProviderError;
use thiserror::Error;

use crate::ai::{AiError, CacheConfigError};
use crate::store::StoreError;

/// Core error type for album operations.
#[derive(Error, Debug)]
pub enum AlbumError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Address parsing errors
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Album catalog could not be built.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A remote caption or ask call failed outside the provider layer.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Caption cache settings rejected.
    #[error("Cache configuration error: {0}")]
    Cache(#[from] CacheConfigError),

    /// Provider construction or call failed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The AI proxy rejected or could not serve a request.
    #[error("{0}")]
    Ai(#[from] AiError),
}

/// Result type alias for album operations.
pub type Result<T> = std::result::Result<T, AlbumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_error_address_parsing() {
        let parse_err = "invalid:address:format".parse::<std::net::SocketAddr>().unwrap_err();
        let album_err: AlbumError = parse_err.into();
        match album_err {
            AlbumError::InvalidAddress(_) => {}
            _ => panic!("Expected InvalidAddress error variant"),
        }
    }

    #[test]
    fn test_album_error_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let album_err: AlbumError = io_err.into();
        match album_err {
            AlbumError::Io(_) => {}
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_album_error_config() {
        let album_err = AlbumError::Config("Invalid port".to_string());
        assert_eq!(album_err.to_string(), "Configuration error: Invalid port");
    }

    #[test]
    fn test_album_error_cache_conversion() {
        let album_err: AlbumError = CacheConfigError::InvalidTtl.into();
        assert!(matches!(album_err, AlbumError::Cache(CacheConfigError::InvalidTtl)));
    }

    #[test]
    fn test_ai_error_displays_unwrapped() {
        let album_err: AlbumError = AiError::MissingImageUrl.into();
        assert_eq!(album_err.to_string(), "Missing imageUrl");
    }

    #[test]
    fn test_provider_error_conversion() {
        let album_err: AlbumError = ProviderError::NotConfigured("GROQ_API_KEY is not set".to_string()).into();
        assert!(album_err.to_string().contains("GROQ_API_KEY"));
    }
}
