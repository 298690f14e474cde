use thiserror::Error;

/// Errors returned by the upstream calendar clients.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected envelope.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The client could not be constructed from the given base URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}
