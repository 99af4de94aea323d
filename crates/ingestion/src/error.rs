//! Ingestion error types

use contracts::SensorKind;
use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Channel closed while the source was still delivering
    #[error("channel closed for {kind}")]
    ChannelClosed { kind: SensorKind },

    /// Source is already listening
    #[error("{kind} source is already listening")]
    AlreadyListening { kind: SensorKind },
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
