//! Error types for bridge analysis

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for bridge analysis
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("Invalid support: {0}")]
    InvalidSupport(String),

    #[error("Invalid load: {0}")]
    InvalidLoad(String),

    #[error("Singular stiffness system: {0}")]
    SingularSystem(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Classification of a failed analysis, as reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "InvalidMeshError")]
    InvalidMesh,
    #[serde(rename = "InvalidSupportError")]
    InvalidSupport,
    #[serde(rename = "InvalidLoadError")]
    InvalidLoad,
    #[serde(rename = "SingularSystemError")]
    SingularSystem,
    #[serde(rename = "InvalidConfigError")]
    InvalidConfig,
    #[serde(rename = "SerializationError")]
    Serialization,
}

impl ErrorKind {
    /// Classification string, e.g. `"SingularSystemError"`
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidMesh => "InvalidMeshError",
            ErrorKind::InvalidSupport => "InvalidSupportError",
            ErrorKind::InvalidLoad => "InvalidLoadError",
            ErrorKind::SingularSystem => "SingularSystemError",
            ErrorKind::InvalidConfig => "InvalidConfigError",
            ErrorKind::Serialization => "SerializationError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::InvalidMesh(_) => ErrorKind::InvalidMesh,
            BridgeError::InvalidSupport(_) => ErrorKind::InvalidSupport,
            BridgeError::InvalidLoad(_) => ErrorKind::InvalidLoad,
            BridgeError::SingularSystem(_) => ErrorKind::SingularSystem,
            BridgeError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            BridgeError::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

/// Result type for bridge analysis operations
pub type BridgeResult<T> = Result<T, BridgeError>;
