// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error handling for exchange collectives
//!
//! Every failure is fatal to the collective operation as a whole. Nothing in
//! this crate retries; retry policy belongs to the channel implementation.

use std::fmt;

/// Error codes for exchange operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    Ok = 0,
    Invalid = 4,
    IoError = 5,
    IndexError = 7,
    UnknownError = 9,
    NotImplemented = 10,
    SerializationError = 11,
    ProtocolError = 20,
    ChannelError = 21,
    PreconditionError = 22,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Ok => write!(f, "OK"),
            Code::Invalid => write!(f, "Invalid"),
            Code::IoError => write!(f, "IO error"),
            Code::IndexError => write!(f, "Index error"),
            Code::UnknownError => write!(f, "Unknown error"),
            Code::NotImplemented => write!(f, "Not implemented"),
            Code::SerializationError => write!(f, "Serialization error"),
            Code::ProtocolError => write!(f, "Protocol error"),
            Code::ChannelError => write!(f, "Channel error"),
            Code::PreconditionError => write!(f, "Precondition violation"),
        }
    }
}

/// Main error type for exchange operations
#[derive(thiserror::Error, Debug)]
pub enum ExchangeError {
    #[error("Invalid group size: {0} (a group needs at least one peer)")]
    InvalidGroupSize(usize),

    #[error("Ordinal {ordinal} is outside a group of size {size}")]
    InvalidOrdinal { ordinal: usize, size: usize },

    #[error("Protocol desync: {0}")]
    ProtocolDesync(String),

    #[error("Channel failure: {0}")]
    ChannelFailure(String),

    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid operation: {0}")]
    Invalid(String),

    #[error("Generic error with code {code}: {message}")]
    Generic { code: Code, message: String },
}

impl ExchangeError {
    /// Create a new error with a specific code and message
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        ExchangeError::Generic {
            code,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> Code {
        match self {
            ExchangeError::InvalidGroupSize(_) => Code::Invalid,
            ExchangeError::InvalidOrdinal { .. } => Code::IndexError,
            ExchangeError::ProtocolDesync(_) => Code::ProtocolError,
            ExchangeError::ChannelFailure(_) => Code::ChannelError,
            ExchangeError::PreconditionViolation(_) => Code::PreconditionError,
            ExchangeError::Serialization(_) => Code::SerializationError,
            ExchangeError::Io(_) => Code::IoError,
            ExchangeError::Invalid(_) => Code::Invalid,
            ExchangeError::Generic { code, .. } => *code,
        }
    }

    /// Check if the error represents success
    pub fn is_ok(&self) -> bool {
        self.code() == Code::Ok
    }
}

impl From<bincode::Error> for ExchangeError {
    fn from(e: bincode::Error) -> Self {
        ExchangeError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(e: serde_json::Error) -> Self {
        ExchangeError::Serialization(e.to_string())
    }
}

/// Type alias for Results using ExchangeError
pub type ExchangeResult<T> = Result<T, ExchangeError>;
