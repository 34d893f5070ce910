//! Client-side error taxonomy shared by the session and API layers.
//! Nothing here crosses a contract boundary raw: the session controller
//! collapses failures into its state enum and the API client collapses them
//! into the uniform `ApiResponse` shape. This enum classifies them on the way.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientError {
    /// The request never reached the server (DNS, refused connection, dead socket).
    #[error("network error: {message}")]
    Transport { message: String },
    /// The server answered with a non-success status.
    #[error("http {status}: {message}")]
    Api { status: u16, message: String },
    /// Credential storage failed in an unexpected way. Absence and corruption
    /// are not errors; they are handled inside the store itself.
    #[error("storage error: {message}")]
    Storage { message: String },
    /// Client-side configuration problem, e.g. no API base URL.
    #[error("config error: {message}")]
    Config { message: String },
}

impl ClientError {
    pub fn transport<S: Into<String>>(msg: S) -> Self { ClientError::Transport { message: msg.into() } }
    pub fn api<S: Into<String>>(status: u16, msg: S) -> Self { ClientError::Api { status, message: msg.into() } }
    pub fn storage<S: Into<String>>(msg: S) -> Self { ClientError::Storage { message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { ClientError::Config { message: msg.into() } }

    pub fn message(&self) -> &str {
        match self {
            ClientError::Transport { message }
            | ClientError::Api { message, .. }
            | ClientError::Storage { message }
            | ClientError::Config { message } => message.as_str(),
        }
    }

    pub fn is_transport(&self) -> bool { matches!(self, ClientError::Transport { .. }) }
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage { message: err.to_string() }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Storage { message: err.to_string() }
    }
}
